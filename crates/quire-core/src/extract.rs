//! Identity extraction.
//!
//! Pulls the asserted `(organization, user)` pair out of request metadata and
//! checks its shape. Nothing here touches the store: a malformed or partial
//! identity is rejected before any lookup happens.

use std::collections::HashMap;

use thiserror::Error;

use crate::ObjectId;

/// Metadata field carrying the asserted organization id.
pub const ORG_ID_HEADER: &str = "x-org-id";

/// Metadata field carrying the asserted user id.
pub const USER_ID_HEADER: &str = "x-user-id";

// ─── Metadata ────────────────────────────────────────────────────────────────

/// Read access to the named fields of an incoming request.
pub trait RequestMetadata {
  fn get(&self, name: &str) -> Option<&str>;
}

/// Metadata with no fields at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl RequestMetadata for Anonymous {
  fn get(&self, _: &str) -> Option<&str> { None }
}

impl RequestMetadata for HashMap<String, String> {
  fn get(&self, name: &str) -> Option<&str> {
    HashMap::get(self, name).map(String::as_str)
  }
}

// ─── Candidate ───────────────────────────────────────────────────────────────

/// A well-formed but not yet verified identity assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityCandidate {
  pub organization_id: ObjectId,
  pub user_id:         ObjectId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedIdentity {
  #[error("missing required headers {ORG_ID_HEADER} and {USER_ID_HEADER}")]
  Missing,

  #[error("header {missing} is required together with {present}")]
  Partial {
    missing: &'static str,
    present: &'static str,
  },

  #[error("header {header} is not a valid identifier")]
  Format { header: &'static str },
}

// ─── Assertion capability ────────────────────────────────────────────────────

/// How a request asserts who it is.
///
/// [`HeaderAsserted`] trusts two caller-supplied ids and leaves verification
/// to the resolver's existence checks. A credential-based variant can replace
/// it without touching resolution or authorization.
pub trait IdentityAssertion: Send + Sync {
  fn assert_identity<M>(
    &self,
    metadata: &M,
  ) -> Result<IdentityCandidate, MalformedIdentity>
  where
    M: RequestMetadata + ?Sized;
}

/// Identity asserted through the [`ORG_ID_HEADER`] and [`USER_ID_HEADER`]
/// fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderAsserted;

impl IdentityAssertion for HeaderAsserted {
  fn assert_identity<M>(
    &self,
    metadata: &M,
  ) -> Result<IdentityCandidate, MalformedIdentity>
  where
    M: RequestMetadata + ?Sized,
  {
    extract(metadata)
  }
}

/// Read both identity fields. Empty values count as absent.
pub fn extract<M>(metadata: &M) -> Result<IdentityCandidate, MalformedIdentity>
where
  M: RequestMetadata + ?Sized,
{
  let org = metadata.get(ORG_ID_HEADER).filter(|v| !v.is_empty());
  let user = metadata.get(USER_ID_HEADER).filter(|v| !v.is_empty());

  match (org, user) {
    (None, None) => Err(MalformedIdentity::Missing),
    (Some(_), None) => Err(MalformedIdentity::Partial {
      missing: USER_ID_HEADER,
      present: ORG_ID_HEADER,
    }),
    (None, Some(_)) => Err(MalformedIdentity::Partial {
      missing: ORG_ID_HEADER,
      present: USER_ID_HEADER,
    }),
    (Some(org), Some(user)) => Ok(IdentityCandidate {
      organization_id: parse_field(org, ORG_ID_HEADER)?,
      user_id:         parse_field(user, USER_ID_HEADER)?,
    }),
  }
}

fn parse_field(
  value: &str,
  header: &'static str,
) -> Result<ObjectId, MalformedIdentity> {
  ObjectId::parse(value).map_err(|_| MalformedIdentity::Format { header })
}
