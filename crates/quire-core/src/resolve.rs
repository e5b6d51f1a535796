//! Identity resolution: turning an asserted candidate into a verified
//! [`ResolvedIdentity`] by checking it against stored state.

use crate::{
  Error, ObjectId, Result,
  extract::IdentityCandidate,
  store::{TenantScope, TenantStore},
  user::Role,
};

/// The `(organization, user, role)` triple established for one request.
///
/// Only [`resolve`] can produce one, and it is never cached: the role is the
/// stored role at the moment of resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
  organization_id: ObjectId,
  user_id:         ObjectId,
  role:            Role,
}

impl ResolvedIdentity {
  pub(crate) fn new(organization_id: ObjectId, user_id: ObjectId, role: Role) -> Self {
    Self { organization_id, user_id, role }
  }

  pub fn organization_id(&self) -> ObjectId { self.organization_id }

  pub fn user_id(&self) -> ObjectId { self.user_id }

  pub fn role(&self) -> Role { self.role }

  /// The tenant filter every data access on behalf of this identity uses.
  pub fn scope(&self) -> TenantScope { TenantScope::new(self.organization_id) }
}

/// Verify `candidate` against the store.
///
/// Two point lookups: the user, then (after the membership check) the
/// organization.
pub async fn resolve<S>(store: &S, candidate: IdentityCandidate) -> Result<ResolvedIdentity>
where
  S: TenantStore,
{
  let IdentityCandidate { organization_id, user_id } = candidate;

  let user = store
    .find_user(user_id)
    .await
    .map_err(Error::from_store)?
    .ok_or(Error::UserNotFound(user_id))?;

  if user.organization_id != organization_id {
    return Err(Error::OrganizationMismatch { user_id, asserted: organization_id });
  }

  store
    .get_organization(organization_id)
    .await
    .map_err(Error::from_store)?
    .ok_or(Error::OrganizationNotFound(organization_id))?;

  Ok(ResolvedIdentity::new(organization_id, user_id, user.role))
}
