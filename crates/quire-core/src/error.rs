//! Error types for `quire-core`.

use thiserror::Error;

use crate::{
  ObjectId,
  extract::MalformedIdentity,
  permission::{Permission, ResourceType},
  pipeline::Stage,
  store::{Constraint, StoreFault},
  user::Role,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed identity: {0}")]
  MalformedIdentity(#[from] MalformedIdentity),

  #[error("user {0} not found")]
  UserNotFound(ObjectId),

  #[error("organization {0} not found")]
  OrganizationNotFound(ObjectId),

  #[error("user {user_id} does not belong to organization {asserted}")]
  OrganizationMismatch { user_id: ObjectId, asserted: ObjectId },

  #[error("role {role} is not permitted to {permission}")]
  PermissionDenied { role: Role, permission: Permission },

  #[error("{resource} {id} not found")]
  NotFound { resource: ResourceType, id: String },

  #[error("constraint violation: {0}")]
  ConstraintViolation(Constraint),

  #[error("organization {organization_id} already has {users} user(s)")]
  AlreadyProvisioned { organization_id: ObjectId, users: u64 },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The error taxonomy without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
  MalformedIdentity,
  UserNotFound,
  OrganizationNotFound,
  OrganizationMismatch,
  PermissionDenied,
  NotFound,
  ConstraintViolation,
  AlreadyProvisioned,
  Store,
}

impl Error {
  /// Convert a backend error, lifting constraint violations into
  /// [`Error::ConstraintViolation`].
  pub fn from_store<E: StoreFault>(err: E) -> Self {
    match err.constraint() {
      Some(constraint) => Self::ConstraintViolation(constraint.clone()),
      None => Self::Store(Box::new(err)),
    }
  }

  pub fn not_found(resource: ResourceType, id: impl ToString) -> Self {
    Self::NotFound { resource, id: id.to_string() }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::MalformedIdentity(_) => ErrorKind::MalformedIdentity,
      Self::UserNotFound(_) => ErrorKind::UserNotFound,
      Self::OrganizationNotFound(_) => ErrorKind::OrganizationNotFound,
      Self::OrganizationMismatch { .. } => ErrorKind::OrganizationMismatch,
      Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
      Self::NotFound { .. } => ErrorKind::NotFound,
      Self::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
      Self::AlreadyProvisioned { .. } => ErrorKind::AlreadyProvisioned,
      Self::Store(_) => ErrorKind::Store,
    }
  }

  /// True for the three resolver failures. Callers must not be able to tell
  /// them apart; logs can.
  pub fn is_unresolved_identity(&self) -> bool {
    matches!(
      self.kind(),
      ErrorKind::UserNotFound
        | ErrorKind::OrganizationNotFound
        | ErrorKind::OrganizationMismatch
    )
  }

  /// The pipeline stage this error rejects a request at, or `None` for
  /// errors raised while executing.
  pub fn stage(&self) -> Option<Stage> {
    match self.kind() {
      ErrorKind::MalformedIdentity => Some(Stage::Extracting),
      ErrorKind::UserNotFound
      | ErrorKind::OrganizationNotFound
      | ErrorKind::OrganizationMismatch => Some(Stage::Resolving),
      ErrorKind::PermissionDenied => Some(Stage::Authorizing),
      ErrorKind::NotFound
      | ErrorKind::ConstraintViolation
      | ErrorKind::AlreadyProvisioned
      | ErrorKind::Store => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
