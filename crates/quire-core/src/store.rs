//! The `TenantStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `quire-store-sqlite`).
//! Request handling never calls it directly; it goes through
//! [`crate::gateway`], which derives every [`TenantScope`] from a resolved
//! identity.

use std::future::Future;

use thiserror::Error;

use crate::{
  ObjectId,
  note::{NewNote, Note, NotePatch},
  organization::{NewOrganization, Organization},
  user::{NewUser, User, UserPatch},
};

// ─── Scope ───────────────────────────────────────────────────────────────────

/// The organization filter applied to every user and note query.
///
/// Store methods that touch users or notes take a scope by value; there is no
/// variant that omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
  organization_id: ObjectId,
}

impl TenantScope {
  pub fn new(organization_id: ObjectId) -> Self { Self { organization_id } }

  pub fn organization_id(&self) -> ObjectId { self.organization_id }
}

// ─── Paging ──────────────────────────────────────────────────────────────────

/// Offset pagination for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  pub skip:  usize,
  pub limit: usize,
}

impl Page {
  pub const DEFAULT_LIMIT: usize = 100;
  pub const MAX_LIMIT: usize = 1000;
}

impl Default for Page {
  fn default() -> Self { Self { skip: 0, limit: Self::DEFAULT_LIMIT } }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A uniqueness rule the store refused to break.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Constraint {
  #[error("organization with name {0:?} already exists")]
  OrganizationName(String),

  #[error("user with email {0:?} already exists in this organization")]
  UserEmail(String),
}

/// Backend errors must say whether they are a constraint violation so the
/// gateway can surface them as such rather than as an opaque store fault.
pub trait StoreFault: std::error::Error + Send + Sync + 'static {
  fn constraint(&self) -> Option<&Constraint>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the persistent store: three record sets addressed by
/// [`ObjectId`].
///
/// Ids and timestamps are assigned by the store. Single-record writes are
/// atomic; nothing here spans records.
pub trait TenantStore: Send + Sync {
  type Error: StoreFault;

  /// Cheap round trip used by readiness checks.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Organizations ─────────────────────────────────────────────────────

  /// Persist a new organization. Fails with [`Constraint::OrganizationName`]
  /// if the name is taken.
  fn create_organization(
    &self,
    input: NewOrganization,
  ) -> impl Future<Output = Result<Organization, Self::Error>> + Send + '_;

  fn get_organization(
    &self,
    id: ObjectId,
  ) -> impl Future<Output = Result<Option<Organization>, Self::Error>> + Send + '_;

  // ── Identity lookup ───────────────────────────────────────────────────

  /// Point lookup of a user by id alone.
  ///
  /// This is the only unscoped user read. It exists so the resolver can learn
  /// which organization an asserted user belongs to.
  fn find_user(
    &self,
    id: ObjectId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user owned by `scope`'s organization. Fails with
  /// [`Constraint::UserEmail`] if the email is taken within that organization.
  fn create_user(
    &self,
    scope: TenantScope,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    scope: TenantScope,
    id: ObjectId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn list_users(
    &self,
    scope: TenantScope,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  fn count_users(
    &self,
    scope: TenantScope,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Apply `patch` and stamp `updated_at`. An empty patch changes nothing.
  /// Returns `None` if no such user exists in `scope`.
  fn update_user(
    &self,
    scope: TenantScope,
    id: ObjectId,
    patch: UserPatch,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Notes ─────────────────────────────────────────────────────────────

  fn create_note(
    &self,
    scope: TenantScope,
    created_by: ObjectId,
    input: NewNote,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  fn get_note(
    &self,
    scope: TenantScope,
    id: ObjectId,
  ) -> impl Future<Output = Result<Option<Note>, Self::Error>> + Send + '_;

  /// Notes in `scope`, newest first.
  fn list_notes(
    &self,
    scope: TenantScope,
    page: Page,
  ) -> impl Future<Output = Result<Vec<Note>, Self::Error>> + Send + '_;

  /// Apply `patch` and stamp `updated_at`. An empty patch changes nothing.
  /// Returns `None` if no such note exists in `scope`.
  fn update_note(
    &self,
    scope: TenantScope,
    id: ObjectId,
    patch: NotePatch,
  ) -> impl Future<Output = Result<Option<Note>, Self::Error>> + Send + '_;

  /// Returns `false` if no such note exists in `scope`.
  fn delete_note(
    &self,
    scope: TenantScope,
    id: ObjectId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
