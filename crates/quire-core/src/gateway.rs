//! Data access on behalf of a request.
//!
//! [`Gateway`] is the only way request handling reaches user and note
//! records. It is built from a [`ResolvedIdentity`] and applies that
//! identity's organization to every query and every write; callers cannot
//! supply an organization of their own. [`Directory`] covers the public
//! organization operations, which need no identity.

use std::sync::Arc;

use tracing::info;

use crate::{
  Error, ObjectId, Result,
  note::{NewNote, Note, NotePatch},
  organization::{NewOrganization, Organization},
  permission::ResourceType,
  resolve::ResolvedIdentity,
  store::{Page, TenantStore},
  user::{NewUser, User, UserPatch},
};

// ─── Directory ───────────────────────────────────────────────────────────────

/// Organization operations that are public.
pub struct Directory<S> {
  store: Arc<S>,
}

impl<S: TenantStore> Directory<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn create_organization(&self, input: NewOrganization) -> Result<Organization> {
    let org = self
      .store
      .create_organization(input)
      .await
      .map_err(Error::from_store)?;
    info!(organization_id = %org.id, name = %org.name, "created organization");
    Ok(org)
  }

  pub async fn get_organization(&self, id: ObjectId) -> Result<Organization> {
    self
      .store
      .get_organization(id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::not_found(ResourceType::Organization, id))
  }

  /// Round-trip to the store without reading tenant data.
  pub async fn ping(&self) -> Result<()> {
    self.store.ping().await.map_err(Error::from_store)
  }
}

// ─── Gateway ─────────────────────────────────────────────────────────────────

/// Tenant-scoped access to users and notes.
///
/// Records of other organizations are indistinguishable from records that do
/// not exist: both yield [`Error::NotFound`].
pub struct Gateway<S> {
  store:    Arc<S>,
  identity: ResolvedIdentity,
}

impl<S: TenantStore> Gateway<S> {
  pub fn new(store: Arc<S>, identity: ResolvedIdentity) -> Self {
    Self { store, identity }
  }

  pub fn identity(&self) -> &ResolvedIdentity { &self.identity }

  // ── Users ─────────────────────────────────────────────────────────────

  pub async fn list_users(&self) -> Result<Vec<User>> {
    self
      .store
      .list_users(self.identity.scope())
      .await
      .map_err(Error::from_store)
  }

  pub async fn get_user(&self, id: ObjectId) -> Result<User> {
    self
      .store
      .get_user(self.identity.scope(), id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::not_found(ResourceType::User, id))
  }

  pub async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = self
      .store
      .create_user(self.identity.scope(), input)
      .await
      .map_err(Error::from_store)?;
    info!(
      organization_id = %user.organization_id,
      user_id = %user.id,
      role = %user.role,
      by = %self.identity.user_id(),
      "created user"
    );
    Ok(user)
  }

  pub async fn update_user(&self, id: ObjectId, patch: UserPatch) -> Result<User> {
    self.get_user(id).await?;
    let user = self
      .store
      .update_user(self.identity.scope(), id, patch)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::not_found(ResourceType::User, id))?;
    info!(
      organization_id = %user.organization_id,
      user_id = %user.id,
      role = %user.role,
      by = %self.identity.user_id(),
      "updated user"
    );
    Ok(user)
  }

  // ── Notes ─────────────────────────────────────────────────────────────

  pub async fn list_notes(&self, page: Page) -> Result<Vec<Note>> {
    self
      .store
      .list_notes(self.identity.scope(), page)
      .await
      .map_err(Error::from_store)
  }

  pub async fn get_note(&self, id: ObjectId) -> Result<Note> {
    self
      .store
      .get_note(self.identity.scope(), id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::not_found(ResourceType::Note, id))
  }

  /// Create a note owned by the caller's organization and authored by the
  /// caller.
  pub async fn create_note(&self, input: NewNote) -> Result<Note> {
    let note = self
      .store
      .create_note(self.identity.scope(), self.identity.user_id(), input)
      .await
      .map_err(Error::from_store)?;
    info!(
      organization_id = %note.organization_id,
      note_id = %note.id,
      by = %note.created_by,
      "created note"
    );
    Ok(note)
  }

  pub async fn update_note(&self, id: ObjectId, patch: NotePatch) -> Result<Note> {
    self.get_note(id).await?;
    let note = self
      .store
      .update_note(self.identity.scope(), id, patch)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::not_found(ResourceType::Note, id))?;
    info!(
      organization_id = %note.organization_id,
      note_id = %note.id,
      by = %self.identity.user_id(),
      "updated note"
    );
    Ok(note)
  }

  pub async fn delete_note(&self, id: ObjectId) -> Result<()> {
    self.get_note(id).await?;
    let deleted = self
      .store
      .delete_note(self.identity.scope(), id)
      .await
      .map_err(Error::from_store)?;
    if !deleted {
      return Err(Error::not_found(ResourceType::Note, id));
    }
    info!(
      organization_id = %self.identity.organization_id(),
      note_id = %id,
      by = %self.identity.user_id(),
      "deleted note"
    );
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    ErrorKind,
    store::Constraint,
    testing::{MemoryStore, seed_org, seed_user},
    user::Role,
  };

  struct Tenant {
    org_id:  ObjectId,
    gateway: Gateway<MemoryStore>,
  }

  async fn tenant(store: &Arc<MemoryStore>, name: &str, role: Role) -> Tenant {
    let org = seed_org(store, name).await;
    let user = seed_user(store, org.id, &format!("{role}@{name}.test"), role).await;
    let identity = ResolvedIdentity::new(org.id, user.id, role);
    Tenant { org_id: org.id, gateway: Gateway::new(store.clone(), identity) }
  }

  fn new_note(title: &str) -> NewNote {
    NewNote { title: title.into(), content: "body".into() }
  }

  #[tokio::test]
  async fn create_stamps_org_and_author_from_identity() {
    let store = Arc::new(MemoryStore::default());
    let acme = tenant(&store, "acme", Role::Writer).await;

    let note = acme.gateway.create_note(new_note("hello")).await.unwrap();
    assert_eq!(note.organization_id, acme.org_id);
    assert_eq!(note.created_by, acme.gateway.identity().user_id());
  }

  #[tokio::test]
  async fn reads_never_cross_tenants() {
    let store = Arc::new(MemoryStore::default());
    let a = tenant(&store, "a", Role::Admin).await;
    let b = tenant(&store, "b", Role::Admin).await;

    a.gateway.create_note(new_note("a1")).await.unwrap();
    a.gateway.create_note(new_note("a2")).await.unwrap();
    let b_note = b.gateway.create_note(new_note("b1")).await.unwrap();

    let a_notes = a.gateway.list_notes(Page::default()).await.unwrap();
    assert_eq!(a_notes.len(), 2);
    assert!(a_notes.iter().all(|n| n.organization_id == a.org_id));

    let a_users = a.gateway.list_users().await.unwrap();
    assert_eq!(a_users.len(), 1);
    assert!(a_users.iter().all(|u| u.organization_id == a.org_id));

    let err = a.gateway.get_note(b_note.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[tokio::test]
  async fn foreign_note_delete_is_indistinguishable_from_missing() {
    let store = Arc::new(MemoryStore::default());
    let x = tenant(&store, "x", Role::Admin).await;
    let y = tenant(&store, "y", Role::Admin).await;
    let y_note = y.gateway.create_note(new_note("secret")).await.unwrap();

    let foreign = x.gateway.delete_note(y_note.id).await.unwrap_err();
    let missing = x.gateway.delete_note(ObjectId::generate()).await.unwrap_err();

    assert_eq!(foreign.kind(), ErrorKind::NotFound);
    assert_eq!(missing.kind(), ErrorKind::NotFound);
    // The note survives in its own tenant.
    assert!(y.gateway.get_note(y_note.id).await.is_ok());
  }

  #[tokio::test]
  async fn foreign_note_update_is_not_found() {
    let store = Arc::new(MemoryStore::default());
    let x = tenant(&store, "x", Role::Writer).await;
    let y = tenant(&store, "y", Role::Writer).await;
    let y_note = y.gateway.create_note(new_note("original")).await.unwrap();

    let err = x
      .gateway
      .update_note(y_note.id, NotePatch { title: Some("pwned".into()), content: None })
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let unchanged = y.gateway.get_note(y_note.id).await.unwrap();
    assert_eq!(unchanged.title, "original");
  }

  #[tokio::test]
  async fn update_applies_patch_and_stamps_updated_at() {
    let store = Arc::new(MemoryStore::default());
    let acme = tenant(&store, "acme", Role::Writer).await;
    let note = acme.gateway.create_note(new_note("draft")).await.unwrap();
    assert!(note.updated_at.is_none());

    let updated = acme
      .gateway
      .update_note(note.id, NotePatch { title: Some("final".into()), content: None })
      .await
      .unwrap();
    assert_eq!(updated.title, "final");
    assert_eq!(updated.content, "body");
    assert!(updated.updated_at.is_some());
  }

  #[tokio::test]
  async fn foreign_user_lookup_is_not_found() {
    let store = Arc::new(MemoryStore::default());
    let x = tenant(&store, "x", Role::Admin).await;
    let y = tenant(&store, "y", Role::Admin).await;

    let err = x.gateway.get_user(y.gateway.identity().user_id()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = x
      .gateway
      .update_user(
        y.gateway.identity().user_id(),
        UserPatch { role: Some(Role::Reader), ..Default::default() },
      )
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[tokio::test]
  async fn duplicate_email_is_constraint_violation() {
    let store = Arc::new(MemoryStore::default());
    let acme = tenant(&store, "acme", Role::Admin).await;
    let input = NewUser {
      email: "dup@acme.test".into(),
      name:  "Dup".into(),
      role:  Role::Reader,
    };

    acme.gateway.create_user(input.clone()).await.unwrap();
    let err = acme.gateway.create_user(input).await.unwrap_err();
    assert!(matches!(
      err,
      Error::ConstraintViolation(Constraint::UserEmail(ref e)) if e == "dup@acme.test"
    ));
  }

  #[tokio::test]
  async fn same_email_in_different_orgs_is_allowed() {
    let store = Arc::new(MemoryStore::default());
    let a = tenant(&store, "a", Role::Admin).await;
    let b = tenant(&store, "b", Role::Admin).await;
    let input = NewUser {
      email: "shared@example.test".into(),
      name:  "Shared".into(),
      role:  Role::Reader,
    };

    a.gateway.create_user(input.clone()).await.unwrap();
    b.gateway.create_user(input).await.unwrap();
  }

  #[tokio::test]
  async fn directory_rejects_duplicate_names_and_reports_missing() {
    let store = Arc::new(MemoryStore::default());
    let directory = Directory::new(store.clone());

    let org = directory
      .create_organization(NewOrganization { name: "Acme".into() })
      .await
      .unwrap();
    assert_eq!(directory.get_organization(org.id).await.unwrap(), org);

    let err = directory
      .create_organization(NewOrganization { name: "Acme".into() })
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);

    let err = directory.get_organization(ObjectId::generate()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }
}
