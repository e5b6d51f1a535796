//! An in-memory `TenantStore` for unit tests.

use std::sync::{
  Mutex,
  atomic::{AtomicUsize, Ordering},
};

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

use crate::{
  ObjectId,
  note::{NewNote, Note, NotePatch},
  organization::{NewOrganization, Organization},
  store::{Constraint, Page, StoreFault, TenantScope, TenantStore},
  user::{NewUser, Role, User, UserPatch},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error(transparent)]
  Constraint(Constraint),
}

impl StoreFault for MemoryError {
  fn constraint(&self) -> Option<&Constraint> {
    match self {
      Self::Constraint(c) => Some(c),
    }
  }
}

#[derive(Default)]
struct State {
  organizations: Vec<Organization>,
  users:         Vec<User>,
  notes:         Vec<Note>,
}

/// Counts every call so tests can assert that nothing reached the store.
#[derive(Default)]
pub struct MemoryStore {
  state:   Mutex<State>,
  lookups: AtomicUsize,
}

fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

impl MemoryStore {
  pub fn lookups(&self) -> usize { self.lookups.load(Ordering::SeqCst) }

  /// Drop an organization without touching its users, leaving them dangling.
  pub fn remove_organization(&self, id: ObjectId) {
    self.state().organizations.retain(|o| o.id != id);
  }

  fn state(&self) -> std::sync::MutexGuard<'_, State> {
    self.lookups.fetch_add(1, Ordering::SeqCst);
    self.state.lock().unwrap()
  }
}

impl TenantStore for MemoryStore {
  type Error = MemoryError;

  async fn ping(&self) -> Result<(), MemoryError> {
    drop(self.state());
    Ok(())
  }

  async fn create_organization(
    &self,
    input: NewOrganization,
  ) -> Result<Organization, MemoryError> {
    let mut state = self.state();
    if state.organizations.iter().any(|o| o.name == input.name) {
      return Err(MemoryError::Constraint(Constraint::OrganizationName(input.name)));
    }
    let org = Organization {
      id:         ObjectId::generate(),
      name:       input.name,
      created_at: now(),
    };
    state.organizations.push(org.clone());
    Ok(org)
  }

  async fn get_organization(&self, id: ObjectId) -> Result<Option<Organization>, MemoryError> {
    Ok(self.state().organizations.iter().find(|o| o.id == id).cloned())
  }

  async fn find_user(&self, id: ObjectId) -> Result<Option<User>, MemoryError> {
    Ok(self.state().users.iter().find(|u| u.id == id).cloned())
  }

  async fn create_user(&self, scope: TenantScope, input: NewUser) -> Result<User, MemoryError> {
    let org_id = scope.organization_id();
    let mut state = self.state();
    if state
      .users
      .iter()
      .any(|u| u.organization_id == org_id && u.email == input.email)
    {
      return Err(MemoryError::Constraint(Constraint::UserEmail(input.email)));
    }
    let user = User {
      id:              ObjectId::generate(),
      organization_id: org_id,
      email:           input.email,
      name:            input.name,
      role:            input.role,
      created_at:      now(),
      updated_at:      None,
    };
    state.users.push(user.clone());
    Ok(user)
  }

  async fn get_user(&self, scope: TenantScope, id: ObjectId) -> Result<Option<User>, MemoryError> {
    Ok(
      self
        .state()
        .users
        .iter()
        .find(|u| u.id == id && u.organization_id == scope.organization_id())
        .cloned(),
    )
  }

  async fn list_users(&self, scope: TenantScope) -> Result<Vec<User>, MemoryError> {
    Ok(
      self
        .state()
        .users
        .iter()
        .filter(|u| u.organization_id == scope.organization_id())
        .cloned()
        .collect(),
    )
  }

  async fn count_users(&self, scope: TenantScope) -> Result<u64, MemoryError> {
    Ok(self.list_users(scope).await?.len() as u64)
  }

  async fn update_user(
    &self,
    scope: TenantScope,
    id: ObjectId,
    patch: UserPatch,
  ) -> Result<Option<User>, MemoryError> {
    let mut state = self.state();
    let Some(user) = state
      .users
      .iter_mut()
      .find(|u| u.id == id && u.organization_id == scope.organization_id())
    else {
      return Ok(None);
    };
    if !patch.is_empty() {
      if let Some(name) = patch.name {
        user.name = name;
      }
      if let Some(role) = patch.role {
        user.role = role;
      }
      user.updated_at = Some(now());
    }
    Ok(Some(user.clone()))
  }

  async fn create_note(
    &self,
    scope: TenantScope,
    created_by: ObjectId,
    input: NewNote,
  ) -> Result<Note, MemoryError> {
    let note = Note {
      id: ObjectId::generate(),
      organization_id: scope.organization_id(),
      created_by,
      title: input.title,
      content: input.content,
      created_at: now(),
      updated_at: None,
    };
    self.state().notes.push(note.clone());
    Ok(note)
  }

  async fn get_note(&self, scope: TenantScope, id: ObjectId) -> Result<Option<Note>, MemoryError> {
    Ok(
      self
        .state()
        .notes
        .iter()
        .find(|n| n.id == id && n.organization_id == scope.organization_id())
        .cloned(),
    )
  }

  async fn list_notes(&self, scope: TenantScope, page: Page) -> Result<Vec<Note>, MemoryError> {
    // Insertion order stands in for creation order.
    Ok(
      self
        .state()
        .notes
        .iter()
        .rev()
        .filter(|n| n.organization_id == scope.organization_id())
        .skip(page.skip)
        .take(page.limit)
        .cloned()
        .collect(),
    )
  }

  async fn update_note(
    &self,
    scope: TenantScope,
    id: ObjectId,
    patch: NotePatch,
  ) -> Result<Option<Note>, MemoryError> {
    let mut state = self.state();
    let Some(note) = state
      .notes
      .iter_mut()
      .find(|n| n.id == id && n.organization_id == scope.organization_id())
    else {
      return Ok(None);
    };
    if !patch.is_empty() {
      if let Some(title) = patch.title {
        note.title = title;
      }
      if let Some(content) = patch.content {
        note.content = content;
      }
      note.updated_at = Some(now());
    }
    Ok(Some(note.clone()))
  }

  async fn delete_note(&self, scope: TenantScope, id: ObjectId) -> Result<bool, MemoryError> {
    let mut state = self.state();
    let before = state.notes.len();
    state
      .notes
      .retain(|n| !(n.id == id && n.organization_id == scope.organization_id()));
    Ok(state.notes.len() < before)
  }
}

pub async fn seed_org(store: &MemoryStore, name: &str) -> Organization {
  store
    .create_organization(NewOrganization { name: name.into() })
    .await
    .unwrap()
}

pub async fn seed_user(store: &MemoryStore, org_id: ObjectId, email: &str, role: Role) -> User {
  store
    .create_user(TenantScope::new(org_id), NewUser {
      email: email.into(),
      name: email.split('@').next().unwrap_or(email).into(),
      role,
    })
    .await
    .unwrap()
}
