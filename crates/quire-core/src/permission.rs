//! The permission engine.
//!
//! Authorization is a pure lookup of `(role, resource, action)` in a closed
//! grant table. Anything the table does not list is denied.

use std::fmt;

use strum::{Display, EnumIter, IntoStaticStr};

use crate::{Error, Result, resolve::ResolvedIdentity, user::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ResourceType {
  Organization,
  User,
  Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
  Create,
  Read,
  List,
  Update,
  Delete,
}

/// A resource type paired with an action on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
  pub resource: ResourceType,
  pub action:   Action,
}

impl Permission {
  pub const fn new(resource: ResourceType, action: Action) -> Self {
    Self { resource, action }
  }
}

impl fmt::Display for Permission {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.action, self.resource)
  }
}

// ─── Grant table ─────────────────────────────────────────────────────────────

const ORG_UPDATE: Permission = Permission::new(ResourceType::Organization, Action::Update);
const ORG_DELETE: Permission = Permission::new(ResourceType::Organization, Action::Delete);
const USER_CREATE: Permission = Permission::new(ResourceType::User, Action::Create);
const USER_LIST: Permission = Permission::new(ResourceType::User, Action::List);
const USER_READ: Permission = Permission::new(ResourceType::User, Action::Read);
const USER_UPDATE: Permission = Permission::new(ResourceType::User, Action::Update);
const NOTE_READ: Permission = Permission::new(ResourceType::Note, Action::Read);
const NOTE_CREATE: Permission = Permission::new(ResourceType::Note, Action::Create);
const NOTE_UPDATE: Permission = Permission::new(ResourceType::Note, Action::Update);
const NOTE_DELETE: Permission = Permission::new(ResourceType::Note, Action::Delete);

/// Everything each role may do. Organization create/read never appear: those
/// operations are public and never consult this table.
const GRANTS: &[(Role, &[Permission])] = &[
  (Role::Reader, &[NOTE_READ]),
  (Role::Writer, &[NOTE_READ, NOTE_CREATE, NOTE_UPDATE]),
  (Role::Admin, &[
    ORG_UPDATE,
    ORG_DELETE,
    USER_CREATE,
    USER_LIST,
    USER_READ,
    USER_UPDATE,
    NOTE_READ,
    NOTE_CREATE,
    NOTE_UPDATE,
    NOTE_DELETE,
  ]),
];

/// The permissions granted to `role`.
pub fn grants(role: Role) -> impl Iterator<Item = Permission> {
  GRANTS
    .iter()
    .filter(move |(r, _)| *r == role)
    .flat_map(|(_, perms)| perms.iter().copied())
}

pub fn is_allowed(role: Role, permission: Permission) -> bool {
  grants(role).any(|p| p == permission)
}

/// Allow or deny `permission` for an already-resolved identity.
pub fn authorize(identity: &ResolvedIdentity, permission: Permission) -> Result<()> {
  let role = identity.role();
  if is_allowed(role, permission) {
    Ok(())
  } else {
    Err(Error::PermissionDenied { role, permission })
  }
}
