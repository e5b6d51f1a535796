//! Users and their roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::ObjectId;

/// The closed set of roles a user can hold.
///
/// There is no implied hierarchy; what each role may do is defined solely by
/// the grant table in [`crate::permission`].
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  #[default]
  Reader,
  Writer,
  Admin,
}

impl Role {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// A member of exactly one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:              ObjectId,
  /// Fixed at creation; users are never reassigned.
  pub organization_id: ObjectId,
  /// Unique within the owning organization.
  pub email:           String,
  pub name:            String,
  pub role:            Role,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      Option<DateTime<Utc>>,
}

/// Input to [`crate::store::TenantStore::create_user`].
///
/// Carries no organization: the owning organization always comes from the
/// scope the user is created under.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email: String,
  pub name:  String,
  pub role:  Role,
}

/// A partial update to a user. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
  pub name: Option<String>,
  pub role: Option<Role>,
}

impl UserPatch {
  pub fn is_empty(&self) -> bool { self.name.is_none() && self.role.is_none() }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn role_string_forms_agree() {
    for (role, s) in [
      (Role::Reader, "reader"),
      (Role::Writer, "writer"),
      (Role::Admin, "admin"),
    ] {
      assert_eq!(role.as_str(), s);
      assert_eq!(role.to_string(), s);
      assert_eq!(Role::from_str(s).unwrap(), role);
      assert_eq!(serde_json::to_string(&role).unwrap(), format!("\"{s}\""));
    }
  }

  #[test]
  fn unknown_roles_are_rejected() {
    assert!(Role::from_str("owner").is_err());
    assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
  }

  #[test]
  fn default_role_is_reader() {
    assert_eq!(Role::default(), Role::Reader);
  }
}
