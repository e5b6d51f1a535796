//! Organizations: the tenant boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ObjectId;

/// A tenant. Users and notes belong to exactly one organization.
///
/// Names are unique across all organizations; the store enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
  pub id:         ObjectId,
  pub name:       String,
  /// Server-assigned; never changes after creation.
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::TenantStore::create_organization`].
/// The id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewOrganization {
  pub name: String,
}
