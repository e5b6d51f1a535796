//! Notes: free-text records owned by an organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ObjectId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
  pub id:              ObjectId,
  /// The creator's organization, stamped at creation and never changed.
  pub organization_id: ObjectId,
  /// A user of the same organization.
  pub created_by:      ObjectId,
  pub title:           String,
  pub content:         String,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      Option<DateTime<Utc>>,
}

/// Input to [`crate::store::TenantStore::create_note`]. Owner and author are
/// supplied separately by the gateway, never by the caller.
#[derive(Debug, Clone)]
pub struct NewNote {
  pub title:   String,
  pub content: String,
}

/// A partial update to a note. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
  pub title:   Option<String>,
  pub content: Option<String>,
}

impl NotePatch {
  pub fn is_empty(&self) -> bool { self.title.is_none() && self.content.is_none() }
}
