//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Ids are stored in their 24-character hex form. Timestamps are RFC 3339 UTC
//! strings with fixed microsecond precision, so lexical order in SQL matches
//! chronological order.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use quire_core::{
  ObjectId,
  note::Note,
  organization::Organization,
  user::{Role, User},
};

use crate::{Error, Result};

// ─── ObjectId ────────────────────────────────────────────────────────────────

pub fn encode_id(id: ObjectId) -> String { id.to_string() }

pub fn decode_id(s: &str) -> Result<ObjectId> { Ok(ObjectId::parse(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str { role.as_str() }

pub fn decode_role(s: &str) -> Result<Role> {
  Role::from_str(s).map_err(|_| Error::UnknownRole(s.to_owned()))
}

// ─── Rows ────────────────────────────────────────────────────────────────────

pub const ORGANIZATION_COLUMNS: &str = "organization_id, name, created_at";

/// Raw strings read directly from an `organizations` row.
pub struct RawOrganization {
  pub organization_id: String,
  pub name:            String,
  pub created_at:      String,
}

impl RawOrganization {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      organization_id: row.get(0)?,
      name:            row.get(1)?,
      created_at:      row.get(2)?,
    })
  }

  pub fn into_organization(self) -> Result<Organization> {
    Ok(Organization {
      id:         decode_id(&self.organization_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const USER_COLUMNS: &str =
  "user_id, organization_id, email, name, role, created_at, updated_at";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:         String,
  pub organization_id: String,
  pub email:           String,
  pub name:            String,
  pub role:            String,
  pub created_at:      String,
  pub updated_at:      Option<String>,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:         row.get(0)?,
      organization_id: row.get(1)?,
      email:           row.get(2)?,
      name:            row.get(3)?,
      role:            row.get(4)?,
      created_at:      row.get(5)?,
      updated_at:      row.get(6)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:              decode_id(&self.user_id)?,
      organization_id: decode_id(&self.organization_id)?,
      email:           self.email,
      name:            self.name,
      role:            decode_role(&self.role)?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_opt_dt(self.updated_at)?,
    })
  }
}

pub const NOTE_COLUMNS: &str =
  "note_id, organization_id, created_by, title, content, created_at, updated_at";

/// Raw strings read directly from a `notes` row.
pub struct RawNote {
  pub note_id:         String,
  pub organization_id: String,
  pub created_by:      String,
  pub title:           String,
  pub content:         String,
  pub created_at:      String,
  pub updated_at:      Option<String>,
}

impl RawNote {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      note_id:         row.get(0)?,
      organization_id: row.get(1)?,
      created_by:      row.get(2)?,
      title:           row.get(3)?,
      content:         row.get(4)?,
      created_at:      row.get(5)?,
      updated_at:      row.get(6)?,
    })
  }

  pub fn into_note(self) -> Result<Note> {
    Ok(Note {
      id:              decode_id(&self.note_id)?,
      organization_id: decode_id(&self.organization_id)?,
      created_by:      decode_id(&self.created_by)?,
      title:           self.title,
      content:         self.content,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_opt_dt(self.updated_at)?,
    })
  }
}
