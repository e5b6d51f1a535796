//! [`SqliteStore`]: the SQLite implementation of [`TenantStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::debug;

use quire_core::{
  ObjectId,
  note::{NewNote, Note, NotePatch},
  organization::{NewOrganization, Organization},
  store::{Constraint, Page, TenantScope, TenantStore},
  user::{NewUser, User, UserPatch},
};

use crate::{
  Error, Result,
  encode::{
    NOTE_COLUMNS, ORGANIZATION_COLUMNS, RawNote, RawOrganization, RawUser, USER_COLUMNS,
    encode_dt, encode_id, encode_role, now,
  },
  schema::SCHEMA,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

/// Run an insert, reporting a unique-constraint failure as `Ok(false)`.
fn insert_unique(
  conn: &rusqlite::Connection,
  sql: &str,
  params: impl rusqlite::Params,
) -> tokio_rusqlite::Result<bool> {
  match conn.execute(sql, params) {
    Ok(_) => Ok(true),
    Err(e) if is_unique_violation(&e) => Ok(false),
    Err(e) => Err(e.into()),
  }
}

fn select_user(
  conn: &rusqlite::Connection,
  org_id: &str,
  user_id: &str,
) -> rusqlite::Result<Option<RawUser>> {
  conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1 AND organization_id = ?2"),
      rusqlite::params![user_id, org_id],
      RawUser::from_row,
    )
    .optional()
}

fn select_note(
  conn: &rusqlite::Connection,
  org_id: &str,
  note_id: &str,
) -> rusqlite::Result<Option<RawNote>> {
  conn
    .query_row(
      &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE note_id = ?1 AND organization_id = ?2"),
      rusqlite::params![note_id, org_id],
      RawNote::from_row,
    )
    .optional()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quire store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!("sqlite schema initialised");
    Ok(())
  }
}

// ─── TenantStore impl ────────────────────────────────────────────────────────

impl TenantStore for SqliteStore {
  type Error = Error;

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Organizations ─────────────────────────────────────────────────────────

  async fn create_organization(&self, input: NewOrganization) -> Result<Organization> {
    let org = Organization {
      id:         ObjectId::generate(),
      name:       input.name,
      created_at: now(),
    };

    let id_str = encode_id(org.id);
    let name = org.name.clone();
    let at_str = encode_dt(org.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        insert_unique(
          conn,
          "INSERT INTO organizations (organization_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, at_str],
        )
      })
      .await?;

    if !inserted {
      return Err(Error::Constraint(Constraint::OrganizationName(org.name)));
    }
    Ok(org)
  }

  async fn get_organization(&self, id: ObjectId) -> Result<Option<Organization>> {
    let id_str = encode_id(id);

    let raw: Option<RawOrganization> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE organization_id = ?1"
              ),
              rusqlite::params![id_str],
              RawOrganization::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawOrganization::into_organization).transpose()
  }

  // ── Identity lookup ───────────────────────────────────────────────────────

  async fn find_user(&self, id: ObjectId) -> Result<Option<User>> {
    let id_str = encode_id(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, scope: TenantScope, input: NewUser) -> Result<User> {
    let user = User {
      id:              ObjectId::generate(),
      organization_id: scope.organization_id(),
      email:           input.email,
      name:            input.name,
      role:            input.role,
      created_at:      now(),
      updated_at:      None,
    };

    let id_str = encode_id(user.id);
    let org_str = encode_id(user.organization_id);
    let email = user.email.clone();
    let name = user.name.clone();
    let role_str = encode_role(user.role);
    let at_str = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        insert_unique(
          conn,
          "INSERT INTO users (user_id, organization_id, email, name, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, org_str, email, name, role_str, at_str],
        )
      })
      .await?;

    if !inserted {
      return Err(Error::Constraint(Constraint::UserEmail(user.email)));
    }
    Ok(user)
  }

  async fn get_user(&self, scope: TenantScope, id: ObjectId) -> Result<Option<User>> {
    let org_str = encode_id(scope.organization_id());
    let id_str = encode_id(id);

    let raw = self
      .conn
      .call(move |conn| Ok(select_user(conn, &org_str, &id_str)?))
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self, scope: TenantScope) -> Result<Vec<User>> {
    let org_str = encode_id(scope.organization_id());

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users WHERE organization_id = ?1
           ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![org_str], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn count_users(&self, scope: TenantScope) -> Result<u64> {
    let org_str = encode_id(scope.organization_id());

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM users WHERE organization_id = ?1",
          rusqlite::params![org_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count.max(0) as u64)
  }

  async fn update_user(
    &self,
    scope: TenantScope,
    id: ObjectId,
    patch: UserPatch,
  ) -> Result<Option<User>> {
    let org_str = encode_id(scope.organization_id());
    let id_str = encode_id(id);
    let apply = !patch.is_empty();
    let name = patch.name;
    let role_str = patch.role.map(encode_role);
    let at_str = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        if apply {
          conn.execute(
            "UPDATE users
                SET name       = COALESCE(?3, name),
                    role       = COALESCE(?4, role),
                    updated_at = ?5
              WHERE user_id = ?1 AND organization_id = ?2",
            rusqlite::params![id_str, org_str, name, role_str, at_str],
          )?;
        }
        Ok(select_user(conn, &org_str, &id_str)?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Notes ─────────────────────────────────────────────────────────────────

  async fn create_note(
    &self,
    scope: TenantScope,
    created_by: ObjectId,
    input: NewNote,
  ) -> Result<Note> {
    let note = Note {
      id: ObjectId::generate(),
      organization_id: scope.organization_id(),
      created_by,
      title: input.title,
      content: input.content,
      created_at: now(),
      updated_at: None,
    };

    let id_str = encode_id(note.id);
    let org_str = encode_id(note.organization_id);
    let by_str = encode_id(note.created_by);
    let title = note.title.clone();
    let content = note.content.clone();
    let at_str = encode_dt(note.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notes (note_id, organization_id, created_by, title, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, org_str, by_str, title, content, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(note)
  }

  async fn get_note(&self, scope: TenantScope, id: ObjectId) -> Result<Option<Note>> {
    let org_str = encode_id(scope.organization_id());
    let id_str = encode_id(id);

    let raw = self
      .conn
      .call(move |conn| Ok(select_note(conn, &org_str, &id_str)?))
      .await?;

    raw.map(RawNote::into_note).transpose()
  }

  async fn list_notes(&self, scope: TenantScope, page: Page) -> Result<Vec<Note>> {
    let org_str = encode_id(scope.organization_id());
    let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
    let skip = i64::try_from(page.skip).unwrap_or(i64::MAX);

    let raws: Vec<RawNote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTE_COLUMNS} FROM notes WHERE organization_id = ?1
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![org_str, limit, skip], RawNote::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNote::into_note).collect()
  }

  async fn update_note(
    &self,
    scope: TenantScope,
    id: ObjectId,
    patch: NotePatch,
  ) -> Result<Option<Note>> {
    let org_str = encode_id(scope.organization_id());
    let id_str = encode_id(id);
    let apply = !patch.is_empty();
    let title = patch.title;
    let content = patch.content;
    let at_str = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        if apply {
          conn.execute(
            "UPDATE notes
                SET title      = COALESCE(?3, title),
                    content    = COALESCE(?4, content),
                    updated_at = ?5
              WHERE note_id = ?1 AND organization_id = ?2",
            rusqlite::params![id_str, org_str, title, content, at_str],
          )?;
        }
        Ok(select_note(conn, &org_str, &id_str)?)
      })
      .await?;

    raw.map(RawNote::into_note).transpose()
  }

  async fn delete_note(&self, scope: TenantScope, id: ObjectId) -> Result<bool> {
    let org_str = encode_id(scope.organization_id());
    let id_str = encode_id(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM notes WHERE note_id = ?1 AND organization_id = ?2",
          rusqlite::params![id_str, org_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }
}
