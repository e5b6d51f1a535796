//! Integration tests for `SqliteStore` against an in-memory database.

use quire_core::{
  ObjectId,
  note::{NewNote, NotePatch},
  organization::{NewOrganization, Organization},
  store::{Constraint, Page, StoreFault, TenantScope, TenantStore},
  user::{NewUser, Role, User, UserPatch},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn org(s: &SqliteStore, name: &str) -> Organization {
  s.create_organization(NewOrganization { name: name.into() })
    .await
    .unwrap()
}

async fn user(s: &SqliteStore, org: &Organization, email: &str, role: Role) -> User {
  s.create_user(TenantScope::new(org.id), NewUser {
    email: email.into(),
    name: "Someone".into(),
    role,
  })
  .await
  .unwrap()
}

fn note(title: &str) -> NewNote {
  NewNote { title: title.into(), content: format!("{title} body") }
}

#[tokio::test]
async fn ping_succeeds() {
  store().await.ping().await.unwrap();
}

// ─── Organizations ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_organization() {
  let s = store().await;
  let created = org(&s, "Acme").await;

  let fetched = s.get_organization(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn missing_organization_is_none() {
  let s = store().await;
  assert!(s.get_organization(ObjectId::generate()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_organization_name_is_constraint() {
  let s = store().await;
  org(&s, "Acme").await;

  let err = s
    .create_organization(NewOrganization { name: "Acme".into() })
    .await
    .unwrap_err();
  assert_eq!(
    err.constraint(),
    Some(&Constraint::OrganizationName("Acme".into()))
  );
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn users_round_trip_and_are_scoped() {
  let s = store().await;
  let a = org(&s, "A").await;
  let b = org(&s, "B").await;
  let alice = user(&s, &a, "alice@a.test", Role::Admin).await;
  user(&s, &b, "bob@b.test", Role::Reader).await;

  let found = s.find_user(alice.id).await.unwrap().unwrap();
  assert_eq!(found, alice);

  assert_eq!(
    s.get_user(TenantScope::new(a.id), alice.id).await.unwrap(),
    Some(alice.clone())
  );
  assert!(s.get_user(TenantScope::new(b.id), alice.id).await.unwrap().is_none());

  let listed = s.list_users(TenantScope::new(a.id)).await.unwrap();
  assert_eq!(listed, vec![alice]);
  assert_eq!(s.count_users(TenantScope::new(b.id)).await.unwrap(), 1);
}

#[tokio::test]
async fn email_is_unique_per_organization_only() {
  let s = store().await;
  let a = org(&s, "A").await;
  let b = org(&s, "B").await;
  user(&s, &a, "same@x.test", Role::Reader).await;
  user(&s, &b, "same@x.test", Role::Reader).await;

  let err = s
    .create_user(TenantScope::new(a.id), NewUser {
      email: "same@x.test".into(),
      name:  "Again".into(),
      role:  Role::Writer,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Constraint(Constraint::UserEmail(ref e)) if e == "same@x.test"));
}

#[tokio::test]
async fn user_in_unknown_organization_is_rejected() {
  let s = store().await;
  let err = s
    .create_user(TenantScope::new(ObjectId::generate()), NewUser {
      email: "ghost@x.test".into(),
      name:  "Ghost".into(),
      role:  Role::Reader,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn update_user_applies_patch_within_scope() {
  let s = store().await;
  let a = org(&s, "A").await;
  let b = org(&s, "B").await;
  let u = user(&s, &a, "u@a.test", Role::Reader).await;

  let foreign = s
    .update_user(TenantScope::new(b.id), u.id, UserPatch {
      role: Some(Role::Admin),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(foreign.is_none());

  let updated = s
    .update_user(TenantScope::new(a.id), u.id, UserPatch {
      role: Some(Role::Writer),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.role, Role::Writer);
  assert_eq!(updated.name, u.name);
  assert!(updated.updated_at.is_some());

  // The resolver sees the new role straight away.
  assert_eq!(s.find_user(u.id).await.unwrap().unwrap().role, Role::Writer);
}

#[tokio::test]
async fn empty_user_patch_changes_nothing() {
  let s = store().await;
  let a = org(&s, "A").await;
  let u = user(&s, &a, "u@a.test", Role::Reader).await;

  let same = s
    .update_user(TenantScope::new(a.id), u.id, UserPatch::default())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(same, u);
}

// ─── Notes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn notes_are_isolated_between_tenants() {
  let s = store().await;
  let a = org(&s, "A").await;
  let b = org(&s, "B").await;
  let ua = user(&s, &a, "w@a.test", Role::Writer).await;
  let ub = user(&s, &b, "w@b.test", Role::Writer).await;
  let sa = TenantScope::new(a.id);
  let sb = TenantScope::new(b.id);

  let na = s.create_note(sa, ua.id, note("a")).await.unwrap();
  let nb = s.create_note(sb, ub.id, note("b")).await.unwrap();

  assert_eq!(s.get_note(sa, na.id).await.unwrap(), Some(na.clone()));
  assert!(s.get_note(sa, nb.id).await.unwrap().is_none());

  let listed = s.list_notes(sa, Page::default()).await.unwrap();
  assert_eq!(listed, vec![na]);

  assert!(!s.delete_note(sa, nb.id).await.unwrap());
  assert!(s.get_note(sb, nb.id).await.unwrap().is_some());
}

#[tokio::test]
async fn author_must_belong_to_the_note_organization() {
  let s = store().await;
  let a = org(&s, "A").await;
  let b = org(&s, "B").await;
  let ub = user(&s, &b, "w@b.test", Role::Writer).await;

  let err = s
    .create_note(TenantScope::new(a.id), ub.id, note("x"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn list_notes_is_newest_first_and_paged() {
  let s = store().await;
  let a = org(&s, "A").await;
  let u = user(&s, &a, "w@a.test", Role::Writer).await;
  let scope = TenantScope::new(a.id);

  for i in 0..5 {
    s.create_note(scope, u.id, note(&format!("n{i}"))).await.unwrap();
  }

  let all = s.list_notes(scope, Page::default()).await.unwrap();
  let titles: Vec<&str> = all.iter().map(|n| n.title.as_str()).collect();
  assert_eq!(titles, ["n4", "n3", "n2", "n1", "n0"]);

  let page = s
    .list_notes(scope, Page { skip: 1, limit: 2 })
    .await
    .unwrap();
  let titles: Vec<&str> = page.iter().map(|n| n.title.as_str()).collect();
  assert_eq!(titles, ["n3", "n2"]);
}

#[tokio::test]
async fn oversized_skip_lists_nothing() {
  let s = store().await;
  let a = org(&s, "A").await;
  let u = user(&s, &a, "w@a.test", Role::Writer).await;
  let scope = TenantScope::new(a.id);
  s.create_note(scope, u.id, note("only")).await.unwrap();

  let past_end = s
    .list_notes(scope, Page { skip: usize::MAX, limit: 10 })
    .await
    .unwrap();
  assert!(past_end.is_empty());
}

#[tokio::test]
async fn update_note_is_partial_and_scoped() {
  let s = store().await;
  let a = org(&s, "A").await;
  let b = org(&s, "B").await;
  let u = user(&s, &a, "w@a.test", Role::Writer).await;
  let n = s
    .create_note(TenantScope::new(a.id), u.id, note("draft"))
    .await
    .unwrap();

  let foreign = s
    .update_note(TenantScope::new(b.id), n.id, NotePatch {
      title: Some("hijacked".into()),
      content: None,
    })
    .await
    .unwrap();
  assert!(foreign.is_none());

  let updated = s
    .update_note(TenantScope::new(a.id), n.id, NotePatch {
      title: None,
      content: Some("rewritten".into()),
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.title, "draft");
  assert_eq!(updated.content, "rewritten");
  assert_eq!(updated.created_by, u.id);
  assert!(updated.updated_at.is_some());
}

#[tokio::test]
async fn delete_note_removes_only_once() {
  let s = store().await;
  let a = org(&s, "A").await;
  let u = user(&s, &a, "w@a.test", Role::Admin).await;
  let scope = TenantScope::new(a.id);
  let n = s.create_note(scope, u.id, note("bye")).await.unwrap();

  assert!(s.delete_note(scope, n.id).await.unwrap());
  assert!(!s.delete_note(scope, n.id).await.unwrap());
  assert!(s.get_note(scope, n.id).await.unwrap().is_none());
}

#[tokio::test]
async fn store_reopens_from_disk() {
  let path = std::env::temp_dir().join(format!("quire-test-{}.db", ObjectId::generate()));

  let created = {
    let s = SqliteStore::open(&path).await.unwrap();
    org(&s, "Persistent").await
  };

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.get_organization(created.id).await.unwrap(), Some(created));

  drop(s);
  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}
