//! Payload validation.
//!
//! Shape checks only; uniqueness is the store's business.

use quire_core::{
  note::{NewNote, NotePatch},
  organization::NewOrganization,
  store::Page,
  user::{NewUser, UserPatch},
};
use thiserror::Error;

pub const NAME_MAX: usize = 100;
pub const TITLE_MAX: usize = 200;
pub const EMAIL_MAX: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {problem}")]
pub struct Invalid {
  pub field:   &'static str,
  pub problem: String,
}

impl Invalid {
  fn new(field: &'static str, problem: impl Into<String>) -> Self {
    Self { field, problem: problem.into() }
  }
}

fn length(field: &'static str, value: &str, max: usize) -> Result<(), Invalid> {
  let n = value.chars().count();
  if n == 0 {
    return Err(Invalid::new(field, "must not be empty"));
  }
  if n > max {
    return Err(Invalid::new(field, format!("must be at most {max} characters")));
  }
  Ok(())
}

/// `local@domain`, where the domain has at least one inner dot.
pub fn email(value: &str) -> Result<(), Invalid> {
  let bad = || Invalid::new("email", "must be an address of the form local@domain");

  if value.len() > EMAIL_MAX || value.chars().any(char::is_whitespace) {
    return Err(bad());
  }
  let (local, domain) = value.split_once('@').ok_or_else(bad)?;
  if local.is_empty()
    || domain.contains('@')
    || !domain.contains('.')
    || domain.starts_with('.')
    || domain.ends_with('.')
  {
    return Err(bad());
  }
  Ok(())
}

pub fn new_organization(input: &NewOrganization) -> Result<(), Invalid> {
  length("name", &input.name, NAME_MAX)
}

pub fn new_user(input: &NewUser) -> Result<(), Invalid> {
  email(&input.email)?;
  length("name", &input.name, NAME_MAX)
}

pub fn user_patch(patch: &UserPatch) -> Result<(), Invalid> {
  if let Some(name) = &patch.name {
    length("name", name, NAME_MAX)?;
  }
  Ok(())
}

pub fn new_note(input: &NewNote) -> Result<(), Invalid> {
  length("title", &input.title, TITLE_MAX)?;
  length("content", &input.content, usize::MAX)
}

pub fn note_patch(patch: &NotePatch) -> Result<(), Invalid> {
  if let Some(title) = &patch.title {
    length("title", title, TITLE_MAX)?;
  }
  if let Some(content) = &patch.content {
    length("content", content, usize::MAX)?;
  }
  Ok(())
}

/// Build a [`Page`] from optional query values.
pub fn page(skip: Option<usize>, limit: Option<usize>) -> Result<Page, Invalid> {
  let limit = limit.unwrap_or(Page::DEFAULT_LIMIT);
  if !(1..=Page::MAX_LIMIT).contains(&limit) {
    return Err(Invalid::new(
      "limit",
      format!("must be between 1 and {}", Page::MAX_LIMIT),
    ));
  }
  let skip = skip.unwrap_or(0);
  if i64::try_from(skip).is_err() {
    return Err(Invalid::new("skip", format!("must be at most {}", i64::MAX)));
  }
  Ok(Page { skip, limit })
}
