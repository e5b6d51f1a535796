//! Error type for `quire-store-sqlite`.

use quire_core::{
  id::ParseIdError,
  store::{Constraint, StoreFault},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("stored id is malformed: {0}")]
  Id(#[from] ParseIdError),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  /// A uniqueness rule refused the write.
  #[error(transparent)]
  Constraint(Constraint),
}

impl StoreFault for Error {
  fn constraint(&self) -> Option<&Constraint> {
    match self {
      Self::Constraint(c) => Some(c),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
