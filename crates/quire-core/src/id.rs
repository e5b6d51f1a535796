//! Opaque record identifiers.
//!
//! Every organization, user and note is addressed by a 12-byte id rendered as
//! 24 lowercase hexadecimal characters. The first four bytes are the creation
//! second (big-endian), the remaining eight are random.

use std::{fmt, str::FromStr};

use chrono::Utc;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Raw byte length of an [`ObjectId`].
pub const ID_LEN: usize = 12;

/// Length of the hexadecimal rendering of an [`ObjectId`].
pub const ID_HEX_LEN: usize = ID_LEN * 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
  #[error("expected {ID_HEX_LEN} hex characters, got {0} bytes")]
  Length(usize),

  #[error("identifier is not hexadecimal")]
  NotHex,
}

/// A 12-byte opaque identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; ID_LEN]);

impl ObjectId {
  /// Generate a fresh identifier.
  pub fn generate() -> Self {
    let secs = Utc::now().timestamp() as u32;
    let mut bytes = [0u8; ID_LEN];
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    OsRng.fill_bytes(&mut bytes[4..]);
    Self(bytes)
  }

  /// Parse the 24-character hex form. Either case is accepted.
  pub fn parse(s: &str) -> Result<Self, ParseIdError> {
    if s.len() != ID_HEX_LEN {
      return Err(ParseIdError::Length(s.len()));
    }
    let mut bytes = [0u8; ID_LEN];
    hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseIdError::NotHex)?;
    Ok(Self(bytes))
  }

  pub fn is_valid(s: &str) -> bool { Self::parse(s).is_ok() }

  pub fn as_bytes(&self) -> &[u8; ID_LEN] { &self.0 }
}

impl fmt::Display for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&hex::encode(self.0))
  }
}

impl fmt::Debug for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ObjectId({self})")
  }
}

impl FromStr for ObjectId {
  type Err = ParseIdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl Serialize for ObjectId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for ObjectId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    Self::parse(&s).map_err(de::Error::custom)
  }
}
