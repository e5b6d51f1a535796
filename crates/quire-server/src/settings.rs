//! Runtime server configuration.
//!
//! Layered from lowest to highest precedence: built-in defaults, the TOML
//! file, then `QUIRE_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "QUIRE";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  pub app_name:        String,
  pub environment:     String,
  /// Origins answered by CORS; `*` allows any.
  pub allowed_origins: Vec<String>,
}

impl ServerConfig {
  /// Load configuration from `file` (which need not exist) and the
  /// environment.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    Self::load_from(config::File::from(file).required(false))
  }

  fn load_from<S>(file: S) -> anyhow::Result<Self>
  where
    S: config::Source + Send + Sync + 'static,
  {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8000_i64)?
      .set_default("store_path", "quire.db")?
      .set_default("app_name", "Quire")?
      .set_default("environment", "development")?
      .set_default("allowed_origins", vec![quire_api::cors::ANY_ORIGIN])?
      .add_source(file)
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("allowed_origins"),
      )
      .build()
      .context("failed to read configuration")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    ServerConfig::load_from(config::File::from_str(toml, FileFormat::Toml)).unwrap()
  }

  #[test]
  fn defaults_apply_without_a_file() {
    let cfg = ServerConfig::load(Path::new("does-not-exist.toml")).unwrap();
    assert_eq!(cfg.app_name, "Quire");
    assert_eq!(cfg.store_path, PathBuf::from("quire.db"));
    assert_eq!(cfg.allowed_origins, ["*"]);
  }

  #[test]
  fn allowed_origins_come_from_file() {
    let cfg = from_toml(
      r#"
        allowed_origins = ["https://app.example.com", "http://localhost:3000"]
      "#,
    );
    assert_eq!(cfg.allowed_origins, [
      "https://app.example.com",
      "http://localhost:3000"
    ]);
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = from_toml(
      r#"
        host = "0.0.0.0"
        port = 9090
        environment = "production"
      "#,
    );
    assert_eq!(cfg.address(), "0.0.0.0:9090");
    assert_eq!(cfg.environment, "production");
    assert_eq!(cfg.app_name, "Quire");
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/data/quire.db")),
      PathBuf::from(home).join("data/quire.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs/quire.db")), PathBuf::from("/abs/quire.db"));
  }
}
