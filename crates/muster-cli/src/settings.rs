//! Layered settings: optional TOML file, then `MUSTER_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use muster_core::entity::Cascade;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub backend: BackendSettings,
  #[serde(default)]
  pub cascade: Cascade,
  #[serde(default = "default_host")]
  pub host:    String,
  #[serde(default = "default_port")]
  pub port:    u16,
}

/// Which table store the directory talks to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendSettings {
  Sqlite {
    #[serde(default = "default_db_path")]
    path: PathBuf,
  },
  Rest {
    url:          String,
    api_key:      String,
    #[serde(default = "default_timeout")]
    timeout_secs: u64,
  },
}

impl Default for BackendSettings {
  fn default() -> Self {
    Self::Sqlite {
      path: default_db_path(),
    }
  }
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_db_path() -> PathBuf { PathBuf::from("~/.local/share/muster/muster.db") }

fn default_timeout() -> u64 { 30 }

impl Settings {
  /// Read `path` if it exists, then apply `MUSTER_*` overrides
  /// (`MUSTER_BACKEND__KIND=rest`, `MUSTER_PORT=9000`, ...).
  pub fn load(path: &Path) -> Result<Self> {
    let builder = Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(
        Environment::with_prefix("MUSTER")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      );
    Self::build(builder)
  }

  fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
    builder
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise Settings")
  }
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
