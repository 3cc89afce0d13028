//! The configured table store, chosen at runtime.

use std::time::Duration;

use anyhow::{Context, Result};
use muster_core::store::{Filter, Row, Select, Table, TableStore};
use muster_store_rest::{RestConfig, RestStore};
use muster_store_sqlite::SqliteStore;
use thiserror::Error;

use crate::settings::{BackendSettings, expand_tilde};

#[derive(Debug, Error)]
pub enum BackendError {
  #[error(transparent)]
  Sqlite(#[from] muster_store_sqlite::Error),

  #[error(transparent)]
  Rest(#[from] muster_store_rest::Error),
}

pub enum Backend {
  Sqlite(SqliteStore),
  Rest(RestStore),
}

impl Backend {
  pub async fn open(settings: &BackendSettings) -> Result<Self> {
    match settings {
      BackendSettings::Sqlite { path } => {
        let path = expand_tilde(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
          std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let store = SqliteStore::open(&path)
          .await
          .with_context(|| format!("failed to open store at {path:?}"))?;
        tracing::info!(path = %path.display(), "using sqlite store");
        Ok(Self::Sqlite(store))
      }
      BackendSettings::Rest {
        url,
        api_key,
        timeout_secs,
      } => {
        let store = RestStore::new(RestConfig {
          base_url: url.clone(),
          api_key:  api_key.clone(),
          timeout:  Duration::from_secs(*timeout_secs),
        })
        .context("failed to build HTTP client")?;
        tracing::info!(%url, "using rest store");
        Ok(Self::Rest(store))
      }
    }
  }
}

impl TableStore for Backend {
  type Error = BackendError;

  async fn select(&self, query: &Select) -> Result<Vec<Row>, BackendError> {
    Ok(match self {
      Self::Sqlite(s) => s.select(query).await?,
      Self::Rest(s) => s.select(query).await?,
    })
  }

  async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, BackendError> {
    Ok(match self {
      Self::Sqlite(s) => s.insert(table, rows).await?,
      Self::Rest(s) => s.insert(table, rows).await?,
    })
  }

  async fn update(
    &self,
    table: Table,
    patch: Row,
    filters: &[Filter],
  ) -> Result<(), BackendError> {
    match self {
      Self::Sqlite(s) => s.update(table, patch, filters).await?,
      Self::Rest(s) => s.update(table, patch, filters).await?,
    }
    Ok(())
  }

  async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), BackendError> {
    match self {
      Self::Sqlite(s) => s.delete(table, filters).await?,
      Self::Rest(s) => s.delete(table, filters).await?,
    }
    Ok(())
  }
}
