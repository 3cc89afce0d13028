//! Error type for `muster-store-sqlite`.

use muster_core::store::Table;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("schema error: {0}")]
  Schema(#[from] muster_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// An update or delete without any filter would touch every row.
  #[error("refusing to modify every row of {0}")]
  UnfilteredMutation(Table),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
