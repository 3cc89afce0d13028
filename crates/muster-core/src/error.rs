//! Error types for `muster-core`.

use thiserror::Error;

use crate::store::Table;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown column {column:?} on table {table}")]
  UnknownColumn { table: Table, column: String },

  #[error("table {table} has no foreign key to {parent}")]
  UnknownRelation { table: Table, parent: Table },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
