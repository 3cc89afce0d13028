//! Error type for `muster-store-rest`.

use muster_core::store::Table;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("schema error: {0}")]
  Schema(#[from] muster_core::Error),

  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid base url: {0}")]
  BaseUrl(String),

  /// The API answered with a non-success status.
  #[error("{message} (HTTP {status})")]
  Api { status: u16, message: String },

  #[error("expected a JSON array of rows from {0}")]
  UnexpectedBody(Table),

  #[error("refusing to modify every row of {0}")]
  UnfilteredMutation(Table),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
