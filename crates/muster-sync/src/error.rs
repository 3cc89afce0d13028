//! Error type for `muster-sync`.
//!
//! Failures from the remote store are not told apart: network, validation,
//! permission and not-found errors all collapse into [`Error::Remote`] with
//! the backend's message. The same message is what lands in the entity's
//! status slot.

use muster_core::{Id, entity::Entity};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("{0}")]
  Remote(String),

  #[error("unreadable {entity} row: {message}")]
  Decode { entity: Entity, message: String },

  #[error("cannot encode {entity} payload: {message}")]
  Encode { entity: Entity, message: String },

  /// The insert went through but the collection could not be reloaded.
  #[error("{entity} {id} was saved but reloading failed: {message}")]
  Unreloaded {
    entity:  Entity,
    id:      Id,
    message: String,
  },
}

impl Error {
  /// The id of a row that exists remotely despite the error.
  pub fn saved_id(&self) -> Option<Id> {
    match self {
      Self::Unreloaded { id, .. } => Some(*id),
      _ => None,
    }
  }

  pub(crate) fn remote(err: impl std::error::Error) -> Self {
    Self::Remote(err.to_string())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
