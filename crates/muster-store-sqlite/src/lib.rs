//! SQLite backend for the Muster directory.
//!
//! Implements [`muster_core::store::TableStore`] over a single SQLite file,
//! with real foreign keys and `ON DELETE CASCADE`, so it behaves like the
//! hosted relational store the directory normally talks to. Wraps
//! [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
