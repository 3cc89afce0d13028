//! HTTP backend for the Muster directory.
//!
//! Talks to a hosted PostgREST-style API: one resource per table under
//! `/rest/v1/`, row filters and parent embeds encoded in the query string,
//! JSON bodies both ways. Authenticates with a project API key sent as both
//! `apikey` and bearer token.

mod query;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{RestConfig, RestStore};
