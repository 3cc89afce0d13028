//! Core types and trait definitions for the Muster directory.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it describes the directory records, the
//! patches that edit them, and the table-oriented contract every remote store
//! backend implements.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod entity;
pub mod error;
pub mod model;
pub mod patch;
pub mod store;

pub use error::{Error, Result};
pub use model::Id;
