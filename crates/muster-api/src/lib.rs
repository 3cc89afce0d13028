//! JSON REST API for the Muster directory.
//!
//! Exposes an axum [`Router`] over a shared [`DirectoryStore`]. Reads are
//! served from the store's loaded collections; writes go through the store
//! and so trigger its usual reloads. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", muster_api::api_router(directory.clone()))
//! ```

pub mod error;
pub mod handlers;
pub mod resource;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use muster_core::{
  model::{Band, Commission, District, Group, Member},
  store::TableStore,
};
use muster_sync::DirectoryStore;

pub use error::ApiError;
use handlers::{create, get_one, list, remove, update};
use resource::Resource;

/// Build a fully-materialised API router for `directory`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(directory: Arc<DirectoryStore<S>>) -> Router<()>
where
  S: TableStore + 'static,
{
  Router::new()
    .route("/status", get(handlers::status::<S>))
    .route("/refresh", post(handlers::refresh::<S>))
    .route("/summary", get(handlers::summary::<S>))
    .merge(collection::<S, Commission>())
    .merge(collection::<S, District>())
    .merge(collection::<S, Group>())
    .merge(collection::<S, Band>())
    .merge(collection::<S, Member>())
    .with_state(directory)
}

fn collection<S, R>() -> Router<Arc<DirectoryStore<S>>>
where
  S: TableStore + 'static,
  R: Resource,
{
  let base = format!("/{}", R::ENTITY.plural());
  Router::new()
    .route(&base, get(list::<S, R>).post(create::<S, R>))
    .route(
      &format!("{base}/{{id}}"),
      get(get_one::<S, R>)
        .patch(update::<S, R>)
        .delete(remove::<S, R>),
    )
}

#[cfg(test)]
mod tests;
