//! The directory store: the client-side state layer between the console and
//! the remote relational store.
//!
//! [`DirectoryStore`] holds one in-memory collection per entity
//! (commissions, districts, groups, bands, members), fetches them with parent
//! names denormalized onto each record, and after every write reloads
//! whatever the write may have changed. There is no optimistic local state:
//! a collection only ever changes by being replaced with a fresh fetch.
//!
//! Each entity has its own [`Status`] slot (loading flag and last error), so
//! concurrent operations on different entities never overwrite each other's
//! outcome.

mod decode;
mod directory;
mod membership;
mod status;

pub mod error;
pub mod view;

pub use directory::DirectoryStore;
pub use error::{Error, Result};
pub use membership::MembershipDiff;
pub use status::Status;
pub use view::{Scope, Snapshot, Summary};
