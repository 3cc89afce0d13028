//! Per-entity loading and error slots.

use std::{
  collections::BTreeMap,
  sync::{Mutex, MutexGuard, PoisonError},
};

use muster_core::entity::Entity;
use serde::Serialize;

/// What the console shows for one collection: a spinner while anything is
/// in flight, a failure notice when the last operation failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
  pub loading: bool,
  pub error:   Option<String>,
}

#[derive(Debug, Default)]
struct Slot {
  in_flight: usize,
  error:     Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct StatusBoard {
  slots: Mutex<BTreeMap<Entity, Slot>>,
}

impl StatusBoard {
  fn slots(&self) -> MutexGuard<'_, BTreeMap<Entity, Slot>> {
    self.slots.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Mark an operation on `entity` as started and clear its last error.
  /// The slot stays loading until the returned guard is dropped, whether the
  /// operation finished or its future was cancelled.
  pub fn begin(&self, entity: Entity) -> Loading<'_> {
    let mut slots = self.slots();
    let slot = slots.entry(entity).or_default();
    slot.in_flight += 1;
    slot.error = None;
    Loading { board: self, entity }
  }

  pub fn fail(&self, entity: Entity, message: String) {
    self.slots().entry(entity).or_default().error = Some(message);
  }

  pub fn get(&self, entity: Entity) -> Status {
    self
      .slots()
      .get(&entity)
      .map(|s| Status {
        loading: s.in_flight > 0,
        error:   s.error.clone(),
      })
      .unwrap_or_default()
  }

  pub fn all(&self) -> BTreeMap<Entity, Status> {
    Entity::ALL.iter().map(|e| (*e, self.get(*e))).collect()
  }
}

/// Guard for one in-flight operation.
pub(crate) struct Loading<'a> {
  board:  &'a StatusBoard,
  entity: Entity,
}

impl Drop for Loading<'_> {
  fn drop(&mut self) {
    if let Some(slot) = self.board.slots().get_mut(&self.entity) {
      slot.in_flight = slot.in_flight.saturating_sub(1);
    }
  }
}
