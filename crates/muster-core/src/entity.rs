//! The five directory collections and how they depend on each other.
//!
//! A child collection depends on a parent when its rows carry the parent's id
//! or a denormalized copy of one of the parent's fields. The graph has two
//! edge kinds: deleting a parent can remove or orphan child rows, while
//! editing a parent only changes children holding a denormalized copy of its
//! fields. The directory store uses both to decide which collections to
//! reload.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::store::Table;

/// One of the directory's collections. Variants are declared in hierarchy
/// order; the derived `Ord` is used to refresh parents before children.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Entity {
  Commission,
  District,
  Group,
  Band,
  Member,
}

impl Entity {
  pub const ALL: [Entity; 5] = [
    Self::Commission,
    Self::District,
    Self::Group,
    Self::Band,
    Self::Member,
  ];

  /// The table holding this entity's rows.
  pub fn table(self) -> Table {
    match self {
      Self::Commission => Table::Commission,
      Self::District => Table::District,
      Self::Group => Table::Group,
      Self::Band => Table::Band,
      Self::Member => Table::Member,
    }
  }

  /// Collections whose rows reference this entity directly, and so change
  /// when a record of it is deleted.
  pub fn dependents(self) -> &'static [Entity] {
    match self {
      Self::Commission => &[Self::District, Self::Group, Self::Band],
      Self::District => &[Self::Group, Self::Band],
      Self::Group => &[Self::Band],
      // Band ids live in each member's `band_ids`.
      Self::Band => &[Self::Member],
      Self::Member => &[],
    }
  }

  /// Collections that carry a denormalized copy of this entity's fields, and
  /// so change when a record of it is edited. Members only hold band ids.
  pub fn copies(self) -> &'static [Entity] {
    match self {
      Self::Commission => &[Self::District, Self::Group, Self::Band],
      Self::District => &[Self::Group, Self::Band],
      Self::Group => &[Self::Band],
      Self::Band | Self::Member => &[],
    }
  }

  /// The next level down the hierarchy.
  pub fn child(self) -> Option<Entity> {
    match self {
      Self::Commission => Some(Self::District),
      Self::District => Some(Self::Group),
      Self::Group => Some(Self::Band),
      Self::Band => Some(Self::Member),
      Self::Member => None,
    }
  }

  /// Every collection reachable through [`Entity::dependents`], excluding
  /// `self`.
  pub fn affected(self) -> BTreeSet<Entity> { reachable(self, Entity::dependents) }

  /// Every collection reachable through [`Entity::copies`], excluding `self`.
  pub fn stale_after_edit(self) -> BTreeSet<Entity> { reachable(self, Entity::copies) }

  /// Plural collection name, as used in URL paths.
  pub fn plural(self) -> &'static str {
    match self {
      Self::Commission => "commissions",
      Self::District => "districts",
      Self::Group => "groups",
      Self::Band => "bands",
      Self::Member => "members",
    }
  }
}

fn reachable(from: Entity, edges: fn(Entity) -> &'static [Entity]) -> BTreeSet<Entity> {
  let mut seen = BTreeSet::new();
  let mut stack = edges(from).to_vec();
  while let Some(next) = stack.pop() {
    if seen.insert(next) {
      stack.extend_from_slice(edges(next));
    }
  }
  seen
}

/// How far a structural change is followed when refreshing collections.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Cascade {
  /// Reload only the next level down after a delete, and nothing else after
  /// an update.
  Direct,
  /// Reload everything transitively affected.
  #[default]
  Transitive,
}

impl Cascade {
  /// Collections to reload after deleting a record of `entity`, in
  /// hierarchy order. Always starts with `entity` itself.
  pub fn after_delete(self, entity: Entity) -> Vec<Entity> {
    match self {
      Self::Direct => std::iter::once(entity).chain(entity.child()).collect(),
      Self::Transitive => including(entity, entity.affected()),
    }
  }

  /// Collections to reload after updating a record of `entity`, in
  /// hierarchy order. Under `Transitive` this follows only denormalized
  /// copies, so editing a band never reloads members.
  pub fn after_update(self, entity: Entity) -> Vec<Entity> {
    match self {
      Self::Direct => vec![entity],
      Self::Transitive => including(entity, entity.stale_after_edit()),
    }
  }
}

fn including(entity: Entity, mut rest: BTreeSet<Entity>) -> Vec<Entity> {
  rest.insert(entity);
  rest.into_iter().collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn direct_cascade_is_one_hop() {
    use Entity::*;
    assert_eq!(Cascade::Direct.after_delete(Commission), [Commission, District]);
    assert_eq!(Cascade::Direct.after_delete(District), [District, Group]);
    assert_eq!(Cascade::Direct.after_delete(Group), [Group, Band]);
    assert_eq!(Cascade::Direct.after_delete(Band), [Band, Member]);
    assert_eq!(Cascade::Direct.after_delete(Member), [Member]);
  }

  #[test]
  fn transitive_cascade_reaches_members_in_order() {
    use Entity::*;
    assert_eq!(
      Cascade::Transitive.after_delete(Commission),
      [Commission, District, Group, Band, Member]
    );
    assert_eq!(Cascade::Transitive.after_delete(Group), [Group, Band, Member]);
    assert_eq!(Cascade::Transitive.after_update(Member), [Member]);
  }

  #[test]
  fn transitive_update_follows_denormalized_copies_only() {
    use Entity::*;
    assert_eq!(
      Cascade::Transitive.after_update(Commission),
      [Commission, District, Group, Band]
    );
    assert_eq!(Cascade::Transitive.after_update(Group), [Group, Band]);
    assert_eq!(Cascade::Transitive.after_update(Band), [Band]);
    assert!(Entity::Band.affected().contains(&Member));
  }

  #[test]
  fn direct_update_reloads_only_the_entity() {
    assert_eq!(
      Cascade::Direct.after_update(Entity::Commission),
      [Entity::Commission]
    );
  }

  #[test]
  fn affected_excludes_self() {
    assert!(!Entity::District.affected().contains(&Entity::District));
    assert!(Entity::Member.affected().is_empty());
  }

  #[test]
  fn parses_case_insensitively() {
    assert_eq!("Band".parse::<Entity>().unwrap(), Entity::Band);
    assert_eq!("direct".parse::<Cascade>().unwrap(), Cascade::Direct);
  }
}
