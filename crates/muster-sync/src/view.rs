//! Read-side views over a consistent copy of the five collections: filtering,
//! text search, cascading-select options and dashboard counts.

use std::sync::Arc;

use muster_core::{
  Id,
  model::{Band, Commission, District, Group, Member},
};
use serde::{Deserialize, Serialize};

/// The five collections as of one moment. Cloning is cheap; every collection
/// is shared, and the directory store replaces (never mutates) them.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  pub commissions: Arc<Vec<Commission>>,
  pub districts:   Arc<Vec<District>>,
  pub groups:      Arc<Vec<Group>>,
  pub bands:       Arc<Vec<Band>>,
  pub members:     Arc<Vec<Member>>,
}

/// Record counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub commissions: usize,
  pub districts:   usize,
  pub groups:      usize,
  pub bands:       usize,
  pub members:     usize,
}

/// Parent filters. A field only applies to collections whose records carry
/// that parent; elsewhere it is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Scope {
  pub commission_id: Option<Id>,
  pub district_id:   Option<Id>,
  pub group_id:      Option<Id>,
  pub band_id:       Option<Id>,
}

/// A record that can be filtered by [`Scope`] and matched by text search.
/// `parents` is the snapshot the record came from, for scopes that resolve
/// through another collection.
pub trait Listed {
  fn in_scope(&self, scope: &Scope, parents: &Snapshot) -> bool;

  /// Whether any search key contains `needle`, which is already lowercase.
  fn matches(&self, needle: &str) -> bool;
}

fn hit(needle: &str, field: &str) -> bool { field.to_lowercase().contains(needle) }

fn hit_opt(needle: &str, field: &Option<String>) -> bool {
  field.as_deref().is_some_and(|f| hit(needle, f))
}

/// `true` when the filter is unset or equals the record's parent.
fn allows(filter: Option<Id>, parent: Option<Id>) -> bool {
  filter.is_none_or(|want| parent == Some(want))
}

impl Listed for Commission {
  fn in_scope(&self, _scope: &Scope, _parents: &Snapshot) -> bool { true }

  fn matches(&self, needle: &str) -> bool {
    hit(needle, &self.id.to_string())
      || hit(needle, &self.name_ar)
      || hit(needle, &self.name_en)
      || hit(needle, &self.code)
  }
}

impl Listed for District {
  fn in_scope(&self, scope: &Scope, _parents: &Snapshot) -> bool {
    allows(scope.commission_id, self.commission_id)
  }

  fn matches(&self, needle: &str) -> bool {
    hit(needle, &self.id.to_string())
      || hit(needle, &self.name)
      || hit(needle, &self.code)
      || hit_opt(needle, &self.commission_name)
  }
}

impl Listed for Group {
  /// The commission is taken from the group's district, not the group's own
  /// `commission_id`; a group whose district is gone matches no commission.
  fn in_scope(&self, scope: &Scope, parents: &Snapshot) -> bool {
    let commission = || {
      let district = parents.districts.iter().find(|d| Some(d.id) == self.district_id)?;
      district.commission_id
    };
    scope.commission_id.is_none_or(|want| commission() == Some(want))
      && allows(scope.district_id, self.district_id)
  }

  fn matches(&self, needle: &str) -> bool {
    hit(needle, &self.id.to_string())
      || hit(needle, &self.name)
      || hit(needle, &self.code)
      || hit(needle, &self.town_name)
      || hit_opt(needle, &self.district_name)
      || hit_opt(needle, &self.commission_name)
  }
}

impl Listed for Band {
  fn in_scope(&self, scope: &Scope, _parents: &Snapshot) -> bool {
    allows(scope.commission_id, self.commission_id)
      && allows(scope.district_id, self.district_id)
      && allows(scope.group_id, self.group_id)
  }

  fn matches(&self, needle: &str) -> bool {
    hit(needle, &self.id.to_string())
      || hit(needle, &self.name)
      || hit(needle, &self.code)
      || hit(needle, &self.town_name)
      || hit_opt(needle, &self.group_name)
      || hit_opt(needle, &self.district_name)
      || hit_opt(needle, &self.commission_name)
  }
}

impl Listed for Member {
  fn in_scope(&self, scope: &Scope, _parents: &Snapshot) -> bool {
    scope.band_id.is_none_or(|band| self.band_ids.contains(&band))
  }

  fn matches(&self, needle: &str) -> bool {
    hit(needle, &self.name)
      || hit(needle, &self.code)
      || hit(needle, &self.civil_id)
      || hit(needle, &self.phone_number)
  }
}

/// Records in `scope` whose search keys contain `query`, case-insensitively.
/// A blank query matches everything.
pub fn filter<'a, T: Listed>(
  items: &'a [T],
  parents: &Snapshot,
  scope: &Scope,
  query: &str,
) -> Vec<&'a T> {
  let needle = query.trim().to_lowercase();
  items
    .iter()
    .filter(|item| item.in_scope(scope, parents))
    .filter(|item| needle.is_empty() || item.matches(&needle))
    .collect()
}

impl Snapshot {
  pub fn summary(&self) -> Summary {
    Summary {
      commissions: self.commissions.len(),
      districts:   self.districts.len(),
      groups:      self.groups.len(),
      bands:       self.bands.len(),
      members:     self.members.len(),
    }
  }

  pub fn districts_in(&self, commission: Id) -> Vec<&District> {
    self
      .districts
      .iter()
      .filter(|d| d.commission_id == Some(commission))
      .collect()
  }

  pub fn groups_in(&self, district: Id) -> Vec<&Group> {
    self
      .groups
      .iter()
      .filter(|g| g.district_id == Some(district))
      .collect()
  }

  pub fn bands_in(&self, group: Id) -> Vec<&Band> {
    self
      .bands
      .iter()
      .filter(|b| b.group_id == Some(group))
      .collect()
  }

  /// The member's bands that are still present in the band collection.
  pub fn bands_of(&self, member: &Member) -> Vec<&Band> {
    self
      .bands
      .iter()
      .filter(|b| member.band_ids.contains(&b.id))
      .collect()
  }

  pub fn members_of(&self, band: Id) -> Vec<&Member> {
    self
      .members
      .iter()
      .filter(|m| m.band_ids.contains(&band))
      .collect()
  }
}
