//! Member ↔ band associations.

use std::collections::{BTreeMap, BTreeSet};

use muster_core::{
  Id,
  entity::Entity,
  store::{Row, Select, Table},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

/// The change needed to move a member from one band set to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
  pub added:   BTreeSet<Id>,
  pub removed: BTreeSet<Id>,
}

impl MembershipDiff {
  pub fn between(current: &BTreeSet<Id>, desired: &BTreeSet<Id>) -> Self {
    Self {
      added:   desired.difference(current).copied().collect(),
      removed: current.difference(desired).copied().collect(),
    }
  }

  pub fn is_empty(&self) -> bool { self.added.is_empty() && self.removed.is_empty() }
}

#[derive(Deserialize)]
struct Link {
  member_id: Id,
  band_id:   Id,
}

pub(crate) fn links_query() -> Select {
  Select::from(Table::BandMember).columns(&["member_id", "band_id"])
}

/// Association rows for `member` joining each of `bands`.
pub(crate) fn link_rows<'a>(
  member: Id,
  bands: impl IntoIterator<Item = &'a Id>,
) -> Vec<Row> {
  bands
    .into_iter()
    .map(|band| {
      let mut row = Row::new();
      row.insert("member_id".into(), Value::String(member.to_string()));
      row.insert("band_id".into(), Value::String(band.to_string()));
      row
    })
    .collect()
}

/// Group association rows into member id → band ids.
pub(crate) fn group_links(rows: Vec<Row>) -> Result<BTreeMap<Id, BTreeSet<Id>>> {
  let mut by_member: BTreeMap<Id, BTreeSet<Id>> = BTreeMap::new();
  for row in rows {
    let link: Link = serde_json::from_value(Value::Object(row)).map_err(|e| {
      Error::Decode {
        entity:  Entity::Member,
        message: format!("band membership: {e}"),
      }
    })?;
    by_member.entry(link.member_id).or_default().insert(link.band_id);
  }
  Ok(by_member)
}
