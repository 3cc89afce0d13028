//! Row → record mapping.
//!
//! Each record type knows the query that loads its collection (with the
//! parent embeds that feed its denormalized fields) and how to turn one
//! returned row into a record. Rows are decoded through `serde`; text
//! columns the store left null decode as empty strings, parent references
//! that did not resolve decode as `None`.

use chrono::{DateTime, Utc};
use muster_core::{
  Id,
  entity::Entity,
  model::{Band, Commission, District, Group, Member},
  store::{Row, Select, Table},
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{Error, Result, view::Snapshot};

/// A record type with a collection in the directory.
pub(crate) trait Record: Sized + Send + Sync + 'static {
  const ENTITY: Entity;

  /// The query that loads the whole collection.
  fn query() -> Select;

  fn decode(row: Row) -> Result<Self>;

  fn collection(snapshot: &mut Snapshot) -> &mut std::sync::Arc<Vec<Self>>;
}

fn parse<T: DeserializeOwned>(entity: Entity, row: Row) -> Result<T> {
  serde_json::from_value(serde_json::Value::Object(row)).map_err(|e| {
    Error::Decode {
      entity,
      message: e.to_string(),
    }
  })
}

/// An embedded parent row. Which fields are present depends on the embed.
#[derive(Debug, Default, Deserialize)]
struct ParentRef {
  id:        Option<Id>,
  name:      Option<String>,
  name_ar:   Option<String>,
  town_name: Option<String>,
}

/// Prefer the foreign-key column; fall back to the embedded parent's id.
fn parent_id(fk: Option<Id>, parent: &Option<ParentRef>) -> Option<Id> {
  fk.or_else(|| parent.as_ref().and_then(|p| p.id))
}

// ─── Commission ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CommissionRow {
  id:         Id,
  name_ar:    Option<String>,
  name_en:    Option<String>,
  code:       Option<String>,
  created_at: Option<DateTime<Utc>>,
}

impl Record for Commission {
  const ENTITY: Entity = Entity::Commission;

  fn query() -> Select { Select::from(Table::Commission).newest_first() }

  fn decode(row: Row) -> Result<Self> {
    let raw: CommissionRow = parse(Self::ENTITY, row)?;
    Ok(Commission {
      id:         raw.id,
      name_ar:    raw.name_ar.unwrap_or_default(),
      name_en:    raw.name_en.unwrap_or_default(),
      code:       raw.code.unwrap_or_default(),
      created_at: raw.created_at,
    })
  }

  fn collection(snapshot: &mut Snapshot) -> &mut std::sync::Arc<Vec<Self>> {
    &mut snapshot.commissions
  }
}

// ─── District ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DistrictRow {
  id:            Id,
  name:          Option<String>,
  code:          Option<String>,
  commission_id: Option<Id>,
  created_at:    Option<DateTime<Utc>>,
  commission:    Option<ParentRef>,
}

impl Record for District {
  const ENTITY: Entity = Entity::District;

  fn query() -> Select {
    Select::from(Table::District)
      .embed(Table::Commission, &["id", "name_ar"])
      .newest_first()
  }

  fn decode(row: Row) -> Result<Self> {
    let raw: DistrictRow = parse(Self::ENTITY, row)?;
    Ok(District {
      id:              raw.id,
      name:            raw.name.unwrap_or_default(),
      code:            raw.code.unwrap_or_default(),
      commission_id:   parent_id(raw.commission_id, &raw.commission),
      commission_name: raw.commission.and_then(|c| c.name_ar),
      created_at:      raw.created_at,
    })
  }

  fn collection(snapshot: &mut Snapshot) -> &mut std::sync::Arc<Vec<Self>> {
    &mut snapshot.districts
  }
}

// ─── Group ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct GroupRow {
  id:            Id,
  name:          Option<String>,
  code:          Option<String>,
  town_name:     Option<String>,
  district_id:   Option<Id>,
  commission_id: Option<Id>,
  created_at:    Option<DateTime<Utc>>,
  district:      Option<ParentRef>,
  commission:    Option<ParentRef>,
}

impl Record for Group {
  const ENTITY: Entity = Entity::Group;

  fn query() -> Select {
    Select::from(Table::Group)
      .embed(Table::District, &["id", "name"])
      .embed(Table::Commission, &["id", "name_ar"])
      .newest_first()
  }

  fn decode(row: Row) -> Result<Self> {
    let raw: GroupRow = parse(Self::ENTITY, row)?;
    Ok(Group {
      id:              raw.id,
      name:            raw.name.unwrap_or_default(),
      code:            raw.code.unwrap_or_default(),
      town_name:       raw.town_name.unwrap_or_default(),
      district_id:     parent_id(raw.district_id, &raw.district),
      district_name:   raw.district.and_then(|d| d.name),
      commission_id:   parent_id(raw.commission_id, &raw.commission),
      commission_name: raw.commission.and_then(|c| c.name_ar),
      created_at:      raw.created_at,
    })
  }

  fn collection(snapshot: &mut Snapshot) -> &mut std::sync::Arc<Vec<Self>> {
    &mut snapshot.groups
  }
}

// ─── Band ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct BandRow {
  id:            Id,
  name:          Option<String>,
  code:          Option<String>,
  town_name:     Option<String>,
  group_id:      Option<Id>,
  district_id:   Option<Id>,
  commission_id: Option<Id>,
  created_at:    Option<DateTime<Utc>>,
  group:         Option<ParentRef>,
  district:      Option<ParentRef>,
  commission:    Option<ParentRef>,
}

/// A group is displayed by its town; its own name stands in for a blank one.
fn group_label(group: ParentRef) -> Option<String> {
  group
    .town_name
    .filter(|t| !t.is_empty())
    .or(group.name)
}

impl Record for Band {
  const ENTITY: Entity = Entity::Band;

  fn query() -> Select {
    Select::from(Table::Band)
      .embed(Table::Group, &["id", "name", "town_name"])
      .embed(Table::District, &["id", "name"])
      .embed(Table::Commission, &["id", "name_ar"])
      .newest_first()
  }

  fn decode(row: Row) -> Result<Self> {
    let raw: BandRow = parse(Self::ENTITY, row)?;
    Ok(Band {
      id:              raw.id,
      name:            raw.name.unwrap_or_default(),
      code:            raw.code.unwrap_or_default(),
      town_name:       raw.town_name.unwrap_or_default(),
      group_id:        parent_id(raw.group_id, &raw.group),
      group_name:      raw.group.and_then(group_label),
      district_id:     parent_id(raw.district_id, &raw.district),
      district_name:   raw.district.and_then(|d| d.name),
      commission_id:   parent_id(raw.commission_id, &raw.commission),
      commission_name: raw.commission.and_then(|c| c.name_ar),
      created_at:      raw.created_at,
    })
  }

  fn collection(snapshot: &mut Snapshot) -> &mut std::sync::Arc<Vec<Self>> {
    &mut snapshot.bands
  }
}

// ─── Member ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MemberRow {
  id:           Id,
  name:         Option<String>,
  code:         Option<String>,
  civil_id:     Option<String>,
  phone_number: Option<String>,
  created_at:   Option<DateTime<Utc>>,
}

/// Decodes the member row only; `band_ids` is merged in from the
/// association table by the caller.
impl Record for Member {
  const ENTITY: Entity = Entity::Member;

  fn query() -> Select { Select::from(Table::Member).newest_first() }

  fn decode(row: Row) -> Result<Self> {
    let raw: MemberRow = parse(Self::ENTITY, row)?;
    Ok(Member {
      id:           raw.id,
      name:         raw.name.unwrap_or_default(),
      code:         raw.code.unwrap_or_default(),
      civil_id:     raw.civil_id.unwrap_or_default(),
      phone_number: raw.phone_number.unwrap_or_default(),
      band_ids:     Default::default(),
      created_at:   raw.created_at,
    })
  }

  fn collection(snapshot: &mut Snapshot) -> &mut std::sync::Arc<Vec<Self>> {
    &mut snapshot.members
  }
}
