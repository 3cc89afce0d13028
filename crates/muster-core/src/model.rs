//! Directory records: the denormalized read model held by the directory
//! store, and the inputs used to create them.
//!
//! The hierarchy is four levels deep: a commission owns districts, a district
//! owns groups (towns), a group owns bands. Members hang off bands through a
//! many-to-many association.
//!
//! Parent names copied onto child records (`commission_name`,
//! `district_name`, `group_name`) are snapshots taken when the collection was
//! fetched. They are display conveniences only and are `None` whenever the
//! parent could not be resolved at fetch time.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, store::Row};

/// Record identifier; assigned by the remote store on insert.
pub type Id = Uuid;

// ─── Records ─────────────────────────────────────────────────────────────────

/// Top level of the hierarchy. Carries a dual-language label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
  pub id:         Id,
  /// Native (Arabic) label; copied onto children as `commission_name`.
  pub name_ar:    String,
  /// Primary (latin) label.
  pub name_en:    String,
  pub code:       String,
  pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
  pub id:              Id,
  pub name:            String,
  pub code:            String,
  pub commission_id:   Option<Id>,
  pub commission_name: Option<String>,
  pub created_at:      Option<DateTime<Utc>>,
}

/// A town-level grouping of bands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub id:              Id,
  pub name:            String,
  pub code:            String,
  pub town_name:       String,
  pub district_id:     Option<Id>,
  pub district_name:   Option<String>,
  pub commission_id:   Option<Id>,
  pub commission_name: Option<String>,
  pub created_at:      Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
  pub id:              Id,
  pub name:            String,
  pub code:            String,
  pub town_name:       String,
  pub group_id:        Option<Id>,
  /// The owning group's town name (or its name when the town is blank).
  pub group_name:      Option<String>,
  pub district_id:     Option<Id>,
  pub district_name:   Option<String>,
  pub commission_id:   Option<Id>,
  pub commission_name: Option<String>,
  pub created_at:      Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
  pub id:           Id,
  pub name:         String,
  pub code:         String,
  pub civil_id:     String,
  pub phone_number: String,
  /// Bands this member belongs to, merged in from the association table.
  pub band_ids:     BTreeSet<Id>,
  pub created_at:   Option<DateTime<Utc>>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input for a new commission.
/// `id` and `created_at` are always assigned by the remote store; they are not
/// accepted from callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCommission {
  pub name_ar: String,
  pub name_en: String,
  pub code:    String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDistrict {
  pub name:          String,
  pub code:          String,
  pub commission_id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroup {
  pub name:          String,
  pub code:          String,
  pub town_name:     String,
  pub district_id:   Id,
  pub commission_id: Id,
}

/// Input for a new band. The parent triple is taken as given; the remote
/// store is the only place that may reject an inconsistent one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBand {
  pub name:          String,
  pub code:          String,
  pub town_name:     String,
  pub group_id:      Id,
  pub district_id:   Id,
  pub commission_id: Id,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMember {
  pub name:         String,
  pub code:         String,
  pub civil_id:     String,
  pub phone_number: String,
  /// Written to the association table after the member row exists.
  #[serde(skip_serializing, default)]
  pub band_ids:     Vec<Id>,
}

/// Serialise an input or patch into the column map sent to the remote store.
pub fn to_row<T: Serialize>(value: &T) -> Result<Row> {
  match serde_json::to_value(value)? {
    serde_json::Value::Object(map) => Ok(map),
    _ => Ok(Row::new()),
  }
}
