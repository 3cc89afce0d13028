//! Partial updates.
//!
//! Every field is an `Option`: `None` leaves the column untouched and is
//! omitted from the update payload, `Some(value)` writes `value`, including
//! an empty string, so a field can be cleared.

use serde::{Deserialize, Serialize};

use crate::{Result, model::Id, store::Row};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name_ar: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name_en: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code:    Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub commission_id: Option<Id>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub town_name:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub district_id:   Option<Id>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub commission_id: Option<Id>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub town_name:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub group_id:      Option<Id>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub district_id:   Option<Id>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub commission_id: Option<Id>,
}

/// Patch for a member row and, optionally, its band memberships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub civil_id:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone_number: Option<String>,
  /// `None` leaves memberships alone; `Some(vec![])` removes them all.
  /// Never part of the member row payload.
  #[serde(default, skip_serializing)]
  pub band_ids:     Option<Vec<Id>>,
}

/// Build the update payload for a patch: exactly the fields that are set.
pub fn payload<T: Serialize>(patch: &T) -> Result<Row> { crate::model::to_row(patch) }
