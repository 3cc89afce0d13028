//! Query-string encoding for selects and row filters.
//!
//! ```text
//! select=*,commission(id,name_ar)&order=created_at.desc&member_id=eq.<id>&band_id=in.("a","b")
//! ```

use muster_core::store::{Columns, Filter, Select};
use serde_json::Value;

use crate::Result;

pub(crate) type Params = Vec<(String, String)>;

fn literal(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// A list element, double-quoted so commas and parentheses survive.
fn quoted(value: &Value) -> String {
  let raw = literal(value).replace('\\', "\\\\").replace('"', "\\\"");
  format!("\"{raw}\"")
}

pub(crate) fn filter_params(filters: &[Filter]) -> Params {
  filters
    .iter()
    .map(|filter| match filter {
      Filter::Eq {
        column,
        value: Value::Null,
      } => (column.to_string(), "is.null".to_owned()),
      Filter::Eq { column, value } => (column.to_string(), format!("eq.{}", literal(value))),
      Filter::In { column, values } => {
        let list: Vec<String> = values.iter().map(quoted).collect();
        (column.to_string(), format!("in.({})", list.join(",")))
      }
    })
    .collect()
}

/// Encode `query` after checking it against the schema.
pub(crate) fn select_params(query: &Select) -> Result<Params> {
  query.validate()?;

  let mut fields = vec![match &query.columns {
    Columns::All => "*".to_owned(),
    Columns::Only(cols) => cols.join(","),
  }];
  for embed in &query.embeds {
    fields.push(format!("{}({})", embed.table, embed.columns.join(",")));
  }

  let mut params = vec![("select".to_owned(), fields.join(","))];
  if let Some(order) = &query.order {
    let direction = if order.descending { "desc" } else { "asc" };
    params.push(("order".to_owned(), format!("{}.{direction}", order.column)));
  }
  params.extend(filter_params(&query.filters));
  Ok(params)
}

#[cfg(test)]
mod tests {
  use muster_core::store::Table;

  use super::*;

  fn pairs(params: &Params) -> Vec<(&str, &str)> {
    params
      .iter()
      .map(|(k, v)| (k.as_str(), v.as_str()))
      .collect()
  }

  #[test]
  fn band_select_embeds_all_parents() {
    let query = Select::from(Table::Band)
      .embed(Table::Group, &["id", "name", "town_name"])
      .embed(Table::Commission, &["id", "name_ar"])
      .newest_first();
    let params = select_params(&query).unwrap();
    assert_eq!(pairs(&params), [
      ("select", "*,group(id,name,town_name),commission(id,name_ar)"),
      ("order", "created_at.desc"),
    ]);
  }

  #[test]
  fn filters_encode_operators() {
    let params = filter_params(&[
      Filter::eq("member_id", "m1"),
      Filter::any_of("band_id", ["b1", "b,2"]),
      Filter::eq("group_id", Value::Null),
    ]);
    assert_eq!(pairs(&params), [
      ("member_id", "eq.m1"),
      ("band_id", r#"in.("b1","b,2")"#),
      ("group_id", "is.null"),
    ]);
  }

  #[test]
  fn link_select_lists_columns() {
    let query = Select::from(Table::BandMember).columns(&["member_id", "band_id"]);
    let params = select_params(&query).unwrap();
    assert_eq!(pairs(&params), [("select", "member_id,band_id")]);
  }

  #[test]
  fn unknown_embed_is_rejected() {
    let query = Select::from(Table::Commission).embed(Table::Band, &["id"]);
    assert!(select_params(&query).is_err());
  }
}
