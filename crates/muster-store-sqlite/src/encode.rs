//! Encoding helpers between JSON row values and SQLite column values, plus
//! the statement builders that turn [`Select`] queries and filters into SQL.
//!
//! Timestamps are stored as RFC 3339 strings with microsecond precision so
//! they sort lexicographically. UUIDs are stored as hyphenated lowercase
//! strings. Identifiers are always double-quoted (`group` is a keyword) and
//! only ever come from the static column lists in `muster-core`.

use chrono::{DateTime, SecondsFormat, Utc};
use muster_core::store::{Filter, Row, Select, Table};
use rusqlite::types::Value as SqlValue;
use serde_json::{Number, Value};

use crate::Result;

// ─── Values ──────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn to_sql(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    other => SqlValue::Text(other.to_string()),
  }
}

pub fn from_sql(value: SqlValue) -> Value {
  match value {
    SqlValue::Null | SqlValue::Blob(_) => Value::Null,
    SqlValue::Integer(i) => Value::Number(i.into()),
    SqlValue::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
    SqlValue::Text(s) => Value::String(s),
  }
}

pub fn quote(ident: &str) -> String { format!("\"{ident}\"") }

// ─── Statements ──────────────────────────────────────────────────────────────

/// A compiled statement and its positional parameters.
pub struct Statement {
  pub sql:    String,
  pub params: Vec<SqlValue>,
}

/// Append `filters` as a `WHERE` clause. `alias` qualifies column names.
fn push_where(
  sql: &mut String,
  params: &mut Vec<SqlValue>,
  table: Table,
  alias: Option<&str>,
  filters: &[Filter],
) -> Result<()> {
  let qualify = |column: &str| match alias {
    Some(a) => format!("{a}.{}", quote(column)),
    None => quote(column),
  };

  let mut conds = Vec::with_capacity(filters.len());
  for filter in filters {
    let column = qualify(table.column(filter.column())?);
    match filter {
      Filter::Eq { value, .. } => {
        conds.push(format!("{column} = ?"));
        params.push(to_sql(value));
      }
      Filter::In { values, .. } if values.is_empty() => conds.push("0".into()),
      Filter::In { values, .. } => {
        let marks = vec!["?"; values.len()].join(", ");
        conds.push(format!("{column} IN ({marks})"));
        params.extend(values.iter().map(to_sql));
      }
    }
  }

  if !conds.is_empty() {
    sql.push_str(" WHERE ");
    sql.push_str(&conds.join(" AND "));
  }
  Ok(())
}

/// A compiled `SELECT` with the column layout needed to rebuild nested rows.
pub struct SelectPlan {
  pub statement: Statement,
  base:          Vec<&'static str>,
  /// Per embed: parent table name and requested columns. Each embed is read
  /// as its `id` (join marker) followed by the requested columns.
  embeds:        Vec<(Table, Vec<&'static str>)>,
}

impl SelectPlan {
  pub fn new(query: &Select) -> Result<Self> {
    query.validate()?;

    let base = query.column_names();
    let mut projection: Vec<String> =
      base.iter().map(|c| format!("t.{}", quote(c))).collect();
    let mut joins = String::new();

    for (i, embed) in query.embeds.iter().enumerate() {
      let alias = format!("e{i}");
      let fk = query.table.foreign_key(embed.table)?;
      projection.push(format!("{alias}.{}", quote("id")));
      projection.extend(
        embed
          .columns
          .iter()
          .map(|c| format!("{alias}.{}", quote(c))),
      );
      joins.push_str(&format!(
        " LEFT JOIN {} AS {alias} ON {alias}.{} = t.{}",
        quote(embed.table.as_ref()),
        quote("id"),
        quote(fk),
      ));
    }

    let mut sql = format!(
      "SELECT {} FROM {} AS t{joins}",
      projection.join(", "),
      quote(query.table.as_ref()),
    );
    let mut params = Vec::new();
    push_where(&mut sql, &mut params, query.table, Some("t"), &query.filters)?;

    if let Some(order) = query.order {
      let dir = if order.descending { "DESC" } else { "ASC" };
      // rowid breaks ties between rows written within the same microsecond.
      sql.push_str(&format!(
        " ORDER BY t.{} {dir}, t.rowid {dir}",
        quote(order.column)
      ));
    }

    Ok(Self {
      statement: Statement { sql, params },
      base,
      embeds: query
        .embeds
        .iter()
        .map(|e| (e.table, e.columns.clone()))
        .collect(),
    })
  }

  /// Rebuild a JSON row (with nested parents) from one result tuple.
  pub fn assemble(&self, values: Vec<SqlValue>) -> Row {
    let mut values = values.into_iter().map(from_sql);
    let mut row = Row::new();

    for column in &self.base {
      row.insert((*column).to_owned(), values.next().unwrap_or(Value::Null));
    }

    for (table, columns) in &self.embeds {
      let marker = values.next().unwrap_or(Value::Null);
      let mut parent = Row::new();
      for column in columns {
        parent.insert((*column).to_owned(), values.next().unwrap_or(Value::Null));
      }
      let nested = if marker.is_null() {
        Value::Null
      } else {
        Value::Object(parent)
      };
      row.insert(table.to_string(), nested);
    }

    row
  }
}

pub fn insert_statement(table: Table, row: &Row) -> Result<Statement> {
  table.check_row(row)?;
  let columns: Vec<String> = row.keys().map(|k| quote(k)).collect();
  let marks = vec!["?"; columns.len()].join(", ");
  Ok(Statement {
    sql:    format!(
      "INSERT INTO {} ({}) VALUES ({marks})",
      quote(table.as_ref()),
      columns.join(", "),
    ),
    params: row.values().map(to_sql).collect(),
  })
}

pub fn update_statement(
  table: Table,
  patch: &Row,
  filters: &[Filter],
) -> Result<Statement> {
  table.check_row(patch)?;
  let sets: Vec<String> = patch.keys().map(|k| format!("{} = ?", quote(k))).collect();
  let mut sql = format!("UPDATE {} SET {}", quote(table.as_ref()), sets.join(", "));
  let mut params: Vec<SqlValue> = patch.values().map(to_sql).collect();
  push_where(&mut sql, &mut params, table, None, filters)?;
  Ok(Statement { sql, params })
}

pub fn delete_statement(table: Table, filters: &[Filter]) -> Result<Statement> {
  let mut sql = format!("DELETE FROM {}", quote(table.as_ref()));
  let mut params = Vec::new();
  push_where(&mut sql, &mut params, table, None, filters)?;
  Ok(Statement { sql, params })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn select_plan_joins_each_embed_on_its_foreign_key() {
    let query = Select::from(Table::Band)
      .columns(&["id", "name"])
      .embed(Table::Group, &["town_name"])
      .filter(Filter::eq("code", "B1"))
      .newest_first();
    let plan = SelectPlan::new(&query).unwrap();

    assert_eq!(
      plan.statement.sql,
      "SELECT t.\"id\", t.\"name\", e0.\"id\", e0.\"town_name\" FROM \"band\" AS t \
       LEFT JOIN \"group\" AS e0 ON e0.\"id\" = t.\"group_id\" \
       WHERE t.\"code\" = ? ORDER BY t.\"created_at\" DESC, t.rowid DESC"
    );
    assert_eq!(plan.statement.params, vec![SqlValue::Text("B1".into())]);
  }

  #[test]
  fn assemble_nulls_unmatched_parents() {
    let query = Select::from(Table::District)
      .columns(&["id"])
      .embed(Table::Commission, &["name_ar"]);
    let plan = SelectPlan::new(&query).unwrap();

    let row = plan.assemble(vec![
      SqlValue::Text("d1".into()),
      SqlValue::Null,
      SqlValue::Null,
    ]);
    assert_eq!(row["id"], "d1");
    assert!(row["commission"].is_null());

    let row = plan.assemble(vec![
      SqlValue::Text("d1".into()),
      SqlValue::Text("c1".into()),
      SqlValue::Text("الشمال".into()),
    ]);
    assert_eq!(row["commission"]["name_ar"], "الشمال");
  }

  #[test]
  fn empty_in_filter_matches_nothing() {
    let stmt = delete_statement(
      Table::BandMember,
      &[
        Filter::eq("member_id", "m1"),
        Filter::any_of("band_id", Vec::<String>::new()),
      ],
    )
    .unwrap();
    assert_eq!(
      stmt.sql,
      "DELETE FROM \"band_member\" WHERE \"member_id\" = ? AND 0"
    );
  }

  #[test]
  fn statements_reject_unknown_columns() {
    let mut row = Row::new();
    row.insert("nickname".into(), "x".into());
    assert!(insert_statement(Table::Member, &row).is_err());
    assert!(update_statement(Table::Member, &row, &[Filter::eq("id", "m")]).is_err());
  }
}
