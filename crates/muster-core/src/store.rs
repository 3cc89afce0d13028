//! The `TableStore` trait and supporting query types.
//!
//! The trait is the whole contract between the directory and the remote
//! relational store: rows by table, full scans with optional parent embedding,
//! inserts, partial updates and deletes. It is implemented by storage
//! backends (`muster-store-sqlite`, `muster-store-rest`); the directory store
//! in `muster-sync` depends on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// A row as exchanged with the remote store: column name → JSON value.
///
/// Embedded parent rows appear as nested objects keyed by the parent table
/// name (e.g. `row["commission"]["name_ar"]`), or `null` when the foreign key
/// does not resolve.
pub type Row = serde_json::Map<String, Value>;

// ─── Tables ──────────────────────────────────────────────────────────────────

/// The tables the directory reads and writes.
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
  strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Table {
  Commission,
  District,
  Group,
  Band,
  Member,
  /// Associative table for member ↔ band; no attributes of its own.
  BandMember,
}

impl Table {
  /// Every column the table carries, in canonical order.
  pub fn columns(self) -> &'static [&'static str] {
    match self {
      Self::Commission => &["id", "created_at", "name_ar", "name_en", "code"],
      Self::District => &["id", "created_at", "name", "code", "commission_id"],
      Self::Group => &[
        "id",
        "created_at",
        "name",
        "code",
        "town_name",
        "district_id",
        "commission_id",
      ],
      Self::Band => &[
        "id",
        "created_at",
        "name",
        "code",
        "town_name",
        "group_id",
        "district_id",
        "commission_id",
      ],
      Self::Member => &[
        "id",
        "created_at",
        "name",
        "code",
        "civil_id",
        "phone_number",
      ],
      Self::BandMember => &["member_id", "band_id"],
    }
  }

  /// Whether the store assigns `id` and `created_at` on insert.
  pub fn has_identity(self) -> bool { !matches!(self, Self::BandMember) }

  /// Resolve `name` to one of this table's columns.
  pub fn column(self, name: &str) -> Result<&'static str> {
    self
      .columns()
      .iter()
      .copied()
      .find(|c| *c == name)
      .ok_or_else(|| Error::UnknownColumn {
        table:  self,
        column: name.to_owned(),
      })
  }

  /// The foreign-key column on this table that references `parent`.
  pub fn foreign_key(self, parent: Table) -> Result<&'static str> {
    let wanted = format!("{parent}_id");
    self
      .columns()
      .iter()
      .copied()
      .find(|c| *c == wanted)
      .ok_or(Error::UnknownRelation { table: self, parent })
  }

  /// Check that every key of `row` is a column of this table.
  pub fn check_row(self, row: &Row) -> Result<()> {
    row.keys().try_for_each(|k| self.column(k).map(|_| ()))
  }
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Which columns of the base table a [`Select`] returns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Columns {
  #[default]
  All,
  Only(Vec<&'static str>),
}

/// A parent row pulled in through the base table's `<parent>_id` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
  pub table:   Table,
  pub columns: Vec<&'static str>,
}

/// A row predicate. Multiple filters are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
  Eq { column: &'static str, value: Value },
  In { column: &'static str, values: Vec<Value> },
}

impl Filter {
  pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
    Self::Eq { column, value: value.into() }
  }

  pub fn any_of<V: Into<Value>>(
    column: &'static str,
    values: impl IntoIterator<Item = V>,
  ) -> Self {
    Self::In {
      column,
      values: values.into_iter().map(Into::into).collect(),
    }
  }

  /// Shorthand for matching a single record by primary key.
  pub fn id(id: crate::Id) -> Self { Self::eq("id", id.to_string()) }

  pub fn column(&self) -> &'static str {
    match self {
      Self::Eq { column, .. } | Self::In { column, .. } => *column,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
  pub column:     &'static str,
  pub descending: bool,
}

/// Parameters for [`TableStore::select`]. Without filters this is a full
/// scan of `table`.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
  pub table:   Table,
  pub columns: Columns,
  pub embeds:  Vec<Embed>,
  pub filters: Vec<Filter>,
  pub order:   Option<Order>,
}

impl Select {
  /// Select every column of `table`.
  pub fn from(table: Table) -> Self {
    Self {
      table,
      columns: Columns::All,
      embeds: Vec::new(),
      filters: Vec::new(),
      order: None,
    }
  }

  pub fn columns(mut self, columns: &[&'static str]) -> Self {
    self.columns = Columns::Only(columns.to_vec());
    self
  }

  pub fn embed(mut self, parent: Table, columns: &[&'static str]) -> Self {
    self.embeds.push(Embed {
      table:   parent,
      columns: columns.to_vec(),
    });
    self
  }

  pub fn filter(mut self, filter: Filter) -> Self {
    self.filters.push(filter);
    self
  }

  /// Order by creation time, newest first.
  pub fn newest_first(mut self) -> Self {
    self.order = Some(Order {
      column:     "created_at",
      descending: true,
    });
    self
  }

  /// The base-table columns this select returns.
  pub fn column_names(&self) -> Vec<&'static str> {
    match &self.columns {
      Columns::All => self.table.columns().to_vec(),
      Columns::Only(cols) => cols.clone(),
    }
  }

  /// Check every referenced column and relation against the schema.
  pub fn validate(&self) -> Result<()> {
    for column in self.column_names() {
      self.table.column(column)?;
    }
    for embed in &self.embeds {
      self.table.foreign_key(embed.table)?;
      for column in &embed.columns {
        embed.table.column(column)?;
      }
    }
    for filter in &self.filters {
      self.table.column(filter.column())?;
    }
    if let Some(order) = &self.order {
      self.table.column(order.column)?;
    }
    Ok(())
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the remote relational store behind the directory.
///
/// The contract is table-oriented and knows nothing about the hierarchy: no
/// transactions span calls, and whatever happens to children when a parent
/// is deleted (cascade, orphaning, refusal) is the backend's business.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TableStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return every row of `query.table` matching its filters, with embedded
  /// parents, in the requested order.
  fn select<'a>(
    &'a self,
    query: &'a Select,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + 'a;

  /// Insert `rows` and return them as stored, including any
  /// server-assigned `id` and `created_at`.
  fn insert(
    &self,
    table: Table,
    rows: Vec<Row>,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + '_;

  /// Set the columns present in `patch` on every row matching `filters`.
  ///
  /// Implementations must refuse an empty filter list.
  fn update<'a>(
    &'a self,
    table: Table,
    patch: Row,
    filters: &'a [Filter],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete every row matching `filters`.
  ///
  /// Implementations must refuse an empty filter list.
  fn delete<'a>(
    &'a self,
    table: Table,
    filters: &'a [Filter],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
