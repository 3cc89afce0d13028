//! [`SqliteStore`] is the SQLite implementation of [`TableStore`].

use std::path::Path;

use chrono::Utc;
use muster_core::store::{Filter, Row, Select, Table, TableStore};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    SelectPlan, Statement, delete_statement, encode_dt, insert_statement,
    update_statement,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A directory table store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run one write statement.
  async fn execute(&self, statement: Statement) -> Result<usize> {
    let Statement { sql, params } = statement;
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&sql, rusqlite::params_from_iter(params.iter()))?)
      })
      .await?;
    Ok(changed)
  }
}

/// Fill in the columns the store owns when the caller left them out.
fn assign_identity(table: Table, row: &mut Row) {
  if !table.has_identity() {
    return;
  }
  row
    .entry("id")
    .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
  row
    .entry("created_at")
    .or_insert_with(|| Value::String(encode_dt(Utc::now())));
}

// ─── TableStore impl ─────────────────────────────────────────────────────────

impl TableStore for SqliteStore {
  type Error = Error;

  async fn select(&self, query: &Select) -> Result<Vec<Row>> {
    let plan = SelectPlan::new(query)?;
    let sql = plan.statement.sql.clone();
    let params = plan.statement.params.clone();
    tracing::debug!(table = %query.table, %sql, "select");

    let tuples: Vec<Vec<SqlValue>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let width = stmt.column_count();
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            (0..width)
              .map(|i| row.get::<_, SqlValue>(i))
              .collect::<rusqlite::Result<Vec<_>>>()
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(tuples.into_iter().map(|t| plan.assemble(t)).collect())
  }

  async fn insert(&self, table: Table, mut rows: Vec<Row>) -> Result<Vec<Row>> {
    if rows.is_empty() {
      return Ok(rows);
    }

    let mut statements = Vec::with_capacity(rows.len());
    for row in &mut rows {
      assign_identity(table, row);
      let Statement { sql, params } = insert_statement(table, row)?;
      statements.push((sql, params));
    }
    tracing::debug!(%table, count = rows.len(), "insert");

    // All rows of one call land together or not at all.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (sql, params) in &statements {
          tx.execute(sql, rusqlite::params_from_iter(params.iter()))?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(rows)
  }

  async fn update(&self, table: Table, patch: Row, filters: &[Filter]) -> Result<()> {
    if filters.is_empty() {
      return Err(Error::UnfilteredMutation(table));
    }
    if patch.is_empty() {
      return Ok(());
    }

    let changed = self.execute(update_statement(table, &patch, filters)?).await?;
    tracing::debug!(%table, changed, "update");
    Ok(())
  }

  async fn delete(&self, table: Table, filters: &[Filter]) -> Result<()> {
    if filters.is_empty() {
      return Err(Error::UnfilteredMutation(table));
    }

    let changed = self.execute(delete_statement(table, filters)?).await?;
    tracing::debug!(%table, changed, "delete");
    Ok(())
  }
}
