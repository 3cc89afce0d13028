//! [`RestStore`] is the HTTP implementation of [`TableStore`].

use std::time::Duration;

use muster_core::store::{Filter, Row, Select, Table, TableStore};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;

use crate::{
  Error, Result,
  query::{filter_params, select_params},
};

/// Connection settings for the hosted API.
#[derive(Debug, Clone)]
pub struct RestConfig {
  /// Project URL, e.g. `https://xyz.example.co`. Tables live under
  /// `/rest/v1/`.
  pub base_url: String,
  pub api_key:  String,
  pub timeout:  Duration,
}

impl RestConfig {
  pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      api_key:  api_key.into(),
      timeout:  Duration::from_secs(30),
    }
  }
}

/// A directory table store backed by a PostgREST-style HTTP API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RestStore {
  client:  Client,
  base:    Url,
  api_key: String,
}

impl RestStore {
  pub fn new(config: RestConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    let root = format!("{}/rest/v1/", config.base_url.trim_end_matches('/'));
    let base = Url::parse(&root).map_err(|e| Error::BaseUrl(format!("{root}: {e}")))?;
    Ok(Self {
      client,
      base,
      api_key: config.api_key,
    })
  }

  fn url(&self, table: Table) -> Result<Url> {
    self
      .base
      .join(table.as_ref())
      .map_err(|e| Error::BaseUrl(e.to_string()))
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    req
      .header("apikey", &self.api_key)
      .bearer_auth(&self.api_key)
  }

  /// Pass a success response through; turn anything else into
  /// [`Error::Api`] carrying the server's message when it sent one.
  async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
      .ok()
      .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
      .unwrap_or(if body.is_empty() {
        status.to_string()
      } else {
        body
      });
    Err(Error::Api {
      status: status.as_u16(),
      message,
    })
  }

  async fn rows(table: Table, resp: Response) -> Result<Vec<Row>> {
    match resp.json::<Value>().await? {
      Value::Array(items) => items
        .into_iter()
        .map(|item| match item {
          Value::Object(row) => Ok(row),
          _ => Err(Error::UnexpectedBody(table)),
        })
        .collect(),
      _ => Err(Error::UnexpectedBody(table)),
    }
  }
}

// ─── TableStore impl ─────────────────────────────────────────────────────────

impl TableStore for RestStore {
  type Error = Error;

  /// `GET /rest/v1/<table>?select=...`
  async fn select(&self, query: &Select) -> Result<Vec<Row>> {
    let params = select_params(query)?;
    tracing::debug!(table = %query.table, ?params, "select");

    let resp = self
      .auth(self.client.get(self.url(query.table)?))
      .query(&params)
      .send()
      .await?;
    Self::rows(query.table, Self::check(resp).await?).await
  }

  /// `POST /rest/v1/<table>` with the rows as a JSON array; the stored rows
  /// come back in the response.
  async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>> {
    if rows.is_empty() {
      return Ok(rows);
    }
    for row in &rows {
      table.check_row(row)?;
    }
    tracing::debug!(%table, count = rows.len(), "insert");

    let resp = self
      .auth(self.client.post(self.url(table)?))
      .header("Prefer", "return=representation")
      .json(&rows)
      .send()
      .await?;
    Self::rows(table, Self::check(resp).await?).await
  }

  /// `PATCH /rest/v1/<table>?<filters>`
  async fn update(&self, table: Table, patch: Row, filters: &[Filter]) -> Result<()> {
    if filters.is_empty() {
      return Err(Error::UnfilteredMutation(table));
    }
    if patch.is_empty() {
      return Ok(());
    }
    table.check_row(&patch)?;
    tracing::debug!(%table, fields = patch.len(), "update");

    let resp = self
      .auth(self.client.patch(self.url(table)?))
      .header("Prefer", "return=minimal")
      .query(&filter_params(filters))
      .json(&patch)
      .send()
      .await?;
    Self::check(resp).await?;
    Ok(())
  }

  /// `DELETE /rest/v1/<table>?<filters>`
  async fn delete(&self, table: Table, filters: &[Filter]) -> Result<()> {
    if filters.is_empty() {
      return Err(Error::UnfilteredMutation(table));
    }
    for filter in filters {
      table.column(filter.column())?;
    }
    tracing::debug!(%table, "delete");

    let resp = self
      .auth(self.client.delete(self.url(table)?))
      .query(&filter_params(filters))
      .send()
      .await?;
    Self::check(resp).await?;
    Ok(())
  }
}
