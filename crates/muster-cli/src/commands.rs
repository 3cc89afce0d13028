//! Subcommand implementations.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use muster_api::resource::Resource;
use muster_core::{
  Id,
  entity::Entity,
  model::{Band, Commission, District, Group, Member},
};
use muster_sync::{DirectoryStore, Scope, view::filter};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::backend::Backend;

type Directory = DirectoryStore<Backend>;

// ─── serve ───────────────────────────────────────────────────────────────────

pub async fn serve(directory: Directory, address: &str) -> Result<()> {
  // A failed initial load is visible through /status; keep serving.
  if let Err(err) = directory.fetch_all().await {
    tracing::warn!(error = %err, "initial load incomplete");
  }

  let app = axum::Router::new()
    .nest("/api", muster_api::api_router(Arc::new(directory)))
    .layer(TraceLayer::new_for_http());

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

// ─── summary / list ──────────────────────────────────────────────────────────

pub async fn summary(directory: &Directory) -> Result<()> {
  directory.fetch_all().await.context("failed to load directory")?;
  let summary = directory.snapshot().await.summary();
  println!("commissions  {}", summary.commissions);
  println!("districts    {}", summary.districts);
  println!("groups       {}", summary.groups);
  println!("bands        {}", summary.bands);
  println!("members      {}", summary.members);
  Ok(())
}

pub async fn list(
  directory: &Directory,
  entity: Entity,
  scope: &Scope,
  search: &str,
  json: bool,
) -> Result<()> {
  directory
    .fetch(entity)
    .await
    .with_context(|| format!("failed to load {}", entity.plural()))?;
  let snapshot = directory.snapshot().await;

  let rows = match entity {
    Entity::Commission => to_values(filter(&snapshot.commissions, &snapshot, scope, search))?,
    Entity::District => to_values(filter(&snapshot.districts, &snapshot, scope, search))?,
    Entity::Group => to_values(filter(&snapshot.groups, &snapshot, scope, search))?,
    Entity::Band => to_values(filter(&snapshot.bands, &snapshot, scope, search))?,
    Entity::Member => to_values(filter(&snapshot.members, &snapshot, scope, search))?,
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&rows)?);
  } else {
    for row in &rows {
      println!("{}", line(row));
    }
  }
  Ok(())
}

fn to_values<T: serde::Serialize>(items: Vec<&T>) -> Result<Vec<Value>> {
  items
    .into_iter()
    .map(|item| serde_json::to_value(item).context("failed to encode record"))
    .collect()
}

/// Fields shown per record in plain listings, in display order.
const SHOWN: &[&str] = &[
  "name_en",
  "name_ar",
  "name",
  "code",
  "town_name",
  "group_name",
  "district_name",
  "commission_name",
  "civil_id",
  "phone_number",
];

/// `<id>  <field>  <field> ...`, skipping absent and empty fields.
fn line(row: &Value) -> String {
  let mut parts = vec![row["id"].as_str().unwrap_or("?").to_owned()];
  parts.extend(
    SHOWN
      .iter()
      .filter_map(|key| row.get(*key).and_then(Value::as_str))
      .filter(|v| !v.is_empty())
      .map(str::to_owned),
  );
  parts.join("  ")
}

// ─── add / update / delete ───────────────────────────────────────────────────

fn parse_body(body: &str) -> Result<Value> {
  let value: Value = serde_json::from_str(body).context("body is not valid JSON")?;
  if !value.is_object() {
    bail!("body must be a JSON object");
  }
  Ok(value)
}

async fn add_as<R: Resource>(directory: &Directory, body: Value) -> Result<Id> {
  let input: R::New = serde_json::from_value(body)
    .with_context(|| format!("invalid {} input", R::ENTITY))?;
  Ok(R::add(directory, input).await?)
}

async fn update_as<R: Resource>(directory: &Directory, id: Id, body: Value) -> Result<()> {
  let patch: R::Patch = serde_json::from_value(body)
    .with_context(|| format!("invalid {} patch", R::ENTITY))?;
  Ok(R::update(directory, id, patch).await?)
}

pub async fn add(directory: &Directory, entity: Entity, body: &str) -> Result<()> {
  let body = parse_body(body)?;
  let id = match entity {
    Entity::Commission => add_as::<Commission>(directory, body).await,
    Entity::District => add_as::<District>(directory, body).await,
    Entity::Group => add_as::<Group>(directory, body).await,
    Entity::Band => add_as::<Band>(directory, body).await,
    Entity::Member => add_as::<Member>(directory, body).await,
  }
  .with_context(|| format!("failed to add {entity}"))?;
  println!("{id}");
  Ok(())
}

pub async fn update(directory: &Directory, entity: Entity, id: Id, body: &str) -> Result<()> {
  let body = parse_body(body)?;
  match entity {
    Entity::Commission => update_as::<Commission>(directory, id, body).await,
    Entity::District => update_as::<District>(directory, id, body).await,
    Entity::Group => update_as::<Group>(directory, id, body).await,
    Entity::Band => update_as::<Band>(directory, id, body).await,
    Entity::Member => update_as::<Member>(directory, id, body).await,
  }
  .with_context(|| format!("failed to update {entity} {id}"))
}

pub async fn delete(directory: &Directory, entity: Entity, id: Id) -> Result<()> {
  match entity {
    Entity::Commission => directory.delete_commission(id).await,
    Entity::District => directory.delete_district(id).await,
    Entity::Group => directory.delete_group(id).await,
    Entity::Band => directory.delete_band(id).await,
    Entity::Member => directory.delete_member(id).await,
  }
  .with_context(|| format!("failed to delete {entity} {id}"))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn line_skips_empty_and_missing_fields() {
    let row = json!({
      "id": "b1",
      "name": "Brass",
      "code": "",
      "group_name": "Salmiya",
      "commission_name": null,
    });
    assert_eq!(line(&row), "b1  Brass  Salmiya");
  }

  #[test]
  fn body_must_be_an_object() {
    assert!(parse_body("[1, 2]").is_err());
    assert!(parse_body("{nope").is_err());
    assert!(parse_body(r#"{"name": "x"}"#).is_ok());
  }
}
