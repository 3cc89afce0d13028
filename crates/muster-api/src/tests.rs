//! Router tests against an in-memory SQLite-backed directory.

use std::sync::Arc;

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
};
use muster_core::store::{Row, Table, TableStore};
use muster_store_sqlite::SqliteStore;
use muster_sync::DirectoryStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::api_router;

async fn app() -> (Router, Arc<DirectoryStore<SqliteStore>>) {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let directory = Arc::new(DirectoryStore::new(store));
  (api_router(directory.clone()), directory)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = app
    .clone()
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn create(app: &Router, plural: &str, body: Value) -> String {
  let (status, value) = send(app, "POST", &format!("/{plural}"), Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{value}");
  value["id"].as_str().unwrap().to_owned()
}

/// Commission → district → group → band, returning their ids.
async fn seed(app: &Router) -> [String; 4] {
  let c = create(app, "commissions", json!({
    "name_ar": "الشمال", "name_en": "North", "code": "C1"
  }))
  .await;
  let d = create(app, "districts", json!({
    "name": "Harbour", "code": "D1", "commission_id": c
  }))
  .await;
  let g = create(app, "groups", json!({
    "name": "G-1", "code": "G1", "town_name": "Salmiya",
    "district_id": d, "commission_id": c
  }))
  .await;
  let b = create(app, "bands", json!({
    "name": "Brass", "code": "B1", "town_name": "Salmiya",
    "group_id": g, "district_id": d, "commission_id": c
  }))
  .await;
  [c, d, g, b]
}

// ── Collections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_records_are_listed_with_parent_names() {
  let (app, _) = app().await;
  let [.., b] = seed(&app).await;

  let (status, bands) = send(&app, "GET", "/bands", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(bands.as_array().unwrap().len(), 1);
  assert_eq!(bands[0]["id"], b);
  assert_eq!(bands[0]["group_name"], "Salmiya");
  assert_eq!(bands[0]["commission_name"], "الشمال");
}

#[tokio::test]
async fn list_applies_scope_and_search() {
  let (app, _) = app().await;
  let [c, d, ..] = seed(&app).await;
  create(&app, "districts", json!({
    "name": "Desert", "code": "D2", "commission_id": c
  }))
  .await;

  let (_, all) = send(&app, "GET", &format!("/districts?commission_id={c}"), None).await;
  assert_eq!(all.as_array().unwrap().len(), 2);

  let (_, hits) = send(&app, "GET", "/districts?q=HARB", None).await;
  assert_eq!(hits.as_array().unwrap().len(), 1);
  assert_eq!(hits[0]["id"], d);

  let (_, groups) = send(&app, "GET", &format!("/groups?district_id={d}"), None).await;
  assert_eq!(groups.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn get_one_is_404_for_unknown_id() {
  let (app, _) = app().await;
  let (status, body) = send(
    &app,
    "GET",
    "/commissions/00000000-0000-0000-0000-000000000000",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("commission"));
}

#[tokio::test]
async fn patch_updates_only_sent_fields() {
  let (app, _) = app().await;
  let [c, ..] = seed(&app).await;

  let (status, _) = send(
    &app,
    "PATCH",
    &format!("/commissions/{c}"),
    Some(json!({ "name_en": "Northern" })),
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, commission) = send(&app, "GET", &format!("/commissions/{c}"), None).await;
  assert_eq!(commission["name_en"], "Northern");
  assert_eq!(commission["name_ar"], "الشمال");
}

#[tokio::test]
async fn delete_cascades_through_the_listing() {
  let (app, _) = app().await;
  let [_, d, ..] = seed(&app).await;

  let (status, _) = send(&app, "DELETE", &format!("/districts/{d}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, summary) = send(&app, "GET", "/summary", None).await;
  assert_eq!(summary, json!({
    "commissions": 1, "districts": 0, "groups": 0, "bands": 0, "members": 0
  }));
}

#[tokio::test]
async fn members_round_trip_band_ids() {
  let (app, _) = app().await;
  let [.., b] = seed(&app).await;

  let m = create(&app, "members", json!({
    "name": "Ali", "code": "M1", "civil_id": "2900", "phone_number": "555",
    "band_ids": [b]
  }))
  .await;

  let (_, members) = send(&app, "GET", &format!("/members?band_id={b}"), None).await;
  assert_eq!(members[0]["id"], m);
  assert_eq!(members[0]["band_ids"], json!([b]));

  send(&app, "PATCH", &format!("/members/{m}"), Some(json!({ "band_ids": [] }))).await;
  let (_, member) = send(&app, "GET", &format!("/members/{m}"), None).await;
  assert_eq!(member["band_ids"], json!([]));
}

// ── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_write_is_500_and_recorded_in_status() {
  let (app, _) = app().await;
  let (status, body) = send(
    &app,
    "POST",
    "/districts",
    Some(json!({
      "name": "Lost", "code": "",
      "commission_id": "00000000-0000-0000-0000-000000000000"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(body["error"].is_string());

  let (_, status) = send(&app, "GET", "/status", None).await;
  assert_eq!(status["loading"], false);
  assert_eq!(status["error"], body["error"]);
  assert_eq!(status["collections"]["district"]["error"], body["error"]);
  assert_eq!(status["collections"]["band"]["error"], Value::Null);
}

#[tokio::test]
async fn refresh_picks_up_rows_written_elsewhere() {
  let (app, directory) = app().await;
  let (_, empty) = send(&app, "POST", "/refresh", None).await;
  assert_eq!(empty["commissions"], 0);

  let mut row = Row::new();
  row.insert("name_en".into(), json!("Elsewhere"));
  directory
    .tables()
    .insert(Table::Commission, vec![row])
    .await
    .unwrap();

  let (status, summary) = send(&app, "POST", "/refresh", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(summary["commissions"], 1);
}
