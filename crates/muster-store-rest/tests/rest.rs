//! `RestStore` against a mock HTTP server.

use muster_core::store::{Filter, Row, Select, Table, TableStore};
use muster_store_rest::{Error, RestConfig, RestStore};
use serde_json::{Value, json};
use uuid::Uuid;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{body_json, header, method, path, query_param},
};

const KEY: &str = "anon-key";

async fn setup() -> (MockServer, RestStore) {
  let server = MockServer::start().await;
  let store = RestStore::new(RestConfig::new(server.uri(), KEY)).unwrap();
  (server, store)
}

fn row(value: Value) -> Row {
  match value {
    Value::Object(map) => map,
    _ => panic!("row literal must be an object"),
  }
}

#[tokio::test]
async fn select_sends_embeds_order_and_auth() {
  let (server, store) = setup().await;
  let commission = Uuid::new_v4();
  Mock::given(method("GET"))
    .and(path("/rest/v1/district"))
    .and(query_param("select", "*,commission(id,name_ar)"))
    .and(query_param("order", "created_at.desc"))
    .and(header("apikey", KEY))
    .and(header("authorization", format!("Bearer {KEY}").as_str()))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
      "id": Uuid::new_v4(),
      "name": "Harbour",
      "commission_id": commission,
      "commission": { "id": commission, "name_ar": "الشمال" },
    }])))
    .expect(1)
    .mount(&server)
    .await;

  let query = Select::from(Table::District)
    .embed(Table::Commission, &["id", "name_ar"])
    .newest_first();
  let rows = store.select(&query).await.unwrap();

  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["commission"]["name_ar"], "الشمال");
}

#[tokio::test]
async fn insert_asks_for_representation() {
  let (server, store) = setup().await;
  let id = Uuid::new_v4();
  Mock::given(method("POST"))
    .and(path("/rest/v1/commission"))
    .and(header("prefer", "return=representation"))
    .and(body_json(json!([{ "name_en": "North" }])))
    .respond_with(
      ResponseTemplate::new(201).set_body_json(json!([{ "id": id, "name_en": "North" }])),
    )
    .expect(1)
    .mount(&server)
    .await;

  let inserted = store
    .insert(Table::Commission, vec![row(json!({ "name_en": "North" }))])
    .await
    .unwrap();
  assert_eq!(inserted[0]["id"], id.to_string());
}

#[tokio::test]
async fn delete_encodes_link_filters() {
  let (server, store) = setup().await;
  let (member, b1, b2) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
  Mock::given(method("DELETE"))
    .and(path("/rest/v1/band_member"))
    .and(query_param("member_id", format!("eq.{member}").as_str()))
    .and(query_param("band_id", format!(r#"in.("{b1}","{b2}")"#).as_str()))
    .respond_with(ResponseTemplate::new(204))
    .expect(1)
    .mount(&server)
    .await;

  store
    .delete(Table::BandMember, &[
      Filter::eq("member_id", member.to_string()),
      Filter::any_of("band_id", [b1.to_string(), b2.to_string()]),
    ])
    .await
    .unwrap();
}

#[tokio::test]
async fn update_sends_patch_with_id_filter() {
  let (server, store) = setup().await;
  let id = Uuid::new_v4();
  Mock::given(method("PATCH"))
    .and(path("/rest/v1/group"))
    .and(query_param("id", format!("eq.{id}").as_str()))
    .and(body_json(json!({ "town_name": "" })))
    .respond_with(ResponseTemplate::new(204))
    .expect(1)
    .mount(&server)
    .await;

  store
    .update(Table::Group, row(json!({ "town_name": "" })), &[Filter::id(id)])
    .await
    .unwrap();
}

#[tokio::test]
async fn api_error_message_is_surfaced() {
  let (server, store) = setup().await;
  Mock::given(method("POST"))
    .and(path("/rest/v1/district"))
    .respond_with(ResponseTemplate::new(409).set_body_json(json!({
      "code": "23503",
      "message": "insert or update on table \"district\" violates foreign key constraint",
    })))
    .mount(&server)
    .await;

  let err = store
    .insert(Table::District, vec![row(json!({ "name": "Lost" }))])
    .await
    .unwrap_err();
  match err {
    Error::Api { status, message } => {
      assert_eq!(status, 409);
      assert!(message.contains("foreign key"));
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[tokio::test]
async fn mutations_without_filters_never_reach_the_server() {
  let (server, store) = setup().await;
  Mock::given(method("DELETE"))
    .respond_with(ResponseTemplate::new(204))
    .expect(0)
    .mount(&server)
    .await;

  let err = store.delete(Table::Member, &[]).await.unwrap_err();
  assert!(matches!(err, Error::UnfilteredMutation(Table::Member)));
}

#[tokio::test]
async fn unknown_columns_are_rejected_locally() {
  let (_server, store) = setup().await;
  let err = store
    .insert(Table::Band, vec![row(json!({ "colour": "red" }))])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Schema(_)));
}
