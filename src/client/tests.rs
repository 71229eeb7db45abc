use super::*;
use crate::config::ApiConfig;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> WebsetClient {
    WebsetClient::new(&ApiConfig {
        base_url: server.uri(),
        api_key: "test-key".to_string(),
        request_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn test_request() -> SearchRequest {
    SearchRequest {
        query: "fintech startups in Berlin".to_string(),
        mode: SearchMode::Company,
        criteria: vec!["has an API".to_string()],
        count: 25,
    }
}

fn test_metadata() -> CreateMetadata {
    CreateMetadata {
        document_id: DocumentId::from("doc-1"),
        user_id: Some("user-1".to_string()),
        query: "fintech startups in Berlin".to_string(),
        mode: SearchMode::Company,
        count: "25".to_string(),
    }
}

#[tokio::test]
async fn create_webset_posts_search_shape_and_returns_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/websets/v0/websets"))
        .and(header("x-api-key", "test-key"))
        .and(body_partial_json(json!({
            "externalId": "doc-1",
            "search": {
                "query": "fintech startups in Berlin",
                "entity": { "type": "company" },
                "criteria": [{ "description": "has an API" }],
                "count": 25
            },
            "enrichments": []
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "ws-1",
            "status": "running"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let webset = client
        .create_webset(&test_request(), &test_metadata())
        .await
        .unwrap();

    assert_eq!(webset.id, WebsetId::from("ws-1"));
    assert_eq!(webset.status.as_deref(), Some("running"));
}

#[tokio::test]
async fn create_webset_failure_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/websets/v0/websets"))
        .respond_with(ResponseTemplate::new(422).set_body_string("missing entity type"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .create_webset(&test_request(), &test_metadata())
        .await
        .unwrap_err();

    match err {
        ClientError::TaskCreation { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "missing entity type");
        }
        other => panic!("expected TaskCreation, got {other:?}"),
    }
}

#[tokio::test]
async fn get_status_reads_the_status_string() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "idle" })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let status = client.get_status(&WebsetId::from("ws-1")).await.unwrap();
    assert!(status.is_idle());
}

#[tokio::test]
async fn get_status_failure_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.get_status(&WebsetId::from("ws-1")).await.unwrap_err();
    assert!(matches!(err, ClientError::StatusFetch { status: 500, .. }));
}

#[tokio::test]
async fn list_items_unwraps_the_data_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "a", "properties": { "company": { "name": "Acme" } } },
                { "id": "b" }
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let items = client.list_items(&WebsetId::from("ws-1")).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "a");
    assert_eq!(
        items[0]
            .properties
            .company
            .as_ref()
            .unwrap()
            .name
            .as_deref(),
        Some("Acme")
    );
}

#[tokio::test]
async fn list_items_tolerates_missing_data_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let items = client.list_items(&WebsetId::from("ws-1")).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn list_all_items_concatenates_pages_without_repeating_cursors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1/items"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "a" }],
            "hasMore": true,
            "nextCursor": "c2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1/items"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "b" }],
            "hasMore": true,
            "nextCursor": "c3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1/items"))
        .and(query_param("cursor", "c3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "c" }],
            "hasMore": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let items = client.list_all_items(&WebsetId::from("ws-1")).await.unwrap();

    let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn list_all_items_stops_when_has_more_without_cursor() {
    let server = MockServer::start().await;

    // A malformed page claiming more data but giving no cursor must not loop
    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "a" }],
            "hasMore": true,
            "nextCursor": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let items = client.list_all_items(&WebsetId::from("ws-1")).await.unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn get_item_fetches_detail_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1/items/item-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "item-7",
            "properties": { "url": "acme.com" },
            "evaluations": [
                { "criterion": { "description": "has an API" }, "satisfied": "yes" }
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let item = client
        .get_item(&WebsetId::from("ws-1"), "item-7")
        .await
        .unwrap();
    assert_eq!(item.id, "item-7");
    assert_eq!(item.evaluations.len(), 1);
}

#[tokio::test]
async fn get_item_failure_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1/items/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such item"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .get_item(&WebsetId::from("ws-1"), "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ItemFetch { status: 404, .. }));
}
