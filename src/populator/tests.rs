use super::*;
use crate::config::ApiConfig;
use crate::db::Database;
use crate::stream::BroadcastSink;
use crate::types::SearchMode;
use serde_json::json;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    populator: WebsetPopulator,
    store: Arc<Database>,
    sink: Arc<BroadcastSink>,
    _tmp: tempfile::TempDir,
}

async fn harness(server: &MockServer, max_attempts: u32) -> Harness {
    let tmp = tempdir().unwrap();
    let db = Arc::new(Database::new(&tmp.path().join("test.db")).await.unwrap());
    let sink = Arc::new(BroadcastSink::new(256));

    let client = Arc::new(
        WebsetClient::new(&ApiConfig {
            base_url: server.uri(),
            api_key: "test-key".to_string(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap(),
    );

    let populator = WebsetPopulator::new(
        client,
        db.clone() as Arc<dyn DocumentStore>,
        sink.clone() as Arc<dyn DataStreamSink>,
        PollingConfig {
            interval: Duration::from_millis(10),
            max_attempts,
        },
    );

    Harness {
        populator,
        store: db,
        sink,
        _tmp: tmp,
    }
}

fn company_request() -> SearchRequest {
    SearchRequest {
        query: "fintech startups".to_string(),
        mode: SearchMode::Company,
        criteria: vec!["has an API".to_string()],
        count: 5,
    }
}

fn params(request: SearchRequest, user_id: Option<&str>) -> PopulateParams {
    PopulateParams {
        request,
        user_id: user_id.map(str::to_string),
        document_id: DocumentId::generate(),
    }
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

async fn mount_create(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/websets/v0/websets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "ws-1",
            "status": "running"
        })))
        .mount(server)
        .await;
}

async fn mount_status_running_then_idle(server: &MockServer, running_ticks: u64) {
    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
        .up_to_n_times(running_ticks)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "idle" })))
        .mount(server)
        .await;
}

async fn mount_items(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn two_company_items() -> serde_json::Value {
    json!({
        "data": [
            {
                "id": "a",
                "properties": {
                    "url": "acme.com",
                    "company": { "name": "Acme", "logoUrl": "https://img.example/a.png" }
                },
                "evaluations": [
                    { "criterion": { "description": "has an API" }, "satisfied": "yes" }
                ]
            },
            {
                "id": "b",
                "properties": { "company": { "name": "Beta" } },
                "evaluations": [
                    { "criterion": "has an API", "result": "miss" }
                ]
            }
        ]
    })
}

#[tokio::test]
async fn populates_streams_and_persists_on_idle() {
    let server = MockServer::start().await;
    mount_create(&server).await;
    mount_status_running_then_idle(&server, 1).await;
    mount_items(&server, two_company_items()).await;

    let h = harness(&server, 10).await;
    let mut rx = h.sink.subscribe();

    let artifact = h
        .populator
        .run(
            params(company_request(), Some("user-1")),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(artifact.kind, ArtifactKind::Sheet);
    assert_eq!(artifact.title, "company webset for \"fintech startups\"");

    let lines: Vec<&str> = artifact.content.lines().collect();
    assert_eq!(
        lines[0],
        "name,url,description,has an API,satisfiesAllCriteria,pictureUrl,_itemId"
    );
    assert_eq!(
        lines[1],
        "\"Acme\",\"acme.com\",\"\",\"Match\",\"true\",\"https://img.example/a.png\",\"a\""
    );
    assert_eq!(lines[2], "\"Beta\",\"\",\"\",\"Miss\",\"false\",\"\",\"b\"");
    assert_eq!(lines.len(), 3);

    // Event order: announcement, metadata, header snapshot, updated
    // metadata, at least one data snapshot, terminal finish.
    let events = drain(&mut rx);
    assert!(matches!(
        events[0],
        StreamEvent::Kind {
            kind: ArtifactKind::Sheet
        }
    ));
    assert!(matches!(events[1], StreamEvent::Id { .. }));
    assert!(matches!(events[2], StreamEvent::Title { .. }));
    assert_eq!(events[3], StreamEvent::Clear);
    assert!(matches!(
        &events[4],
        StreamEvent::WebsetMetadata { webset_id: None, .. }
    ));
    match &events[5] {
        StreamEvent::SheetDelta { csv } => {
            assert_eq!(
                csv,
                "name,url,description,has an API,satisfiesAllCriteria,pictureUrl,_itemId\n"
            );
        }
        other => panic!("expected header snapshot, got {other:?}"),
    }
    match &events[6] {
        StreamEvent::WebsetMetadata { webset_id, .. } => {
            assert_eq!(webset_id.as_ref().map(|w| w.as_str()), Some("ws-1"));
        }
        other => panic!("expected webset metadata, got {other:?}"),
    }
    assert_eq!(events.last(), Some(&StreamEvent::Finish));

    // Every sheet delta carries the full snapshot, so the last one equals
    // the final artifact content.
    let last_delta = events
        .iter()
        .rev()
        .find_map(|e| match e {
            StreamEvent::SheetDelta { csv } => Some(csv.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(last_delta, artifact.content);

    // Persisted exactly as returned
    let stored = h.store.get_document(&artifact.id).await.unwrap().unwrap();
    assert_eq!(stored.content, artifact.content);
    assert_eq!(stored.user_id.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn creation_failure_aborts_with_finish_and_no_document() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/websets/v0/websets"))
        .respond_with(ResponseTemplate::new(500).set_body_string("kaput"))
        .mount(&server)
        .await;

    let h = harness(&server, 5).await;
    let mut rx = h.sink.subscribe();

    let err = h
        .populator
        .run(params(company_request(), None), CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::Client(crate::error::ClientError::TaskCreation { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "kaput");
        }
        other => panic!("expected TaskCreation, got {other:?}"),
    }

    let events = drain(&mut rx);
    assert_eq!(events.last(), Some(&StreamEvent::Finish));

    // The header-only snapshot was streamed, but nothing was persisted
    let document_id = events
        .iter()
        .find_map(|e| match e {
            StreamEvent::Id { document_id } => Some(document_id.clone()),
            _ => None,
        })
        .unwrap();
    assert!(h.store.get_document(&document_id).await.unwrap().is_none());
}

#[tokio::test]
async fn never_idle_webset_times_out_and_persists_partial_rows() {
    let server = MockServer::start().await;
    mount_create(&server).await;
    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
        .mount(&server)
        .await;
    mount_items(&server, two_company_items()).await;

    let h = harness(&server, 3).await;
    let mut rx = h.sink.subscribe();

    let err = h
        .populator
        .run(params(company_request(), None), CancellationToken::new())
        .await
        .unwrap_err();

    let document_id = match err {
        Error::PollTimeout {
            document_id,
            attempts,
        } => {
            assert_eq!(attempts, 3);
            document_id
        }
        other => panic!("expected PollTimeout, got {other:?}"),
    };

    let events = drain(&mut rx);
    assert_eq!(events.last(), Some(&StreamEvent::Finish));

    // Partial rows have value: the accumulated sheet was persisted anyway
    let stored = h.store.get_document(&document_id).await.unwrap().unwrap();
    assert_eq!(stored.content.lines().count(), 3, "header plus two rows");
}

#[tokio::test]
async fn unrecognized_status_values_keep_the_loop_running() {
    let server = MockServer::start().await;
    mount_create(&server).await;
    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "completed" })),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "idle" })))
        .mount(&server)
        .await;
    mount_items(&server, two_company_items()).await;

    let h = harness(&server, 10).await;

    // "completed" is not terminal; only the literal "idle" is. The item
    // count matching the requested count must not end the loop either
    // (count = 2 here, and two items arrive on the first tick).
    let mut request = company_request();
    request.count = 2;

    let artifact = h
        .populator
        .run(params(request, None), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(artifact.content.lines().count(), 3);

    let received = server.received_requests().await.unwrap();
    let status_checks = received
        .iter()
        .filter(|r| r.url.path() == "/websets/v0/websets/ws-1")
        .count();
    assert_eq!(status_checks, 3, "two non-terminal ticks plus the idle one");
}

#[tokio::test]
async fn status_fetch_failure_skips_the_tick_and_recovers() {
    let server = MockServer::start().await;
    mount_create(&server).await;
    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "idle" })))
        .mount(&server)
        .await;
    mount_items(&server, two_company_items()).await;

    let h = harness(&server, 5).await;
    let artifact = h
        .populator
        .run(params(company_request(), None), CancellationToken::new())
        .await
        .unwrap();

    // The failed tick skipped item ingestion; the snapshot listing on the
    // next tick caught everything up.
    assert_eq!(artifact.content.lines().count(), 3);
}

#[tokio::test]
async fn items_fetch_failure_is_tick_local() {
    let server = MockServer::start().await;
    mount_create(&server).await;
    mount_status_running_then_idle(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/websets/v0/websets/ws-1/items"))
        .respond_with(ResponseTemplate::new(500).set_body_string("flaky"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_items(&server, two_company_items()).await;

    let h = harness(&server, 5).await;
    let artifact = h
        .populator
        .run(params(company_request(), None), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(artifact.content.lines().count(), 3);
}

#[tokio::test]
async fn repeated_snapshots_do_not_duplicate_rows() {
    let server = MockServer::start().await;
    mount_create(&server).await;
    mount_status_running_then_idle(&server, 3).await;
    mount_items(&server, two_company_items()).await;

    let h = harness(&server, 10).await;
    let mut rx = h.sink.subscribe();

    let artifact = h
        .populator
        .run(params(company_request(), None), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        artifact.content.lines().count(),
        3,
        "four identical snapshots still yield two rows"
    );

    // Only one data delta was published: later ticks saw nothing new
    let events = drain(&mut rx);
    let deltas = events
        .iter()
        .filter(|e| matches!(e, StreamEvent::SheetDelta { .. }))
        .count();
    assert_eq!(deltas, 2, "header snapshot plus one data snapshot");
}

#[tokio::test]
async fn cancellation_persists_partial_sheet() {
    let server = MockServer::start().await;
    mount_create(&server).await;
    mount_status_running_then_idle(&server, 1).await;
    mount_items(&server, json!({ "data": [] })).await;

    let h = harness(&server, 5).await;
    let mut rx = h.sink.subscribe();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = h
        .populator
        .run(params(company_request(), None), cancel)
        .await
        .unwrap_err();

    let document_id = match err {
        Error::Cancelled { document_id } => document_id,
        other => panic!("expected Cancelled, got {other:?}"),
    };

    let events = drain(&mut rx);
    assert_eq!(events.last(), Some(&StreamEvent::Finish));

    let stored = h.store.get_document(&document_id).await.unwrap().unwrap();
    assert_eq!(
        stored.content,
        "name,url,description,has an API,satisfiesAllCriteria,pictureUrl,_itemId\n"
    );
}

#[tokio::test]
async fn invalid_request_fails_before_any_remote_call() {
    let server = MockServer::start().await;
    let h = harness(&server, 5).await;

    let mut request = company_request();
    request.criteria.clear();

    let err = h
        .populator
        .run(params(request, None), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert!(server.received_requests().await.unwrap().is_empty());
}
