//! Existing mute-list reader tests
//!
//! Drives `ExistingListReader` against a wiremock platform API.

use glasswall::models::Handle;
use glasswall::pipeline::progress::RecordingSink;
use glasswall::platform::client::PlatformClient;
use glasswall::platform::mutes::{ExistingListReader, ListTermination, ReaderPolicy};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{credentials, mute_page, test_config, transport, BEARER, CSRF};

const LIST_PATH: &str = "/mutes/users/list.json";

fn client_for(server: &MockServer, max_retries: u32) -> (PlatformClient, ReaderPolicy) {
    let mut config = test_config(&server.uri(), "http://127.0.0.1:1");
    config.platform.list_max_retries = max_retries;
    let client = PlatformClient::new(transport(), &config.platform, &credentials()).unwrap();
    (client, ReaderPolicy::from(&config.platform))
}

async fn cursors_requested(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "cursor")
                .map(|(_, v)| v.into_owned())
        })
        .collect()
}

/// Cursors -1 -> "abc" -> "0": two requests, four handles
#[tokio::test]
async fn test_cursor_walk_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", "-1"))
        .and(query_param("include_entities", "false"))
        .and(query_param("skip_status", "true"))
        .and(header("authorization", format!("Bearer {BEARER}").as_str()))
        .and(header("x-csrf-token", CSRF))
        .respond_with(ResponseTemplate::new(200).set_body_json(mute_page(&["Alice", "bob"], "abc")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mute_page(&["carol", "DAVE"], "0")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, policy) = client_for(&server, 3);
    let sink = RecordingSink::new();
    let existing = ExistingListReader::new(&client, policy)
        .read_existing(&sink, &CancellationToken::new())
        .await;

    assert!(existing.is_complete());
    assert_eq!(existing.len(), 4);
    assert_eq!(existing.requests, 2);
    assert_eq!(existing.pages, 2);
    assert!(existing.handles.contains(&Handle::new("dave")));
    assert_eq!(cursors_requested(&server).await, vec!["-1", "abc"]);
}

/// Empty list on first run is valid
#[tokio::test]
async fn test_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [],
            "next_cursor": 0,
            "next_cursor_str": "0"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, policy) = client_for(&server, 3);
    let existing = ExistingListReader::new(&client, policy)
        .read_existing(&RecordingSink::new(), &CancellationToken::new())
        .await;

    assert!(existing.is_complete());
    assert!(existing.is_empty());
}

/// An empty-string cursor is a continuation token, not the end
#[tokio::test]
async fn test_empty_string_cursor_continues() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", "-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mute_page(&["a"], "")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(mute_page(&["b"], "0")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, policy) = client_for(&server, 3);
    let existing = ExistingListReader::new(&client, policy)
        .read_existing(&RecordingSink::new(), &CancellationToken::new())
        .await;

    assert!(existing.is_complete());
    assert_eq!(existing.len(), 2);
}

/// A 429 retries the same cursor and loses nothing
#[tokio::test]
async fn test_rate_limit_retries_same_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", "-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mute_page(&["a", "b"], "next1")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", "next1"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", "next1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mute_page(&["c"], "0")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, policy) = client_for(&server, 3);
    let sink = RecordingSink::new();
    let existing = ExistingListReader::new(&client, policy)
        .read_existing(&sink, &CancellationToken::new())
        .await;

    assert!(existing.is_complete());
    assert_eq!(existing.len(), 3);
    assert_eq!(existing.requests, 4);
    assert_eq!(
        cursors_requested(&server).await,
        vec!["-1", "next1", "next1", "next1"]
    );
    assert_eq!(
        sink.messages(true)
            .iter()
            .filter(|m| m.contains("429"))
            .count(),
        2
    );
}

/// Persistent 429 stops after the ceiling with the partial set
#[tokio::test]
async fn test_retry_ceiling_returns_partial() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", "-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mute_page(&["a", "b"], "stuck")))
        .mount(&server)
        .await;

    // Ceiling of 2: the original attempt plus two retries
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", "stuck"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let (client, policy) = client_for(&server, 2);
    let existing = ExistingListReader::new(&client, policy)
        .read_existing(&RecordingSink::new(), &CancellationToken::new())
        .await;

    assert_eq!(existing.termination, ListTermination::RetriesExhausted { retries: 2 });
    assert_eq!(existing.len(), 2);
}

/// Non-429 failure ends the walk with what was read
#[tokio::test]
async fn test_server_error_returns_partial() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", "-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mute_page(&["a", "b"], "p2")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("cursor", "p2"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let (client, policy) = client_for(&server, 5);
    let sink = RecordingSink::new();
    let existing = ExistingListReader::new(&client, policy)
        .read_existing(&sink, &CancellationToken::new())
        .await;

    assert_eq!(existing.termination, ListTermination::HttpStatus(503));
    assert_eq!(existing.len(), 2);
    assert!(sink.messages(true).iter().any(|m| m.contains("HTTP 503")));
}

/// Undecodable 2xx body ends the walk
#[tokio::test]
async fn test_malformed_page_returns_partial() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let (client, policy) = client_for(&server, 5);
    let existing = ExistingListReader::new(&client, policy)
        .read_existing(&RecordingSink::new(), &CancellationToken::new())
        .await;

    assert!(matches!(existing.termination, ListTermination::Malformed(_)));
    assert!(existing.is_empty());
}

/// Cancellation before the first request reads nothing
#[tokio::test]
async fn test_cancelled_reader() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(mute_page(&["a"], "0")))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let (client, policy) = client_for(&server, 5);
    let existing = ExistingListReader::new(&client, policy)
        .read_existing(&RecordingSink::new(), &cancel)
        .await;

    assert_eq!(existing.termination, ListTermination::Cancelled);
}
