//! End-to-end pipeline tests
//!
//! Tests the complete credentials -> read -> crawl -> reconcile -> mute flow
//! against two wiremock servers: the platform API and the directory site.

use std::sync::Arc;

use glasswall::config::Config;
use glasswall::error::{CredentialError, Error};
use glasswall::models::Handle;
use glasswall::pipeline::progress::RecordingSink;
use glasswall::pipeline::{Orchestrator, RunOptions};
use glasswall::platform::credentials::{NoCredentials, StaticCredentials};
use glasswall::platform::mutes::ListTermination;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{credentials, directory_page, mute_page, test_config};

const LIST_PATH: &str = "/mutes/users/list.json";
const CREATE_PATH: &str = "/mutes/users/create.json";

struct Harness {
    api: MockServer,
    directory: MockServer,
    sink: Arc<RecordingSink>,
}

impl Harness {
    async fn start(muted: &[&str], listed: &[&str]) -> Self {
        let api = MockServer::start().await;
        let directory = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(mute_page(muted, "0")))
            .mount(&api)
            .await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param_is_missing("page"))
            .respond_with(ResponseTemplate::new(200).set_body_string(directory_page(listed)))
            .mount(&directory)
            .await;

        Self {
            api,
            directory,
            sink: Arc::new(RecordingSink::new()),
        }
    }

    fn config(&self) -> Config {
        test_config(&self.api.uri(), &self.directory.uri())
    }

    fn orchestrator(&self, config: Config, options: RunOptions) -> Orchestrator {
        Orchestrator::new(
            config,
            crate::common::transport(),
            Arc::new(StaticCredentials(credentials())),
            self.sink.clone(),
        )
        .with_options(options)
    }

    async fn muted_names(&self) -> Vec<String> {
        self.api
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == CREATE_PATH)
            .map(|r| {
                String::from_utf8_lossy(&r.body)
                    .trim_start_matches("screen_name=")
                    .to_string()
            })
            .collect()
    }
}

fn sorted(handles: &[Handle]) -> Vec<String> {
    let mut names: Vec<String> = handles.iter().map(|h| h.to_string()).collect();
    names.sort();
    names
}

/// Partial overlap: only the unmuted, case-folded handles are muted
#[tokio::test]
async fn test_partial_overlap_mutes_the_rest() {
    let harness = Harness::start(&["alice"], &["alice", "bob", "Carol"]).await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(2)
        .mount(&harness.api)
        .await;

    let report = harness
        .orchestrator(harness.config(), RunOptions::default())
        .run(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.queue.len(), 2);
    assert_eq!(sorted(&report.queue), vec!["bob", "carol"]);
    assert_eq!(report.skipped, 1);

    let execution = report.execution.expect("executor ran");
    assert_eq!(execution.success, 2);

    let mut muted = harness.muted_names().await;
    muted.sort();
    assert_eq!(muted, vec!["bob", "carol"]);
}

/// Everything already muted: the executor stage is skipped entirely
#[tokio::test]
async fn test_full_overlap_skips_executor() {
    let harness = Harness::start(&["Alice", "bob"], &["alice", "BOB"]).await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.api)
        .await;

    let report = harness
        .orchestrator(harness.config(), RunOptions::default())
        .run(&CancellationToken::new())
        .await
        .unwrap();

    assert!(report.queue.is_empty());
    assert!(report.execution.is_none());
    assert!(harness
        .sink
        .messages(false)
        .contains(&"Nothing to mute".to_string()));
}

/// Missing credentials abort before any request is made
#[tokio::test]
async fn test_missing_credentials_is_fatal() {
    let harness = Harness::start(&[], &["alice"]).await;

    let orchestrator = Orchestrator::new(
        harness.config(),
        crate::common::transport(),
        Arc::new(NoCredentials),
        harness.sink.clone(),
    );
    let result = orchestrator.run(&CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(Error::Credential(CredentialError::MissingCsrfToken))
    ));
    assert!(harness.api.received_requests().await.unwrap_or_default().is_empty());
    assert!(harness
        .directory
        .received_requests()
        .await
        .unwrap_or_default()
        .is_empty());
    assert!(!harness.sink.messages(true).is_empty());
}

/// A failed mute-list read degrades to partial data by default
#[tokio::test]
async fn test_partial_existing_list_continues() {
    let api = MockServer::start().await;
    let directory = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&api)
        .await;
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(2)
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(directory_page(&["x1", "x2"])))
        .mount(&directory)
        .await;

    let sink = Arc::new(RecordingSink::new());
    let report = Orchestrator::new(
        test_config(&api.uri(), &directory.uri()),
        crate::common::transport(),
        Arc::new(StaticCredentials(credentials())),
        sink.clone(),
    )
    .run(&CancellationToken::new())
    .await
    .unwrap();

    assert_eq!(report.existing.termination, ListTermination::HttpStatus(500));
    assert_eq!(report.queue.len(), 2);
    assert!(sink
        .messages(true)
        .iter()
        .any(|m| m.starts_with("Mute list incomplete")));
}

/// Strict mode turns a partial mute-list read into a fatal error
#[tokio::test]
async fn test_strict_mode_aborts_on_partial_list() {
    let api = MockServer::start().await;
    let directory = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&api)
        .await;

    let mut config = test_config(&api.uri(), &directory.uri());
    config.platform.abort_on_partial_list = true;

    let result = Orchestrator::new(
        config,
        crate::common::transport(),
        Arc::new(StaticCredentials(credentials())),
        Arc::new(RecordingSink::new()),
    )
    .run(&CancellationToken::new())
    .await;

    assert!(matches!(
        result,
        Err(Error::PartialExistingList { handles: 0, .. })
    ));
    assert!(directory.received_requests().await.unwrap_or_default().is_empty());
}

/// Dry run builds the queue without muting
#[tokio::test]
async fn test_dry_run_sends_no_mutes() {
    let harness = Harness::start(&[], &["p", "q", "r"]).await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.api)
        .await;

    let report = harness
        .orchestrator(
            harness.config(),
            RunOptions {
                dry_run: true,
                seed: Some(1),
            },
        )
        .run(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.queue.len(), 3);
    assert!(report.execution.is_none());
}

/// The same seed yields the same queue order
#[tokio::test]
async fn test_seeded_runs_are_reproducible() {
    let listed: Vec<String> = (0..30).map(|i| format!("member{i}")).collect();
    let listed: Vec<&str> = listed.iter().map(String::as_str).collect();
    let harness = Harness::start(&[], &listed).await;
    let options = RunOptions {
        dry_run: true,
        seed: Some(42),
    };

    let first = harness
        .orchestrator(harness.config(), options)
        .run(&CancellationToken::new())
        .await
        .unwrap();
    let second = harness
        .orchestrator(harness.config(), options)
        .run(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(first.queue, second.queue);
    assert_eq!(first.queue.len(), 30);
}

/// A cancelled run stops before muting
#[tokio::test]
async fn test_cancelled_run() {
    let harness = Harness::start(&[], &["a"]).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = harness
        .orchestrator(harness.config(), RunOptions::default())
        .run(&cancel)
        .await;

    assert!(matches!(result, Err(Error::Cancelled)));
}
