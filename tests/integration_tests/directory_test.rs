//! Directory crawler tests
//!
//! Drives `DirectoryCrawler` against a wiremock directory site.

use std::time::Duration;

use glasswall::crawler::directory::{CrawlStop, DirectoryCrawler};
use glasswall::models::Handle;
use glasswall::pipeline::progress::RecordingSink;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{DIRECTORY_PAGE_HTML, DIRECTORY_PAGE_HANDLES, SOFT_NOT_FOUND_HTML};
use crate::common::{directory_page, test_config, transport};

async fn mount_page(server: &MockServer, page: u32, body: String) {
    let mock = Mock::given(method("GET")).and(path("/"));
    let mock = if page == 1 {
        mock.and(query_param_is_missing("page"))
    } else {
        mock.and(query_param("page", page.to_string().as_str()))
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn crawler(server: &MockServer, concurrency: usize) -> DirectoryCrawler {
    let mut config = test_config("http://127.0.0.1:1", &server.uri());
    config.directory.concurrency = concurrency;
    config.directory.page_timeout_ms = 300;
    DirectoryCrawler::from_config(transport(), &config)
}

fn requested_pages(requests: &[wiremock::Request]) -> Vec<u32> {
    let mut pages: Vec<u32> = requests
        .iter()
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "page")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(1)
        })
        .collect();
    pages.sort_unstable();
    pages
}

/// Two productive rounds, then two empty rounds end the crawl
#[tokio::test]
async fn test_crawl_until_two_empty_rounds() {
    let server = MockServer::start().await;
    mount_page(&server, 1, DIRECTORY_PAGE_HTML.to_string()).await;
    mount_page(&server, 2, directory_page(&["Anna", "ben"])).await;
    mount_page(&server, 3, directory_page(&["anna"])).await;
    mount_page(&server, 5, directory_page(&["Chen_Wei"])).await;

    let sink = RecordingSink::new();
    let report = crawler(&server, 3)
        .crawl_all(&sink, &CancellationToken::new())
        .await;

    assert_eq!(report.stop, CrawlStop::Exhausted);
    assert_eq!(report.rounds, 4);
    assert_eq!(report.pages_requested, 12);
    assert_eq!(report.handles.len(), DIRECTORY_PAGE_HANDLES.len() + 3);
    assert!(report.handles.contains(&Handle::new("chen_wei")));

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requested_pages(&requests), (1..=12).collect::<Vec<_>>());

    let logs = sink.messages(false);
    assert!(logs.iter().any(|m| m == "Downloading pages 1 - 3 ..."));
    assert!(logs.iter().any(|m| m == "Downloading pages 10 - 12 ..."));
}

/// Page 1 is requested without a page parameter
#[tokio::test]
async fn test_first_page_has_no_query() {
    let server = MockServer::start().await;
    mount_page(&server, 1, directory_page(&["solo"])).await;

    let report = crawler(&server, 1)
        .crawl_all(&RecordingSink::new(), &CancellationToken::new())
        .await;

    assert_eq!(report.handles.len(), 1);
    let requests = server.received_requests().await.unwrap_or_default();
    let first = requests
        .iter()
        .find(|r| r.url.query().is_none())
        .expect("page 1 request");
    assert_eq!(first.url.path(), "/");
}

/// Failing and slow pages contribute nothing but do not stop the round
#[tokio::test]
async fn test_failed_pages_are_soft() {
    let server = MockServer::start().await;
    mount_page(&server, 1, directory_page(&["kept"])).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("page", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(directory_page(&["too_slow"]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let report = crawler(&server, 3)
        .crawl_all(&RecordingSink::new(), &CancellationToken::new())
        .await;

    assert_eq!(report.handles.len(), 1);
    assert!(report.handles.contains(&Handle::new("kept")));
    assert!(report.pages_failed >= 2);
    assert_eq!(report.stop, CrawlStop::Exhausted);
}

/// Soft 404 pages served with 200 add nothing
#[tokio::test]
async fn test_soft_not_found_pages_count_as_empty() {
    let server = MockServer::start().await;
    mount_page(&server, 1, directory_page(&["first"])).await;
    for page in 2..=6 {
        mount_page(&server, page, SOFT_NOT_FOUND_HTML.to_string()).await;
    }

    let report = crawler(&server, 2)
        .crawl_all(&RecordingSink::new(), &CancellationToken::new())
        .await;

    assert_eq!(report.handles.len(), 1);
    assert_eq!(report.rounds, 3);
}

/// Page cap stops the crawl even while pages keep yielding
#[tokio::test]
async fn test_max_pages() {
    let server = MockServer::start().await;
    for page in 1..=10 {
        mount_page(&server, page, directory_page(&[format!("user{page}").as_str()])).await;
    }

    let mut config = test_config("http://127.0.0.1:1", &server.uri());
    config.directory.concurrency = 3;
    config.directory.max_pages = Some(5);
    let report = DirectoryCrawler::from_config(transport(), &config)
        .crawl_all(&RecordingSink::new(), &CancellationToken::new())
        .await;

    assert_eq!(report.stop, CrawlStop::PageLimit);
    assert_eq!(report.handles.len(), 5);
    assert_eq!(report.pages_requested, 5);
}
