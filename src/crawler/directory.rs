//! Directory crawler with a parallel page window
//!
//! The directory exposes numbered listing pages but no total page count. The
//! crawler therefore walks it in rounds: each round fetches `concurrency`
//! contiguous pages at once, waits for all of them, then merges the handles
//! found. The crawl ends after `empty_round_threshold` consecutive rounds that
//! add no new handle.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use glasswall::config::Config;
//! use glasswall::crawler::directory::DirectoryCrawler;
//! use glasswall::crawler::fetcher::ReqwestTransport;
//! use glasswall::pipeline::progress::TracingSink;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let transport = Arc::new(ReqwestTransport::new("glasswall", config.page_timeout())?);
//! let crawler = DirectoryCrawler::from_config(transport, &config);
//! let report = crawler.crawl_all(&TracingSink, &CancellationToken::new()).await;
//! println!("Discovered {} handles", report.handles.len());
//! # Ok(())
//! # }
//! ```

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::crawler::fetcher::{HttpRequest, HttpTransport};
use crate::crawler::headers::build_directory_headers;
use crate::models::HandleSet;
use crate::parser::{ExtractorOptions, HandleExtractor};
use crate::pipeline::progress::ProgressSink;
use crate::utils::sleep_or_cancel;

/// Round sizing and pacing for a crawl
#[derive(Debug, Clone)]
pub struct CrawlPolicy {
    /// Pages fetched concurrently per round
    pub concurrency: usize,
    /// Consecutive empty rounds that end the crawl
    pub empty_round_threshold: u32,
    /// Pause between rounds
    pub round_delay: Duration,
    /// Timeout for each page request
    pub page_timeout: Duration,
    /// Optional cap on the highest page number requested
    pub max_pages: Option<u32>,
}

impl Default for CrawlPolicy {
    fn default() -> Self {
        Self {
            concurrency: 20,
            empty_round_threshold: 2,
            round_delay: Duration::from_millis(500),
            page_timeout: Duration::from_secs(8),
            max_pages: None,
        }
    }
}

impl From<&Config> for CrawlPolicy {
    fn from(config: &Config) -> Self {
        Self {
            concurrency: config.directory.concurrency.max(1),
            empty_round_threshold: config.directory.empty_round_threshold.max(1),
            round_delay: Duration::from_millis(config.directory.round_delay_ms),
            page_timeout: config.page_timeout(),
            max_pages: config.directory.max_pages,
        }
    }
}

/// Why the crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStop {
    /// Consecutive empty rounds reached the threshold
    Exhausted,
    /// Configured page cap reached
    PageLimit,
    /// Cancellation token fired
    Cancelled,
}

/// Result of a directory crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub handles: HandleSet,
    pub rounds: u32,
    pub pages_requested: u32,
    pub pages_failed: u32,
    pub stop: CrawlStop,
}

/// Outcome of one scatter/gather round, before merging
#[derive(Debug)]
struct RoundResult {
    first_page: u32,
    last_page: u32,
    bodies: Vec<Option<String>>,
}

/// Parallel-window crawler for the external directory
pub struct DirectoryCrawler {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    extractor: HandleExtractor,
    policy: CrawlPolicy,
}

impl DirectoryCrawler {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        extractor: HandleExtractor,
        policy: CrawlPolicy,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            extractor,
            policy,
        }
    }

    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &Config) -> Self {
        Self::new(
            transport,
            config.directory.base_url.clone(),
            HandleExtractor::new(ExtractorOptions::from(config)),
            CrawlPolicy::from(config),
        )
    }

    /// URL of a 1-based directory page under this crawler's base
    pub fn page_url(&self, page: u32) -> String {
        page_url(&self.base_url, page)
    }

    /// Crawl the directory until it stops yielding new handles
    ///
    /// Never fails: pages that cannot be fetched contribute nothing.
    pub async fn crawl_all(
        &self,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> CrawlReport {
        let mut handles = HandleSet::new();
        let mut page = 1u32;
        let mut empty_rounds = 0u32;
        let mut rounds = 0u32;
        let mut pages_requested = 0u32;
        let mut pages_failed = 0u32;

        let stop = loop {
            if cancel.is_cancelled() {
                break CrawlStop::Cancelled;
            }

            let Some(width) = self.window_width(page) else {
                break CrawlStop::PageLimit;
            };

            sink.info(&format!(
                "Downloading pages {} - {} ...",
                page,
                page + width - 1
            ));

            let round = tokio::select! {
                round = self.fetch_round(page, width) => round,
                _ = cancel.cancelled() => break CrawlStop::Cancelled,
            };

            rounds += 1;
            pages_requested += width;
            pages_failed += round.bodies.iter().filter(|b| b.is_none()).count() as u32;

            let added = self.merge_round(&round, &mut handles);
            if added == 0 {
                empty_rounds += 1;
            } else {
                empty_rounds = 0;
            }

            tracing::debug!(
                first_page = round.first_page,
                last_page = round.last_page,
                added,
                empty_rounds,
                total = handles.len(),
                "Crawl round merged"
            );
            sink.progress(0.0, &format!("Discovered: {}", handles.len()));

            page += width;

            if empty_rounds >= self.policy.empty_round_threshold {
                break CrawlStop::Exhausted;
            }

            if !sleep_or_cancel(self.policy.round_delay, cancel).await {
                break CrawlStop::Cancelled;
            }
        };

        tracing::info!(
            handles = handles.len(),
            rounds,
            pages_requested,
            pages_failed,
            stop = ?stop,
            "Directory crawl finished"
        );

        CrawlReport {
            handles,
            rounds,
            pages_requested,
            pages_failed,
            stop,
        }
    }

    /// Number of pages in the round starting at `first_page`, honoring the page cap
    fn window_width(&self, first_page: u32) -> Option<u32> {
        let width = self.policy.concurrency.max(1) as u32;
        match self.policy.max_pages {
            Some(max) if first_page > max => None,
            Some(max) => Some(width.min(max - first_page + 1)),
            None => Some(width),
        }
    }

    /// Scatter `width` page fetches and gather all of them
    async fn fetch_round(&self, first_page: u32, width: u32) -> RoundResult {
        let last_page = first_page + width - 1;
        let fetches = (first_page..=last_page).map(|page| self.fetch_page(page));
        let bodies = join_all(fetches).await;

        RoundResult {
            first_page,
            last_page,
            bodies,
        }
    }

    /// Fetch one page, mapping every failure to `None`
    async fn fetch_page(&self, page: u32) -> Option<String> {
        let url = self.page_url(page);
        let request = HttpRequest::get(&url)
            .with_headers(build_directory_headers())
            .with_timeout(self.policy.page_timeout);

        match self.transport.send(request).await {
            Ok(response) if response.status == 200 => Some(response.body),
            Ok(response) => {
                tracing::debug!(page, status = response.status, "Directory page unavailable");
                None
            }
            Err(e) => {
                tracing::debug!(page, error = %e, "Directory page fetch failed");
                None
            }
        }
    }

    /// Merge a gathered round into the discovered set, returning how many were new
    fn merge_round(&self, round: &RoundResult, handles: &mut HandleSet) -> usize {
        let mut added = 0;
        for body in round.bodies.iter().flatten() {
            for handle in self.extractor.extract(body) {
                if handles.insert(handle) {
                    added += 1;
                }
            }
        }
        added
    }
}

/// URL of a 1-based directory page: page 1 is the bare base, later pages pass `?page=`
///
/// # Examples
///
/// ```
/// use glasswall::crawler::directory::page_url;
///
/// assert_eq!(page_url("https://dir.example/", 1), "https://dir.example/");
/// assert_eq!(page_url("https://dir.example", 3), "https://dir.example/?page=3");
/// ```
pub fn page_url(base_url: &str, page: u32) -> String {
    let base = base_url.trim_end_matches('/');
    if page <= 1 {
        format!("{base}/")
    } else {
        format!("{base}/?page={page}")
    }
}
