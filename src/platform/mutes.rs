//! Existing mute-list reader
//!
//! Walks the platform's cursor-paginated mute list and collects every handle
//! that is already muted. The reader never fails: rate limiting is retried on
//! the same cursor up to a ceiling, and any other failure ends the walk early
//! with whatever has been accumulated. [`ListTermination`] records why the walk
//! stopped so the caller can decide whether partial data is acceptable.

use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::PlatformConfig;
use crate::models::{HandleSet, PageCursor};
use crate::pipeline::progress::ProgressSink;
use crate::platform::client::{MutePage, PlatformClient};
use crate::utils::sleep_or_cancel;

/// Why the mute-list walk stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListTermination {
    /// The end-of-list cursor was reached
    Complete,
    /// 429 retries exceeded the configured ceiling
    RetriesExhausted { retries: u32 },
    /// Non-2xx, non-429 response
    HttpStatus(u16),
    /// Transport failure
    Network(String),
    /// 2xx response that could not be decoded
    Malformed(String),
    /// Cancellation token fired
    Cancelled,
}

impl fmt::Display for ListTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::RetriesExhausted { retries } => {
                write!(f, "rate limited {retries} times in a row")
            }
            Self::HttpStatus(status) => write!(f, "HTTP {status}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed response: {msg}"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Handles already muted, plus how the read ended
#[derive(Debug, Clone)]
pub struct ExistingSet {
    pub handles: HandleSet,
    pub termination: ListTermination,
    /// Successful pages read
    pub pages: u32,
    /// Requests issued, including rate-limited retries
    pub requests: u32,
}

impl ExistingSet {
    pub fn is_complete(&self) -> bool {
        self.termination == ListTermination::Complete
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Retry and pacing policy for the mute-list walk
#[derive(Debug, Clone)]
pub struct ReaderPolicy {
    /// Pause after each successful page
    pub page_delay: Duration,
    /// Pause after a 429 before retrying the same cursor
    pub rate_limit_cooldown: Duration,
    /// Consecutive 429s tolerated before giving up
    pub max_retries: u32,
}

impl From<&PlatformConfig> for ReaderPolicy {
    fn from(config: &PlatformConfig) -> Self {
        Self {
            page_delay: Duration::from_millis(config.list_page_delay_ms),
            rate_limit_cooldown: Duration::from_millis(config.list_rate_limit_cooldown_ms),
            max_retries: config.list_max_retries,
        }
    }
}

/// Sequential reader for the existing mute list
pub struct ExistingListReader<'a> {
    client: &'a PlatformClient,
    policy: ReaderPolicy,
}

impl<'a> ExistingListReader<'a> {
    pub fn new(client: &'a PlatformClient, policy: ReaderPolicy) -> Self {
        Self { client, policy }
    }

    /// Read the whole mute list, stopping early on unrecoverable failures
    pub async fn read_existing(
        &self,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> ExistingSet {
        let mut handles = HandleSet::new();
        let mut cursor = PageCursor::Start;
        let mut retries = 0u32;
        let mut pages = 0u32;
        let mut requests = 0u32;

        let termination = loop {
            if cancel.is_cancelled() {
                break ListTermination::Cancelled;
            }

            requests += 1;
            tracing::debug!(cursor = %cursor, requests, "Fetching mute list page");

            let response = match self.client.fetch_mute_page(&cursor).await {
                Ok(response) => response,
                Err(e) => {
                    sink.error(&format!("Mute list read failed: {e}"));
                    break ListTermination::Network(e.to_string());
                }
            };

            if response.is_rate_limited() {
                retries += 1;
                if retries > self.policy.max_retries {
                    sink.error(&format!(
                        "Mute list still rate limited after {} retries, continuing with {} known handles",
                        self.policy.max_retries,
                        handles.len()
                    ));
                    break ListTermination::RetriesExhausted {
                        retries: self.policy.max_retries,
                    };
                }

                sink.error(&format!(
                    "Mute list rate limited (429), retry {retries}/{} in {}s",
                    self.policy.max_retries,
                    self.policy.rate_limit_cooldown.as_secs()
                ));
                if !sleep_or_cancel(self.policy.rate_limit_cooldown, cancel).await {
                    break ListTermination::Cancelled;
                }
                continue;
            }

            if !response.is_success() {
                sink.error(&format!("Mute list read failed: HTTP {}", response.status));
                break ListTermination::HttpStatus(response.status);
            }

            let page = match MutePage::parse(&response.body) {
                Ok(page) => page,
                Err(e) => {
                    sink.error(&format!("Mute list page unreadable: {e}"));
                    break ListTermination::Malformed(e.to_string());
                }
            };

            retries = 0;
            pages += 1;
            handles.extend(page.handles());
            sink.progress(0.0, &format!("Read: {}", handles.len()));

            match page.next_cursor() {
                Some(PageCursor::End) => break ListTermination::Complete,
                Some(next) => cursor = next,
                None => {
                    sink.error("Mute list page has no next cursor");
                    break ListTermination::Malformed("missing next cursor".to_string());
                }
            }

            if !sleep_or_cancel(self.policy.page_delay, cancel).await {
                break ListTermination::Cancelled;
            }
        };

        tracing::info!(
            handles = handles.len(),
            pages,
            requests,
            termination = %termination,
            "Mute list read finished"
        );

        ExistingSet {
            handles,
            termination,
            pages,
            requests,
        }
    }
}
