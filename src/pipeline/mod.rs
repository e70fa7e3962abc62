//! Run orchestration
//!
//! A run has five stages, each handing its result to the next:
//!
//! 1. Resolve credentials (fatal when absent, before any network work)
//! 2. Read the existing mute list
//! 3. Crawl the directory
//! 4. Reconcile into a shuffled work queue
//! 5. Mute the queue serially
//!
//! Stage results are owned by [`Orchestrator::run`] and lent to each stage
//! only for the duration of that stage.

pub mod executor;
pub mod progress;
pub mod reconcile;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::crawler::directory::{CrawlReport, CrawlStop, DirectoryCrawler};
use crate::crawler::fetcher::HttpTransport;
use crate::error::{Error, Result};
use crate::models::Handle;
use crate::platform::client::PlatformClient;
use crate::platform::credentials::CredentialProvider;
use crate::platform::mutes::{ExistingListReader, ExistingSet, ListTermination, ReaderPolicy};

pub use executor::{ExecutionSummary, ExecutorPolicy, SerialExecutor};
pub use progress::{ChannelSink, ProgressSink, RecordingSink, RunEvent, TracingSink};
pub use reconcile::{reconcile, Reconciliation};

/// Per-run switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after reconciliation without muting anything
    pub dry_run: bool,
    /// Seed for the queue shuffle and delay jitter
    pub seed: Option<u64>,
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub existing: ExistingSet,
    pub crawl: CrawlReport,
    pub queue: Vec<Handle>,
    pub skipped: usize,
    /// `None` when the queue was empty or the run was a dry run
    pub execution: Option<ExecutionSummary>,
}

/// Sequences the pipeline stages for one run
pub struct Orchestrator {
    config: Config,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialProvider>,
    sink: Arc<dyn ProgressSink>,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialProvider>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            config,
            transport,
            credentials,
            sink,
            options: RunOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve credentials and bind a platform client to them
    fn platform_client(&self) -> Result<PlatformClient> {
        let credentials = self.credentials.credentials().inspect_err(|e| {
            self.sink.error(&format!("Not signed in: {e}"));
        })?;

        Ok(PlatformClient::new(
            Arc::clone(&self.transport),
            &self.config.platform,
            &credentials,
        )?)
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Run the full pipeline
    ///
    /// # Errors
    ///
    /// - `Error::Credential` when no usable session is available
    /// - `Error::PartialExistingList` when strict mode is on and the list read stopped early
    /// - `Error::Cancelled` when cancelled before the apply stage
    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunReport> {
        let client = self.platform_client()?;

        self.sink.info("Reading existing mute list");
        let existing = self.read_existing_with(&client, cancel).await?;

        self.sink.info("Crawling directory");
        let crawl = self.crawl(cancel).await;
        if crawl.stop == CrawlStop::Cancelled {
            return Err(Error::Cancelled);
        }
        self.sink.info(&format!(
            "Discovered {} accounts in {} pages",
            crawl.handles.len(),
            crawl.pages_requested
        ));

        let mut rng = self.rng();
        let Reconciliation { queue, skipped } =
            reconcile(&crawl.handles, &existing.handles, &mut rng);
        self.sink.info(&format!(
            "{} to mute, {skipped} already muted",
            queue.len()
        ));

        let execution = if queue.is_empty() {
            self.sink.info("Nothing to mute");
            None
        } else if self.options.dry_run {
            self.sink.info("Dry run, skipping mute requests");
            None
        } else {
            let executor =
                SerialExecutor::new(&client, ExecutorPolicy::from(&self.config.executor));
            Some(executor.execute(&queue, &mut rng, self.sink.as_ref(), cancel).await)
        };

        Ok(RunReport {
            existing,
            crawl,
            queue,
            skipped,
            execution,
        })
    }

    /// Read only the existing mute list
    ///
    /// # Errors
    ///
    /// Same credential, strict-mode and cancellation errors as [`Orchestrator::run`].
    pub async fn read_existing(&self, cancel: &CancellationToken) -> Result<ExistingSet> {
        let client = self.platform_client()?;
        self.read_existing_with(&client, cancel).await
    }

    async fn read_existing_with(
        &self,
        client: &PlatformClient,
        cancel: &CancellationToken,
    ) -> Result<ExistingSet> {
        let reader = ExistingListReader::new(client, ReaderPolicy::from(&self.config.platform));
        let existing = reader.read_existing(self.sink.as_ref(), cancel).await;

        match &existing.termination {
            ListTermination::Complete => {
                self.sink.info(&format!("Already muted: {}", existing.len()));
            }
            ListTermination::Cancelled => return Err(Error::Cancelled),
            reason if self.config.platform.abort_on_partial_list => {
                return Err(Error::PartialExistingList {
                    handles: existing.len(),
                    reason: reason.to_string(),
                });
            }
            reason => {
                self.sink.error(&format!(
                    "Mute list incomplete ({reason}), continuing with {} known",
                    existing.len()
                ));
            }
        }

        Ok(existing)
    }

    /// Crawl only the directory
    pub async fn crawl(&self, cancel: &CancellationToken) -> CrawlReport {
        let crawler = DirectoryCrawler::from_config(Arc::clone(&self.transport), &self.config);
        crawler.crawl_all(self.sink.as_ref(), cancel).await
    }
}
