//! Serial mute executor
//!
//! Applies the mute action to each queued handle in order, one request at a
//! time. Every entry is attempted exactly once. Between entries the executor
//! sleeps a jittered delay; a 429 adds a fixed cooldown on top and the entry
//! is counted as failed rather than replayed.

use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::ExecutorConfig;
use crate::models::{ExecutionOutcome, Handle};
use crate::pipeline::progress::ProgressSink;
use crate::platform::client::PlatformClient;
use crate::utils::error::PlatformError;
use crate::utils::{jittered_delay, percent, sleep_or_cancel, truncate_text};

/// Pacing for the apply loop
#[derive(Debug, Clone)]
pub struct ExecutorPolicy {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub rate_limit_cooldown: Duration,
    /// Consolidated success log interval
    pub log_every: u64,
}

impl Default for ExecutorPolicy {
    fn default() -> Self {
        Self::from(&ExecutorConfig::default())
    }
}

impl From<&ExecutorConfig> for ExecutorPolicy {
    fn from(config: &ExecutorConfig) -> Self {
        Self {
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms,
            rate_limit_cooldown: Duration::from_millis(config.rate_limit_cooldown_ms),
            log_every: config.log_every.max(1),
        }
    }
}

/// Run-level tally of the apply loop
#[derive(Debug, Clone, Default)]
pub struct ExecutionSummary {
    pub success: usize,
    pub failure: usize,
    /// Entries attempted
    pub processed: usize,
    /// Queue length
    pub total: usize,
    /// Failed handles with their outcome, in queue order
    pub failures: Vec<(Handle, ExecutionOutcome)>,
    /// Whether the loop stopped early on cancellation
    pub cancelled: bool,
}

impl ExecutionSummary {
    pub fn rate_limited(&self) -> usize {
        self.failures.iter().filter(|(_, o)| o.is_rate_limited()).count()
    }
}

/// Sequential executor over the work queue
pub struct SerialExecutor<'a> {
    client: &'a PlatformClient,
    policy: ExecutorPolicy,
}

impl<'a> SerialExecutor<'a> {
    pub fn new(client: &'a PlatformClient, policy: ExecutorPolicy) -> Self {
        Self { client, policy }
    }

    /// Attempt a single mute and classify the result
    pub async fn attempt(&self, handle: &Handle) -> ExecutionOutcome {
        match self.client.mute(handle).await {
            Ok(()) => ExecutionOutcome::Success,
            Err(PlatformError::RateLimited) => ExecutionOutcome::HttpFailure { status: 429 },
            Err(PlatformError::Status(status)) => ExecutionOutcome::HttpFailure { status },
            Err(PlatformError::Fetch(e)) => ExecutionOutcome::NetworkFailure {
                message: truncate_text(&e.to_string(), 200),
            },
            Err(PlatformError::MalformedResponse(message)) => {
                ExecutionOutcome::NetworkFailure { message }
            }
        }
    }

    /// Mute every queued handle in order
    ///
    /// Cancellation is honored between entries; an entry already in flight
    /// completes and is counted.
    pub async fn execute<R: Rng + ?Sized>(
        &self,
        queue: &[Handle],
        rng: &mut R,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> ExecutionSummary {
        let total = queue.len();
        let mut summary = ExecutionSummary {
            total,
            ..Default::default()
        };

        sink.info(&format!("Muting {total} accounts"));

        for (index, handle) in queue.iter().enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let outcome = self.attempt(handle).await;
            summary.processed += 1;

            match &outcome {
                ExecutionOutcome::Success => {
                    summary.success += 1;
                    if summary.success as u64 % self.policy.log_every == 0 {
                        sink.info(&format!("Muted {} of {total}", summary.success));
                    }
                }
                ExecutionOutcome::HttpFailure { status } => {
                    summary.failure += 1;
                    sink.error(&format!("@{handle}: HTTP {status}"));
                }
                ExecutionOutcome::NetworkFailure { message } => {
                    summary.failure += 1;
                    sink.error(&format!("@{handle}: {message}"));
                }
            }

            tracing::debug!(handle = %handle, outcome = %outcome, index, "Mute attempted");
            sink.progress(percent(index + 1, total), &format!("{}/{total}", index + 1));

            let rate_limited = outcome.is_rate_limited();
            if !outcome.is_success() {
                summary.failures.push((handle.clone(), outcome));
            }

            if rate_limited {
                sink.error(&format!(
                    "Rate limited (429), pausing {}s",
                    self.policy.rate_limit_cooldown.as_secs()
                ));
                if !sleep_or_cancel(self.policy.rate_limit_cooldown, cancel).await {
                    summary.cancelled = true;
                    break;
                }
            }

            // Pacing runs between entries only; the final entry gets no jittered
            // delay, while a 429 on it still waits out the cooldown above.
            if index + 1 < total {
                let delay = jittered_delay(rng, self.policy.min_delay_ms, self.policy.max_delay_ms);
                if !sleep_or_cancel(delay, cancel).await {
                    summary.cancelled = true;
                    break;
                }
            }
        }

        if summary.cancelled {
            sink.error(&format!(
                "Cancelled after {} of {total}: {} muted, {} failed",
                summary.processed, summary.success, summary.failure
            ));
        } else {
            sink.progress(100.0, "Done");
            sink.info(&format!(
                "Finished: {} muted, {} failed",
                summary.success, summary.failure
            ));
        }

        tracing::info!(
            success = summary.success,
            failure = summary.failure,
            processed = summary.processed,
            total,
            cancelled = summary.cancelled,
            "Mute execution finished"
        );

        summary
    }
}
