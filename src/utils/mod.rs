//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sleep for `duration` unless the token is cancelled first
///
/// Returns `false` when the sleep was interrupted by cancellation.
pub async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    if duration.is_zero() {
        return !cancel.is_cancelled();
    }

    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = cancel.cancelled() => false,
    }
}

/// Draw a delay uniformly from the inclusive `[min_ms, max_ms]` window
pub fn jittered_delay<R: Rng + ?Sized>(rng: &mut R, min_ms: u64, max_ms: u64) -> Duration {
    let (lo, hi) = if min_ms <= max_ms {
        (min_ms, max_ms)
    } else {
        (max_ms, min_ms)
    };
    Duration::from_millis(rng.gen_range(lo..=hi))
}

/// Truncate text to a maximum length
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Percentage of `done` out of `total`, clamped to 0-100
pub fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    ((done as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
}
