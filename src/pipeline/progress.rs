//! Progress and log events for the presentation layer
//!
//! The pipeline emits two event shapes: `(percent, label)` progress updates and
//! `(message, is_error)` log lines. Log lines are stamped with the wall-clock
//! time at which they were emitted.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Event emitted by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Progress bar update (percent is 0-100)
    Progress { percent: f64, label: String },

    /// Timestamped log line
    Log {
        message: String,
        is_error: bool,
        at: DateTime<Utc>,
    },
}

impl RunEvent {
    pub fn progress(percent: f64, label: impl Into<String>) -> Self {
        Self::Progress {
            percent: percent.clamp(0.0, 100.0),
            label: label.into(),
        }
    }

    pub fn log(message: impl Into<String>, is_error: bool) -> Self {
        Self::Log {
            message: message.into(),
            is_error,
            at: Utc::now(),
        }
    }
}

/// Receiver of pipeline events
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: RunEvent);

    fn progress(&self, percent: f64, label: &str) {
        self.emit(RunEvent::progress(percent, label));
    }

    fn info(&self, message: &str) {
        self.emit(RunEvent::log(message, false));
    }

    fn error(&self, message: &str) {
        self.emit(RunEvent::log(message, true));
    }
}

/// Sink that renders events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, event: RunEvent) {
        match event {
            RunEvent::Progress { percent, label } => {
                tracing::debug!(percent, "{label}");
            }
            RunEvent::Log {
                message,
                is_error: false,
                at,
            } => {
                tracing::info!(at = %at.to_rfc3339(), "{message}");
            }
            RunEvent::Log {
                message,
                is_error: true,
                at,
            } => {
                tracing::warn!(at = %at.to_rfc3339(), "{message}");
            }
        }
    }
}

/// Sink forwarding events over a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<RunEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: RunEvent) {
        let _ = self.tx.send(event);
    }
}

/// Sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events received so far
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Log messages, optionally only errors
    pub fn messages(&self, errors_only: bool) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RunEvent::Log {
                    message, is_error, ..
                } if is_error || !errors_only => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Percent values of all progress events, in order
    pub fn percents(&self) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RunEvent::Progress { percent, .. } => Some(percent),
                RunEvent::Log { .. } => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
