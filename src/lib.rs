//! glasswall - directory-driven bulk muting
//!
//! Discovers account handles listed on an external directory site, compares
//! them with the accounts already muted on the platform, and mutes the rest
//! one at a time while respecting the platform's rate limits.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - HTTP transport and the parallel-window directory crawler
//! - [`parser`] - Handle extraction from directory HTML
//! - [`platform`] - Credentials, mute API client and existing mute-list reader
//! - [`pipeline`] - Reconciler, serial executor, progress events and orchestration
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use glasswall::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let transport = Arc::new(ReqwestTransport::new(
//!         &config.platform.user_agent,
//!         config.request_timeout(),
//!     )?);
//!     let orchestrator = Orchestrator::new(
//!         config,
//!         transport,
//!         Arc::new(EnvCredentialProvider),
//!         Arc::new(TracingSink),
//!     );
//!     let report = orchestrator.run(&CancellationToken::new()).await?;
//!     println!("{} queued", report.queue.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod platform;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{DirectoryCrawler, HttpTransport, ReqwestTransport};
    pub use crate::error::{Error, ErrorCategory, GlasswallErrorTrait, Result};
    pub use crate::models::{ExecutionOutcome, Handle, HandleSet, PageCursor};
    pub use crate::parser::HandleExtractor;
    pub use crate::pipeline::{Orchestrator, ProgressSink, RunOptions, RunReport, TracingSink};
    pub use crate::platform::{CredentialProvider, Credentials, EnvCredentialProvider};
}

// Direct re-exports for convenience
pub use models::{Handle, HandleSet};
