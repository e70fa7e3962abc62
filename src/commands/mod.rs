pub mod crawl;
pub mod existing;
pub mod run;

// Re-export command functions for convenience
pub use crawl::crawl;
pub use existing::existing;
pub use run::run;

use anyhow::{Context, Result};
use std::sync::Arc;

use glasswall::config::Config;
use glasswall::crawler::fetcher::ReqwestTransport;
use glasswall::pipeline::{Orchestrator, RunOptions, TracingSink};
use glasswall::platform::EnvCredentialProvider;

/// Orchestrator wired to the real network, environment credentials and tracing output
fn orchestrator(config: Config, options: RunOptions) -> Result<Orchestrator> {
    let transport = ReqwestTransport::new(&config.platform.user_agent, config.request_timeout())
        .context("Failed to create HTTP client")?;

    Ok(Orchestrator::new(
        config,
        Arc::new(transport),
        Arc::new(EnvCredentialProvider),
        Arc::new(TracingSink),
    )
    .with_options(options))
}
