use anyhow::Result;
use tokio_util::sync::CancellationToken;

use glasswall::config::Config;
use glasswall::error::GlasswallErrorTrait;
use glasswall::pipeline::RunOptions;

pub async fn run(
    config: Config,
    dry_run: bool,
    seed: Option<u64>,
    cancel: &CancellationToken,
) -> Result<()> {
    println!("Starting glasswall run");
    println!("======================");

    let orchestrator = super::orchestrator(config, RunOptions { dry_run, seed })?;
    let report = match orchestrator.run(cancel).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(
                category = %e.category(),
                recoverable = e.is_recoverable(),
                "Run aborted: {e}"
            );
            return Err(e.into());
        }
    };

    println!("\nRun Summary");
    println!("===========");
    println!(
        "Already muted:  {}{}",
        report.existing.len(),
        if report.existing.is_complete() {
            String::new()
        } else {
            format!(" (partial: {})", report.existing.termination)
        }
    );
    println!(
        "Discovered:     {} ({} pages, {} failed)",
        report.crawl.handles.len(),
        report.crawl.pages_requested,
        report.crawl.pages_failed
    );
    println!("Skipped:        {}", report.skipped);
    println!("Queued:         {}", report.queue.len());

    match &report.execution {
        Some(summary) => {
            println!("Muted:          {}", summary.success);
            println!("Failed:         {}", summary.failure);
            if summary.cancelled {
                println!(
                    "Cancelled after {} of {}",
                    summary.processed, summary.total
                );
            }
            if !summary.failures.is_empty() {
                println!("\nFailed handles:");
                for (handle, outcome) in &summary.failures {
                    println!("  @{handle}: {outcome}");
                }
            }
        }
        None if dry_run && !report.queue.is_empty() => {
            println!("\nQueue (dry run):");
            for handle in &report.queue {
                println!("  @{handle}");
            }
        }
        None => {}
    }

    Ok(())
}
