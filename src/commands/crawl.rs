use anyhow::Result;
use tokio_util::sync::CancellationToken;

use glasswall::config::Config;
use glasswall::pipeline::RunOptions;

pub async fn crawl(
    mut config: Config,
    max_pages: Option<u32>,
    cancel: &CancellationToken,
) -> Result<()> {
    println!("Crawling directory");
    println!("==================");

    if max_pages.is_some() {
        config.directory.max_pages = max_pages;
    }
    println!("Base URL: {}", config.directory.base_url);
    println!("Concurrency: {}", config.directory.concurrency);

    let orchestrator = super::orchestrator(config, RunOptions::default())?;
    let report = orchestrator.crawl(cancel).await;

    for handle in &report.handles {
        println!("@{handle}");
    }

    println!("\nCrawl Summary");
    println!("=============");
    println!("Handles:        {}", report.handles.len());
    println!("Rounds:         {}", report.rounds);
    println!("Pages:          {}", report.pages_requested);
    println!("Failed pages:   {}", report.pages_failed);
    println!("Stopped:        {:?}", report.stop);

    Ok(())
}
