use anyhow::Result;
use tokio_util::sync::CancellationToken;

use glasswall::config::Config;
use glasswall::pipeline::RunOptions;

pub async fn existing(config: Config, list: bool, cancel: &CancellationToken) -> Result<()> {
    println!("Reading existing mute list");
    println!("==========================");

    let orchestrator = super::orchestrator(config, RunOptions::default())?;
    let existing = orchestrator.read_existing(cancel).await?;

    if list {
        for handle in &existing.handles {
            println!("@{handle}");
        }
    }

    println!("\nMute List Summary");
    println!("=================");
    println!("Muted:          {}", existing.len());
    println!("Pages:          {}", existing.pages);
    println!("Requests:       {}", existing.requests);
    println!("Status:         {}", existing.termination);

    Ok(())
}
