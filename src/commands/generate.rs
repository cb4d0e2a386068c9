//! Generate static files

use anyhow::Result;
use std::time::{Duration, Instant};

use crate::Blog;

/// Generate the static site once
pub async fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let summary = blog.generate().await?;

    tracing::info!("Generation finished in {:.2}s", start.elapsed().as_secs_f64());
    if summary.skipped > 0 {
        tracing::warn!("{} posts could not be rendered", summary.skipped);
    }

    Ok(())
}

/// Regenerate every `revalidate_secs` until interrupted
pub async fn watch(blog: &Blog) -> Result<()> {
    let period = Duration::from_secs(blog.config.revalidate_secs.max(1));
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately; the initial build already ran
    ticker.tick().await;

    tracing::info!(
        "Regenerating every {}s. Press Ctrl+C to stop.",
        period.as_secs()
    );

    loop {
        ticker.tick().await;
        tracing::info!("Revalidating...");
        if let Err(e) = run(blog).await {
            tracing::error!("Generation failed: {}", e);
        }
    }
}
