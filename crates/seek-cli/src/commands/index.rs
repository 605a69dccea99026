//! Index command - crawl the filesystem cache.

use crate::app::{App, CACHE_TIMEOUT};
use seek_core::Config;
use std::time::{Duration, Instant};
use tracing::info;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

/// Run the index command.
pub fn run(config: Config) -> anyhow::Result<()> {
    let root = config.files.root.clone();
    let app = App::new(config);
    let Some(files) = app.file_provider() else {
        anyhow::bail!("File provider is not available");
    };

    println!("Crawling {}...", root.display());

    let start = Instant::now();
    files.build_filesystem_cache();

    while !files.wait_for_cache(PROGRESS_INTERVAL) {
        info!(entries = files.cache().len(), "Crawl in progress");
        if start.elapsed() > CACHE_TIMEOUT {
            anyhow::bail!(
                "Crawl did not finish within {}s ({} entries so far)",
                CACHE_TIMEOUT.as_secs(),
                files.cache().len()
            );
        }
    }

    let elapsed = start.elapsed();
    let entries = files.cache().len();

    println!();
    println!("Crawl complete!");
    println!("  Entries: {}", entries);
    println!("  Time:    {:.2}s", elapsed.as_secs_f64());
    println!(
        "  Rate:    {:.0} entries/sec",
        entries as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );

    Ok(())
}
