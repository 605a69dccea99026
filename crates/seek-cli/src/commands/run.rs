//! Run command - search, then activate one result.

use crate::app::App;
use anyhow::Context;
use seek_core::Config;
use tracing::info;

/// Run the run command.
pub fn run(config: Config, text: &str, pick: usize, wait: bool) -> anyhow::Result<()> {
    let app = App::new(config);
    let limit = app.config.general.max_results.max(pick + 1);
    let results = app.search(text, limit, wait);

    let Some(result) = results.get(pick) else {
        anyhow::bail!(
            "No result at position {} ({} results for {:?})",
            pick,
            results.len(),
            text
        );
    };

    info!(kind = %result.kind(), title = result.title(), "Activating result");
    result
        .activate(&app.desktop)
        .with_context(|| format!("Failed to activate {:?}", result.title()))?;

    println!("[{}] {}", result.kind(), result.title());
    Ok(())
}
