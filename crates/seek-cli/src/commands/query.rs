//! Query command - show merged results.

use crate::app::App;
use crate::OutputFormat;
use seek_core::Config;
use std::time::Instant;

/// Run the query command.
pub fn run(
    config: Config,
    text: &str,
    limit: Option<usize>,
    output: OutputFormat,
    wait: bool,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(config.general.max_results);
    let app = App::new(config);

    let start = Instant::now();
    let results = app.search(text, limit, wait);
    let elapsed = start.elapsed();

    match output {
        OutputFormat::Text => {
            for (position, result) in results.iter().enumerate() {
                if result.subtitle().is_empty() {
                    println!("{:>3}  [{}] {}", position, result.kind(), result.title());
                } else {
                    println!(
                        "{:>3}  [{}] {}  ({})",
                        position,
                        result.kind(),
                        result.title(),
                        result.subtitle()
                    );
                }
            }

            eprintln!();
            eprintln!(
                "Found {} results in {:.3}ms",
                results.len(),
                elapsed.as_secs_f64() * 1000.0
            );
        }
        OutputFormat::Json => {
            let json_results: Vec<serde_json::Value> = results
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "kind": r.kind().to_string(),
                        "title": r.title(),
                        "subtitle": r.subtitle(),
                        "score": r.score(),
                        "icon": r.icon().to_string(),
                    })
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&json_results)?);
        }
    }

    Ok(())
}
