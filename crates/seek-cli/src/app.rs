//! Application state: the caller that owns providers and merges results.

use parking_lot::Mutex;
use seek_core::{
    standard_providers, Config, FileProvider, Provider, ResultKind, SearchResult, SystemDesktop,
    TaskRunner,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How long a query may wait for background providers.
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// How long `--wait` may wait for the filesystem crawl.
pub const CACHE_TIMEOUT: Duration = Duration::from_secs(600);

/// Shared application state.
pub struct App {
    /// Configuration
    pub config: Config,

    /// Completion queue for background provider work
    pub runner: TaskRunner,

    /// All five providers
    pub providers: Vec<Provider>,

    /// Side effects for activation
    pub desktop: SystemDesktop,
}

impl App {
    /// Create a new application instance.
    pub fn new(config: Config) -> Self {
        let runner = TaskRunner::new();
        let providers = standard_providers(&config, &runner);
        debug!(providers = providers.len(), "Application initialized");

        App {
            config,
            runner,
            providers,
            desktop: SystemDesktop::new(),
        }
    }

    pub fn file_provider(&self) -> Option<&FileProvider> {
        self.providers.iter().find_map(Provider::as_file)
    }

    /// Query every provider and return the merged, ranked results.
    ///
    /// With `wait_for_cache`, the filesystem crawl finishes before files
    /// are matched; otherwise files come from whatever was crawled so far.
    pub fn search(&self, text: &str, limit: usize, wait_for_cache: bool) -> Vec<SearchResult> {
        if wait_for_cache {
            if let Some(files) = self.file_provider() {
                files.build_filesystem_cache();
                if !files.wait_for_cache(CACHE_TIMEOUT) {
                    warn!("Filesystem crawl still running, matching a partial cache");
                }
            }
        }

        let collected = Arc::new(Mutex::new(Vec::new()));
        for provider in &self.providers {
            let sink = Arc::clone(&collected);
            provider.query(text, move |results| sink.lock().extend(results));
        }

        if !self.runner.run_until_idle(QUERY_TIMEOUT) {
            warn!("Timed out waiting for background providers");
        }

        let results = std::mem::take(&mut *collected.lock());
        merge_results(results, limit)
    }
}

/// Drop duplicates (keeping the higher score), sort by descending score and
/// keep the first `limit`.
///
/// Ties keep the order in which results arrived.
pub fn merge_results(results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    let mut merged: Vec<SearchResult> = Vec::with_capacity(results.len());
    let mut positions: HashMap<(ResultKind, String, String), usize> = HashMap::new();

    for result in results {
        let key = (
            result.kind(),
            result.title().to_string(),
            result.subtitle().to_string(),
        );
        match positions.get(&key) {
            Some(&index) => {
                if result.score() > merged[index].score() {
                    merged[index] = result;
                }
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(result);
            }
        }
    }

    merged.sort_by(|a, b| b.score().cmp(&a.score()));
    merged.truncate(limit);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use seek_core::Icon;
    use std::fs;
    use tempfile::TempDir;

    fn icon() -> Arc<Icon> {
        Arc::new(Icon::Named("test".to_string()))
    }

    #[test]
    fn test_merge_drops_duplicates_keeping_best_score() {
        let results = vec![
            SearchResult::file(icon(), "/a".to_string(), 5),
            SearchResult::file(icon(), "/b".to_string(), 7),
            SearchResult::file(icon(), "/a".to_string(), 9),
        ];

        let merged = merge_results(results, 10);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title(), "/a");
        assert_eq!(merged[0].score(), 9);
        assert_eq!(merged[1].title(), "/b");
    }

    #[test]
    fn test_merge_sorts_and_truncates() {
        let results = vec![
            SearchResult::file(icon(), "/low".to_string(), 1),
            SearchResult::calculator(icon(), "4".to_string()),
            SearchResult::file(icon(), "/mid".to_string(), 50),
        ];

        let merged = merge_results(results, 2);
        let titles: Vec<&str> = merged.iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["4", "/mid"]);
    }

    fn test_config(root: &TempDir, apps: &TempDir) -> Config {
        let mut config = Config::default();
        config.files.root = root.path().to_path_buf();
        config.applications.dirs = vec![apps.path().to_path_buf()];
        config
    }

    #[test]
    fn test_search_calculator_ranks_first() {
        let root = TempDir::new().unwrap();
        let apps = TempDir::new().unwrap();
        let app = App::new(test_config(&root, &apps));

        let results = app.search("=6*7", 10, false);
        assert_eq!(results[0].title(), "42");
        assert_eq!(results[0].kind(), ResultKind::Calculator);
    }

    #[test]
    fn test_search_finds_files_after_crawl() {
        let root = TempDir::new().unwrap();
        let apps = TempDir::new().unwrap();
        fs::write(root.path().join("budget.ods"), "").unwrap();
        fs::write(
            apps.path().join("calc.desktop"),
            "[Desktop Entry]\nName=Budget Planner\nExec=planner\nType=Application\n",
        )
        .unwrap();
        let app = App::new(test_config(&root, &apps));

        let results = app.search("budget", 50, true);
        assert!(results
            .iter()
            .any(|r| r.kind() == ResultKind::File && r.title().ends_with("budget.ods")));
        assert!(results
            .iter()
            .any(|r| r.kind() == ResultKind::Application && r.title() == "Budget Planner"));
        assert!(results.windows(2).all(|w| w[0].score() >= w[1].score()));
    }
}
