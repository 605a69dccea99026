use crate::cache::{crawl, PathCache};
use crate::config::FilesConfig;
use crate::fuzzy::FuzzyMatcher;
use crate::icon::IconResolver;
use crate::result::{SearchResult, FILE_ICON};
use crate::task::{CancellationToken, Delivery, TaskHandle, TaskRunner};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Fuzzy-matches paths from the filesystem cache.
///
/// Every query triggers the one-shot cache build and starts a background
/// match task over the paths crawled so far. A newer query cancels the
/// previous match task. Matches scoring below zero are dropped.
pub struct FileProvider {
    cache: Arc<PathCache>,
    files: Arc<FilesConfig>,
    runner: TaskRunner,
    matcher: Arc<dyn FuzzyMatcher>,
    icons: Arc<dyn IconResolver>,
    delivery: Delivery,
    active_match: Mutex<Option<TaskHandle>>,
}

impl FileProvider {
    pub fn new(
        files: FilesConfig,
        runner: TaskRunner,
        matcher: Arc<dyn FuzzyMatcher>,
        icons: Arc<dyn IconResolver>,
    ) -> Self {
        let delivery = if files.deliver_superseded {
            Delivery::Always
        } else {
            Delivery::UnlessCancelled
        };

        FileProvider {
            cache: Arc::new(PathCache::new()),
            files: Arc::new(files),
            runner,
            matcher,
            icons,
            delivery,
            active_match: Mutex::new(None),
        }
    }

    /// Use an existing cache instead of a fresh one.
    pub fn with_cache(mut self, cache: Arc<PathCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<PathCache> {
        &self.cache
    }

    /// Start the crawl unless it was already started.
    ///
    /// Returns `true` if this call started it. Never waits for the crawl.
    pub fn build_filesystem_cache(&self) -> bool {
        if !self.cache.try_begin_build() {
            return false;
        }

        let cache = Arc::clone(&self.cache);
        let files = Arc::clone(&self.files);
        match self.runner.spawn_detached("crawl", move || {
            crawl(&cache, &files);
        }) {
            Ok(()) => true,
            Err(err) => {
                // Leave the cache empty rather than stuck in Building.
                error!(error = %err, "Failed to start filesystem crawl");
                self.cache.mark_ready();
                false
            }
        }
    }

    /// Block until the crawl has finished or `timeout` elapses.
    pub fn wait_for_cache(&self, timeout: Duration) -> bool {
        self.cache.wait_ready(timeout)
    }

    pub fn query<F>(&self, text: &str, on_complete: F)
    where
        F: FnOnce(Vec<SearchResult>) + Send + 'static,
    {
        self.build_filesystem_cache();

        let mut active = self.active_match.lock();
        if let Some(previous) = active.take() {
            debug!(task = previous.id(), "Superseding file match task");
            previous.cancel();
        }

        let query = text.to_string();
        let cache = Arc::clone(&self.cache);
        let matcher = Arc::clone(&self.matcher);
        let icons = Arc::clone(&self.icons);

        let work = move |token: &CancellationToken| {
            let snapshot = cache.snapshot();
            let icon = icons.default_icon(FILE_ICON);
            let mut results = Vec::new();

            for path in snapshot.iter() {
                if token.is_cancelled() {
                    debug!(query = %query, partial = results.len(), "File match cancelled");
                    break;
                }
                let outcome = matcher.fuzzy_match(&query, path);
                if outcome.matched && outcome.score >= 0 {
                    results.push(SearchResult::file(
                        Arc::clone(&icon),
                        path.to_string(),
                        outcome.score,
                    ));
                }
            }

            debug!(
                query = %query,
                scanned = snapshot.len(),
                matches = results.len(),
                "File match finished"
            );
            results
        };

        match self.runner.spawn("file-match", self.delivery, work, on_complete) {
            Ok(handle) => *active = Some(handle),
            Err(err) => warn!(error = %err, "Failed to start file match task"),
        }
    }
}
