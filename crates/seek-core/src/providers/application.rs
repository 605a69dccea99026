use super::{CALCULATOR_SIGIL, TERMINAL_SIGIL};
use crate::apps::AppCatalog;
use crate::fuzzy::FuzzyMatcher;
use crate::icon::IconResolver;
use crate::result::SearchResult;
use std::sync::Arc;
use tracing::trace;

/// Fuzzy-matches installed application names.
///
/// Every match is kept, including negative scores.
pub struct ApplicationProvider {
    catalog: Arc<dyn AppCatalog>,
    matcher: Arc<dyn FuzzyMatcher>,
    icons: Arc<dyn IconResolver>,
}

impl ApplicationProvider {
    pub fn new(
        catalog: Arc<dyn AppCatalog>,
        matcher: Arc<dyn FuzzyMatcher>,
        icons: Arc<dyn IconResolver>,
    ) -> Self {
        ApplicationProvider {
            catalog,
            matcher,
            icons,
        }
    }

    pub fn query<F>(&self, text: &str, on_complete: F)
    where
        F: FnOnce(Vec<SearchResult>),
    {
        if text.starts_with(CALCULATOR_SIGIL) || text.starts_with(TERMINAL_SIGIL) {
            on_complete(Vec::new());
            return;
        }

        let results: Vec<SearchResult> = self
            .catalog
            .applications()
            .into_iter()
            .filter_map(|app| {
                let outcome = self.matcher.fuzzy_match(text, &app.name);
                if !outcome.matched {
                    return None;
                }
                let icon = self.icons.icon_for_executable(&app.executable);
                Some(SearchResult::application(icon, app, outcome.score))
            })
            .collect();

        trace!(query = text, matches = results.len(), "Application query");
        on_complete(results);
    }
}
