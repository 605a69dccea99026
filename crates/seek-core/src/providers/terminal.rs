use super::TERMINAL_SIGIL;
use crate::config::TerminalConfig;
use crate::icon::IconResolver;
use crate::result::{SearchResult, TERMINAL_ICON};
use std::sync::Arc;

/// Offers to run `$command` queries in a terminal.
pub struct TerminalProvider {
    terminal: Arc<TerminalConfig>,
    icons: Arc<dyn IconResolver>,
}

impl TerminalProvider {
    pub fn new(terminal: TerminalConfig, icons: Arc<dyn IconResolver>) -> Self {
        TerminalProvider {
            terminal: Arc::new(terminal),
            icons,
        }
    }

    pub fn query<F>(&self, text: &str, on_complete: F)
    where
        F: FnOnce(Vec<SearchResult>),
    {
        let Some(command) = text.strip_prefix(TERMINAL_SIGIL) else {
            on_complete(Vec::new());
            return;
        };

        on_complete(vec![SearchResult::terminal(
            self.icons.default_icon(TERMINAL_ICON),
            command.to_string(),
            Arc::clone(&self.terminal),
        )]);
    }
}
