//! Query providers.
//!
//! Each provider interprets the whole query text under its own rule and
//! reports its results through a single completion callback:
//!
//! | Provider    | Applies to        | Work        |
//! |-------------|-------------------|-------------|
//! | Application | no `=`/`$` sigil  | synchronous |
//! | Calculator  | `=expression`     | synchronous |
//! | File        | everything        | background  |
//! | Terminal    | `$command`        | synchronous |
//! | URL         | everything        | synchronous |
//!
//! Synchronous providers call `on_complete` exactly once before `query`
//! returns, possibly with an empty list. The File provider hands its
//! callback to the [`TaskRunner`](crate::task::TaskRunner), which runs it on
//! the caller's thread when the caller drains completions.

mod application;
mod calculator;
mod file;
mod terminal;
mod url;

pub use application::ApplicationProvider;
pub use calculator::CalculatorProvider;
pub use file::FileProvider;
pub use terminal::TerminalProvider;
pub use url::UrlProvider;

use crate::apps::{AppCatalog, DesktopEntryCatalog};
use crate::calc::ArithmeticEvaluator;
use crate::config::Config;
use crate::fuzzy::SubsequenceMatcher;
use crate::icon::IconRegistry;
use crate::result::{ResultKind, SearchResult};
use crate::task::TaskRunner;
use std::sync::Arc;

/// Sigil that routes a query to the Calculator provider.
pub const CALCULATOR_SIGIL: char = '=';

/// Sigil that routes a query to the Terminal provider.
pub const TERMINAL_SIGIL: char = '$';

/// One of the five query providers.
pub enum Provider {
    Application(ApplicationProvider),
    Calculator(CalculatorProvider),
    File(FileProvider),
    Terminal(TerminalProvider),
    Url(UrlProvider),
}

impl Provider {
    /// The kind of result this provider produces.
    pub fn kind(&self) -> ResultKind {
        match self {
            Provider::Application(_) => ResultKind::Application,
            Provider::Calculator(_) => ResultKind::Calculator,
            Provider::File(_) => ResultKind::File,
            Provider::Terminal(_) => ResultKind::Terminal,
            Provider::Url(_) => ResultKind::Url,
        }
    }

    /// Interpret `text` and report results to `on_complete`.
    pub fn query<F>(&self, text: &str, on_complete: F)
    where
        F: FnOnce(Vec<SearchResult>) + Send + 'static,
    {
        match self {
            Provider::Application(provider) => provider.query(text, on_complete),
            Provider::Calculator(provider) => provider.query(text, on_complete),
            Provider::File(provider) => provider.query(text, on_complete),
            Provider::Terminal(provider) => provider.query(text, on_complete),
            Provider::Url(provider) => provider.query(text, on_complete),
        }
    }

    pub fn as_file(&self) -> Option<&FileProvider> {
        match self {
            Provider::File(provider) => Some(provider),
            _ => None,
        }
    }
}

impl From<ApplicationProvider> for Provider {
    fn from(provider: ApplicationProvider) -> Self {
        Provider::Application(provider)
    }
}

impl From<CalculatorProvider> for Provider {
    fn from(provider: CalculatorProvider) -> Self {
        Provider::Calculator(provider)
    }
}

impl From<FileProvider> for Provider {
    fn from(provider: FileProvider) -> Self {
        Provider::File(provider)
    }
}

impl From<TerminalProvider> for Provider {
    fn from(provider: TerminalProvider) -> Self {
        Provider::Terminal(provider)
    }
}

impl From<UrlProvider> for Provider {
    fn from(provider: UrlProvider) -> Self {
        Provider::Url(provider)
    }
}

/// Build all five providers with the default collaborators.
///
/// Providers share one icon registry and one fuzzy matcher.
pub fn standard_providers(config: &Config, runner: &TaskRunner) -> Vec<Provider> {
    let icons = Arc::new(IconRegistry::new());
    let matcher = Arc::new(SubsequenceMatcher);

    let catalog: Arc<dyn AppCatalog> = if config.applications.dirs.is_empty() {
        Arc::new(DesktopEntryCatalog::xdg())
    } else {
        Arc::new(DesktopEntryCatalog::new(config.applications.dirs.clone()))
    };

    vec![
        ApplicationProvider::new(catalog, matcher.clone(), icons.clone()).into(),
        CalculatorProvider::new(Arc::new(ArithmeticEvaluator), icons.clone()).into(),
        FileProvider::new(config.files.clone(), runner.clone(), matcher, icons.clone()).into(),
        TerminalProvider::new(config.terminal.clone(), icons.clone()).into(),
        UrlProvider::new(icons).into(),
    ]
}
