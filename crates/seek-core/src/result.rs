//! Search results and their activation.
//!
//! A [`SearchResult`] is immutable once built: display text, a shared icon
//! handle, a score used only for ordering, and a kind-specific [`Payload`]
//! that drives [`SearchResult::activate`].
//!
//! Two results are equal when they have the same kind, title and subtitle.
//! The score is not part of a result's identity, so the caller can drop
//! duplicates coming from repeated queries.

use crate::apps::AppEntry;
use crate::config::TerminalConfig;
use crate::desktop::{Desktop, SpawnRequest};
use crate::error::{Result, SeekError};
use crate::icon::Icon;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

pub const CALCULATOR_ICON: &str = "app-calculator";
pub const CALCULATOR_SUBTITLE: &str = "'Enter' will copy to clipboard";
pub const CALCULATOR_SCORE: i32 = 100;

pub const FILE_ICON: &str = "filetype-folder";

pub const TERMINAL_ICON: &str = "app-terminal";
pub const TERMINAL_SUBTITLE: &str = "Run command in Terminal";
pub const TERMINAL_SCORE: i32 = 100;

pub const URL_ICON: &str = "app-browser";
pub const URL_SUBTITLE: &str = "'Enter' will open this URL in the browser";
pub const URL_SCORE: i32 = 50;

/// The provider family a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResultKind {
    Application,
    Calculator,
    File,
    Terminal,
    Url,
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultKind::Application => write!(f, "application"),
            ResultKind::Calculator => write!(f, "calculator"),
            ResultKind::File => write!(f, "file"),
            ResultKind::Terminal => write!(f, "terminal"),
            ResultKind::Url => write!(f, "url"),
        }
    }
}

/// A shell command plus the terminal that should run it.
#[derive(Debug, Clone)]
pub struct TerminalLaunch {
    pub command: String,
    pub terminal: Arc<TerminalConfig>,
}

/// Kind-specific data carried by a result.
#[derive(Debug, Clone)]
pub enum Payload {
    Application(Arc<AppEntry>),
    /// The formatted value is the result's title
    Calculator,
    /// Absolute path
    File(String),
    Terminal(TerminalLaunch),
    Url(Url),
}

impl Payload {
    pub fn kind(&self) -> ResultKind {
        match self {
            Payload::Application(_) => ResultKind::Application,
            Payload::Calculator => ResultKind::Calculator,
            Payload::File(_) => ResultKind::File,
            Payload::Terminal(_) => ResultKind::Terminal,
            Payload::Url(_) => ResultKind::Url,
        }
    }
}

/// One ranked, activatable candidate.
#[derive(Debug, Clone)]
pub struct SearchResult {
    icon: Arc<Icon>,
    title: String,
    subtitle: String,
    score: i32,
    payload: Payload,
}

impl SearchResult {
    pub fn application(icon: Arc<Icon>, app: Arc<AppEntry>, score: i32) -> Self {
        SearchResult {
            icon,
            title: app.name.clone(),
            subtitle: String::new(),
            score,
            payload: Payload::Application(app),
        }
    }

    pub fn calculator(icon: Arc<Icon>, display: String) -> Self {
        SearchResult {
            icon,
            title: display,
            subtitle: CALCULATOR_SUBTITLE.to_string(),
            score: CALCULATOR_SCORE,
            payload: Payload::Calculator,
        }
    }

    pub fn file(icon: Arc<Icon>, path: String, score: i32) -> Self {
        SearchResult {
            icon,
            title: path.clone(),
            subtitle: String::new(),
            score,
            payload: Payload::File(path),
        }
    }

    pub fn terminal(icon: Arc<Icon>, command: String, terminal: Arc<TerminalConfig>) -> Self {
        SearchResult {
            icon,
            title: command.clone(),
            subtitle: TERMINAL_SUBTITLE.to_string(),
            score: TERMINAL_SCORE,
            payload: Payload::Terminal(TerminalLaunch { command, terminal }),
        }
    }

    pub fn url(icon: Arc<Icon>, url: Url) -> Self {
        SearchResult {
            icon,
            title: url.to_string(),
            subtitle: URL_SUBTITLE.to_string(),
            score: URL_SCORE,
            payload: Payload::Url(url),
        }
    }

    pub fn icon(&self) -> &Arc<Icon> {
        &self.icon
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn kind(&self) -> ResultKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Perform the result's action.
    ///
    /// - Application: spawn the executable with the home directory as its
    ///   working directory. Fails if the home directory is unknown or the
    ///   spawn fails.
    /// - Calculator: copy the title to the clipboard. Never fails.
    /// - File: open the path as a `file://` URL.
    /// - Terminal: launch the configured terminal running the command.
    ///   Failures are logged only.
    /// - URL: open the URL.
    pub fn activate(&self, desktop: &dyn Desktop) -> Result<()> {
        match &self.payload {
            Payload::Application(app) => {
                let home = desktop
                    .home_dir()
                    .ok_or(SeekError::HomeDirectoryUnavailable)?;
                let request = SpawnRequest::new(app.executable.as_os_str(), desktop.environment())
                    .args(app.args.iter())
                    .current_dir(home);

                desktop
                    .spawn_detached(&request)
                    .map_err(|source| SeekError::Spawn {
                        program: request.display_program(),
                        source,
                    })?;
                info!(app = %app.name, "Launched application");
                Ok(())
            }
            Payload::Calculator => {
                if let Err(err) = desktop.set_clipboard_text(&self.title) {
                    warn!(error = %err, "Failed to copy calculation to clipboard");
                }
                Ok(())
            }
            Payload::File(path) => {
                let url = Url::from_file_path(path)
                    .map_err(|_| SeekError::InvalidPath { path: path.clone() })?;
                desktop.open(&url)
            }
            Payload::Terminal(launch) => {
                let request = SpawnRequest::new(&launch.terminal.program, desktop.environment())
                    .args(launch.terminal.args.iter())
                    .arg(&launch.command);

                if let Err(err) = desktop.spawn_detached(&request) {
                    warn!(
                        program = %request.display_program(),
                        command = %launch.command,
                        error = %err,
                        "Failed to launch terminal"
                    );
                }
                Ok(())
            }
            Payload::Url(url) => desktop.open(url),
        }
    }
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.title == other.title && self.subtitle == other.subtitle
    }
}

impl Eq for SearchResult {}
