//! `seek.toml` configuration.
//!
//! Every section and field has a default, so a partial file (or none at
//! all) is valid. The file lives in the platform config directory unless the
//! caller passes an explicit path.

use crate::error::{Result, SeekError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Top-level configuration.
///
/// ## Example
///
/// ```toml
/// [general]
/// max_results = 50
/// log_level = "info"
///
/// [files]
/// root = "/"
/// exclude = ["/proc", "/sys"]
/// deliver_superseded = false
///
/// [terminal]
/// program = "x-terminal-emulator"
/// args = ["-e"]
///
/// [applications]
/// dirs = ["/usr/share/applications"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    /// Crawl scope and match delivery for the File provider
    pub files: FilesConfig,

    /// Terminal used by the Terminal provider
    pub terminal: TerminalConfig,

    /// Where the Application provider looks for `.desktop` entries
    pub applications: ApplicationsConfig,
}

/// Caller-side settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Maximum number of merged results to display
    pub max_results: usize,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            max_results: 50,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory the crawl starts from
    pub root: PathBuf,

    /// Path prefixes that are neither recorded nor traversed
    pub exclude: Vec<String>,

    /// Deliver the partial results of a match task cancelled by a newer query
    pub deliver_superseded: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            root: PathBuf::from("/"),
            exclude: Vec::new(),
            deliver_superseded: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Terminal emulator executable
    pub program: String,

    /// Arguments placed before the command text
    pub args: Vec<String>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            program: "x-terminal-emulator".to_string(),
            args: vec!["-e".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationsConfig {
    /// Directories holding `.desktop` entries (empty = XDG defaults)
    pub dirs: Vec<PathBuf>,
}

impl Config {
    /// Read `seek.toml` from the platform config directory.
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_path()?)
    }

    /// Read configuration from `path`, falling back to defaults if the file
    /// does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Config::default());
            }
            Err(err) => return Err(err.into()),
        };

        info!(path = %path.display(), "Loaded configuration");
        toml::from_str(&text).map_err(|e| config_error("parse", path, e))
    }

    /// Write `seek.toml` to the platform config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path()?)
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).map_err(|e| config_error("serialize", path, e))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// `<config_dir>/seek.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "seek")
            .map(|dirs| dirs.config_dir().join("seek.toml"))
            .ok_or_else(|| SeekError::ConfigError {
                reason: "no config directory for this platform".to_string(),
            })
    }
}

impl FilesConfig {
    /// Check if `path` lies under one of the `exclude` prefixes.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|excluded| is_under(path, excluded))
    }
}

fn config_error(action: &str, path: &Path, err: impl Display) -> SeekError {
    SeekError::ConfigError {
        reason: format!("failed to {} {}: {}", action, path.display(), err),
    }
}

/// `true` if `path` equals `prefix` or lies below it.
///
/// `/proc` excludes `/proc/1` but not `/processes`.
pub(crate) fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
