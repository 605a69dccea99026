//! Icon handles shared between results and the rendering layer.
//!
//! Seek never decodes images; an [`Icon`] only identifies what the front end
//! should draw. Handles are reference counted and interned so every result
//! pointing at the same icon shares one allocation.

use dashmap::DashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where an icon comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Icon {
    /// A named icon from the desktop theme (e.g. "app-terminal")
    Named(String),

    /// The icon embedded in or associated with an executable
    Executable(PathBuf),
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Icon::Named(name) => write!(f, "{}", name),
            Icon::Executable(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolves icon handles for results.
pub trait IconResolver: Send + Sync {
    fn icon_for_executable(&self, path: &Path) -> Arc<Icon>;

    fn default_icon(&self, name: &str) -> Arc<Icon>;
}

/// Process-wide interning resolver.
#[derive(Debug, Default)]
pub struct IconRegistry {
    named: DashMap<String, Arc<Icon>>,
    executables: DashMap<PathBuf, Arc<Icon>>,
}

impl IconRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IconResolver for IconRegistry {
    fn icon_for_executable(&self, path: &Path) -> Arc<Icon> {
        if let Some(icon) = self.executables.get(path) {
            return Arc::clone(&icon);
        }
        self.executables
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Icon::Executable(path.to_path_buf())))
            .clone()
    }

    fn default_icon(&self, name: &str) -> Arc<Icon> {
        if let Some(icon) = self.named.get(name) {
            return Arc::clone(&icon);
        }
        self.named
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Icon::Named(name.to_string())))
            .clone()
    }
}
