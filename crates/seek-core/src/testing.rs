//! Collaborator doubles shared by unit tests.

use crate::apps::{AppCatalog, AppEntry};
use crate::desktop::{Desktop, Environment, SpawnRequest};
use crate::error::Result;
use crate::fuzzy::{FuzzyMatch, FuzzyMatcher};
use parking_lot::Mutex;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// A side effect requested from [`RecordingDesktop`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DesktopCall {
    Spawn(SpawnRequest),
    Open(String),
    Clipboard(String),
}

/// Desktop that records requests instead of performing them.
pub(crate) struct RecordingDesktop {
    calls: Mutex<Vec<DesktopCall>>,
    home: Option<PathBuf>,
    fail_spawn: bool,
}

impl RecordingDesktop {
    pub(crate) fn new() -> Self {
        RecordingDesktop {
            calls: Mutex::new(Vec::new()),
            home: Some(PathBuf::from("/home/tester")),
            fail_spawn: false,
        }
    }

    pub(crate) fn without_home(mut self) -> Self {
        self.home = None;
        self
    }

    pub(crate) fn failing_spawn(mut self) -> Self {
        self.fail_spawn = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<DesktopCall> {
        self.calls.lock().clone()
    }
}

impl Desktop for RecordingDesktop {
    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn environment(&self) -> Environment {
        Environment::from_vars([("HOME", "/home/tester"), ("PATH", "/usr/bin:/bin")])
    }

    fn spawn_detached(&self, request: &SpawnRequest) -> io::Result<()> {
        self.calls.lock().push(DesktopCall::Spawn(request.clone()));
        if self.fail_spawn {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"));
        }
        Ok(())
    }

    fn open(&self, url: &Url) -> Result<()> {
        self.calls.lock().push(DesktopCall::Open(url.to_string()));
        Ok(())
    }

    fn set_clipboard_text(&self, text: &str) -> Result<()> {
        self.calls.lock().push(DesktopCall::Clipboard(text.to_string()));
        Ok(())
    }
}

/// Matcher that accepts every candidate with one fixed outcome.
pub(crate) struct FixedMatcher {
    outcome: FuzzyMatch,
    calls: AtomicUsize,
}

impl FixedMatcher {
    pub(crate) fn new(outcome: FuzzyMatch) -> Self {
        FixedMatcher {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FuzzyMatcher for FixedMatcher {
    fn fuzzy_match(&self, _query: &str, _candidate: &str) -> FuzzyMatch {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome
    }
}

/// Application catalog that counts how often it is enumerated.
pub(crate) struct CountingCatalog {
    apps: Vec<Arc<AppEntry>>,
    calls: AtomicUsize,
}

impl CountingCatalog {
    pub(crate) fn new(apps: Vec<AppEntry>) -> Self {
        CountingCatalog {
            apps: apps.into_iter().map(Arc::new).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AppCatalog for CountingCatalog {
    fn applications(&self) -> Vec<Arc<AppEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.apps.clone()
    }
}
