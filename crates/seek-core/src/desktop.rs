//! Desktop integration boundary.
//!
//! Activation is the only place Seek touches the outside world. Everything it
//! needs (launching processes, opening URLs, writing the clipboard, finding
//! the home directory) goes through the [`Desktop`] trait so front ends and
//! tests can substitute their own implementation.

use crate::error::{Result, SeekError};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};
use url::Url;

/// Snapshot of environment variables handed to spawned processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment(Arc<[(OsString, OsString)]>);

impl Default for Environment {
    fn default() -> Self {
        Environment(Arc::from(Vec::new()))
    }
}

impl Environment {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        Environment(std::env::vars_os().collect())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Environment(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.0.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A detached process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Executable name or path
    pub program: OsString,

    /// Arguments after the program name
    pub args: Vec<OsString>,

    /// Working directory for the child (None = inherit)
    pub current_dir: Option<PathBuf>,

    /// Complete environment of the child
    pub env: Environment,
}

impl SpawnRequest {
    pub fn new(program: impl Into<OsString>, env: Environment) -> Self {
        SpawnRequest {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Program name for log lines and errors.
    pub fn display_program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// Side-effecting services used by result activation.
pub trait Desktop: Send + Sync {
    /// The user's home directory, if it can be determined.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Environment given to every spawned process.
    fn environment(&self) -> Environment;

    /// Start a process without waiting for it.
    fn spawn_detached(&self, request: &SpawnRequest) -> std::io::Result<()>;

    /// Open a URL (including `file://` URLs) with the default handler.
    fn open(&self, url: &Url) -> Result<()>;

    /// Replace the clipboard contents with plain text.
    fn set_clipboard_text(&self, text: &str) -> Result<()>;
}

/// The real desktop: `std::process`, the `open` crate and `arboard`.
#[derive(Debug, Clone)]
pub struct SystemDesktop {
    env: Environment,
    home: Option<PathBuf>,
}

impl Default for SystemDesktop {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemDesktop {
    /// Capture the environment and home directory of the current process.
    pub fn new() -> Self {
        SystemDesktop {
            env: Environment::capture(),
            home: directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
        }
    }
}

impl Desktop for SystemDesktop {
    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn environment(&self) -> Environment {
        self.env.clone()
    }

    fn spawn_detached(&self, request: &SpawnRequest) -> std::io::Result<()> {
        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .env_clear()
            .envs(request.env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if let Some(dir) = &request.current_dir {
            command.current_dir(dir);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command.spawn()?;
        debug!(
            pid = child.id(),
            program = %request.display_program(),
            "Spawned detached process"
        );

        // The process is running either way; a missing reaper only leaves a zombie.
        reap(child, thread::Builder::new().name("seek-reaper".to_string()));
        Ok(())
    }

    fn open(&self, url: &Url) -> Result<()> {
        debug!(url = %url, "Opening URL");
        open::that(url.as_str()).map_err(|e| SeekError::open(url.as_str(), e.to_string()))
    }

    fn set_clipboard_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| SeekError::Clipboard {
            reason: e.to_string(),
        })?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| SeekError::Clipboard {
                reason: e.to_string(),
            })
    }
}

/// Wait for `child` on a thread built from `reaper`.
///
/// Returns `false` if the thread could not be started.
fn reap(mut child: Child, reaper: thread::Builder) -> bool {
    let pid = child.id();
    let spawned = reaper.spawn(move || match child.wait() {
        Ok(status) => debug!(pid, %status, "Detached process exited"),
        Err(err) => debug!(pid, error = %err, "Failed to wait for detached process"),
    });

    match spawned {
        Ok(_) => true,
        Err(err) => {
            warn!(pid, error = %err, "Failed to start reaper thread");
            false
        }
    }
}
