//! Filesystem path cache used by the File provider.
//!
//! The cache is filled once per process by a breadth-first crawl and never
//! invalidated. It is append-only: the crawl publishes one immutable segment
//! per listed directory, and match tasks take a [`PathSnapshot`] of the
//! segments published so far. Readers hold the lock only long enough to
//! clone a list of `Arc`s, so they never wait on filesystem I/O and never
//! observe a half-written entry.
//!
//! ## Build states
//!
//! `NotStarted -> Building -> Ready`, forward only. The first transition is a
//! compare-and-swap, so at most one crawl is ever started per cache.

use crate::config::FilesConfig;
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Progress of the one-shot cache build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BuildState {
    NotStarted = 0,
    Building = 1,
    Ready = 2,
}

impl BuildState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => BuildState::NotStarted,
            1 => BuildState::Building,
            _ => BuildState::Ready,
        }
    }
}

/// Append-only list of absolute paths.
pub struct PathCache {
    /// One immutable segment per crawled directory, in crawl order
    segments: RwLock<Vec<Arc<[String]>>>,

    /// Total number of paths across all segments
    len: AtomicUsize,

    /// Current [`BuildState`]
    state: AtomicU8,

    ready_lock: Mutex<()>,
    ready: Condvar,
}

impl std::fmt::Debug for PathCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathCache")
            .field("len", &self.len())
            .field("state", &self.state())
            .finish()
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PathCache {
    pub fn new() -> Self {
        PathCache {
            segments: RwLock::new(Vec::new()),
            len: AtomicUsize::new(0),
            state: AtomicU8::new(BuildState::NotStarted as u8),
            ready_lock: Mutex::new(()),
            ready: Condvar::new(),
        }
    }

    /// A cache that is already built from `paths`.
    #[cfg(test)]
    pub(crate) fn ready_with<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cache = Self::new();
        cache.state.store(BuildState::Building as u8, Ordering::Release);
        cache.publish(paths.into_iter().map(Into::into).collect());
        cache.mark_ready();
        cache
    }

    pub fn state(&self) -> BuildState {
        BuildState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == BuildState::Ready
    }

    /// Number of paths published so far.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The paths published so far.
    ///
    /// Later appends by an unfinished crawl are not visible through the
    /// returned snapshot.
    pub fn snapshot(&self) -> PathSnapshot {
        PathSnapshot {
            segments: self.segments.read().clone(),
        }
    }

    /// Block until the build is `Ready` or `timeout` elapses.
    ///
    /// Returns `true` if the cache is ready.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.ready_lock.lock();
        while !self.is_ready() {
            if self.ready.wait_until(&mut guard, deadline).timed_out() {
                return self.is_ready();
            }
        }
        true
    }

    /// Claim the build. Only the first caller ever gets `true`.
    pub(crate) fn try_begin_build(&self) -> bool {
        self.state
            .compare_exchange(
                BuildState::NotStarted as u8,
                BuildState::Building as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn publish(&self, batch: Vec<String>) {
        if batch.is_empty() {
            return;
        }
        let count = batch.len();
        self.segments.write().push(Arc::from(batch));
        self.len.fetch_add(count, Ordering::AcqRel);
    }

    pub(crate) fn mark_ready(&self) {
        // Store under the lock so a waiter cannot miss the notification.
        let _guard = self.ready_lock.lock();
        self.state.store(BuildState::Ready as u8, Ordering::Release);
        self.ready.notify_all();
    }
}

/// Point-in-time view of a [`PathCache`].
#[derive(Debug, Clone, Default)]
pub struct PathSnapshot {
    segments: Vec<Arc<[String]>>,
}

impl PathSnapshot {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .flat_map(|segment| segment.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.segments.iter().map(|segment| segment.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Fill `cache` by breadth-first traversal starting at `files.root`, then
/// mark it ready.
///
/// Symbolic links are neither recorded nor followed. Entries that cannot be
/// stat'ed are logged and skipped; unreadable directories are skipped. The
/// crawl has no cancellation point. Returns the number of recorded paths.
#[instrument(skip_all, fields(root = %files.root.display()))]
pub(crate) fn crawl(cache: &PathCache, files: &FilesConfig) -> usize {
    let started = Instant::now();
    info!("Building filesystem cache");

    let mut pending: VecDeque<PathBuf> = VecDeque::new();
    pending.push_back(files.root.clone());
    let mut recorded = 0usize;

    while let Some(dir) = pending.pop_front() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = %dir.display(), error = %err, "Skipping unreadable directory");
                continue;
            }
        };

        let mut batch = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "Failed to read directory entry");
                    continue;
                }
            };

            let path = entry.path();
            let metadata = match fs::symlink_metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Failed to stat entry");
                    continue;
                }
            };

            if metadata.file_type().is_symlink() {
                continue;
            }

            let Some(path_str) = path.to_str() else {
                debug!(path = %path.display(), "Skipping non-UTF-8 path");
                continue;
            };

            if files.is_excluded(path_str) {
                debug!(path = path_str, "Skipping excluded path");
                continue;
            }

            batch.push(path_str.to_string());
            if metadata.is_dir() {
                pending.push_back(path);
            }
        }

        recorded += batch.len();
        cache.publish(batch);
    }

    cache.mark_ready();
    info!(
        entries = recorded,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Filesystem cache ready"
    );
    recorded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;
    use tempfile::TempDir;

    fn files_config(root: &std::path::Path) -> FilesConfig {
        FilesConfig {
            root: root.to_path_buf(),
            ..FilesConfig::default()
        }
    }

    fn path_string(path: PathBuf) -> String {
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_crawl_records_files_and_directories() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("notes.txt"), "hello").unwrap();
        fs::create_dir(root.join("projects")).unwrap();
        fs::write(root.join("projects").join("plan.md"), "# plan").unwrap();

        let cache = PathCache::new();
        assert!(cache.try_begin_build());
        let recorded = crawl(&cache, &files_config(root));

        let paths: Vec<String> = cache.snapshot().iter().map(String::from).collect();
        assert_eq!(recorded, 3);
        assert_eq!(cache.len(), 3);
        assert!(cache.is_ready());
        assert!(paths.contains(&path_string(root.join("notes.txt"))));
        assert!(paths.contains(&path_string(root.join("projects"))));
        assert!(paths.contains(&path_string(root.join("projects").join("plan.md"))));
        assert!(paths.iter().all(|p| !p.ends_with("/.") && !p.ends_with("/..")));
    }

    #[cfg(unix)]
    #[test]
    fn test_crawl_skips_symlinks() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("real.txt"), "data").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        std::os::unix::fs::symlink(root.join("sub"), root.join("link")).unwrap();

        let cache = PathCache::new();
        crawl(&cache, &files_config(root));

        let paths: HashSet<String> = cache.snapshot().iter().map(String::from).collect();
        assert!(paths.contains(&path_string(root.join("real.txt"))));
        assert!(paths.contains(&path_string(root.join("sub"))));
        assert!(!paths.contains(&path_string(root.join("link"))));
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_crawl_is_breadth_first() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a").join("deep")).unwrap();
        fs::write(root.join("a").join("deep").join("leaf"), "").unwrap();
        fs::write(root.join("top"), "").unwrap();

        let cache = PathCache::new();
        crawl(&cache, &files_config(root));

        let paths: Vec<String> = cache.snapshot().iter().map(String::from).collect();
        let position = |p: PathBuf| {
            let p = path_string(p);
            paths.iter().position(|x| *x == p).unwrap()
        };
        let leaf = position(root.join("a").join("deep").join("leaf"));
        assert!(position(root.join("top")) < leaf);
        assert!(position(root.join("a")) < position(root.join("a").join("deep")));
        assert!(position(root.join("a").join("deep")) < leaf);
    }

    #[test]
    fn test_crawl_honors_excludes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("cache")).unwrap();
        fs::write(root.join("cache").join("blob"), "").unwrap();
        fs::write(root.join("keep"), "").unwrap();

        let files = FilesConfig {
            root: root.to_path_buf(),
            exclude: vec![path_string(root.join("cache"))],
            deliver_superseded: false,
        };
        let cache = PathCache::new();
        crawl(&cache, &files);

        let paths: Vec<String> = cache.snapshot().iter().map(String::from).collect();
        assert_eq!(paths, vec![path_string(root.join("keep"))]);
    }

    #[test]
    fn test_crawl_missing_root_still_becomes_ready() {
        let dir = TempDir::new().unwrap();
        let cache = PathCache::new();
        assert!(cache.try_begin_build());

        assert_eq!(crawl(&cache, &files_config(&dir.path().join("missing"))), 0);
        assert!(cache.is_ready());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_build_is_claimed_once() {
        let cache = Arc::new(PathCache::new());
        assert_eq!(cache.state(), BuildState::NotStarted);

        let claims: Vec<bool> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.try_begin_build())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(claims.iter().filter(|claimed| **claimed).count(), 1);
        assert_eq!(cache.state(), BuildState::Building);
        cache.mark_ready();
        assert!(!cache.try_begin_build());
    }

    #[test]
    fn test_wait_ready() {
        let cache = Arc::new(PathCache::new());
        assert!(!cache.wait_ready(Duration::from_millis(20)));

        cache.try_begin_build();
        let builder = Arc::clone(&cache);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            builder.publish(vec!["/a".to_string()]);
            builder.mark_ready();
        });

        assert!(cache.wait_ready(Duration::from_secs(5)));
        assert_eq!(cache.len(), 1);
        handle.join().unwrap();
    }

    #[test]
    fn test_snapshot_is_stable_while_crawl_appends() {
        let cache = PathCache::new();
        cache.publish(vec!["/a".to_string(), "/b".to_string()]);

        let snapshot = cache.snapshot();
        cache.publish(vec!["/c".to_string()]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.iter().collect::<Vec<_>>(), vec!["/a", "/b"]);
        assert_eq!(cache.snapshot().len(), 3);
    }
}
