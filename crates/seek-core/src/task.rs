//! Background work with cooperative cancellation.
//!
//! Every background operation runs on its own worker thread. Work closures
//! receive a [`CancellationToken`] they are expected to poll; nothing is
//! ever interrupted forcibly. Results travel back through a completion
//! queue that the caller drains on its own thread ([`TaskRunner::run_pending`],
//! [`TaskRunner::wait`], [`TaskRunner::run_until_idle`]), so completion
//! callbacks may touch caller-owned state without further synchronization.

use crate::error::Result;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What happens to the result of a task that was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// The completion callback always runs, with whatever the work returned
    #[default]
    Always,

    /// The completion callback is skipped once the task is cancelled
    UnlessCancelled,
}

/// Handle to a spawned task.
#[derive(Debug)]
pub struct TaskHandle {
    id: u64,
    token: CancellationToken,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Ask the task to stop at its next cancellation check.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

type Completion = Box<dyn FnOnce() + Send>;

struct RunnerInner {
    completed_tx: Sender<Completion>,
    completed_rx: Receiver<Completion>,
    in_flight: AtomicUsize,
    next_id: AtomicU64,
}

/// Spawns background tasks and hands their results back to the caller.
///
/// Cloning is cheap; clones share the same completion queue.
#[derive(Clone)]
pub struct TaskRunner {
    inner: Arc<RunnerInner>,
}

impl std::fmt::Debug for TaskRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRunner")
            .field("in_flight", &self.in_flight())
            .field("pending", &self.inner.completed_rx.len())
            .finish()
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter even if the work panics.
struct InFlightGuard(Arc<RunnerInner>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);

impl TaskRunner {
    pub fn new() -> Self {
        let (completed_tx, completed_rx) = unbounded();
        TaskRunner {
            inner: Arc::new(RunnerInner {
                completed_tx,
                completed_rx,
                in_flight: AtomicUsize::new(0),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Run `work` on a new worker thread and queue `on_complete` with its
    /// output.
    ///
    /// The callback runs when the caller next drains the completion queue,
    /// subject to `delivery`.
    pub fn spawn<T, W, C>(
        &self,
        name: &str,
        delivery: Delivery,
        work: W,
        on_complete: C,
    ) -> Result<TaskHandle>
    where
        T: Send + 'static,
        W: FnOnce(&CancellationToken) -> T + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let worker_token = token.clone();

        self.inner.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlightGuard(Arc::clone(&self.inner));

        thread::Builder::new()
            .name(format!("seek-{}", name))
            .spawn(move || {
                let value = work(&worker_token);

                if delivery == Delivery::UnlessCancelled && worker_token.is_cancelled() {
                    debug!(task = id, "Dropping result of cancelled task");
                } else {
                    let completion: Completion = Box::new(move || {
                        // Cancellation may have arrived while the result sat in the queue.
                        if delivery == Delivery::UnlessCancelled && worker_token.is_cancelled() {
                            debug!(task = id, "Dropping result of cancelled task");
                            return;
                        }
                        on_complete(value);
                    });
                    let _ = guard.0.completed_tx.send(completion);
                }

                drop(guard);
            })?;

        debug!(task = id, name, "Spawned background task");
        Ok(TaskHandle { id, token })
    }

    /// Run `work` on a new worker thread with no completion callback.
    ///
    /// Detached work is not counted by [`in_flight`](Self::in_flight).
    pub fn spawn_detached<W>(&self, name: &str, work: W) -> Result<()>
    where
        W: FnOnce() + Send + 'static,
    {
        thread::Builder::new()
            .name(format!("seek-{}", name))
            .spawn(work)?;
        debug!(name, "Spawned detached task");
        Ok(())
    }

    /// Number of spawned tasks whose work has not finished yet.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Run every queued completion on the calling thread without blocking.
    ///
    /// Returns the number of completions processed.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        while let Ok(completion) = self.inner.completed_rx.try_recv() {
            completion();
            count += 1;
        }
        count
    }

    /// Block until a completion arrives or `timeout` elapses, then drain the
    /// queue.
    pub fn wait(&self, timeout: Duration) -> usize {
        match self.inner.completed_rx.recv_timeout(timeout) {
            Ok(completion) => {
                completion();
                1 + self.run_pending()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Process completions until no task is in flight and the queue is
    /// empty, or until `timeout` elapses.
    ///
    /// Returns `true` if the runner went idle.
    pub fn run_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.run_pending();
            if self.in_flight() == 0 {
                // Work finishes only after its completion is queued.
                self.run_pending();
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.wait(POLL_INTERVAL.min(deadline - now));
        }
    }
}
