//! Restartable single-shot timer.
//!
//! Scheduling replaces any pending task, so a burst of calls runs only the
//! last one, `delay` after it was scheduled. Tasks run on one worker thread;
//! [`DebounceTimer::flush`] runs the pending task on the caller's thread
//! instead. [`DebounceTimer::run_now`] replaces the pending task with one
//! that runs immediately. Task execution is serialized in every case, so a
//! task the worker already started always finishes before the next begins.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Quiet period before a hand-off write.
pub const HANDOFF_DEBOUNCE_MS: u64 = 150;

type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct State {
    pending: Option<(Instant, Task)>,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    wake: Condvar,
    running: Mutex<()>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn run(&self, task: Task) {
        let _guard = self.running.lock().unwrap_or_else(|e| e.into_inner());
        task();
    }
}

pub struct DebounceTimer {
    shared: Arc<Shared>,
    delay: Duration,
    worker: Option<JoinHandle<()>>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("charforge-debounce".to_string())
            .spawn(move || worker_loop(&worker_shared));

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("Debounce worker unavailable, running tasks inline: {}", e);
                None
            }
        };
        Self {
            shared,
            delay,
            worker,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces the pending task and restarts the countdown.
    pub fn schedule(&self, task: impl FnOnce() + Send + 'static) {
        if self.worker.is_none() {
            self.shared.run(Box::new(task));
            return;
        }
        let mut state = self.shared.state();
        state.pending = Some((Instant::now() + self.delay, Box::new(task)));
        drop(state);
        self.shared.wake.notify_all();
    }

    /// Drops the pending task. Returns true if one was pending.
    pub fn cancel(&self) -> bool {
        self.shared.state().pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.shared.state().pending.is_some()
    }

    /// Drops the pending task and runs `task` on the caller's thread once any
    /// task already running on the worker has finished.
    pub fn run_now<T>(&self, task: impl FnOnce() -> T) -> T {
        self.cancel();
        let _guard = self.shared.running.lock().unwrap_or_else(|e| e.into_inner());
        self.cancel();
        task()
    }

    /// Runs the pending task now. Returns true if one ran.
    pub fn flush(&self) -> bool {
        let pending = self.shared.state().pending.take();
        match pending {
            Some((_, task)) => {
                self.shared.run(task);
                true
            }
            None => false,
        }
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.flush();
        self.shared.state().shutdown = true;
        self.shared.wake.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Debounce worker panicked");
            }
        }
    }
}

impl std::fmt::Debug for DebounceTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebounceTimer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}

fn worker_loop(shared: &Shared) {
    let mut state = shared.state();
    loop {
        if state.shutdown {
            return;
        }
        let deadline = state.pending.as_ref().map(|(deadline, _)| *deadline);
        match deadline {
            None => {
                state = shared.wake.wait(state).unwrap_or_else(|e| e.into_inner());
            }
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    if let Some((_, task)) = state.pending.take() {
                        drop(state);
                        shared.run(task);
                        state = shared.state();
                    }
                } else {
                    state = shared
                        .wake
                        .wait_timeout(state, deadline - now)
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|e| e.into_inner().0);
                }
            }
        }
    }
}
