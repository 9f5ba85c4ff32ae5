//! Ticker Actor: Dedicated thread for the animation heartbeat.
//!
//! The ticker sleeps for one interval, enqueues a [`Task::AnimationTick`],
//! and repeats. It never looks at whether anything is animating: the screen
//! loop discards ticks nobody asked for, so ticks are free to arrive faster
//! than frames are produced.

use super::channel::Sender;
use super::task::Task;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default time between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(15);

/// Owner of the animation heartbeat thread.
pub struct TickerActor {
    /// `None` once joined.
    handle: Option<JoinHandle<()>>,
    /// Checked once per interval.
    shutdown: Arc<AtomicBool>,
}

impl TickerActor {
    /// Start enqueuing a tick on `sender` every `interval`.
    pub fn spawn(sender: Sender<Task>, interval: Duration) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("treeterm-ticker".to_string())
            .spawn(move || {
                tracing::trace!("ticker started");
                Self::run_loop(&sender, &shutdown_clone, interval);
                tracing::trace!("ticker stopped");
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    /// Ask the thread to stop after its current sleep.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Stop the thread and wait for it. Returns within one interval.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(sender: &Sender<Task>, shutdown: &AtomicBool, interval: Duration) {
        while !shutdown.load(Ordering::Relaxed) {
            thread::sleep(interval);
            sender.send(Task::AnimationTick);
        }
    }
}

impl Drop for TickerActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
