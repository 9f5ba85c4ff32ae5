//! Shared State: The part of a screen other threads may touch.

use crate::actor::{Sender, Task};
use crate::component::CapturedMouse;
use crate::event::Event;
use crate::terminal::SignalCounters;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A frame requested after this long idle restarts the animation clock, so
/// the first step after a pause does not jump.
const ANIMATION_HYSTERESIS: Duration = Duration::from_millis(33);

/// Flags and mailbox of one screen, safe to share across threads.
pub(crate) struct ScreenShared {
    quit: AtomicBool,
    mouse_captured: AtomicBool,
    animation_requested: AtomicBool,
    previous_animation_time: Mutex<Instant>,
    sender: Mutex<Option<Sender<Task>>>,
    /// Ctrl-C and Ctrl-Z seen by the loop, drained with the OS signals.
    pub(crate) signals: SignalCounters,
}

impl ScreenShared {
    pub(crate) fn new() -> Self {
        Self {
            quit: AtomicBool::new(false),
            mouse_captured: AtomicBool::new(false),
            animation_requested: AtomicBool::new(false),
            previous_animation_time: Mutex::new(Instant::now()),
            sender: Mutex::new(None),
            signals: SignalCounters::new(),
        }
    }

    /// Open the mailbox for a new install.
    pub(crate) fn open(&self, sender: Sender<Task>) {
        self.quit.store(false, Ordering::Release);
        *self.sender.lock() = Some(sender);
    }

    /// Flip the quit flag and close the mailbox. Tasks posted afterwards
    /// are dropped.
    pub(crate) fn exit_now(&self) {
        self.quit.store(true, Ordering::Release);
        self.sender.lock().take();
    }

    pub(crate) fn has_quitted(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    /// Enqueue `task`. Returns false when the mailbox is closed.
    pub(crate) fn post(&self, task: Task) -> bool {
        match &*self.sender.lock() {
            Some(sender) => {
                sender.send(task);
                true
            }
            None => {
                tracing::trace!(?task, "task dropped, screen not running");
                false
            }
        }
    }

    pub(crate) fn request_animation_frame(&self) {
        if self.animation_requested.swap(true, Ordering::AcqRel) {
            return;
        }
        let now = Instant::now();
        let mut previous = self.previous_animation_time.lock();
        if now.duration_since(*previous) >= ANIMATION_HYSTERESIS {
            *previous = now;
        }
    }

    pub(crate) fn animation_requested(&self) -> bool {
        self.animation_requested.load(Ordering::Acquire)
    }

    /// Consume a pending frame request and return the time since the
    /// previous step. `None` when nobody asked.
    pub(crate) fn take_animation_step(&self) -> Option<Duration> {
        if !self.animation_requested.swap(false, Ordering::AcqRel) {
            return None;
        }
        let now = Instant::now();
        let mut previous = self.previous_animation_time.lock();
        let delta = now.duration_since(*previous);
        *previous = now;
        Some(delta)
    }

    pub(crate) fn reset_animation_clock(&self) {
        *self.previous_animation_time.lock() = Instant::now();
    }

    pub(crate) fn capture_mouse(self: &Arc<Self>) -> Option<CapturedMouse> {
        if self
            .mouse_captured
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!("mouse capture refused, already held");
            return None;
        }
        Some(CapturedMouse::new(Arc::clone(self)))
    }

    pub(crate) fn release_mouse(&self) {
        self.mouse_captured.store(false, Ordering::Release);
    }

    pub(crate) fn is_mouse_captured(&self) -> bool {
        self.mouse_captured.load(Ordering::Acquire)
    }
}

impl Default for ScreenShared {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe handle to a screen.
///
/// Handed to components through [`Event::screen`] and to animations through
/// [`Params`](crate::animation::Params). Everything it does is funnelled
/// through the screen's task queue, so it is safe to call from any thread
/// and it never touches the component tree directly.
#[derive(Clone)]
pub struct ScreenHandle {
    shared: Arc<ScreenShared>,
}

impl ScreenHandle {
    pub(crate) const fn from_shared(shared: Arc<ScreenShared>) -> Self {
        Self { shared }
    }

    /// Run `closure` on the loop thread, between two tasks. Dropped when the
    /// screen is not running.
    pub fn post(&self, closure: impl FnOnce() + Send + 'static) {
        self.shared.post(Task::Closure(Box::new(closure)));
    }

    /// Dispatch `event` to the component tree as if it had been typed.
    pub fn post_event(&self, event: Event) {
        self.shared.post(Task::Event(event));
    }

    /// Ask the loop to stop once the tasks already queued are handled.
    pub fn exit(&self) {
        let shared = Arc::clone(&self.shared);
        self.shared
            .post(Task::Closure(Box::new(move || shared.exit_now())));
    }

    /// Step animations on the next tick.
    pub fn request_animation_frame(&self) {
        self.shared.request_animation_frame();
    }

    /// Take the mouse. `None` while another token is alive.
    pub fn capture_mouse(&self) -> Option<CapturedMouse> {
        self.shared.capture_mouse()
    }

    /// Whether the loop was asked to stop and has not restarted since.
    pub fn has_quitted(&self) -> bool {
        self.shared.has_quitted()
    }
}

impl std::fmt::Debug for ScreenHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenHandle")
            .field("quit", &self.shared.has_quitted())
            .field("mouse_captured", &self.shared.is_mouse_captured())
            .finish_non_exhaustive()
    }
}
