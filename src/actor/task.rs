//! Task: The unit of work carried from background threads to the screen loop.

use crate::event::Event;

/// A deferred callback, run on the screen loop thread.
pub type Closure = Box<dyn FnOnce() + Send>;

/// Work item consumed in FIFO order by the screen loop.
pub enum Task {
    /// Input to dispatch to the component tree.
    Event(Event),
    /// Callback to invoke.
    Closure(Closure),
    /// Periodic animation heartbeat. Ignored unless a frame was requested.
    AnimationTick,
}

impl From<Event> for Task {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event(event) => f.debug_tuple("Event").field(event).finish(),
            Self::Closure(_) => f.write_str("Closure"),
            Self::AnimationTick => f.write_str("AnimationTick"),
        }
    }
}
