//! Loop: Step-by-step driving of a screen.

use super::interactive::ScreenInteractive;
use crate::component::Component;

/// A running session of a screen with one root component.
///
/// Creating the loop installs the screen, suspending any screen of the same
/// context that was running. Dropping it uninstalls the screen and resumes
/// the suspended one. [`run`](Self::run) is the usual entry point;
/// [`run_once`](Self::run_once) lets an application interleave its own work.
pub struct Loop {
    screen: ScreenInteractive,
    component: Component,
}

impl Loop {
    /// Install `screen` and attach `component` as its root.
    pub fn new(screen: &ScreenInteractive, component: Component) -> Self {
        screen.core().pre_main();
        Self {
            screen: screen.clone(),
            component,
        }
    }

    /// Whether the screen was asked to exit.
    pub fn has_quitted(&self) -> bool {
        self.screen.core().has_quitted()
    }

    /// Handle every queued task, then repaint if needed. Never blocks.
    pub fn run_once(&self) {
        self.screen.core().run_once(self.component.as_ref());
    }

    /// Wait for at least one task, then behave like
    /// [`run_once`](Self::run_once).
    pub fn run_once_blocking(&self) {
        self.screen.core().run_once_blocking(self.component.as_ref());
    }

    /// Run until the screen exits.
    pub fn run(&self) {
        while !self.has_quitted() {
            self.run_once_blocking();
        }
    }
}

impl Drop for Loop {
    fn drop(&mut self) {
        self.screen.core().post_main();
    }
}

impl std::fmt::Debug for Loop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loop")
            .field("screen", &self.screen)
            .finish_non_exhaustive()
    }
}
