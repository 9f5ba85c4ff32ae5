//! Context: Which screen currently owns the terminal.

use super::interactive::ScreenCore;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

thread_local! {
    static THREAD_DEFAULT: Context = Context::new();
}

/// Tracks the active screen among the screens sharing one terminal.
///
/// Starting a loop on a screen while another screen of the same context is
/// running suspends the running one; it is resumed when the nested loop
/// ends. Screens built without an explicit context share
/// [`Context::thread_default`]. Only screens given a separate
/// [`Context::new`] run side by side.
#[derive(Clone, Default)]
pub struct Context {
    active: Rc<RefCell<Option<Weak<ScreenCore>>>>,
}

impl Context {
    /// An empty context, independent of every other.
    pub fn new() -> Self {
        Self::default()
    }

    /// The context shared by the screens of this thread that were built
    /// without one.
    pub fn thread_default() -> Self {
        THREAD_DEFAULT.with(Self::clone)
    }

    /// Whether `self` and `other` track the same screens.
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.active, &other.active)
    }

    /// Whether a loop is currently running on a screen of this context.
    pub fn has_active_screen(&self) -> bool {
        self.active().is_some()
    }

    pub(crate) fn active(&self) -> Option<Rc<ScreenCore>> {
        self.active.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_active(&self, screen: Option<&Rc<ScreenCore>>) {
        *self.active.borrow_mut() = screen.map(Rc::downgrade);
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("has_active_screen", &self.has_active_screen())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_default_is_shared() {
        assert!(Context::thread_default().same_as(&Context::thread_default()));
        assert!(!Context::new().same_as(&Context::thread_default()));
        assert!(!Context::thread_default().has_active_screen());
    }

    #[test]
    fn test_thread_default_is_per_thread() {
        let here = Context::thread_default();
        let there_matches = std::thread::spawn(|| {
            let there = Context::thread_default();
            there.same_as(&Context::thread_default())
        })
        .join()
        .unwrap();
        assert!(there_matches);
        assert!(here.same_as(&Context::thread_default()));
    }
}
