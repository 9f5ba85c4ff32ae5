//! Captured Mouse: Exclusive ownership of the mouse for one gesture.

use crate::screen::ScreenShared;
use std::sync::Arc;

/// Token granting its holder priority over mouse events, typically for the
/// length of a drag. The capture is released when the token is dropped.
#[must_use = "the capture is released as soon as the token is dropped"]
pub struct CapturedMouse {
    screen: Option<Arc<ScreenShared>>,
}

impl CapturedMouse {
    /// A token taken from `screen`, which must already be marked captured.
    pub(crate) const fn new(screen: Arc<ScreenShared>) -> Self {
        Self {
            screen: Some(screen),
        }
    }

    /// A token bound to no screen. Handed out for events that did not come
    /// from a screen, where there is nothing to compete with.
    pub const fn detached() -> Self {
        Self { screen: None }
    }

    /// Whether the token holds a screen's capture.
    pub const fn is_detached(&self) -> bool {
        self.screen.is_none()
    }
}

impl Drop for CapturedMouse {
    fn drop(&mut self) {
        if let Some(screen) = self.screen.take() {
            screen.release_mouse();
        }
    }
}

impl std::fmt::Debug for CapturedMouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedMouse")
            .field("detached", &self.is_detached())
            .finish()
    }
}
