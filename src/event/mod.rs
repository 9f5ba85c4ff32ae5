//! Event: Structured terminal input.
//!
//! Events are produced by the [`TerminalInputParser`] on the input listener
//! thread, or synthesized by the screen (the resize notification). They are
//! immutable values, except for the back-reference to the screen that
//! dispatches them.
//!
//! Special keys are identified by their canonical byte sequence, so comparing
//! against the associated constants is the usual way to match a key:
//!
//! ```
//! use treeterm::Event;
//!
//! let event = Event::special("\x1B[A");
//! assert_eq!(event, Event::ARROW_UP);
//! assert!(Event::from_char('j').is_character());
//! ```

mod mouse;
mod parser;

pub use mouse::{Motion, Mouse, MouseButton, MouseState};
pub use parser::{TerminalInputParser, ESCAPE_TIMEOUT};

use crate::screen::{ScreenHandle, ScreenShared};
use std::borrow::Cow;
use std::sync::{Arc, Weak};

/// Payload of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// One printable code point.
    Character,
    /// A control byte or an escape sequence (keys, unknown sequences).
    Special,
    /// A mouse report.
    Mouse(Mouse),
    /// Answer to a cursor position query. Consumed by the screen.
    CursorPosition {
        /// Column, 1-based.
        x: i32,
        /// Row, 1-based.
        y: i32,
    },
    /// Answer to a cursor shape query. Consumed by the screen.
    CursorShape(i32),
}

/// A terminal input event.
///
/// Equality compares the kind and the raw input, ignoring the screen
/// back-reference.
#[derive(Clone)]
pub struct Event {
    kind: EventKind,
    input: Cow<'static, str>,
    screen: Option<Weak<ScreenShared>>,
}

impl Event {
    /// Arrow left.
    pub const ARROW_LEFT: Self = Self::special_static("\x1B[D");
    /// Arrow right.
    pub const ARROW_RIGHT: Self = Self::special_static("\x1B[C");
    /// Arrow up.
    pub const ARROW_UP: Self = Self::special_static("\x1B[A");
    /// Arrow down.
    pub const ARROW_DOWN: Self = Self::special_static("\x1B[B");
    /// Ctrl + arrow left.
    pub const ARROW_LEFT_CTRL: Self = Self::special_static("\x1B[1;5D");
    /// Ctrl + arrow right.
    pub const ARROW_RIGHT_CTRL: Self = Self::special_static("\x1B[1;5C");
    /// Ctrl + arrow up.
    pub const ARROW_UP_CTRL: Self = Self::special_static("\x1B[1;5A");
    /// Ctrl + arrow down.
    pub const ARROW_DOWN_CTRL: Self = Self::special_static("\x1B[1;5B");
    /// Backspace. Both DEL and BS are normalized to this.
    pub const BACKSPACE: Self = Self::special_static("\x7F");
    /// Delete.
    pub const DELETE: Self = Self::special_static("\x1B[3~");
    /// Return. Carriage return is normalized to this.
    pub const RETURN: Self = Self::special_static("\n");
    /// A lone escape key, emitted after the idle timeout.
    pub const ESCAPE: Self = Self::special_static("\x1B");
    /// Tab.
    pub const TAB: Self = Self::special_static("\t");
    /// Shift + tab.
    pub const TAB_REVERSE: Self = Self::special_static("\x1B[Z");
    /// Insert.
    pub const INSERT: Self = Self::special_static("\x1B[2~");
    /// Home.
    pub const HOME: Self = Self::special_static("\x1B[H");
    /// End.
    pub const END: Self = Self::special_static("\x1B[F");
    /// Page up.
    pub const PAGE_UP: Self = Self::special_static("\x1B[5~");
    /// Page down.
    pub const PAGE_DOWN: Self = Self::special_static("\x1B[6~");
    /// F1.
    pub const F1: Self = Self::special_static("\x1BOP");
    /// F2.
    pub const F2: Self = Self::special_static("\x1BOQ");
    /// F3.
    pub const F3: Self = Self::special_static("\x1BOR");
    /// F4.
    pub const F4: Self = Self::special_static("\x1BOS");
    /// F5.
    pub const F5: Self = Self::special_static("\x1B[15~");
    /// F6.
    pub const F6: Self = Self::special_static("\x1B[17~");
    /// F7.
    pub const F7: Self = Self::special_static("\x1B[18~");
    /// F8.
    pub const F8: Self = Self::special_static("\x1B[19~");
    /// F9.
    pub const F9: Self = Self::special_static("\x1B[20~");
    /// F10.
    pub const F10: Self = Self::special_static("\x1B[21~");
    /// F11.
    pub const F11: Self = Self::special_static("\x1B[23~");
    /// F12.
    pub const F12: Self = Self::special_static("\x1B[24~");
    /// Ctrl-C, delivered as a byte since raw mode disables `ISIG`.
    pub const CTRL_C: Self = Self::special_static("\x03");
    /// Ctrl-Z.
    pub const CTRL_Z: Self = Self::special_static("\x1A");
    /// Application-defined event. The screen posts it on terminal resize.
    pub const CUSTOM: Self = Self::special_static("\0");

    const fn special_static(input: &'static str) -> Self {
        Self {
            kind: EventKind::Special,
            input: Cow::Borrowed(input),
            screen: None,
        }
    }

    /// A character event holding one code point (or grapheme) of text.
    pub fn character(text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: EventKind::Character,
            input: text.into(),
            screen: None,
        }
    }

    /// A character event for `c`.
    pub fn from_char(c: char) -> Self {
        Self::character(c.to_string())
    }

    /// A special event for a raw key sequence.
    pub fn special(input: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: EventKind::Special,
            input: input.into(),
            screen: None,
        }
    }

    /// A mouse event with the raw sequence it was decoded from.
    pub fn mouse(input: impl Into<Cow<'static, str>>, mouse: Mouse) -> Self {
        Self {
            kind: EventKind::Mouse(mouse),
            input: input.into(),
            screen: None,
        }
    }

    /// A cursor position report.
    pub fn cursor_position(input: impl Into<Cow<'static, str>>, x: i32, y: i32) -> Self {
        Self {
            kind: EventKind::CursorPosition { x, y },
            input: input.into(),
            screen: None,
        }
    }

    /// A cursor shape report.
    pub fn cursor_shape(input: impl Into<Cow<'static, str>>, shape: i32) -> Self {
        Self {
            kind: EventKind::CursorShape(shape),
            input: input.into(),
            screen: None,
        }
    }

    /// The payload.
    #[inline]
    pub const fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// The raw input, normalized for special keys.
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether this is a character event.
    #[inline]
    pub const fn is_character(&self) -> bool {
        matches!(self.kind, EventKind::Character)
    }

    /// The text of a character event.
    pub fn as_character(&self) -> Option<&str> {
        self.is_character().then(|| self.input())
    }

    /// Whether this is a mouse event.
    #[inline]
    pub const fn is_mouse(&self) -> bool {
        matches!(self.kind, EventKind::Mouse(_))
    }

    /// The mouse report, if any.
    pub const fn as_mouse(&self) -> Option<&Mouse> {
        match &self.kind {
            EventKind::Mouse(mouse) => Some(mouse),
            _ => None,
        }
    }

    /// Mutable access to the mouse report, if any.
    pub fn as_mouse_mut(&mut self) -> Option<&mut Mouse> {
        match &mut self.kind {
            EventKind::Mouse(mouse) => Some(mouse),
            _ => None,
        }
    }

    /// Whether this is a cursor position report.
    #[inline]
    pub const fn is_cursor_position(&self) -> bool {
        matches!(self.kind, EventKind::CursorPosition { .. })
    }

    /// The reported `(column, row)`, 1-based, if this is a position report.
    pub const fn as_cursor_position(&self) -> Option<(i32, i32)> {
        match self.kind {
            EventKind::CursorPosition { x, y } => Some((x, y)),
            _ => None,
        }
    }

    /// The reported cursor shape, if this is a shape report.
    pub const fn as_cursor_shape(&self) -> Option<i32> {
        match self.kind {
            EventKind::CursorShape(shape) => Some(shape),
            _ => None,
        }
    }

    /// The screen dispatching this event, if it is still alive.
    pub fn screen(&self) -> Option<ScreenHandle> {
        self.screen
            .as_ref()
            .and_then(Weak::upgrade)
            .map(ScreenHandle::from_shared)
    }

    pub(crate) fn set_screen(&mut self, screen: &Arc<ScreenShared>) {
        self.screen = Some(Arc::downgrade(screen));
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.input == other.input
    }
}

impl Eq for Event {}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_is_send() {
        fn assert_send<T: Send + 'static>() {}
        assert_send::<Event>();
    }

    #[test]
    fn test_special_equality() {
        assert_eq!(Event::special("\x1B[A"), Event::ARROW_UP);
        assert_ne!(Event::ARROW_UP, Event::ARROW_DOWN);
        assert_ne!(Event::character("\n"), Event::RETURN);
    }

    #[test]
    fn test_character_accessors() {
        let event = Event::from_char('é');
        assert!(event.is_character());
        assert_eq!(event.as_character(), Some("é"));
        assert!(!event.is_mouse());
        assert_eq!(Event::TAB.as_character(), None);
    }

    #[test]
    fn test_mouse_accessors() {
        let mut event = Event::mouse(
            "\x1B[<0;1;1M",
            Mouse::new(MouseButton::Left, Motion::Pressed, 1, 1),
        );
        assert!(event.is_mouse());
        if let Some(mouse) = event.as_mouse_mut() {
            mouse.x -= 1;
        }
        assert_eq!(event.as_mouse().map(|m| m.x), Some(0));
    }

    #[test]
    fn test_screen_reference_ignored_by_equality() {
        let shared = Arc::new(ScreenShared::new());
        let mut event = Event::TAB;
        event.set_screen(&shared);
        assert!(event.screen().is_some());
        assert_eq!(event, Event::TAB);

        drop(shared);
        assert!(event.screen().is_none());
    }
}
