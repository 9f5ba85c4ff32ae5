//! Mouse: Decoded pointer reports.

/// Mouse button, in terminal report order.
///
/// The numbering matches the xterm encoding: the two low bits select the
/// button and bit 6 shifts the id into the wheel range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button.
    Left,
    /// Middle button.
    Middle,
    /// Right button.
    Right,
    /// No button (motion report).
    None,
    /// Wheel scrolled up.
    WheelUp,
    /// Wheel scrolled down.
    WheelDown,
    /// Wheel scrolled left.
    WheelLeft,
    /// Wheel scrolled right.
    WheelRight,
}

impl MouseButton {
    /// Decode a button id in `0..8`.
    pub const fn from_code(code: i32) -> Self {
        match code & 7 {
            0 => Self::Left,
            1 => Self::Middle,
            2 => Self::Right,
            3 => Self::None,
            4 => Self::WheelUp,
            5 => Self::WheelDown,
            6 => Self::WheelLeft,
            _ => Self::WheelRight,
        }
    }

    /// Whether this is one of the wheel directions.
    pub const fn is_wheel(self) -> bool {
        matches!(
            self,
            Self::WheelUp | Self::WheelDown | Self::WheelLeft | Self::WheelRight
        )
    }
}

/// What the pointer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    /// Button released.
    Released,
    /// Button pressed.
    Pressed,
    /// Pointer moved (with or without a held button).
    Moved,
}

/// Snapshot of the previous mouse report, used for click and drag detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseState {
    /// Button of the previous report.
    pub button: MouseButton,
    /// Motion of the previous report.
    pub motion: Motion,
    /// Column of the previous report.
    pub x: i32,
    /// Row of the previous report.
    pub y: i32,
}

/// A mouse report.
///
/// Coordinates are raw terminal coordinates when produced by the parser; the
/// screen translates them to frame-relative coordinates before dispatch and
/// fills `previous` with the last dispatched report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mouse {
    /// Button involved.
    pub button: MouseButton,
    /// Press, release or move.
    pub motion: Motion,
    /// Shift held.
    pub shift: bool,
    /// Meta (alt) held.
    pub meta: bool,
    /// Control held.
    pub control: bool,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// The report dispatched before this one, if any.
    pub previous: Option<MouseState>,
}

impl Mouse {
    /// Create a report with no modifiers and no history.
    pub const fn new(button: MouseButton, motion: Motion, x: i32, y: i32) -> Self {
        Self {
            button,
            motion,
            shift: false,
            meta: false,
            control: false,
            x,
            y,
            previous: None,
        }
    }

    /// This report without its history.
    pub const fn state(&self) -> MouseState {
        MouseState {
            button: self.button,
            motion: self.motion,
            x: self.x,
            y: self.y,
        }
    }

    /// The button went from released to pressed.
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        is_down(self.button, self.motion, button)
            && !self
                .previous
                .is_some_and(|p| is_down(p.button, p.motion, button))
    }

    /// The button was pressed in the previous report and still is (a drag).
    pub fn is_held(&self, button: MouseButton) -> bool {
        is_down(self.button, self.motion, button)
            && self
                .previous
                .is_some_and(|p| is_down(p.button, p.motion, button))
    }

    /// The button went from pressed to released.
    pub fn is_released(&self, button: MouseButton) -> bool {
        !is_down(self.button, self.motion, button)
            && self
                .previous
                .is_some_and(|p| is_down(p.button, p.motion, button))
    }
}

fn is_down(current: MouseButton, motion: Motion, button: MouseButton) -> bool {
    current == button && motion == Motion::Pressed
}
