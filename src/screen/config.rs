//! Screen configuration.

use crate::actor::{InputTiming, POLL_TIMEOUT, TICK_INTERVAL};
use crate::event::ESCAPE_TIMEOUT;
use std::time::Duration;

/// Frames between two cursor position queries.
pub const CURSOR_REPORT_INTERVAL: u32 = 150;

/// How the frame size is chosen on every draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimension {
    /// Always this size.
    Fixed {
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
    /// The whole terminal.
    Fullscreen,
    /// The component's minimum size, capped by the terminal.
    FitComponent,
    /// The terminal width and the component's minimum height.
    #[default]
    TerminalOutput,
}

/// Configuration for a [`ScreenInteractive`](super::ScreenInteractive).
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    /// Frame sizing policy.
    pub dimension: Dimension,
    /// Draw on the alternate screen buffer.
    pub alternate_screen: bool,
    /// Enable mouse reporting.
    pub track_mouse: bool,
    /// Exit on Ctrl-C even when a component handled it.
    pub force_handle_ctrl_c: bool,
    /// Suspend on Ctrl-Z even when a component handled it.
    pub force_handle_ctrl_z: bool,
    /// Leave the terminal mode, signal handlers and input alone, and start
    /// no listener thread. For tests and output-only use.
    pub headless: bool,
    /// Terminal size to assume instead of asking the terminal.
    pub terminal_size: Option<(u16, u16)>,
    /// Input listener poll period.
    pub input_poll: Duration,
    /// Animation ticker period.
    pub tick_interval: Duration,
    /// Idle time after which a lone `ESC` is reported as the Escape key.
    pub escape_timeout: Duration,
    /// Frames between cursor position queries, used to map mouse
    /// coordinates to the frame.
    pub cursor_report_interval: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            dimension: Dimension::default(),
            alternate_screen: false,
            track_mouse: true,
            force_handle_ctrl_c: true,
            force_handle_ctrl_z: true,
            headless: false,
            terminal_size: None,
            input_poll: POLL_TIMEOUT,
            tick_interval: TICK_INTERVAL,
            escape_timeout: ESCAPE_TIMEOUT,
            cursor_report_interval: CURSOR_REPORT_INTERVAL,
        }
    }
}

impl ScreenConfig {
    /// A `width` x `height` frame drawn inline.
    pub fn fixed_size(width: u16, height: u16) -> Self {
        Self::default().with_dimension(Dimension::Fixed { width, height })
    }

    /// The whole terminal, on the alternate screen.
    pub fn fullscreen() -> Self {
        Self::default()
            .with_dimension(Dimension::Fullscreen)
            .with_alternate_screen(true)
    }

    /// As small as the component allows, drawn inline.
    pub fn fit_component() -> Self {
        Self::default().with_dimension(Dimension::FitComponent)
    }

    /// Full width, as tall as the component needs, drawn inline.
    pub fn terminal_output() -> Self {
        Self::default().with_dimension(Dimension::TerminalOutput)
    }

    /// Set the sizing policy.
    #[must_use]
    pub const fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = dimension;
        self
    }

    /// Use the alternate screen buffer.
    #[must_use]
    pub const fn with_alternate_screen(mut self, enabled: bool) -> Self {
        self.alternate_screen = enabled;
        self
    }

    /// Enable or disable mouse reporting.
    #[must_use]
    pub const fn with_track_mouse(mut self, enabled: bool) -> Self {
        self.track_mouse = enabled;
        self
    }

    /// Exit on Ctrl-C only when no component handled it.
    #[must_use]
    pub const fn with_force_handle_ctrl_c(mut self, force: bool) -> Self {
        self.force_handle_ctrl_c = force;
        self
    }

    /// Suspend on Ctrl-Z only when no component handled it.
    #[must_use]
    pub const fn with_force_handle_ctrl_z(mut self, force: bool) -> Self {
        self.force_handle_ctrl_z = force;
        self
    }

    /// Run without touching the controlling terminal.
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Assume a terminal of `width` x `height`.
    #[must_use]
    pub const fn with_terminal_size(mut self, width: u16, height: u16) -> Self {
        self.terminal_size = Some((width, height));
        self
    }

    /// Set the input poll period.
    #[must_use]
    pub const fn with_input_poll(mut self, poll: Duration) -> Self {
        self.input_poll = poll;
        self
    }

    /// Set the animation ticker period.
    #[must_use]
    pub const fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the lone escape timeout.
    #[must_use]
    pub const fn with_escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    /// Set the frames between cursor position queries. Zero disables them.
    #[must_use]
    pub const fn with_cursor_report_interval(mut self, frames: u32) -> Self {
        self.cursor_report_interval = frames;
        self
    }

    pub(crate) const fn input_timing(&self) -> InputTiming {
        InputTiming {
            poll: self.input_poll,
            escape_timeout: self.escape_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScreenConfig::default();
        assert_eq!(config.dimension, Dimension::TerminalOutput);
        assert!(config.track_mouse);
        assert!(config.force_handle_ctrl_c);
        assert!(!config.alternate_screen);
        assert_eq!(config.input_poll, Duration::from_millis(20));
        assert_eq!(config.tick_interval, Duration::from_millis(15));
        assert_eq!(config.escape_timeout, Duration::from_millis(50));
        assert_eq!(config.cursor_report_interval, 150);
    }

    #[test]
    fn test_presets() {
        let config = ScreenConfig::fullscreen();
        assert_eq!(config.dimension, Dimension::Fullscreen);
        assert!(config.alternate_screen);

        let config = ScreenConfig::fixed_size(10, 4).with_headless(true);
        assert_eq!(config.dimension, Dimension::Fixed { width: 10, height: 4 });
        assert!(config.headless);
        assert!(!config.alternate_screen);
    }
}
