//! `OutputBuffer`: Single-syscall output buffer for control sequences.

use crate::error::Result;
use std::io::Write;

/// Cursor position query (DSR). Answered with `ESC [ row ; col R`.
pub const REQUEST_CURSOR_POSITION: &str = "\x1B[6n";

/// Cursor shape query (DECRQSS for DECSCUSR). Answered with `ESC P 1 $ r N SP q ESC \`.
pub const REQUEST_CURSOR_SHAPE: &str = "\x1BP$q q\x1B\\";

/// DEC private modes toggled with `CSI ? <n> h` / `CSI ? <n> l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecMode {
    /// Automatic line wrap.
    LineWrap,
    /// Cursor visibility.
    Cursor,
    /// Button press and release reports.
    MouseVt200,
    /// Reports for every motion, pressed or not.
    MouseAnyEvent,
    /// Decimal coordinates.
    MouseUrxvt,
    /// `CSI <` encoding with separate release reports.
    MouseSgrExt,
    /// Alternate screen buffer, saving the cursor.
    AlternateScreen,
}

impl DecMode {
    /// Every mouse mode this crate decodes, in enable order.
    pub const MOUSE: [Self; 4] = [
        Self::MouseVt200,
        Self::MouseAnyEvent,
        Self::MouseUrxvt,
        Self::MouseSgrExt,
    ];

    /// Mode number.
    pub const fn code(self) -> u16 {
        match self {
            Self::LineWrap => 7,
            Self::Cursor => 25,
            Self::MouseVt200 => 1000,
            Self::MouseAnyEvent => 1003,
            Self::MouseUrxvt => 1015,
            Self::MouseSgrExt => 1006,
            Self::AlternateScreen => 1049,
        }
    }
}

/// Pre-allocated buffer for building escape sequences.
///
/// A whole frame, with its cursor bookkeeping, is accumulated here and then
/// flushed in a single `write()` to prevent flickering.
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the buffer length.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Append the contents of another buffer.
    #[inline]
    pub fn append(&mut self, other: &Self) {
        self.data.extend_from_slice(&other.data);
    }

    /// Set DEC private modes.
    pub fn set_modes(&mut self, modes: &[DecMode]) {
        self.write_modes(modes, b'h');
    }

    /// Reset DEC private modes.
    pub fn reset_modes(&mut self, modes: &[DecMode]) {
        self.write_modes(modes, b'l');
    }

    fn write_modes(&mut self, modes: &[DecMode], action: u8) {
        if modes.is_empty() {
            return;
        }
        self.data.extend_from_slice(b"\x1B[?");
        for (i, mode) in modes.iter().enumerate() {
            if i > 0 {
                self.data.push(b';');
            }
            let _ = write!(self.data, "{}", mode.code());
        }
        self.data.push(action);
    }

    /// Move the cursor up `n` rows. No-op for zero.
    #[inline]
    pub fn cursor_up(&mut self, n: u16) {
        self.cursor_step(n, 'A');
    }

    /// Move the cursor down `n` rows.
    #[inline]
    pub fn cursor_down(&mut self, n: u16) {
        self.cursor_step(n, 'B');
    }

    /// Move the cursor right `n` columns.
    #[inline]
    pub fn cursor_right(&mut self, n: u16) {
        self.cursor_step(n, 'C');
    }

    /// Move the cursor left `n` columns.
    #[inline]
    pub fn cursor_left(&mut self, n: u16) {
        self.cursor_step(n, 'D');
    }

    fn cursor_step(&mut self, n: u16, direction: char) {
        if n > 0 {
            let _ = write!(self.data, "\x1B[{n}{direction}");
        }
    }

    /// Hide cursor.
    #[inline]
    pub fn cursor_hide(&mut self) {
        self.reset_modes(&[DecMode::Cursor]);
    }

    /// Show cursor.
    #[inline]
    pub fn cursor_show(&mut self) {
        self.set_modes(&[DecMode::Cursor]);
    }

    /// Set the cursor shape (DECSCUSR).
    #[inline]
    pub fn cursor_shape(&mut self, shape: i32) {
        let _ = write!(self.data, "\x1B[{shape} q");
    }

    /// Move from the bottom-left of a `height` rows frame back to its
    /// top-left, erasing every row on the way when `clear` is set.
    pub fn reset_position(&mut self, height: u16, clear: bool) {
        self.data.push(b'\r');
        if clear {
            self.data.extend_from_slice(b"\x1B[2K");
        }
        for _ in 1..height {
            self.data.extend_from_slice(b"\x1B[1A");
            if clear {
                self.data.extend_from_slice(b"\x1B[2K");
            }
        }
    }

    /// Erase from the cursor to the end of the screen, then home the cursor.
    #[inline]
    pub fn clear_below_and_home(&mut self) {
        self.data.extend_from_slice(b"\x1B[J\x1B[H");
    }

    /// Flush to a writer in a single syscall.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Write`](crate::error::TerminalError::Write) if the underlying writer fails.
    pub fn flush_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()?;
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TerminalError;

    fn text(buffer: &OutputBuffer) -> String {
        String::from_utf8_lossy(buffer.as_bytes()).into_owned()
    }

    /// Writer whose pipe has been closed.
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_flush_failure_is_write_error() {
        let mut out = OutputBuffer::new();
        out.write_str("x");
        let err = out.flush_to(&mut Closed).unwrap_err();
        assert!(matches!(err, TerminalError::Write(ref source) if source.kind() == std::io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn test_modes_are_joined() {
        let mut out = OutputBuffer::new();
        out.set_modes(&DecMode::MOUSE);
        assert_eq!(text(&out), "\x1B[?1000;1003;1015;1006h");

        out.clear();
        out.reset_modes(&[DecMode::AlternateScreen]);
        assert_eq!(text(&out), "\x1B[?1049l");

        out.clear();
        out.set_modes(&[]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_cursor_steps() {
        let mut out = OutputBuffer::new();
        out.cursor_up(2);
        out.cursor_left(0);
        out.cursor_right(3);
        assert_eq!(text(&out), "\x1B[2A\x1B[3C");
    }

    #[test]
    fn test_reset_position() {
        let mut out = OutputBuffer::new();
        out.reset_position(3, false);
        assert_eq!(text(&out), "\r\x1B[1A\x1B[1A");

        out.clear();
        out.reset_position(2, true);
        assert_eq!(text(&out), "\r\x1B[2K\x1B[1A\x1B[2K");

        out.clear();
        out.reset_position(0, false);
        assert_eq!(text(&out), "\r");
    }

    #[test]
    fn test_cursor_visibility_and_shape() {
        let mut out = OutputBuffer::new();
        out.cursor_hide();
        out.cursor_show();
        out.cursor_shape(5);
        assert_eq!(text(&out), "\x1B[?25l\x1B[?25h\x1B[5 q");
    }

    #[test]
    fn test_flush_to_writer() {
        let mut out = OutputBuffer::new();
        out.write_str("frame");
        let mut sink = Vec::new();
        out.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"frame");
    }
}
