//! Input Actor: Dedicated thread for reading the terminal input stream.
//!
//! On unix the thread polls stdin with a short timeout and feeds raw bytes to
//! the [`TerminalInputParser`]. When the poll times out it reports the idle
//! time so that a pending lone `ESC` can be flushed.
//!
//! Windows consoles deliver input records instead of bytes. There the thread
//! reads crossterm events and re-encodes them as the VT sequences the parser
//! understands, so both paths converge on the same event stream.

use super::channel::Sender;
use super::task::Task;
use crate::event::{TerminalInputParser, ESCAPE_TIMEOUT};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default stdin poll timeout.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(20);

/// Bytes read from stdin per wakeup.
const READ_BUFFER_SIZE: usize = 100;

/// Timing knobs of the input listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputTiming {
    /// How long one poll waits before checking for shutdown.
    pub poll: Duration,
    /// Idle time after which a pending escape sequence is flushed.
    pub escape_timeout: Duration,
}

impl Default for InputTiming {
    fn default() -> Self {
        Self {
            poll: POLL_TIMEOUT,
            escape_timeout: ESCAPE_TIMEOUT,
        }
    }
}

/// Input listener thread handle.
pub struct InputActor {
    /// Handle to the input thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl InputActor {
    /// Spawn the input actor thread.
    ///
    /// # Arguments
    ///
    /// * `sender` - Channel decoded events are enqueued on.
    /// * `timing` - Poll and escape timeouts.
    pub fn spawn(sender: Sender<Task>, timing: InputTiming) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("treeterm-input".to_string())
            .spawn(move || {
                tracing::trace!("input listener started");
                Self::run_loop(sender, &shutdown_clone, timing);
                tracing::trace!("input listener stopped");
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    /// Signal the input thread to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the input thread to finish.
    ///
    /// Returns within one poll timeout of the call.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main input polling loop.
    #[cfg(unix)]
    fn run_loop(sender: Sender<Task>, shutdown: &AtomicBool, timing: InputTiming) {
        use std::time::Instant;

        let poll = timing.poll;
        let mut parser =
            TerminalInputParser::new(sender).with_escape_timeout(timing.escape_timeout);

        let mut buffer = [0u8; READ_BUFFER_SIZE];
        let mut last_input = Instant::now();
        while !shutdown.load(Ordering::Relaxed) {
            match unix::wait_readable(libc::STDIN_FILENO, poll) {
                Ok(true) => match unix::read(libc::STDIN_FILENO, &mut buffer) {
                    Ok(count) if count > 0 => {
                        for &byte in &buffer[..count] {
                            parser.add(byte);
                        }
                        last_input = Instant::now();
                    }
                    // End of file: stdin is gone, keep flushing pending bytes.
                    Ok(_) => {
                        thread::sleep(poll);
                        parser.timeout(last_input.elapsed());
                        last_input = Instant::now();
                    }
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to read stdin");
                        thread::sleep(poll);
                    }
                },
                Ok(false) => {
                    parser.timeout(last_input.elapsed());
                    last_input = Instant::now();
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    tracing::warn!(error = %err, "failed to poll stdin");
                    thread::sleep(poll);
                }
            }
        }
    }

    /// Main input polling loop.
    #[cfg(not(unix))]
    fn run_loop(sender: Sender<Task>, shutdown: &AtomicBool, timing: InputTiming) {
        use crate::event::Event;
        use crossterm::event;

        let poll = timing.poll;
        let resize = sender.clone();
        let mut parser =
            TerminalInputParser::new(sender).with_escape_timeout(timing.escape_timeout);

        while !shutdown.load(Ordering::Relaxed) {
            match event::poll(poll) {
                Ok(true) => match event::read() {
                    Ok(event::Event::Resize(..)) => resize.send(Task::Event(Event::CUSTOM)),
                    Ok(event) => {
                        for byte in encode::event(&event) {
                            parser.add(byte);
                        }
                    }
                    Err(err) => tracing::warn!(error = %err, "failed to read console input"),
                },
                Ok(false) => parser.timeout(poll),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to poll console input");
                    thread::sleep(poll);
                }
            }
        }
    }
}

impl Drop for InputActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(unix)]
mod unix {
    use std::io;
    use std::time::Duration;

    /// Wait until `fd` is readable or `timeout` elapses.
    #[allow(unsafe_code)]
    pub fn wait_readable(fd: libc::c_int, timeout: Duration) -> io::Result<bool> {
        let mut pollfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);
        // SAFETY: `pollfd` is a valid, exclusively borrowed array of one entry.
        let ready = unsafe { libc::poll(&mut pollfd, 1, millis) };
        if ready < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(ready > 0)
    }

    /// Read whatever is available on `fd`.
    #[allow(unsafe_code)]
    pub fn read(fd: libc::c_int, buffer: &mut [u8]) -> io::Result<usize> {
        // SAFETY: `buffer` is valid for writes of `buffer.len()` bytes.
        let count = unsafe { libc::read(fd, buffer.as_mut_ptr().cast(), buffer.len()) };
        usize::try_from(count).map_err(|_| io::Error::last_os_error())
    }
}

/// Re-encoding of console input records as VT input sequences.
#[cfg_attr(unix, allow(dead_code))]
mod encode {
    use crossterm::event::{
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    };

    /// Bytes a VT terminal would send for `event`.
    pub fn event(event: &Event) -> Vec<u8> {
        match event {
            Event::Key(key) => self::key(key),
            Event::Mouse(mouse) => self::mouse(mouse),
            Event::Paste(text) => text.as_bytes().to_vec(),
            Event::FocusGained | Event::FocusLost | Event::Resize(..) => Vec::new(),
        }
    }

    pub fn key(key: &KeyEvent) -> Vec<u8> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        let mut bytes = Vec::with_capacity(8);
        if alt {
            bytes.push(0x1B);
        }
        let sequence: &[u8] = match key.code {
            KeyCode::Char(c) if ctrl && c.is_ascii_alphabetic() => {
                bytes.push(c.to_ascii_lowercase() as u8 - b'a' + 1);
                return bytes;
            }
            KeyCode::Char(c) => {
                let mut utf8 = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                return bytes;
            }
            KeyCode::Enter => b"\r",
            KeyCode::Tab => b"\t",
            KeyCode::BackTab => b"\x1B[Z",
            KeyCode::Backspace => b"\x7F",
            KeyCode::Esc => b"\x1B",
            KeyCode::Up if ctrl => b"\x1B[1;5A",
            KeyCode::Down if ctrl => b"\x1B[1;5B",
            KeyCode::Right if ctrl => b"\x1B[1;5C",
            KeyCode::Left if ctrl => b"\x1B[1;5D",
            KeyCode::Up => b"\x1B[A",
            KeyCode::Down => b"\x1B[B",
            KeyCode::Right => b"\x1B[C",
            KeyCode::Left => b"\x1B[D",
            KeyCode::Home => b"\x1B[H",
            KeyCode::End => b"\x1B[F",
            KeyCode::PageUp => b"\x1B[5~",
            KeyCode::PageDown => b"\x1B[6~",
            KeyCode::Insert => b"\x1B[2~",
            KeyCode::Delete => b"\x1B[3~",
            KeyCode::F(n) => function_key(n),
            _ => b"",
        };
        bytes.extend_from_slice(sequence);
        bytes
    }

    fn function_key(n: u8) -> &'static [u8] {
        match n {
            1 => b"\x1BOP",
            2 => b"\x1BOQ",
            3 => b"\x1BOR",
            4 => b"\x1BOS",
            5 => b"\x1B[15~",
            6 => b"\x1B[17~",
            7 => b"\x1B[18~",
            8 => b"\x1B[19~",
            9 => b"\x1B[20~",
            10 => b"\x1B[21~",
            11 => b"\x1B[23~",
            12 => b"\x1B[24~",
            _ => b"",
        }
    }

    /// SGR (mode 1006) mouse report, 1-based coordinates.
    pub fn mouse(mouse: &MouseEvent) -> Vec<u8> {
        let button = |b: MouseButton| match b {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
        };
        let (mut code, release) = match mouse.kind {
            MouseEventKind::Down(b) => (button(b), false),
            MouseEventKind::Up(b) => (button(b), true),
            MouseEventKind::Drag(b) => (button(b) + 32, false),
            MouseEventKind::Moved => (3 + 32, false),
            MouseEventKind::ScrollUp => (64, false),
            MouseEventKind::ScrollDown => (65, false),
            MouseEventKind::ScrollLeft => (66, false),
            MouseEventKind::ScrollRight => (67, false),
        };
        if mouse.modifiers.contains(KeyModifiers::SHIFT) {
            code += 4;
        }
        if mouse.modifiers.contains(KeyModifiers::ALT) {
            code += 8;
        }
        if mouse.modifiers.contains(KeyModifiers::CONTROL) {
            code += 16;
        }
        let terminator = if release { 'm' } else { 'M' };
        format!(
            "\x1B[<{code};{};{}{terminator}",
            u32::from(mouse.column) + 1,
            u32::from(mouse.row) + 1
        )
        .into_bytes()
    }
}
