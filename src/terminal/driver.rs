//! Terminal Driver: Side effects of an installed screen.
//!
//! Every step that changes the terminal or the process pushes its own undo
//! onto a LIFO list. [`TerminalDriver::restore`] runs the whole list, so
//! whatever was acquired is released in reverse order, including when an
//! install stopped halfway.

use super::output::{DecMode, OutputBuffer};
use crate::actor::{InputActor, InputTiming, Sender, Task, TickerActor};
use crate::error::{Result, TerminalError};
use std::io::Write;
use std::time::Duration;

/// One release step. Receives the screen's output stream.
type Undo = Box<dyn FnOnce(&mut dyn Write)>;

/// Owner of the terminal state changes and listener threads of one install.
#[derive(Default)]
pub struct TerminalDriver {
    undo: Vec<Undo>,
    input: Option<InputActor>,
    ticker: Option<TickerActor>,
    os_signals: bool,
}

impl TerminalDriver {
    /// A driver with nothing installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a release step.
    pub fn push_undo(&mut self, undo: impl FnOnce(&mut dyn Write) + 'static) {
        self.undo.push(Box::new(undo));
    }

    /// Number of pending release steps.
    pub fn pending_undo(&self) -> usize {
        self.undo.len()
    }

    /// Whether the OS signal handlers of this install are in place.
    pub const fn has_os_signals(&self) -> bool {
        self.os_signals
    }

    /// Set `modes` now, reset them on restore.
    pub fn enable_modes(&mut self, out: &mut OutputBuffer, modes: &'static [DecMode]) {
        out.set_modes(modes);
        self.push_undo(move |writer| write_modes(writer, modes, false));
    }

    /// Reset `modes` now, set them again on restore.
    pub fn disable_modes(&mut self, out: &mut OutputBuffer, modes: &'static [DecMode]) {
        out.reset_modes(modes);
        self.push_undo(move |writer| write_modes(writer, modes, true));
    }

    /// Put stdin into raw mode: no echo, no line buffering, no signal keys,
    /// no flow control.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::RawMode`] when stdin is not a terminal.
    #[cfg(unix)]
    pub fn enter_raw_mode(&mut self) -> Result<()> {
        let original = unix::get_attributes(libc::STDIN_FILENO)?;
        let mut raw = original;
        raw.c_iflag &= !(libc::IGNBRK
            | libc::BRKINT
            | libc::PARMRK
            | libc::ISTRIP
            | libc::INLCR
            | libc::IGNCR
            | libc::ICRNL
            | libc::IXON);
        raw.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
        raw.c_cflag &= !(libc::CSIZE | libc::PARENB);
        raw.c_cflag |= libc::CS8;
        // The input thread polls; reads must never block.
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 0;
        unix::set_attributes(libc::STDIN_FILENO, &raw)?;
        tracing::debug!("terminal switched to raw mode");

        self.push_undo(move |_| {
            if let Err(err) = unix::set_attributes(libc::STDIN_FILENO, &original) {
                tracing::warn!(error = %err, "failed to restore terminal mode");
            }
        });
        Ok(())
    }

    /// Put the console into raw mode.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::RawMode`] when there is no console.
    #[cfg(not(unix))]
    pub fn enter_raw_mode(&mut self) -> Result<()> {
        crossterm::terminal::enable_raw_mode().map_err(TerminalError::RawMode)?;
        tracing::debug!("console switched to raw mode");
        self.push_undo(|_| {
            if let Err(err) = crossterm::terminal::disable_raw_mode() {
                tracing::warn!(error = %err, "failed to restore console mode");
            }
        });
        Ok(())
    }

    /// Route `signals` to the process-wide counters until restore.
    ///
    /// Handlers installed before a failure stay registered for undo.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Signal`] for the first handler that could
    /// not be installed.
    pub fn install_signal_handlers(&mut self, signals: &[libc::c_int]) -> Result<()> {
        use super::signals::os;

        for &signal in signals {
            let previous = os::install(signal)?;
            tracing::trace!(signal = os::name(signal), "signal handler installed");
            self.os_signals = true;
            self.push_undo(move |_| os::restore(signal, &previous));
        }
        Ok(())
    }

    /// Spawn the input listener and the animation ticker.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Spawn`] if a thread cannot be created. A
    /// listener started before the failure keeps running until
    /// [`stop_listeners`](Self::stop_listeners).
    pub fn start_listeners(
        &mut self,
        sender: &Sender<Task>,
        timing: InputTiming,
        tick_interval: Duration,
    ) -> Result<()> {
        let input =
            InputActor::spawn(sender.clone(), timing).map_err(|source| TerminalError::Spawn {
                name: "treeterm-input",
                source,
            })?;
        self.input = Some(input);

        let ticker = TickerActor::spawn(sender.clone(), tick_interval).map_err(|source| {
            TerminalError::Spawn {
                name: "treeterm-ticker",
                source,
            }
        })?;
        self.ticker = Some(ticker);
        Ok(())
    }

    /// Whether any listener thread is running.
    pub const fn has_listeners(&self) -> bool {
        self.input.is_some() || self.ticker.is_some()
    }

    /// Stop and join the listener threads. Takes at most one poll period.
    pub fn stop_listeners(&mut self) {
        let input = self.input.take();
        let ticker = self.ticker.take();
        // Signal both before joining either.
        if let Some(input) = &input {
            input.shutdown();
        }
        if let Some(ticker) = &ticker {
            ticker.shutdown();
        }
        if let Some(input) = input {
            input.join();
        }
        if let Some(ticker) = ticker {
            ticker.join();
        }
    }

    /// Run every release step, most recent first.
    pub fn restore(&mut self, writer: &mut dyn Write) {
        tracing::debug!(steps = self.undo.len(), "restoring terminal");
        while let Some(undo) = self.undo.pop() {
            undo(writer);
        }
        self.os_signals = false;
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop_listeners();
        if !self.undo.is_empty() {
            self.restore(&mut std::io::stdout());
        }
    }
}

fn write_modes(writer: &mut dyn Write, modes: &[DecMode], set: bool) {
    let mut out = OutputBuffer::with_capacity(32);
    if set {
        out.set_modes(modes);
    } else {
        out.reset_modes(modes);
    }
    if let Err(err) = out.flush_to(writer) {
        tracing::warn!(error = %err, "failed to restore terminal modes");
    }
}

#[cfg(unix)]
mod unix {
    use crate::error::{Result, TerminalError};
    use std::io;

    /// Read the line discipline of `fd`.
    #[allow(unsafe_code)]
    pub fn get_attributes(fd: libc::c_int) -> Result<libc::termios> {
        // SAFETY: isatty only inspects the descriptor.
        if unsafe { libc::isatty(fd) } == 0 {
            return Err(TerminalError::RawMode(io::Error::new(
                io::ErrorKind::Unsupported,
                "stdin is not a terminal",
            )));
        }
        // SAFETY: termios is plain data; tcgetattr fully initializes it on
        // success and the error path discards it.
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut termios) != 0 {
                return Err(TerminalError::RawMode(io::Error::last_os_error()));
            }
            Ok(termios)
        }
    }

    /// Apply a line discipline to `fd` immediately.
    #[allow(unsafe_code)]
    pub fn set_attributes(fd: libc::c_int, termios: &libc::termios) -> Result<()> {
        // SAFETY: `termios` is a valid, initialized termios struct.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } != 0 {
            return Err(TerminalError::RawMode(io::Error::last_os_error()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_restore_runs_undo_in_reverse() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut driver = TerminalDriver::new();
        for step in 0..3 {
            let order = Rc::clone(&order);
            driver.push_undo(move |_| order.borrow_mut().push(step));
        }
        assert_eq!(driver.pending_undo(), 3);

        driver.restore(&mut Vec::new());
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
        assert_eq!(driver.pending_undo(), 0);
    }

    #[test]
    fn test_modes_are_undone() {
        static ALTERNATE: [DecMode; 1] = [DecMode::AlternateScreen];
        static WRAP: [DecMode; 1] = [DecMode::LineWrap];

        let mut driver = TerminalDriver::new();
        let mut out = OutputBuffer::new();
        driver.enable_modes(&mut out, &ALTERNATE);
        driver.disable_modes(&mut out, &WRAP);
        assert_eq!(out.as_bytes(), b"\x1B[?1049h\x1B[?7l");

        let mut restored = Vec::new();
        driver.restore(&mut restored);
        assert_eq!(restored, b"\x1B[?7h\x1B[?1049l");
    }

    #[test]
    fn test_exit_signal_counted_until_restore() {
        use crate::terminal::signals::OS_SIGNALS;
        use crate::terminal::SignalAction;

        let mut driver = TerminalDriver::new();
        driver.install_signal_handlers(&[libc::SIGTERM]).unwrap();
        assert!(driver.has_os_signals());

        // SAFETY: the handler installed above only increments a counter.
        unsafe {
            libc::raise(libc::SIGTERM);
        }
        assert!(OS_SIGNALS.drain(SignalAction::Exit) >= 1);

        driver.restore(&mut Vec::new());
        assert!(!driver.has_os_signals());
        assert_eq!(driver.pending_undo(), 0);
    }

    #[test]
    fn test_listeners_start_and_stop() {
        let receiver = crate::actor::channel::<Task>();
        let sender = receiver.make_sender();
        let mut driver = TerminalDriver::new();
        driver
            .start_listeners(&sender, InputTiming::default(), Duration::from_millis(1))
            .unwrap();
        assert!(driver.has_listeners());

        // The ticker produces regardless of input.
        assert!(std::iter::from_fn(|| receiver.receive())
            .any(|task| matches!(task, Task::AnimationTick)));

        driver.stop_listeners();
        assert!(!driver.has_listeners());
    }
}
