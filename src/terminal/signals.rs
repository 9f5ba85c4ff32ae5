//! Signals: Async-signal-safe counters drained by the screen loop.
//!
//! OS signal handlers only increment an atomic counter. The screen loop
//! drains the counters between tasks and acts on them from its own thread.
//! Ctrl-C and Ctrl-Z typed while the terminal is raw never raise a signal,
//! so the screen records them into its own set of counters and drains them
//! through the same path.

use std::sync::atomic::{AtomicUsize, Ordering};

/// What a pending signal asks the screen to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalAction {
    /// Leave the loop (SIGTERM, SIGINT, SIGABRT, ...).
    Exit,
    /// Suspend the process (SIGTSTP).
    Stop,
    /// The terminal changed size (SIGWINCH).
    Resize,
}

/// Pending signal counts, one per [`SignalAction`].
#[derive(Debug, Default)]
pub struct SignalCounters {
    exit: AtomicUsize,
    stop: AtomicUsize,
    resize: AtomicUsize,
}

impl SignalCounters {
    /// All counters at zero.
    pub const fn new() -> Self {
        Self {
            exit: AtomicUsize::new(0),
            stop: AtomicUsize::new(0),
            resize: AtomicUsize::new(0),
        }
    }

    const fn counter(&self, action: SignalAction) -> &AtomicUsize {
        match action {
            SignalAction::Exit => &self.exit,
            SignalAction::Stop => &self.stop,
            SignalAction::Resize => &self.resize,
        }
    }

    /// Count one occurrence. Safe to call from a signal handler.
    #[inline]
    pub fn record(&self, action: SignalAction) {
        self.counter(action).fetch_add(1, Ordering::SeqCst);
    }

    /// Take and zero the pending count.
    #[inline]
    pub fn drain(&self, action: SignalAction) -> usize {
        self.counter(action).swap(0, Ordering::SeqCst)
    }

    /// Whether any count is pending.
    pub fn has_pending(&self) -> bool {
        [SignalAction::Exit, SignalAction::Stop, SignalAction::Resize]
            .into_iter()
            .any(|action| self.counter(action).load(Ordering::SeqCst) > 0)
    }
}

/// Counters fed by the process-wide OS handlers.
pub(crate) static OS_SIGNALS: SignalCounters = SignalCounters::new();

/// Handler registration. The exit set goes through the C runtime's
/// `signal` where `sigaction` is missing; resize and suspend are POSIX only.
pub(crate) mod os {
    use super::{SignalAction, OS_SIGNALS};
    use crate::error::{Result, TerminalError};
    use std::io;

    /// Signals that end the loop.
    pub const EXIT_SIGNALS: [libc::c_int; 6] = [
        libc::SIGTERM,
        libc::SIGSEGV,
        libc::SIGINT,
        libc::SIGILL,
        libc::SIGABRT,
        libc::SIGFPE,
    ];

    /// Terminal resize and job control.
    #[cfg(unix)]
    pub const JOB_CONTROL_SIGNALS: [libc::c_int; 2] = [libc::SIGWINCH, libc::SIGTSTP];

    /// The disposition a handler replaced.
    #[cfg(unix)]
    pub type Previous = libc::sigaction;

    /// The disposition a handler replaced.
    #[cfg(not(unix))]
    pub type Previous = libc::sighandler_t;

    /// `SIG_ERR`, declared by the C runtime as `-1`.
    #[cfg(not(unix))]
    const SIGNAL_FAILED: libc::sighandler_t = libc::sighandler_t::MAX;

    /// Terminal restoration written when the process is about to die.
    const FATAL_RESET: &[u8] =
        b"\x1B[?1000;1003;1015;1006l\x1B[?7h\x1B[?25h\x1B[?1049l\x1B[0m\r\n";

    /// Human readable signal name.
    pub const fn name(signal: libc::c_int) -> &'static str {
        match signal {
            libc::SIGTERM => "SIGTERM",
            libc::SIGSEGV => "SIGSEGV",
            libc::SIGINT => "SIGINT",
            libc::SIGILL => "SIGILL",
            libc::SIGABRT => "SIGABRT",
            libc::SIGFPE => "SIGFPE",
            #[cfg(unix)]
            libc::SIGWINCH => "SIGWINCH",
            #[cfg(unix)]
            libc::SIGTSTP => "SIGTSTP",
            _ => "signal",
        }
    }

    extern "C" fn record_signal(signal: libc::c_int) {
        match signal {
            #[cfg(unix)]
            libc::SIGWINCH => OS_SIGNALS.record(SignalAction::Resize),
            #[cfg(unix)]
            libc::SIGTSTP => OS_SIGNALS.record(SignalAction::Stop),
            libc::SIGSEGV | libc::SIGILL | libc::SIGFPE => fatal(signal),
            _ => {
                OS_SIGNALS.record(SignalAction::Exit);
                rearm(signal);
            }
        }
    }

    fn handler() -> libc::sighandler_t {
        record_signal as extern "C" fn(libc::c_int) as libc::sighandler_t
    }

    /// `sigaction` handlers stay installed.
    #[cfg(unix)]
    const fn rearm(_signal: libc::c_int) {}

    /// The C runtime resets the disposition before calling the handler.
    #[cfg(not(unix))]
    #[allow(unsafe_code)]
    fn rearm(signal: libc::c_int) {
        // SAFETY: `signal` may be called from a handler for the signal
        // being handled.
        unsafe {
            libc::signal(signal, handler());
        }
    }

    /// The faulting thread cannot be resumed, so the screen loop never gets
    /// to run its undo list: reset what can be reset with a raw write and
    /// die with the default disposition.
    #[allow(unsafe_code)]
    fn fatal(signal: libc::c_int) {
        // SAFETY: signal and raise are async-signal-safe.
        unsafe {
            libc::signal(signal, libc::SIG_DFL);
        }
        write_reset();
        // SAFETY: as above.
        unsafe {
            libc::raise(signal);
        }
    }

    #[cfg(unix)]
    #[allow(unsafe_code)]
    fn write_reset() {
        // SAFETY: write is async-signal-safe; FATAL_RESET is a static byte
        // string valid for its whole length.
        unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                FATAL_RESET.as_ptr().cast(),
                FATAL_RESET.len(),
            );
        }
    }

    #[cfg(not(unix))]
    #[allow(unsafe_code, clippy::cast_possible_truncation)]
    fn write_reset() {
        // SAFETY: FATAL_RESET is a static byte string valid for its whole
        // length; descriptor 1 is the C runtime's stdout.
        unsafe {
            libc::write(1, FATAL_RESET.as_ptr().cast(), FATAL_RESET.len() as libc::c_uint);
        }
    }

    /// Route `signal` to the counters. Returns the disposition it replaced.
    #[cfg(unix)]
    #[allow(unsafe_code)]
    pub fn install(signal: libc::c_int) -> Result<Previous> {
        // SAFETY: both sigaction structs are zero-initialized plain data and
        // the handler is an `extern "C"` function that only touches atomics
        // (or the async-signal-safe calls of `fatal`).
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = handler();
            action.sa_flags = libc::SA_RESTART;
            libc::sigemptyset(&mut action.sa_mask);

            let mut previous: libc::sigaction = std::mem::zeroed();
            if libc::sigaction(signal, &action, &mut previous) != 0 {
                return Err(TerminalError::Signal {
                    signal: name(signal),
                    source: io::Error::last_os_error(),
                });
            }
            Ok(previous)
        }
    }

    /// Route `signal` to the counters. Returns the disposition it replaced.
    #[cfg(not(unix))]
    #[allow(unsafe_code)]
    pub fn install(signal: libc::c_int) -> Result<Previous> {
        // SAFETY: the handler is an `extern "C"` function that only touches
        // atomics and calls the C runtime's `signal`, `write` and `raise`.
        let previous = unsafe { libc::signal(signal, handler()) };
        if previous == SIGNAL_FAILED {
            return Err(TerminalError::Signal {
                signal: name(signal),
                source: io::Error::last_os_error(),
            });
        }
        Ok(previous)
    }

    /// Put back a disposition returned by [`install`].
    #[cfg(unix)]
    #[allow(unsafe_code)]
    pub fn restore(signal: libc::c_int, previous: &Previous) {
        // SAFETY: `previous` was filled in by a successful sigaction call.
        let result = unsafe { libc::sigaction(signal, previous, std::ptr::null_mut()) };
        if result != 0 {
            warn_restore(signal);
        }
    }

    /// Put back a disposition returned by [`install`].
    #[cfg(not(unix))]
    #[allow(unsafe_code)]
    pub fn restore(signal: libc::c_int, previous: &Previous) {
        // SAFETY: `previous` is the handler `signal` returned on install.
        if unsafe { libc::signal(signal, *previous) } == SIGNAL_FAILED {
            warn_restore(signal);
        }
    }

    fn warn_restore(signal: libc::c_int) {
        tracing::warn!(
            signal = name(signal),
            error = %io::Error::last_os_error(),
            "failed to restore signal handler"
        );
    }

    /// Stop the process with the default SIGTSTP disposition. Returns once
    /// the process is continued.
    #[cfg(unix)]
    #[allow(unsafe_code)]
    pub fn stop_process() {
        // SAFETY: the caller has restored the default SIGTSTP disposition.
        unsafe {
            libc::raise(libc::SIGTSTP);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_drain() {
        let counters = SignalCounters::new();
        assert!(!counters.has_pending());

        counters.record(SignalAction::Exit);
        counters.record(SignalAction::Exit);
        counters.record(SignalAction::Resize);
        assert!(counters.has_pending());

        assert_eq!(counters.drain(SignalAction::Exit), 2);
        assert_eq!(counters.drain(SignalAction::Exit), 0);
        assert_eq!(counters.drain(SignalAction::Stop), 0);
        assert_eq!(counters.drain(SignalAction::Resize), 1);
        assert!(!counters.has_pending());
    }

    #[test]
    fn test_signal_names() {
        assert_eq!(os::name(libc::SIGINT), "SIGINT");
        assert_eq!(os::name(libc::SIGTERM), "SIGTERM");
        assert!(os::EXIT_SIGNALS.contains(&libc::SIGABRT));
    }

    #[cfg(unix)]
    #[test]
    fn test_job_control_names() {
        assert_eq!(os::name(libc::SIGWINCH), "SIGWINCH");
        assert_eq!(os::name(libc::SIGTSTP), "SIGTSTP");
    }
}
