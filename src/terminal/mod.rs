//! Terminal module: Everything that changes the controlling terminal.
//!
//! - [`TerminalDriver`]: Raw mode, signal handlers, listener threads, and
//!   the LIFO undo list releasing them
//! - [`OutputBuffer`]: Control sequences batched into one write
//! - [`SignalCounters`]: Async-signal-safe pending signal counts

mod driver;
mod output;
pub(crate) mod signals;

pub use driver::TerminalDriver;
pub use output::{DecMode, OutputBuffer, REQUEST_CURSOR_POSITION, REQUEST_CURSOR_SHAPE};
pub use signals::{SignalAction, SignalCounters};
