//! Screen module: The interactive session driving a component tree.
//!
//! # Lifecycle
//!
//! ```text
//! Loop::new ──▶ install ──▶ run_once / run_once_blocking ... ──▶ drop ──▶ uninstall
//!                  │                                                        │
//!                  └── suspends the running screen of the same Context ◀───┘ resumes it
//! ```
//!
//! Install flushes pending output, asks for the cursor shape, installs
//! signal handlers, switches to raw mode, sets the terminal modes and starts
//! the input and animation threads. Every step registers its own undo, and
//! uninstall runs them in reverse.

mod config;
mod context;
mod event_loop;
mod interactive;
mod shared;

pub use config::{Dimension, ScreenConfig, CURSOR_REPORT_INTERVAL};
pub use context::Context;
pub use event_loop::Loop;
pub use interactive::ScreenInteractive;
pub use shared::ScreenHandle;

pub(crate) use shared::ScreenShared;
