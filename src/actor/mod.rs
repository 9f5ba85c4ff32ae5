//! Actor Model: The threads feeding the screen loop.
//!
//! Two listener threads run while a screen is installed. Neither touches the
//! component tree or the output stream; they only enqueue [`Task`]s.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Task::Event     ┌──────────────┐
//! │ Input Thread │ ────────────────▶ │              │
//! └──────────────┘                   │              │
//!                                    │ Screen Loop  │ ──▶ component tree
//! ┌──────────────┐ Task::AnimationTick│              │
//! │Ticker Thread │ ────────────────▶ │              │
//! └──────────────┘                   │              │
//!                                    │              │
//!   ScreenHandle  ─ Task::Closure ─▶ │              │
//!                                    └──────────────┘
//! ```

mod channel;
mod input;
mod task;
mod ticker;

pub use channel::{channel, Receiver, Sender};
pub use input::{InputActor, InputTiming, POLL_TIMEOUT};
pub use task::{Closure, Task};
pub use ticker::{TickerActor, TICK_INTERVAL};
