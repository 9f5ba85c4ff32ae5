//! # Treeterm
//!
//! A retained-mode terminal UI toolkit core.
//!
//! Treeterm keeps a tree of interactive components, routes keyboard and
//! mouse input to the focused branch, and repaints the tree into the
//! terminal from a single loop thread.
//!
//! ## Core Concepts
//!
//! - **Input decoding**: Raw terminal bytes become [`Event`]s, including
//!   mouse reports and replies to cursor queries
//! - **Task queue**: Listener threads and [`ScreenHandle`]s feed one FIFO
//!   consumed by the loop
//! - **Component tree**: Focus is the path of active children from the root
//! - **Containers**: Vertical, horizontal, tab and stacked selection
//! - **Screen**: Terminal install and restore, frame sizing, nesting
//!
//! ## Example
//!
//! ```no_run
//! use treeterm::component::{container, focusable_renderer};
//! use treeterm::layout::{inverted, text};
//! use treeterm::ScreenInteractive;
//!
//! let item = |label: &'static str| {
//!     focusable_renderer(move |focused| {
//!         if focused { inverted(text(label)) } else { text(label) }
//!     })
//! };
//! let menu = container::vertical(vec![item("one"), item("two"), item("three")]);
//! ScreenInteractive::terminal_output().run(menu);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod animation;
pub mod buffer;
pub mod component;
pub mod error;
pub mod event;
pub mod layout;
pub mod screen;
pub mod terminal;

// Re-exports for convenience
pub use buffer::{Buffer, Cell, Modifiers, Rgb, Style};
pub use component::{Component, ComponentBase, ComponentExt, Container, ContainerMode};
pub use error::{Result, TerminalError};
pub use event::{Event, Mouse, MouseButton, TerminalInputParser};
pub use layout::{Element, Rect};
pub use screen::{Loop, ScreenConfig, ScreenHandle, ScreenInteractive};
