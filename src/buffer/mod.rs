//! Buffer module: The frame a component tree renders into.
//!
//! This module contains:
//! - [`Cell`]: One grapheme plus its [`Style`]
//! - [`Buffer`]: A grid of cells plus the requested [`Cursor`]
//! - [`Rgb`] and [`Modifiers`]: Color and SGR attributes
//! - [`ansi`]: Serialization of a buffer into escape sequences

pub mod ansi;
mod cell;
#[allow(clippy::module_inception)]
mod buffer;

pub use buffer::{Buffer, Cursor, CursorShape};
pub use cell::{Cell, Modifiers, Rgb, Style};
