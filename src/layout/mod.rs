//! Layout module: Rectangles and the renderable element contract.
//!
//! Components render to an [`Element`]; the screen asks it for its
//! [`Requirement`] to size the frame, then paints it into a [`Rect`] of the
//! frame buffer.

mod element;
mod rect;

pub use element::{
    cursor, dbox, empty, hbox, inverted, reflect, render_fit, styled, text, vbox, Element, Node,
    Requirement,
};
pub use rect::Rect;
