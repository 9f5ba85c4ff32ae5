//! Element: The renderable a component produces.
//!
//! The screen loop only needs two things from an element: how much room it
//! wants ([`Node::requirement`]) and how to paint itself into a rectangle of
//! a [`Buffer`] ([`Node::render`]). The handful of elements here cover what
//! the containers and decorators of this crate build; richer layout libraries
//! plug in by implementing [`Node`].

use super::Rect;
use crate::buffer::{Buffer, Cursor, CursorShape, Modifiers, Style};
use std::cell::Cell;
use std::rc::Rc;
use unicode_width::UnicodeWidthStr;

/// Minimum size an element asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Requirement {
    /// Columns.
    pub min_width: u16,
    /// Rows.
    pub min_height: u16,
}

/// Something that can be laid out and painted.
pub trait Node {
    /// Minimum size.
    fn requirement(&self) -> Requirement;

    /// Paint into `area` of `buffer`.
    fn render(&self, buffer: &mut Buffer, area: Rect);
}

/// An owned, type-erased renderable.
pub type Element = Box<dyn Node>;

/// Single line of text.
pub fn text(content: impl Into<String>) -> Element {
    Box::new(Text {
        content: content.into(),
    })
}

/// Children stacked top to bottom.
pub fn vbox(children: Vec<Element>) -> Element {
    Box::new(Stack {
        children,
        axis: Axis::Vertical,
    })
}

/// Children laid out left to right.
pub fn hbox(children: Vec<Element>) -> Element {
    Box::new(Stack {
        children,
        axis: Axis::Horizontal,
    })
}

/// Children painted over each other in the same area, later ones on top.
pub fn dbox(children: Vec<Element>) -> Element {
    Box::new(Stack {
        children,
        axis: Axis::Depth,
    })
}

/// Nothing, taking no room.
pub fn empty() -> Element {
    Box::new(Empty)
}

/// Record the area `child` gets painted into.
pub fn reflect(child: Element, area: Rc<Cell<Rect>>) -> Element {
    Box::new(Reflect { child, area })
}

/// Layer `style` over `child`.
pub fn styled(child: Element, style: Style) -> Element {
    Box::new(Styled { child, style })
}

/// Swap foreground and background of `child`.
pub fn inverted(child: Element) -> Element {
    styled(child, Style::DEFAULT.add(Modifiers::REVERSED))
}

/// Show the terminal cursor at the top-left corner of `child`.
pub fn cursor(child: Element, shape: CursorShape) -> Element {
    Box::new(CursorAt { child, shape })
}

/// Paint `element` into a buffer sized to its requirement.
pub fn render_fit(element: &dyn Node) -> Buffer {
    let requirement = element.requirement();
    let mut buffer = Buffer::new(requirement.min_width, requirement.min_height);
    let area = buffer.area();
    element.render(&mut buffer, area);
    buffer
}

struct Text {
    content: String,
}

impl Node for Text {
    fn requirement(&self) -> Requirement {
        Requirement {
            min_width: u16::try_from(self.content.width()).unwrap_or(u16::MAX),
            min_height: 1,
        }
    }

    fn render(&self, buffer: &mut Buffer, area: Rect) {
        if area.is_empty() {
            return;
        }
        buffer.set_string(area.x, area.y, &self.content, Style::DEFAULT, area);
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Vertical,
    Horizontal,
    Depth,
}

struct Stack {
    children: Vec<Element>,
    axis: Axis,
}

impl Node for Stack {
    fn requirement(&self) -> Requirement {
        self.children
            .iter()
            .map(|child| child.requirement())
            .fold(Requirement::default(), |acc, r| match self.axis {
                Axis::Vertical => Requirement {
                    min_width: acc.min_width.max(r.min_width),
                    min_height: acc.min_height.saturating_add(r.min_height),
                },
                Axis::Horizontal => Requirement {
                    min_width: acc.min_width.saturating_add(r.min_width),
                    min_height: acc.min_height.max(r.min_height),
                },
                Axis::Depth => Requirement {
                    min_width: acc.min_width.max(r.min_width),
                    min_height: acc.min_height.max(r.min_height),
                },
            })
    }

    fn render(&self, buffer: &mut Buffer, area: Rect) {
        let mut rest = area;
        for child in &self.children {
            let slot = match self.axis {
                Axis::Vertical => {
                    let (slot, remaining) = rest.split_rows(child.requirement().min_height);
                    rest = remaining;
                    slot
                }
                Axis::Horizontal => {
                    let (slot, remaining) = rest.split_columns(child.requirement().min_width);
                    rest = remaining;
                    slot
                }
                Axis::Depth => area,
            };
            child.render(buffer, slot);
        }
    }
}

struct Empty;

impl Node for Empty {
    fn requirement(&self) -> Requirement {
        Requirement::default()
    }

    fn render(&self, _buffer: &mut Buffer, _area: Rect) {}
}

struct Reflect {
    child: Element,
    area: Rc<Cell<Rect>>,
}

impl Node for Reflect {
    fn requirement(&self) -> Requirement {
        self.child.requirement()
    }

    fn render(&self, buffer: &mut Buffer, area: Rect) {
        self.area.set(area.intersection(&buffer.area()));
        self.child.render(buffer, area);
    }
}

struct Styled {
    child: Element,
    style: Style,
}

impl Node for Styled {
    fn requirement(&self) -> Requirement {
        self.child.requirement()
    }

    fn render(&self, buffer: &mut Buffer, area: Rect) {
        self.child.render(buffer, area);
        buffer.patch_style(area, self.style);
    }
}

struct CursorAt {
    child: Element,
    shape: CursorShape,
}

impl Node for CursorAt {
    fn requirement(&self) -> Requirement {
        self.child.requirement()
    }

    fn render(&self, buffer: &mut Buffer, area: Rect) {
        self.child.render(buffer, area);
        if buffer.area().contains(area.x, area.y) {
            buffer.set_cursor(Cursor {
                x: area.x,
                y: area.y,
                shape: self.shape,
            });
        }
    }
}
