//! Buffer: The grid a frame is painted into.
//!
//! Cells are stored in row-major order in one contiguous `Vec`. The buffer
//! also carries the position and shape the terminal cursor should take once
//! the frame is written.

use super::cell::{Cell, Style};
use crate::layout::Rect;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Terminal cursor style, numbered as DECSCUSR parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorShape {
    /// Cursor not shown.
    #[default]
    Hidden,
    /// Blinking block.
    BlockBlinking,
    /// Steady block.
    Block,
    /// Blinking underline.
    UnderlineBlinking,
    /// Steady underline.
    Underline,
    /// Blinking bar.
    BarBlinking,
    /// Steady bar.
    Bar,
}

impl CursorShape {
    /// DECSCUSR parameter, `None` when hidden.
    pub const fn code(self) -> Option<u8> {
        match self {
            Self::Hidden => None,
            Self::BlockBlinking => Some(1),
            Self::Block => Some(2),
            Self::UnderlineBlinking => Some(3),
            Self::Underline => Some(4),
            Self::BarBlinking => Some(5),
            Self::Bar => Some(6),
        }
    }
}

/// Where to leave the terminal cursor after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor {
    /// Column inside the frame.
    pub x: u16,
    /// Row inside the frame.
    pub y: u16,
    /// Shape.
    pub shape: CursorShape,
}

/// A grid of cells.
///
/// A zero-sized buffer is valid: it is what a screen holds before its first
/// draw and while suspended.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    /// Contiguous cell storage (row-major order).
    cells: Vec<Cell>,
    /// Width in columns.
    width: u16,
    /// Height in rows.
    height: u16,
    /// Cursor placement requested by the painted elements.
    cursor: Cursor,
}

impl Buffer {
    /// Create a blank buffer.
    pub fn new(width: u16, height: u16) -> Self {
        let mut buffer = Self {
            cells: vec![Cell::blank(); usize::from(width) * usize::from(height)],
            width,
            height,
            cursor: Cursor::default(),
        };
        buffer.reset_cursor();
        buffer
    }

    /// Width in columns.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The whole buffer as a rectangle.
    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the buffer has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major cell slice.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Convert (x, y) coordinates to a linear index.
    #[inline]
    pub fn index_of(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(usize::from(y) * usize::from(self.width) + usize::from(x))
        } else {
            None
        }
    }

    /// Cell at (x, y).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index_of(x, y).map(|i| &self.cells[i])
    }

    /// Mutable cell at (x, y).
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index_of(x, y).map(|i| &mut self.cells[i])
    }

    /// One row of cells.
    pub fn row(&self, y: u16) -> &[Cell] {
        let Some(start) = self.index_of(0, y) else {
            return &[];
        };
        &self.cells[start..start + usize::from(self.width)]
    }

    /// Write one grapheme at (x, y), clipped to `clip`.
    ///
    /// A wide grapheme also claims the cell to its right; it is skipped when
    /// that cell falls outside `clip`. Returns the number of columns used.
    pub fn set_grapheme(&mut self, x: u16, y: u16, grapheme: &str, style: Style, clip: Rect) -> u16 {
        if !clip.contains(x, y) {
            return 0;
        }
        let width = u16::try_from(grapheme.width()).unwrap_or(1);
        if width == 0 {
            return 0;
        }
        if width > 1 && !clip.contains(x + width - 1, y) {
            return width;
        }
        let Some(index) = self.index_of(x, y) else {
            return 0;
        };
        self.cells[index].set_glyph(grapheme).set_style(style);
        for dx in 1..width {
            if let Some(cell) = self.get_mut(x + dx, y) {
                *cell = Cell::continuation(style);
            }
        }
        width
    }

    /// Write a string starting at (x, y), clipped to `clip`. Returns the
    /// columns consumed.
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, style: Style, clip: Rect) -> u16 {
        let mut column = x;
        for grapheme in text.graphemes(true) {
            if column >= clip.right() {
                break;
            }
            column = column.saturating_add(self.set_grapheme(column, y, grapheme, style, clip));
        }
        column - x
    }

    /// Layer `style` over every cell of `rect`.
    pub fn patch_style(&mut self, rect: Rect, style: Style) {
        let rect = rect.intersection(&self.area());
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if let Some(cell) = self.get_mut(x, y) {
                    let patched = cell.style().patch(style);
                    cell.set_style(patched);
                }
            }
        }
    }

    /// Requested cursor placement.
    #[inline]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Request a cursor placement.
    #[inline]
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    /// Blank every cell and park a hidden cursor at the bottom-right corner.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
        self.reset_cursor();
    }

    /// Resize, discarding content.
    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self::new(width, height);
    }

    fn reset_cursor(&mut self) {
        self.cursor = Cursor {
            x: self.width.saturating_sub(1),
            y: self.height.saturating_sub(1),
            shape: CursorShape::Hidden,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Modifiers;

    #[test]
    fn test_buffer_creation() {
        let buffer = Buffer::new(80, 24);
        assert_eq!(buffer.width(), 80);
        assert_eq!(buffer.height(), 24);
        assert_eq!(buffer.len(), 80 * 24);
        assert_eq!(buffer.cursor().x, 79);
        assert_eq!(buffer.cursor().y, 23);
        assert_eq!(buffer.cursor().shape, CursorShape::Hidden);
    }

    #[test]
    fn test_buffer_zero_size() {
        let buffer = Buffer::new(0, 0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.cursor(), Cursor::default());
        assert!(buffer.row(0).is_empty());
    }

    #[test]
    fn test_buffer_index_of() {
        let buffer = Buffer::new(10, 5);
        assert_eq!(buffer.index_of(0, 0), Some(0));
        assert_eq!(buffer.index_of(9, 0), Some(9));
        assert_eq!(buffer.index_of(0, 1), Some(10));
        assert_eq!(buffer.index_of(10, 0), None);
        assert_eq!(buffer.index_of(0, 5), None);
    }

    #[test]
    fn test_buffer_set_string_clips() {
        let mut buffer = Buffer::new(10, 1);
        let used = buffer.set_string(0, 0, "hello world", Style::DEFAULT, Rect::new(0, 0, 5, 1));
        assert_eq!(used, 5);
        let text: String = buffer.row(0).iter().map(Cell::glyph).collect();
        assert_eq!(text, "hello     ");
    }

    #[test]
    fn test_buffer_wide_graphemes() {
        let mut buffer = Buffer::new(5, 1);
        let area = buffer.area();
        assert_eq!(buffer.set_string(0, 0, "日本", Style::DEFAULT, area), 4);
        assert_eq!(buffer.get(0, 0).unwrap().glyph(), "日");
        assert!(buffer.get(1, 0).unwrap().is_continuation());
        assert_eq!(buffer.get(2, 0).unwrap().glyph(), "本");

        // A wide glyph that would straddle the clip edge is not drawn.
        let mut buffer = Buffer::new(3, 1);
        buffer.set_string(0, 0, "a日", Style::DEFAULT, Rect::new(0, 0, 2, 1));
        assert_eq!(buffer.get(1, 0).unwrap().glyph(), " ");
    }

    #[test]
    fn test_buffer_patch_style() {
        let mut buffer = Buffer::new(4, 2);
        buffer.patch_style(Rect::new(1, 1, 10, 10), Style::DEFAULT.add(Modifiers::BOLD));
        assert!(buffer.get(1, 1).unwrap().style().modifiers.contains(Modifiers::BOLD));
        assert!(buffer.get(0, 1).unwrap().style().modifiers.is_empty());
        assert!(buffer.get(1, 0).unwrap().style().modifiers.is_empty());
    }

    #[test]
    fn test_buffer_clear_and_resize() {
        let mut buffer = Buffer::new(3, 3);
        let area = buffer.area();
        buffer.set_string(0, 0, "abc", Style::DEFAULT, area);
        buffer.set_cursor(Cursor { x: 0, y: 0, shape: CursorShape::Bar });
        buffer.clear();
        assert_eq!(buffer.get(0, 0).unwrap().glyph(), " ");
        assert_eq!(buffer.cursor().shape, CursorShape::Hidden);

        buffer.resize(5, 2);
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.cursor().x, 4);
    }
}
