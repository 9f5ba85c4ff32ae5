//! Rect: The area an element was painted into.

/// A cell-aligned rectangle of a frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left column.
    pub x: u16,
    /// Top row.
    pub y: u16,
    /// Columns.
    pub width: u16,
    /// Rows.
    pub height: u16,
}

impl Rect {
    /// A rectangle at (`x`, `y`).
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// A rectangle anchored at the origin.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Whether it covers no cell.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// First column past the right edge.
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// First row past the bottom edge.
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Whether cell (`x`, `y`) is covered.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Like [`contains`](Self::contains) for mouse coordinates, which go
    /// negative left of or above the frame.
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        match (u16::try_from(x), u16::try_from(y)) {
            (Ok(x), Ok(y)) => self.contains(x, y),
            _ => false,
        }
    }

    /// The overlapping area, `ZERO` sized when disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return Self::new(x, y, 0, 0);
        }
        Self::new(x, y, right - x, bottom - y)
    }

    /// Split off `height` rows from the top. Returns (top, rest).
    pub fn split_rows(&self, height: u16) -> (Self, Self) {
        let at = height.min(self.height);
        (
            Self::new(self.x, self.y, self.width, at),
            Self::new(self.x, self.y + at, self.width, self.height - at),
        )
    }

    /// Split off `width` columns from the left. Returns (left, rest).
    pub fn split_columns(&self, width: u16) -> (Self, Self) {
        let at = width.min(self.width);
        (
            Self::new(self.x, self.y, at, self.height),
            Self::new(self.x + at, self.y, self.width - at, self.height),
        )
    }
}

impl std::fmt::Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_point() {
        let rect = Rect::new(2, 3, 4, 2);
        assert!(rect.contains_point(2, 3));
        assert!(rect.contains_point(5, 4));
        assert!(!rect.contains_point(6, 4));
        assert!(!rect.contains_point(-1, 3));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Rect::new(5, 5, 5, 5));
        assert!(a.intersection(&Rect::new(20, 20, 1, 1)).is_empty());
    }

    #[test]
    fn test_rect_splits() {
        let rect = Rect::new(1, 1, 8, 4);
        let (top, rest) = rect.split_rows(3);
        assert_eq!(top, Rect::new(1, 1, 8, 3));
        assert_eq!(rest, Rect::new(1, 4, 8, 1));

        let (left, rest) = rect.split_columns(10);
        assert_eq!(left, rect);
        assert!(rest.is_empty());
    }
}
