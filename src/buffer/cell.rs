//! Cell: One column of one row of a rendered frame.

use bitflags::bitflags;

/// A 24-bit color, emitted as an SGR `38;2` / `48;2` sequence.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// A color from its channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

bitflags! {
    /// SGR attributes of a cell.
    ///
    /// ```
    /// use treeterm::Modifiers;
    /// let style = Modifiers::BOLD | Modifiers::REVERSED;
    /// assert!(style.contains(Modifiers::BOLD));
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// SGR 1.
        const BOLD = 1 << 0;
        /// SGR 2.
        const DIM = 1 << 1;
        /// SGR 3.
        const ITALIC = 1 << 2;
        /// SGR 4.
        const UNDERLINE = 1 << 3;
        /// SGR 5.
        const BLINK = 1 << 4;
        /// SGR 7, swaps foreground and background.
        const REVERSED = 1 << 5;
        /// SGR 8.
        const HIDDEN = 1 << 6;
        /// SGR 9.
        const STRIKETHROUGH = 1 << 7;
    }
}

impl Modifiers {
    /// SGR parameter of every set attribute, in ascending order.
    pub fn sgr_codes(self) -> impl Iterator<Item = u8> {
        const CODES: [(Modifiers, u8); 8] = [
            (Modifiers::BOLD, 1),
            (Modifiers::DIM, 2),
            (Modifiers::ITALIC, 3),
            (Modifiers::UNDERLINE, 4),
            (Modifiers::BLINK, 5),
            (Modifiers::REVERSED, 7),
            (Modifiers::HIDDEN, 8),
            (Modifiers::STRIKETHROUGH, 9),
        ];
        CODES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, code)| code)
    }
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// Colors and attributes painted over a region.
///
/// `None` colors leave the terminal default in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Foreground color.
    pub fg: Option<Rgb>,
    /// Background color.
    pub bg: Option<Rgb>,
    /// Attributes.
    pub modifiers: Modifiers,
}

impl Style {
    /// Terminal defaults, no attributes.
    pub const DEFAULT: Self = Self {
        fg: None,
        bg: None,
        modifiers: Modifiers::empty(),
    };

    /// Set the foreground color (builder pattern).
    #[must_use]
    pub const fn fg(mut self, fg: Rgb) -> Self {
        self.fg = Some(fg);
        self
    }

    /// Set the background color (builder pattern).
    #[must_use]
    pub const fn bg(mut self, bg: Rgb) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Add attributes (builder pattern).
    #[must_use]
    pub fn add(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// Layer `other` on top: its colors win where set, attributes combine.
    #[must_use]
    pub fn patch(self, other: Self) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            modifiers: self.modifiers | other.modifiers,
        }
    }
}

/// A single frame cell.
///
/// The glyph is one grapheme cluster. A wide grapheme occupies its own cell
/// plus a continuation cell to its right whose glyph is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    glyph: String,
    style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

impl Cell {
    /// A space with default style.
    pub fn blank() -> Self {
        Self {
            glyph: " ".to_string(),
            style: Style::DEFAULT,
        }
    }

    /// A cell holding `glyph`.
    pub fn new(glyph: &str, style: Style) -> Self {
        Self {
            glyph: glyph.to_string(),
            style,
        }
    }

    /// The right half of a wide glyph.
    pub fn continuation(style: Style) -> Self {
        Self {
            glyph: String::new(),
            style,
        }
    }

    /// The grapheme, empty for a continuation cell.
    #[inline]
    pub fn glyph(&self) -> &str {
        &self.glyph
    }

    /// Whether this cell is covered by the wide glyph to its left.
    #[inline]
    pub fn is_continuation(&self) -> bool {
        self.glyph.is_empty()
    }

    /// Current style.
    #[inline]
    pub const fn style(&self) -> Style {
        self.style
    }

    /// Replace the glyph, reusing the allocation.
    pub fn set_glyph(&mut self, glyph: &str) -> &mut Self {
        self.glyph.clear();
        self.glyph.push_str(glyph);
        self
    }

    /// Replace the style.
    pub fn set_style(&mut self, style: Style) -> &mut Self {
        self.style = style;
        self
    }

    /// Reset the cell to a blank space.
    pub fn reset(&mut self) {
        self.set_glyph(" ");
        self.style = Style::DEFAULT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_debug_is_hex() {
        assert_eq!(format!("{:?}", Rgb::new(255, 128, 0)), "#ff8000");
    }

    #[test]
    fn test_modifier_sgr_codes() {
        let codes: Vec<u8> = (Modifiers::REVERSED | Modifiers::BOLD).sgr_codes().collect();
        assert_eq!(codes, vec![1, 7]);
        assert_eq!(Modifiers::empty().sgr_codes().count(), 0);
    }

    #[test]
    fn test_style_patch() {
        let base = Style::DEFAULT.fg(Rgb::new(1, 2, 3)).add(Modifiers::BOLD);
        let top = Style::DEFAULT.bg(Rgb::new(9, 9, 9)).add(Modifiers::REVERSED);
        let merged = base.patch(top);
        assert_eq!(merged.fg, Some(Rgb::new(1, 2, 3)));
        assert_eq!(merged.bg, Some(Rgb::new(9, 9, 9)));
        assert_eq!(merged.modifiers, Modifiers::BOLD | Modifiers::REVERSED);
    }

    #[test]
    fn test_cell_reset() {
        let mut cell = Cell::new("日", Style::DEFAULT.add(Modifiers::BOLD));
        assert_eq!(cell.glyph(), "日");
        cell.reset();
        assert_eq!(cell, Cell::blank());
    }

    #[test]
    fn test_continuation() {
        let cell = Cell::continuation(Style::DEFAULT);
        assert!(cell.is_continuation());
        assert!(!Cell::blank().is_continuation());
    }
}
