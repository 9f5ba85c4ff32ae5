//! ANSI serialization of a [`Buffer`].
//!
//! A frame is written as a full repaint starting at the frame's top-left
//! corner: rows separated by `\r\n`, SGR sequences emitted only when the
//! style changes between two cells. The terminal cursor ends up on the last
//! cell of the last row, which is where the cursor bookkeeping of the screen
//! expects it.

use super::{Buffer, Modifiers, Rgb, Style};
use std::fmt::Write;

/// Serialize the whole buffer.
pub fn to_ansi(buffer: &Buffer) -> String {
    let mut output = String::with_capacity(buffer.len() * 2);
    write_ansi(buffer, &mut output);
    output
}

/// Serialize the whole buffer, appending to `output`.
pub fn write_ansi(buffer: &Buffer, output: &mut String) {
    for y in 0..buffer.height() {
        if y > 0 {
            output.push_str("\r\n");
        }
        let mut current = Style::DEFAULT;
        for cell in buffer.row(y) {
            if cell.is_continuation() {
                continue;
            }
            emit_transition(output, current, cell.style());
            current = cell.style();
            output.push_str(cell.glyph());
        }
        if current != Style::DEFAULT {
            output.push_str("\x1b[0m");
        }
    }
}

/// Emit the shortest SGR sequence turning `from` into `to`.
fn emit_transition(output: &mut String, from: Style, to: Style) {
    if from == to {
        return;
    }
    // Attributes can only be switched off by a full reset, which also drops
    // the colors.
    let from = if from.modifiers.difference(to.modifiers).is_empty() {
        from
    } else {
        output.push_str("\x1b[0m");
        Style::DEFAULT
    };
    emit_modifier_set(output, to.modifiers.difference(from.modifiers));
    if from.fg != to.fg {
        emit_color(output, to.fg, 38, 39);
    }
    if from.bg != to.bg {
        emit_color(output, to.bg, 48, 49);
    }
}

fn emit_color(output: &mut String, color: Option<Rgb>, set: u8, reset: u8) {
    let _ = match color {
        Some(Rgb { r, g, b }) => write!(output, "\x1b[{set};2;{r};{g};{b}m"),
        None => write!(output, "\x1b[{reset}m"),
    };
}

fn emit_modifier_set(output: &mut String, modifiers: Modifiers) {
    for code in modifiers.sgr_codes() {
        let _ = write!(output, "\x1b[{code}m");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_of(buffer: &Buffer) -> vt100::Parser {
        let mut parser = vt100::Parser::new(buffer.height().max(1), buffer.width().max(1), 0);
        parser.process(to_ansi(buffer).as_bytes());
        parser
    }

    #[test]
    fn test_plain_rows() {
        let mut buffer = Buffer::new(3, 2);
        let area = buffer.area();
        buffer.set_string(0, 0, "abc", Style::DEFAULT, area);
        buffer.set_string(0, 1, "de", Style::DEFAULT, area);
        assert_eq!(to_ansi(&buffer), "abc\r\nde ");
    }

    #[test]
    fn test_style_runs() {
        let mut buffer = Buffer::new(4, 1);
        let bold = Style::DEFAULT.add(Modifiers::BOLD);
        buffer.set_string(1, 0, "xy", bold, buffer.area());
        assert_eq!(to_ansi(&buffer), " \x1b[1mxy\x1b[0m ");
    }

    #[test]
    fn test_colors_and_reset() {
        let mut buffer = Buffer::new(2, 1);
        let red = Style::DEFAULT.fg(Rgb::new(255, 0, 0));
        buffer.set_string(0, 0, "r", red, buffer.area());
        assert_eq!(to_ansi(&buffer), "\x1b[38;2;255;0;0mr\x1b[39m ");
    }

    #[test]
    fn test_vt100_round_trip() {
        let mut buffer = Buffer::new(6, 2);
        let area = buffer.area();
        let reversed = Style::DEFAULT.add(Modifiers::REVERSED);
        buffer.set_string(0, 0, "日本", Style::DEFAULT, area);
        buffer.set_string(0, 1, "ok", reversed, area);

        let parser = screen_of(&buffer);
        let screen = parser.screen();
        assert_eq!(screen.contents(), "日本\nok");
        assert!(screen.cell(1, 0).unwrap().inverse());
        assert!(!screen.cell(1, 2).unwrap().inverse());
    }
}
