//! Terminal input parser: Raw bytes in, structured [`Event`]s out.
//!
//! Bytes arrive one at a time from the input listener. Every [`add`] re-parses
//! the pending buffer from its start; a parse either needs more bytes, drops
//! the buffer (malformed input), or completes and emits exactly one event.
//!
//! A lone `ESC` is ambiguous: it may be the Escape key or the first byte of a
//! sequence still in flight. The listener calls [`timeout`] while the input
//! is idle, and once the escape timeout has elapsed whatever is pending is
//! flushed as a special event.
//!
//! [`add`]: TerminalInputParser::add
//! [`timeout`]: TerminalInputParser::timeout

use super::{Event, Motion, Mouse, MouseButton};
use crate::actor::{Sender, Task};
use std::borrow::Cow;
use std::time::Duration;

/// Idle time after which an incomplete sequence is flushed.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(50);

const ESC: u8 = 0x1B;
const CAN: u8 = 0x18;
const DEL: u8 = 0x7F;

enum Output {
    Uncompleted,
    Drop,
    Character,
    Special,
    Mouse(Mouse),
    CursorPosition { x: i32, y: i32 },
    CursorShape(i32),
}

/// Stateful decoder feeding the task channel.
pub struct TerminalInputParser {
    out: Sender<Task>,
    pending: Vec<u8>,
    position: usize,
    idle: Duration,
    escape_timeout: Duration,
}

impl TerminalInputParser {
    /// Create a parser emitting [`Task::Event`]s on `out`.
    pub fn new(out: Sender<Task>) -> Self {
        Self {
            out,
            pending: Vec::with_capacity(32),
            position: 0,
            idle: Duration::ZERO,
            escape_timeout: ESCAPE_TIMEOUT,
        }
    }

    /// Override the idle flush delay.
    #[must_use]
    pub const fn with_escape_timeout(mut self, escape_timeout: Duration) -> Self {
        self.escape_timeout = escape_timeout;
        self
    }

    /// Feed one byte.
    pub fn add(&mut self, byte: u8) {
        self.pending.push(byte);
        self.idle = Duration::ZERO;
        self.position = 0;
        let output = self.parse();
        self.send(output);
    }

    /// Report that `elapsed` passed without input.
    pub fn timeout(&mut self, elapsed: Duration) {
        self.idle += elapsed;
        if self.idle < self.escape_timeout {
            return;
        }
        self.idle = Duration::ZERO;
        if !self.pending.is_empty() {
            self.send(Output::Special);
        }
    }

    /// Whether bytes are waiting for completion or timeout.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn eat(&mut self) -> bool {
        if self.position < self.pending.len() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn current(&self) -> u8 {
        self.pending[self.position - 1]
    }

    fn send(&mut self, output: Output) {
        let event = match output {
            Output::Uncompleted => return,
            Output::Drop => {
                tracing::trace!(bytes = ?self.pending, "dropping malformed input");
                self.pending.clear();
                return;
            }
            Output::Character => match String::from_utf8(std::mem::take(&mut self.pending)) {
                Ok(text) => Event::character(text),
                Err(_) => return,
            },
            Output::Special => Event::special(normalize(&self.pending)),
            Output::Mouse(mouse) => Event::mouse(self.lossy(), mouse),
            Output::CursorPosition { x, y } => Event::cursor_position(self.lossy(), x, y),
            Output::CursorShape(shape) => Event::cursor_shape(self.lossy(), shape),
        };
        self.pending.clear();
        self.out.send(Task::Event(event));
    }

    fn lossy(&self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }

    fn parse(&mut self) -> Output {
        if !self.eat() {
            return Output::Uncompleted;
        }
        match self.current() {
            CAN => Output::Drop,
            ESC => self.parse_esc(),
            c if c < 32 || c == DEL => Output::Special,
            _ => self.parse_utf8(),
        }
    }

    // Lead byte     | Continuation bytes
    // 0xxxxxxx      |
    // 110xxxxx      | 10xxxxxx
    // 1110xxxx      | 10xxxxxx 10xxxxxx
    // 11110xxx      | 10xxxxxx 10xxxxxx 10xxxxxx
    fn parse_utf8(&mut self) -> Output {
        let head = self.current();
        let ones = head.leading_ones();
        if ones == 1 || ones >= 5 {
            return Output::Drop;
        }
        let len = ones.max(1);
        let mut value = u32::from(head & (0x7F >> ones));

        for _ in 1..len {
            if !self.eat() {
                return Output::Uncompleted;
            }
            let byte = self.current();
            if byte & 0b1100_0000 != 0b1000_0000 {
                return Output::Drop;
            }
            value = (value << 6) | u32::from(byte & 0b0011_1111);
        }

        let shortest = match value {
            0..=0x7F => 1,
            0x80..=0x7FF => 2,
            0x800..=0xFFFF => 3,
            0x1_0000..=0x10_FFFF => 4,
            _ => return Output::Drop,
        };
        if shortest != len || (0xD800..=0xDFFF).contains(&value) {
            return Output::Drop;
        }
        Output::Character
    }

    fn parse_esc(&mut self) -> Output {
        if !self.eat() {
            return Output::Uncompleted;
        }
        match self.current() {
            b'P' => self.parse_dcs(),
            b'[' => self.parse_csi(),
            b']' => self.parse_string_terminated(),
            // Two-byte escape forms with one parameter byte.
            b' ' | b'#' | b'%' | b'(' | b')' | b'*' | b'+' | b'O' | b'N' => {
                if self.eat() {
                    Output::Special
                } else {
                    Output::Uncompleted
                }
            }
            // Alt + key.
            _ => Output::Special,
        }
    }

    // Consume up to and including the string terminator `ESC \`.
    fn parse_string_terminated(&mut self) -> Output {
        loop {
            if !self.eat() {
                return Output::Uncompleted;
            }
            if self.current() != ESC {
                continue;
            }
            if !self.eat() {
                return Output::Uncompleted;
            }
            if self.current() == b'\\' {
                return Output::Special;
            }
        }
    }

    fn parse_dcs(&mut self) -> Output {
        match self.parse_string_terminated() {
            Output::Special => {}
            other => return other,
        }
        // DECRQSS answer for the cursor style: `ESC P 1 $ r <Ps> SP q ESC \`
        let body = &self.pending[2..self.pending.len() - 2];
        body.strip_prefix(b"1$r")
            .and_then(|rest| rest.strip_suffix(b" q"))
            .and_then(parse_decimal)
            .map_or(Output::Special, Output::CursorShape)
    }

    fn parse_csi(&mut self) -> Output {
        let mut argument: i32 = 0;
        let mut arguments = Vec::with_capacity(4);
        loop {
            if !self.eat() {
                return Output::Uncompleted;
            }
            match self.current() {
                c @ b'0'..=b'9' => {
                    argument = argument
                        .saturating_mul(10)
                        .saturating_add(i32::from(c - b'0'));
                }
                b';' => {
                    arguments.push(argument);
                    argument = 0;
                }
                c @ b'@'..=b'~' if c != b'[' => {
                    arguments.push(argument);
                    return match c {
                        b'M' => parse_mouse(true, &arguments),
                        b'm' => parse_mouse(false, &arguments),
                        b'R' => parse_cursor_position(&arguments),
                        _ => Output::Special,
                    };
                }
                ESC => return Output::Special,
                // Private markers (`<`, `?`) and intermediate bytes.
                _ => {}
            }
        }
    }
}

fn parse_mouse(pressed: bool, arguments: &[i32]) -> Output {
    let &[code, x, y] = arguments else {
        return Output::Special;
    };
    let motion = if code & 32 != 0 {
        Motion::Moved
    } else if pressed {
        Motion::Pressed
    } else {
        Motion::Released
    };
    Output::Mouse(Mouse {
        button: MouseButton::from_code((code & 3) + ((code & 64) >> 4)),
        motion,
        shift: code & 4 != 0,
        meta: code & 8 != 0,
        control: code & 16 != 0,
        x,
        y,
        previous: None,
    })
}

fn parse_cursor_position(arguments: &[i32]) -> Output {
    match *arguments {
        [y, x] => Output::CursorPosition { x, y },
        _ => Output::Special,
    }
}

fn parse_decimal(digits: &[u8]) -> Option<i32> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}

// Terminals disagree on how to encode a number of keys; map every known
// variant onto the sequence the `Event` constants use.
fn normalize(raw: &[u8]) -> Cow<'static, str> {
    let canonical = match raw {
        b"\r" => "\n",
        b"\x08" => "\x7F",

        // Application cursor mode.
        b"\x1BOA" => "\x1B[A",
        b"\x1BOB" => "\x1B[B",
        b"\x1BOC" => "\x1B[C",
        b"\x1BOD" => "\x1B[D",
        b"\x1BOH" => "\x1B[H",
        b"\x1BOF" => "\x1B[F",

        // Linux console.
        b"\x1B[[A" | b"\x1B[11~" | b"\x1B[M" => "\x1BOP",
        b"\x1B[[B" | b"\x1B[12~" | b"\x1B[N" => "\x1BOQ",
        b"\x1B[[C" | b"\x1B[13~" | b"\x1B[O" => "\x1BOR",
        b"\x1B[[D" | b"\x1B[14~" | b"\x1B[P" => "\x1BOS",
        b"\x1B[[E" | b"\x1BOt" | b"\x1B[Q" => "\x1B[15~",

        // vt100 and scoansi function keys.
        b"\x1BOu" | b"\x1B[R" => "\x1B[17~",
        b"\x1BOv" | b"\x1B[S" => "\x1B[18~",
        b"\x1BOl" | b"\x1B[T" => "\x1B[19~",
        b"\x1BOw" | b"\x1B[U" => "\x1B[20~",
        b"\x1BOx" | b"\x1B[V" => "\x1B[21~",
        b"\x1B[W" => "\x1B[23~",
        b"\x1B[X" => "\x1B[24~",

        // Home and End as sent by rxvt and the Linux console.
        b"\x1B[1~" | b"\x1B[7~" => "\x1B[H",
        b"\x1B[4~" | b"\x1B[8~" => "\x1B[F",

        _ => return Cow::Owned(String::from_utf8_lossy(raw).into_owned()),
    };
    Cow::Borrowed(canonical)
}
