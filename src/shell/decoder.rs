//! Input decoder for terminal character sequences.
//!
//! Turns raw terminal characters (control codes and ANSI escape sequences)
//! into logical [`Key`] events. Pure state machine: no buffers, no I/O.
//! Hosts whose toolkit already reports logical keys skip the decoder and
//! feed [`Key`] values to the terminal directly.

/// Longest parameter run accepted inside `ESC [ ... <final>`.
const MAX_PARAMS: usize = 8;

/// Decoder state for escape sequence handling.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputState {
    /// Normal input mode
    Normal,

    /// Saw first ESC character
    EscapeStart,

    /// Saw ESC [ (collecting parameters until the final byte)
    EscapeSequence,
}

/// Logical key event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    /// No event (accumulating sequence or ignored input)
    None,

    /// Printable character
    Char(char),

    /// Submit the line
    Enter,

    /// Delete before the cursor
    Backspace,

    /// Delete under the cursor
    Delete,

    /// Cursor one left (Left arrow, Ctrl+B)
    Left,

    /// Cursor one right (Right arrow, Ctrl+F)
    Right,

    /// Start of previous word (Ctrl+Left)
    WordLeft,

    /// End of next word (Ctrl+Right)
    WordRight,

    /// Start of line (Home, Ctrl+A)
    Home,

    /// End of line (End, Ctrl+E)
    End,

    /// Older history entry (Up arrow, Ctrl+P)
    HistoryPrevious,

    /// Newer history entry (Down arrow, Ctrl+N)
    HistoryNext,

    /// Drop the whole line (double ESC)
    ClearLine,

    /// Drop from the cursor to the end (Ctrl+K)
    KillToEnd,

    /// Delete the word after the cursor (Alt+D, sent as ESC d)
    DeleteWord,

    /// Leave the current interpreter (Ctrl+D)
    Exit,
}

/// Terminal input decoder with escape sequence handling.
#[derive(Debug)]
pub struct InputDecoder {
    state: InputState,
    params: heapless::String<MAX_PARAMS>,
}

impl InputDecoder {
    /// Create new decoder in Normal state.
    pub fn new() -> Self {
        Self {
            state: InputState::Normal,
            params: heapless::String::new(),
        }
    }

    /// Decode a single character.
    ///
    /// ```rust,ignore
    /// // Up arrow (ESC [ A)
    /// decoder.decode_char('\x1b');
    /// decoder.decode_char('[');
    /// assert_eq!(decoder.decode_char('A'), Key::HistoryPrevious);
    /// ```
    pub fn decode_char(&mut self, c: char) -> Key {
        match self.state {
            InputState::Normal => self.decode_normal(c),
            InputState::EscapeStart => self.decode_escape_start(c),
            InputState::EscapeSequence => self.decode_escape_sequence(c),
        }
    }

    fn decode_normal(&mut self, c: char) -> Key {
        match c {
            '\x1b' => {
                self.state = InputState::EscapeStart;
                Key::None
            }
            '\n' | '\r' => Key::Enter,
            '\x08' | '\x7f' => Key::Backspace,
            '\x01' => Key::Home,
            '\x02' => Key::Left,
            '\x04' => Key::Exit,
            '\x05' => Key::End,
            '\x06' => Key::Right,
            '\x0b' => Key::KillToEnd,
            '\x0e' => Key::HistoryNext,
            '\x10' => Key::HistoryPrevious,
            // No completion: Tab is inserted as typed
            '\t' => Key::Char('\t'),
            c if c.is_control() => Key::None,
            _ => Key::Char(c),
        }
    }

    fn decode_escape_start(&mut self, c: char) -> Key {
        match c {
            '\x1b' => {
                self.state = InputState::Normal;
                Key::ClearLine
            }
            '[' => {
                self.state = InputState::EscapeSequence;
                self.params.clear();
                Key::None
            }
            'd' => {
                self.state = InputState::Normal;
                Key::DeleteWord
            }
            // ESC followed by anything else is taken literally
            _ => {
                self.state = InputState::Normal;
                if c.is_control() { Key::None } else { Key::Char(c) }
            }
        }
    }

    fn decode_escape_sequence(&mut self, c: char) -> Key {
        if c.is_ascii_digit() || c == ';' {
            if self.params.push(c).is_err() {
                // Runaway sequence - drop it
                self.reset();
            }
            return Key::None;
        }

        let key = match (self.params.as_str(), c) {
            ("", 'A') => Key::HistoryPrevious,
            ("", 'B') => Key::HistoryNext,
            ("", 'C') => Key::Right,
            ("", 'D') => Key::Left,
            ("", 'H') | ("1", '~') | ("7", '~') => Key::Home,
            ("", 'F') | ("4", '~') | ("8", '~') => Key::End,
            ("3", '~') => Key::Delete,
            ("1;5", 'C') => Key::WordRight,
            ("1;5", 'D') => Key::WordLeft,
            _ => Key::None,
        };
        self.reset();
        key
    }

    /// Reset decoder state to Normal.
    pub fn reset(&mut self) {
        self.state = InputState::Normal;
        self.params.clear();
    }

    /// Current decoder state.
    pub fn state(&self) -> InputState {
        self.state
    }
}

impl Default for InputDecoder {
    fn default() -> Self {
        Self::new()
    }
}
