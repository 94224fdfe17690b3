//! Line buffer with cursor and mask mode.
//!
//! Owns the command being typed. Positions count characters, not bytes, so
//! every operation is safe on multi-byte input. All operations keep
//! `position <= len`.

/// In-progress command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    text: Vec<char>,
    position: usize,
    mask: bool,
}

impl LineBuffer {
    /// Create an empty, unmasked buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text.
    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    /// Cursor position in characters.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether mask mode is on.
    pub fn is_masked(&self) -> bool {
        self.mask
    }

    /// Text as it should be drawn: every character replaced by `mask_char`
    /// while mask mode is on.
    pub fn display(&self, mask_char: char) -> String {
        if self.mask {
            self.text.iter().map(|_| mask_char).collect()
        } else {
            self.text()
        }
    }

    /// Insert `ch` at the cursor and advance.
    pub fn insert(&mut self, ch: char) {
        self.text.insert(self.position, ch);
        self.position += 1;
    }

    /// Insert `s` at the cursor and advance past it.
    pub fn paste(&mut self, s: &str) {
        let tail = self.text.split_off(self.position);
        self.text.extend(s.chars());
        self.position = self.text.len();
        self.text.extend(tail);
    }

    /// Remove the character before the cursor (backspace).
    pub fn delete_before(&mut self) {
        if self.position > 0 {
            self.position -= 1;
            self.text.remove(self.position);
        }
    }

    /// Remove the character under the cursor (delete).
    pub fn delete_after(&mut self) {
        if self.position < self.text.len() {
            self.text.remove(self.position);
        }
    }

    /// Move one character left.
    pub fn move_left(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    /// Move one character right.
    pub fn move_right(&mut self) {
        if self.position < self.text.len() {
            self.position += 1;
        }
    }

    /// Jump to the start of the previous word.
    ///
    /// A single space directly before the cursor is skipped first, then the
    /// cursor stops at the first character after a space, or at 0.
    pub fn move_word_left(&mut self) {
        if self.position == 0 {
            return;
        }
        let mut i = self.position - 1;
        if self.text[i] == ' ' && i > 0 {
            i -= 1;
        }
        while i > 0 && !(self.text[i - 1] == ' ' && self.text[i] != ' ') {
            i -= 1;
        }
        self.position = i;
    }

    /// Jump to the end of the next word.
    ///
    /// A single space under the cursor is skipped first, then the cursor
    /// stops on the first space that follows a non-space, or at the end.
    pub fn move_word_right(&mut self) {
        let len = self.text.len();
        let mut i = self.position;
        if i < len && self.text[i] == ' ' {
            i += 1;
        }
        while i < len && !(self.text[i] == ' ' && i > 0 && self.text[i - 1] != ' ') {
            i += 1;
        }
        self.position = i;
    }

    /// Move to the start of the line.
    pub fn move_home(&mut self) {
        self.position = 0;
    }

    /// Move to the end of the line.
    pub fn move_end(&mut self) {
        self.position = self.text.len();
    }

    /// Place the cursor at `position`, clamped to the text.
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.text.len());
    }

    /// Replace the text and put the cursor at its end.
    pub fn set_text(&mut self, s: &str) {
        self.text = s.chars().collect();
        self.position = self.text.len();
    }

    /// Remove all text.
    pub fn clear(&mut self) {
        self.text.clear();
        self.position = 0;
    }

    /// Turn mask mode on or off. The text is unaffected.
    pub fn set_mask(&mut self, mask: bool) {
        self.mask = mask;
    }

    /// Drop everything from the cursor to the end (Ctrl+K).
    ///
    /// At position 0 the whole line goes.
    pub fn kill_to_end(&mut self) {
        self.text.truncate(self.position);
    }

    /// Delete from the cursor through the next space, or to the end when
    /// no space follows (Alt+D).
    pub fn delete_word_after(&mut self) {
        let end = self.text[self.position..]
            .iter()
            .position(|&c| c == ' ')
            .map(|offset| self.position + offset + 1)
            .unwrap_or(self.text.len());
        self.text.drain(self.position..end);
    }

    /// Take the trimmed command and reset the buffer.
    pub fn submit(&mut self) -> String {
        let command = self.text().trim().to_owned();
        self.clear();
        command
    }
}
