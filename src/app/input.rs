//! Single-buffer text input with a byte cursor kept on char boundaries

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextInput {
    pub buffer: String,
    pub cursor: usize,
}

impl TextInput {
    /// Start editing `text` with the cursor at the end
    pub fn with_text(text: &str) -> Self {
        TextInput {
            buffer: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.buffer[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.buffer.len() {
            self.cursor = self.buffer[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.buffer.len());
        }
    }

    pub fn insert(&mut self, c: char) {
        if self.cursor <= self.buffer.len() {
            self.buffer.insert(self.cursor, c);
            self.cursor += c.len_utf8();
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.buffer[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.buffer.remove(prev);
            self.cursor = prev;
        }
    }

    /// Column of the cursor within its line, in chars
    pub fn cursor_column(&self) -> usize {
        let before = &self.buffer[..self.cursor];
        match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count(),
            None => before.chars().count(),
        }
    }

    /// Line index of the cursor
    pub fn cursor_line(&self) -> usize {
        self.buffer[..self.cursor].matches('\n').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace_multibyte() {
        let mut input = TextInput::with_text("héllo");
        input.move_left();
        input.move_left();
        input.move_left();
        input.move_left();
        assert_eq!(input.cursor, 1);
        input.move_right();
        assert_eq!(input.cursor, 3);
        input.backspace();
        assert_eq!(input.buffer, "hllo");
        input.insert('é');
        assert_eq!(input.buffer, "héllo");
        assert_eq!(input.cursor_column(), 2);
    }

    #[test]
    fn test_cursor_position_on_lines() {
        let mut input = TextInput::with_text("{\n  \"a\": 1");
        assert_eq!(input.cursor_line(), 1);
        assert_eq!(input.cursor_column(), 8);
        input.insert('\n');
        assert_eq!(input.cursor_line(), 2);
        assert_eq!(input.cursor_column(), 0);
    }

    #[test]
    fn test_take_resets() {
        let mut input = TextInput::with_text("abc");
        assert_eq!(input.take(), "abc");
        assert_eq!(input, TextInput::default());
    }
}
