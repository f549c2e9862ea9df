//! Editable line: bytes plus a cursor.
//!
//! Every mutating operation returns the first offset whose display
//! changed, which is where the screen repaint starts.

const DELIMITERS: &[u8] = b" !\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

fn is_delimiter(byte: u8) -> bool {
    DELIMITERS.contains(&byte)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    bytes: Vec<u8>,
    cursor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Insert at the cursor and step past the new byte.
    pub fn insert(&mut self, byte: u8) -> usize {
        let changed = self.cursor;
        self.bytes.insert(self.cursor, byte);
        self.cursor += 1;
        changed
    }

    /// Remove the byte left of the cursor.
    pub fn backspace(&mut self) -> Option<usize> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.bytes.remove(self.cursor);
        Some(self.cursor)
    }

    /// Remove the byte under the cursor.
    pub fn delete(&mut self) -> Option<usize> {
        if self.cursor >= self.bytes.len() {
            return None;
        }
        self.bytes.remove(self.cursor);
        Some(self.cursor)
    }

    pub fn left(&mut self) -> bool {
        self.move_to(self.cursor.saturating_sub(1))
    }

    pub fn right(&mut self) -> bool {
        self.move_to((self.cursor + 1).min(self.bytes.len()))
    }

    pub fn home(&mut self) -> bool {
        self.move_to(0)
    }

    pub fn end(&mut self) -> bool {
        self.move_to(self.bytes.len())
    }

    /// Jump to the start of the word left of the cursor.
    pub fn word_left(&mut self) -> bool {
        let mut pos = self.cursor;
        while pos > 0 && is_delimiter(self.bytes[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && !is_delimiter(self.bytes[pos - 1]) {
            pos -= 1;
        }
        self.move_to(pos)
    }

    /// Jump past the next word and the delimiters after it.
    pub fn word_right(&mut self) -> bool {
        let len = self.bytes.len();
        let mut pos = self.cursor;
        while pos < len && is_delimiter(self.bytes[pos]) {
            pos += 1;
        }
        while pos < len && !is_delimiter(self.bytes[pos]) {
            pos += 1;
        }
        while pos < len && is_delimiter(self.bytes[pos]) {
            pos += 1;
        }
        self.move_to(pos)
    }

    /// Replace the whole content, cursor at the end.
    pub fn replace(&mut self, text: &str) {
        self.bytes.clear();
        self.bytes.extend_from_slice(text.as_bytes());
        self.cursor = self.bytes.len();
    }

    /// Replace everything from `start` on with `text`, cursor at the end.
    pub fn splice(&mut self, start: usize, text: &str) -> usize {
        let start = start.min(self.bytes.len());
        self.bytes.truncate(start);
        self.bytes.extend_from_slice(text.as_bytes());
        self.cursor = self.bytes.len();
        start
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.cursor = 0;
    }

    fn move_to(&mut self, pos: usize) -> bool {
        let moved = pos != self.cursor;
        self.cursor = pos;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, cursor: usize) -> LineBuffer {
        let mut line = LineBuffer::new();
        line.replace(text);
        line.cursor = cursor;
        line
    }

    #[test]
    fn insert_shifts_tail() {
        let mut buffer = line("ac", 1);
        assert_eq!(buffer.insert(b'b'), 1);
        assert_eq!(buffer.text(), "abc");
        assert_eq!(buffer.cursor(), 2);
    }

    #[test]
    fn deletes_stop_at_edges() {
        let mut buffer = line("ab", 0);
        assert_eq!(buffer.backspace(), None);
        assert_eq!(buffer.delete(), Some(0));
        assert_eq!(buffer.text(), "b");
        buffer.end();
        assert_eq!(buffer.delete(), None);
        assert_eq!(buffer.backspace(), Some(0));
        assert!(buffer.is_empty());
    }

    #[test]
    fn cursor_moves_are_clamped() {
        let mut buffer = line("ab", 0);
        assert!(!buffer.left());
        assert!(buffer.right());
        assert!(buffer.right());
        assert!(!buffer.right());
        assert!(buffer.home());
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn word_motion_uses_delimiters() {
        let mut buffer = line("set  prompt-color red", 21);
        assert!(buffer.word_left());
        assert_eq!(buffer.cursor(), 18);
        buffer.word_left();
        assert_eq!(buffer.cursor(), 12);
        buffer.word_left();
        assert_eq!(buffer.cursor(), 5);
        buffer.word_left();
        assert_eq!(buffer.cursor(), 0);
        assert!(!buffer.word_left());

        buffer.word_right();
        assert_eq!(buffer.cursor(), 5);
        buffer.word_right();
        assert_eq!(buffer.cursor(), 12);
        buffer.word_right();
        assert_eq!(buffer.cursor(), 18);
        buffer.word_right();
        assert_eq!(buffer.cursor(), 21);
        assert!(!buffer.word_right());
    }

    #[test]
    fn splice_replaces_tail() {
        let mut buffer = line("show ca", 3);
        assert_eq!(buffer.splice(5, "camera "), 5);
        assert_eq!(buffer.text(), "show camera ");
        assert_eq!(buffer.cursor(), 12);
    }
}
