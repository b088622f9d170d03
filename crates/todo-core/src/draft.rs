//! Draft for a new todo item
//!
//! A single editable line. Submitting hands out the text as a `NewTodo` and
//! clears the draft right away, whether or not the create call later
//! succeeds. Empty titles are submitted as-is.

use crate::models::NewTodo;

/// Editable title with a cursor (counted in characters)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    text: String,
    cursor: usize,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the text and move the cursor to the end
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Insert character at cursor position
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    /// Take the text as a new open item for `user_id`, clearing the draft
    pub fn submit(&mut self, user_id: i64) -> NewTodo {
        let title = std::mem::take(&mut self.text);
        self.cursor = 0;
        NewTodo::new(user_id, title)
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing() {
        let mut draft = Draft::new();
        for c in "bread".chars() {
            draft.insert_char(c);
        }
        assert_eq!(draft.text(), "bread");

        draft.cursor_left();
        draft.cursor_left();
        draft.delete_char();
        assert_eq!(draft.text(), "brad");
        assert_eq!(draft.cursor(), 2);

        draft.insert_char('e');
        assert_eq!(draft.text(), "bread");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut draft = Draft::new();
        draft.set("café");
        draft.insert_char('!');
        assert_eq!(draft.text(), "café!");

        draft.cursor_left();
        draft.delete_char();
        assert_eq!(draft.text(), "caf!");
    }

    #[test]
    fn test_cursor_bounds() {
        let mut draft = Draft::new();
        draft.cursor_left();
        draft.delete_char();
        assert_eq!(draft.cursor(), 0);

        draft.set("ab");
        draft.cursor_right();
        assert_eq!(draft.cursor(), 2);
    }

    #[test]
    fn test_submit_clears() {
        let mut draft = Draft::new();
        draft.set("water plants");

        let new = draft.submit(3);
        assert_eq!(new.title, "water plants");
        assert_eq!(new.user_id, 3);
        assert!(!new.completed);
        assert!(draft.is_empty());
        assert_eq!(draft.cursor(), 0);
    }

    #[test]
    fn test_submit_empty_title() {
        let mut draft = Draft::new();
        let new = draft.submit(1);
        assert_eq!(new.title, "");
    }
}
