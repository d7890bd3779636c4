// Single-line text input
//
// Cursor-aware editing for the search box and form fields. The cursor is a
// char index, not a byte offset, so Vietnamese input edits cleanly.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

/// What a key did to the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Changed,
    Moved,
    Ignored,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.value.remove(at);
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.value.chars().count() {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.value.remove(at);
        true
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        let len = self.value.chars().count();
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.value.is_empty() {
                    InputOutcome::Ignored
                } else {
                    self.clear();
                    InputOutcome::Changed
                }
            }
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                InputOutcome::Ignored
            }
            KeyCode::Char(ch) => {
                self.insert(ch);
                InputOutcome::Changed
            }
            KeyCode::Backspace if self.backspace() => InputOutcome::Changed,
            KeyCode::Delete if self.delete() => InputOutcome::Changed,
            KeyCode::Left if self.cursor > 0 => {
                self.cursor -= 1;
                InputOutcome::Moved
            }
            KeyCode::Right if self.cursor < len => {
                self.cursor += 1;
                InputOutcome::Moved
            }
            KeyCode::Home => {
                self.cursor = 0;
                InputOutcome::Moved
            }
            KeyCode::End => {
                self.cursor = len;
                InputOutcome::Moved
            }
            _ => InputOutcome::Ignored,
        }
    }

    /// Text with a block cursor spliced in, for rendering
    pub fn display(&self) -> String {
        let at = self.byte_offset(self.cursor);
        format!("{}▏{}", &self.value[..at], &self.value[at..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn edits_multibyte_text_by_char() {
        let mut input = TextInput::new("sữa");
        assert_eq!(input.cursor(), 3);

        input.handle_key(key(KeyCode::Left));
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "sa");

        input.handle_key(key(KeyCode::Char('ữ')));
        assert_eq!(input.value(), "sữa");
        assert_eq!(input.display(), "sữ▏a");
    }

    #[test]
    fn boundaries_are_ignored() {
        let mut input = TextInput::default();
        assert_eq!(input.handle_key(key(KeyCode::Backspace)), InputOutcome::Ignored);
        assert_eq!(input.handle_key(key(KeyCode::Left)), InputOutcome::Ignored);
        assert_eq!(input.handle_key(key(KeyCode::Delete)), InputOutcome::Ignored);
    }

    #[test]
    fn ctrl_u_clears() {
        let mut input = TextInput::new("trà xanh");
        let outcome = input.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(outcome, InputOutcome::Changed);
        assert_eq!(input.value(), "");
    }
}
