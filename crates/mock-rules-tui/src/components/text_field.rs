//! Single-line text field with a movable cursor
//!
//! Used for every prompt in the TUI: file paths, rule titles, matcher and
//! handler values. The cursor counts characters, not bytes, so editing
//! non-ASCII input never splits a character.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

/// What a key press did to the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAction {
    /// Nothing the caller needs to react to
    None,
    /// The text changed
    Changed,
    Submit,
    Cancel,
    /// Ctrl+V: the caller owns the clipboard
    PasteRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    /// Cursor position in characters
    cursor: usize,
}

impl TextField {
    /// A field holding `value` with the cursor at the end
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

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Insert text at the cursor, dropping line breaks
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\n' && *c != '\r') {
            self.insert_char(c);
        }
    }

    fn delete_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
        true
    }

    fn delete_after(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
        true
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FieldAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => FieldAction::Submit,
            KeyCode::Esc => FieldAction::Cancel,
            KeyCode::Char('v') if ctrl => FieldAction::PasteRequest,
            KeyCode::Char('u') if ctrl => {
                let at = self.byte_index(self.cursor);
                self.value.replace_range(..at, "");
                self.cursor = 0;
                FieldAction::Changed
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                FieldAction::None
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.len());
                FieldAction::None
            }
            KeyCode::Home => {
                self.cursor = 0;
                FieldAction::None
            }
            KeyCode::End => {
                self.cursor = self.len();
                FieldAction::None
            }
            KeyCode::Backspace if self.delete_before() => FieldAction::Changed,
            KeyCode::Delete if self.delete_after() => FieldAction::Changed,
            KeyCode::Char(c) if !ctrl => {
                self.insert_char(c);
                FieldAction::Changed
            }
            _ => FieldAction::None,
        }
    }

    /// Render the value with a block cursor, or the placeholder when empty
    pub fn to_line(
        &self,
        placeholder: &str,
        text: Style,
        muted: Style,
        cursor: Style,
    ) -> Line<'static> {
        let cursor = cursor.add_modifier(Modifier::SLOW_BLINK);
        if self.value.is_empty() {
            return Line::from(vec![
                Span::styled("█", cursor),
                Span::styled(placeholder.to_string(), muted),
            ]);
        }
        let at = self.byte_index(self.cursor);
        let (before, after) = self.value.split_at(at);
        Line::from(vec![
            Span::styled(before.to_string(), text),
            Span::styled("█", cursor),
            Span::styled(after.to_string(), text),
        ])
    }
}
