//! Colour palette and the handful of styles built from it

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    pub text: Color,
    pub dim: Color,
    pub frame: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub title_bg: Color,
    pub title_fg: Color,
    /// Background behind modal dialogs
    pub modal_bg: Color,
    pub focus: Color,
    pub ok: Color,
    pub warn: Color,
    pub danger: Color,
    /// Shortcut keys
    pub key: Color,
    /// Shortcut descriptions
    pub label: Color,
    /// Rules with unsaved edits
    pub unsaved: Color,
    /// A rule lifted for reordering
    pub moving: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Color::White,
            dim: Color::DarkGray,
            frame: Color::Gray,
            selected_bg: Color::Blue,
            selected_fg: Color::White,
            title_bg: Color::Cyan,
            title_fg: Color::Black,
            modal_bg: Color::Black,
            focus: Color::Yellow,
            ok: Color::Green,
            warn: Color::Yellow,
            danger: Color::Red,
            key: Color::Cyan,
            label: Color::Gray,
            unsaved: Color::Yellow,
            moving: Color::Magenta,
        }
    }
}

impl Theme {
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn frame_style(&self) -> Style {
        Style::default().fg(self.frame)
    }

    pub fn selected_style(&self) -> Style {
        Style::default().bg(self.selected_bg).fg(self.selected_fg)
    }

    pub fn key_style(&self) -> Style {
        Style::default().fg(self.key).add_modifier(Modifier::BOLD)
    }

    pub fn label_style(&self) -> Style {
        Style::default().fg(self.label)
    }

    /// A bold key shown in a given colour, for dialog button rows
    pub fn button_style(&self, color: Color) -> Style {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}
