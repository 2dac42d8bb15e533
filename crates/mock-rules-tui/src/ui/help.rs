//! Scrollable list of keyboard shortcuts

use crate::theme::Theme;
use ratatui::{
    layout::{Alignment, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

fn overlay_area(screen: Rect) -> Rect {
    super::centered_rect(75, 85, screen)
}

/// Lines of the shortcut list that do not fit inside `area`'s border
fn overflow(line_count: usize, area: Rect) -> u16 {
    (line_count as u16).saturating_sub(area.height.saturating_sub(2))
}

/// Furthest the overlay can scroll on a screen of this size
pub fn max_scroll(screen: Rect) -> u16 {
    overflow(help_lines(&Theme::default()).len(), overlay_area(screen))
}

pub fn draw_overlay(frame: &mut Frame, theme: &Theme, scroll: u16) {
    let area = overlay_area(frame.area());
    let lines = help_lines(theme);
    let overflow = overflow(lines.len(), area);
    let offset = scroll.min(overflow);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .scroll((offset, 0))
            .block(
                Block::default()
                    .title(" Keyboard Shortcuts ")
                    .title_alignment(Alignment::Center)
                    .borders(Borders::ALL)
                    .border_style(theme.frame_style())
                    .style(Style::default().bg(theme.modal_bg)),
            ),
        area,
    );

    if overflow > 0 {
        let mut state = ScrollbarState::new(overflow as usize).position(offset as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut state,
        );
    }
}

fn help_lines(theme: &Theme) -> Vec<Line<'static>> {
    let key = |keys: &'static str, action: &'static str| shortcut(theme, keys, action);
    vec![
        Line::from(""),
        heading(theme, "RULE LIST"),
        Line::from(""),
        key("j / ↓", "Move down"),
        key("k / ↑", "Move up"),
        key("Enter / l", "Edit the selected rule"),
        key("o / Tab", "Expand or collapse the selected rule"),
        key("n", "Add a new rule at the top"),
        key("d", "Delete the selected rule"),
        key("s", "Save the selected rule"),
        key("r", "Reset the selected rule to its saved version"),
        key("q", "Quit"),
        key("?", "Toggle this help"),
        Line::from(""),
        heading(theme, "REORDERING"),
        Line::from(""),
        key("Space", "Pick up the selected rule"),
        key("j / k", "Choose its new position"),
        key("Space / Enter", "Drop it there"),
        key("Esc", "Put it back"),
        Line::from(""),
        heading(theme, "ALL RULES"),
        Line::from(""),
        key("S (Shift+s)", "Save every rule"),
        key("R (Shift+r)", "Discard all unsaved changes"),
        key("D (Shift+d)", "Reset to the default rules"),
        Line::from(""),
        heading(theme, "IMPORT/EXPORT"),
        Line::from(""),
        key("i", "Import rules from a .htkrules or .json file"),
        key("e", "Export rules to a folder"),
        key("x", "Preview the export"),
        Line::from(""),
        heading(theme, "RULE EDITOR"),
        Line::from(""),
        key("Enter", "Change the selected row"),
        key("d", "Delete the selected matcher"),
        key("t", "Edit the title"),
        key("s", "Save and return to the list"),
        key("r", "Reset the rule"),
        key("Esc / h", "Back to the list"),
        Line::from(""),
        heading(theme, "TEXT INPUT"),
        Line::from(""),
        key("Enter", "Apply"),
        key("Esc", "Cancel"),
        key("Ctrl+V", "Paste from clipboard"),
        key("Ctrl+U", "Clear before cursor"),
        Line::from(""),
        heading(theme, "EXPORT PREVIEW"),
        Line::from(""),
        key("s", "Save to a folder"),
        key("c", "Copy to clipboard"),
        key("j/k or ↑/↓", "Scroll content"),
        key("Esc", "Close"),
        Line::from(""),
        Line::from(Span::styled(
            "  ↑/↓ line by line, PgUp/PgDn a page at a time, Esc or ? to close",
            theme.dim_style().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
    ]
}

fn heading(theme: &Theme, title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {}", title),
        theme
            .label_style()
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

fn shortcut(theme: &Theme, keys: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<16}", keys), theme.key_style()),
        Span::styled(action, theme.text_style()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_scroll_is_what_does_not_fit() {
        let lines = help_lines(&Theme::default()).len() as u16;
        let short = Rect::new(0, 0, 100, 30);
        let visible = overlay_area(short).height - 2;
        assert_eq!(max_scroll(short), lines - visible);

        let tall = Rect::new(0, 0, 100, 200);
        assert_eq!(max_scroll(tall), 0);
    }
}
