//! UI rendering for the TUI

mod dialogs;
mod help;
mod rule_editor;
mod rules;

use crate::app::{App, Overlay, StatusLevel, View};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub use help::max_scroll as help_max_scroll;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    // two command rows plus borders at the bottom
    let [header, body, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(10),
        Constraint::Length(4),
    ])
    .areas(frame.area());

    draw_header(frame, app, header);
    match &app.view {
        View::RuleList => rules::draw_list(frame, app, body),
        View::RuleEditor { .. } => rule_editor::draw(frame, app, body),
    }
    draw_status_bar(frame, app, status);

    match &app.overlay {
        Overlay::Help => help::draw_overlay(frame, &app.theme, app.help_scroll),
        Overlay::Confirm { message, .. } => dialogs::draw_confirm(frame, &app.theme, message),
        Overlay::Error { message } => dialogs::draw_error(frame, &app.theme, message),
        Overlay::Success { message } => dialogs::draw_success(frame, &app.theme, message),
        Overlay::FilePathInput { prompt, .. } => dialogs::draw_file_path_input(frame, app, prompt),
        Overlay::Picker {
            title,
            options,
            selected,
            ..
        } => dialogs::draw_picker(frame, app, title, options, *selected),
        Overlay::TextInput {
            prompt,
            hint,
            error,
            ..
        } => dialogs::draw_text_input(frame, app, prompt, hint, error.as_deref()),
        Overlay::ImportPreview { path, report, .. } => {
            dialogs::draw_import_preview(frame, app, path, report)
        }
        Overlay::Export { filename, content } => {
            dialogs::draw_export(frame, &app.theme, filename, content, app.export_scroll_offset)
        }
        Overlay::None => {}
    }
}

/// Draw the header bar
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let unsaved = if app.page.are_some_rules_unsaved() {
        Span::styled("● Unsaved changes", Style::default().fg(app.theme.unsaved))
    } else {
        Span::styled("○ All saved", Style::default().fg(app.theme.ok))
    };

    let customised = if app.page.are_some_rules_non_default() {
        Span::styled(" │ customised", app.theme.dim_style())
    } else {
        Span::raw("")
    };

    let rule_count = Span::styled(
        format!(" Rules: {}", app.page.rules().len()),
        app.theme.dim_style(),
    );

    let title = Line::from(vec![
        Span::styled(
            " Mock Rules ",
            Style::default()
                .fg(app.theme.title_fg)
                .bg(app.theme.title_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        unsaved,
        customised,
        Span::raw(" │"),
        rule_count,
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.frame_style());

    let paragraph = Paragraph::new(title).block(block);
    frame.render_widget(paragraph, area);
}

/// Draw the status bar
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.frame_style());

    if let Some((msg, level, _)) = &app.status_message {
        let color = match level {
            StatusLevel::Info => app.theme.text,
            StatusLevel::Success => app.theme.ok,
            StatusLevel::Warning => app.theme.warn,
            StatusLevel::Error => app.theme.danger,
        };
        let paragraph = Paragraph::new(Span::styled(
            format!(" {}", msg),
            Style::default().fg(color),
        ))
        .block(block)
        .alignment(Alignment::Left);
        frame.render_widget(paragraph, area);
    } else {
        let moving = app.page.moving_index().is_some();
        let (commands1, commands2) = get_commands(&app.view, moving);
        let mut lines = vec![build_command_line(&commands1, app)];
        if let Some(cmds2) = commands2 {
            lines.push(build_command_line(&cmds2, app));
        }
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left);
        frame.render_widget(paragraph, area);
    }
}

/// Command definition (key, label)
type Command = (&'static str, &'static str);

/// Build a nvim-style command line with [key] notation and separators
fn build_command_line(commands: &[Command], app: &App) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (i, (key, label)) in commands.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", app.theme.frame_style()));
        }
        spans.push(Span::styled(format!("[{}]", key), app.theme.key_style()));
        spans.push(Span::styled(format!(" {}", label), app.theme.label_style()));
    }
    Line::from(spans)
}

/// Get context-sensitive commands as (key, label) pairs
fn get_commands(view: &View, moving: bool) -> (Vec<Command>, Option<Vec<Command>>) {
    if moving {
        return (
            vec![("j/k", "Position"), ("Space", "Drop"), ("Esc", "Cancel")],
            None,
        );
    }
    match view {
        View::RuleList => (
            vec![
                ("n", "New"),
                ("Enter", "Edit"),
                ("o", "Expand"),
                ("Space", "Move"),
                ("d", "Del"),
                ("s", "Save"),
                ("r", "Reset"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
            Some(vec![
                ("S", "SaveAll"),
                ("R", "Discard"),
                ("D", "Defaults"),
                ("i", "Import"),
                ("e", "Export"),
                ("x", "Preview"),
            ]),
        ),
        View::RuleEditor { .. } => (
            vec![
                ("Enter", "Change"),
                ("d", "DelMatcher"),
                ("t", "Title"),
                ("s", "Save"),
                ("r", "Reset"),
                ("Esc", "Back"),
                ("?", "Help"),
            ],
            None,
        ),
    }
}

/// A rect taking the given percentages of `area`, centred in it
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppConfig;
    use mock_rules::{builtin_default_rules, Matcher, MockRule};
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_rule_list_shows_summary() {
        let app = App::new(AppConfig::default(), builtin_default_rules());
        let screen = render(&app);
        assert!(screen.contains("Mock Rules"));
        assert!(screen.contains("Default passthrough"));
        assert!(screen.contains("All saved"));
    }

    #[test]
    fn test_editor_and_help_render() {
        let mut app = App::new(AppConfig::default(), builtin_default_rules());
        let id = app.page.rules()[0].id;
        app.open_editor(id);
        let screen = render(&app);
        assert!(screen.contains("Any requests"));

        app.overlay = Overlay::Help;
        let screen = render(&app);
        assert!(screen.contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_editor_lists_leading_host_matcher() {
        let rule = MockRule::new().with_matchers(vec![Matcher::Host {
            host: "example.com".to_string(),
        }]);
        let id = rule.id;
        let mut app = App::new(AppConfig::default(), vec![rule]);
        app.open_editor(id);

        let screen = render(&app);
        assert!(screen.contains("Never"));
        assert!(screen.contains("for host example.com"));
        assert!(!screen.contains("Any requests"));
    }

    #[test]
    fn test_centered_rect_fits_area() {
        let area = Rect::new(0, 0, 100, 50);
        let rect = centered_rect(60, 40, area);
        assert_eq!(rect.width, 60);
        assert_eq!(rect.height, 20);
    }
}
