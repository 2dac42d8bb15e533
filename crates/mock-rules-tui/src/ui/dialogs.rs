//! Modal dialogs

use crate::app::App;
use crate::components::Popup;
use crate::theme::Theme;
use mock_rules::{LintReport, Severity};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Wrap,
    },
    Frame,
};
use std::path::Path;

/// (key, description, key colour)
type Hint = (&'static str, &'static str, Color);

/// Clear `area`, frame it with a titled border and return the inside
fn modal(frame: &mut Frame, theme: &Theme, area: Rect, title: &str, color: Color) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} ", title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme.modal_bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

fn key_hints(theme: &Theme, hints: &[Hint]) -> Paragraph<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (i, (key, desc, color)) in hints.iter().enumerate() {
        let gap = if i + 1 < hints.len() { "  " } else { "" };
        spans.push(Span::styled(format!("[{}]", key), theme.button_style(*color)));
        spans.push(Span::raw(format!(" {}{}", desc, gap)));
    }
    Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
}

fn input_hints(theme: &Theme) -> Paragraph<'static> {
    key_hints(
        theme,
        &[
            ("←/→", "Move", theme.key),
            ("^V", "Paste", theme.key),
            ("Enter", "OK", theme.ok),
            ("Esc", "Cancel", theme.danger),
        ],
    )
}

/// Draw a yes/no confirmation sized to its message
pub fn draw_confirm(frame: &mut Frame, theme: &Theme, message: &str) {
    let screen = frame.area();
    let widest = message.lines().map(str::len).max().unwrap_or(30);
    let width = ((widest + 10).clamp(40, 70) as u16).min(screen.width);
    let height = ((message.lines().count() + 6).min(15) as u16).min(screen.height);
    let area = Rect {
        x: screen.x + (screen.width - width) / 2,
        y: screen.y + (screen.height - height) / 2,
        width,
        height,
    };

    let inner = modal(frame, theme, area, "Confirm", theme.warn);
    let [_, body, _, buttons] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(2),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new(message)
            .style(theme.text_style())
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Center),
        body,
    );
    frame.render_widget(
        key_hints(
            theme,
            &[("Enter", "Confirm", theme.ok), ("Esc", "Cancel", theme.danger)],
        ),
        buttons,
    );
}

fn draw_notice(
    frame: &mut Frame,
    theme: &Theme,
    title: &str,
    message: &str,
    footer: &str,
    color: Color,
) {
    let popup = Popup::new(format!("\n{}\n\n{}", message, footer))
        .title(format!(" {} ", title))
        .style(Style::default().bg(theme.modal_bg).fg(color))
        .border_style(Style::default().fg(color));
    frame.render_widget(popup, frame.area());
}

pub fn draw_error(frame: &mut Frame, theme: &Theme, message: &str) {
    draw_notice(frame, theme, "Error", message, "Press Esc to close", theme.danger);
}

pub fn draw_success(frame: &mut Frame, theme: &Theme, message: &str) {
    draw_notice(frame, theme, "Success", message, "Press any key to continue", theme.ok);
}

/// Bordered single-line input showing the shared text field
fn draw_field(frame: &mut Frame, app: &App, area: Rect, label: &str, placeholder: &str) {
    let block = Block::default()
        .title(format!(" ▶ {} ", label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.focus));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = app.field.to_line(
        placeholder,
        app.theme.text_style(),
        app.theme.dim_style(),
        Style::default().fg(app.theme.focus),
    );
    frame.render_widget(Paragraph::new(line), inner);
}

pub fn draw_file_path_input(frame: &mut Frame, app: &App, prompt: &str) {
    let area = super::centered_rect(70, 35, frame.area());
    let inner = modal(frame, &app.theme, area, prompt, app.theme.focus);
    let [_, field, _, tip, _, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(1),
    ])
    .areas(inner);

    draw_field(frame, app, field, "Path", "");
    frame.render_widget(
        Paragraph::new(Span::styled("Use ~ for the home directory", app.theme.dim_style()))
        .alignment(Alignment::Center),
        tip,
    );
    frame.render_widget(input_hints(&app.theme), help);
}

/// Draw a text prompt with its placeholder hint and any validation error
pub fn draw_text_input(
    frame: &mut Frame,
    app: &App,
    prompt: &str,
    hint: &str,
    error: Option<&str>,
) {
    let area = super::centered_rect(70, 35, frame.area());
    let color = if error.is_some() {
        app.theme.danger
    } else {
        app.theme.focus
    };
    let inner = modal(frame, &app.theme, area, prompt, color);
    let [_, field, problem, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Min(1),
    ])
    .areas(inner);

    draw_field(frame, app, field, "Value", hint);
    if let Some(error) = error {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("✗ {}", error),
                Style::default().fg(app.theme.danger),
            ))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center),
            problem,
        );
    }
    frame.render_widget(input_hints(&app.theme), help);
}

/// Draw a single-choice list
pub fn draw_picker(frame: &mut Frame, app: &App, title: &str, options: &[String], selected: usize) {
    let screen = frame.area();
    let height = (options.len() as u16 + 4).min(screen.height);
    let percent_y = (height * 100 / screen.height.max(1)).clamp(20, 90);
    let area = super::centered_rect(50, percent_y, screen);
    let inner = modal(frame, &app.theme, area, title, app.theme.focus);
    let [list_area, help] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    let items: Vec<ListItem> = options
        .iter()
        .map(|option| ListItem::new(format!(" {}", option)))
        .collect();
    let list = List::new(items).highlight_style(app.theme.selected_style());
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, list_area, &mut state);

    frame.render_widget(
        key_hints(
            &app.theme,
            &[
                ("j/k", "Move", app.theme.key),
                ("Enter", "Choose", app.theme.ok),
                ("Esc", "Cancel", app.theme.danger),
            ],
        ),
        help,
    );
}

/// Draw the lint report for a rule file about to be imported
pub fn draw_import_preview(frame: &mut Frame, app: &App, path: &Path, report: &LintReport) {
    let theme = &app.theme;
    let area = super::centered_rect(75, 60, frame.area());
    let color = if report.is_valid() {
        theme.ok
    } else {
        theme.danger
    };
    let inner = modal(
        frame,
        theme,
        area,
        &format!("Import {}", path.display()),
        color,
    );
    let [summary, issues, help] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(inner);

    let verdict = Line::from(vec![
        Span::styled(
            if report.is_valid() { " ✓ " } else { " ✗ " },
            theme.button_style(color),
        ),
        Span::styled(report.summary(), theme.text_style()),
    ]);
    frame.render_widget(Paragraph::new(verdict), summary);

    let lines: Vec<Line> = report
        .issues
        .iter()
        .map(|issue| {
            let severity = match issue.severity {
                Severity::Error => theme.danger,
                Severity::Warning => theme.warn,
                Severity::Info => theme.dim,
            };
            let mut spans = vec![
                Span::styled(format!(" {} ", issue.code), theme.button_style(severity)),
                Span::raw(issue.message.clone()),
            ];
            if let Some(location) = &issue.location {
                spans.push(Span::styled(format!(" ({})", location), theme.dim_style()));
            }
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), issues);

    let hints: Vec<Hint> = if report.is_valid() {
        vec![
            ("Enter", "Replace unsaved rules", theme.ok),
            ("Esc", "Cancel", theme.danger),
        ]
    } else {
        vec![("Esc", "Close", theme.danger)]
    };
    frame.render_widget(key_hints(theme, &hints), help);
}

/// Draw the serialized rule set with scrolling
pub fn draw_export(
    frame: &mut Frame,
    theme: &Theme,
    filename: &str,
    content: &str,
    scroll_offset: u16,
) {
    let area = super::centered_rect(85, 85, frame.area());
    let inner = modal(frame, theme, area, filename, theme.ok);
    let [body, help] = Layout::vertical([Constraint::Min(5), Constraint::Length(2)]).areas(inner);

    let lines: Vec<Line> = content.lines().map(Line::from).collect();
    let total_lines = lines.len();
    frame.render_widget(
        Paragraph::new(lines)
            .style(theme.text_style())
            .scroll((scroll_offset, 0))
            .wrap(Wrap { trim: false }),
        body,
    );

    if total_lines > body.height as usize {
        let mut state = ScrollbarState::new(total_lines).position(scroll_offset as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓")),
            body.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut state,
        );
    }

    frame.render_widget(
        key_hints(
            theme,
            &[
                ("s", "Save", theme.ok),
                ("c", "Copy", theme.key),
                ("↑/↓", "Scroll", theme.label),
                ("Esc", "Close", theme.danger),
            ],
        ),
        help,
    );
}
