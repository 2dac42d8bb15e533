//! Rule editor view

use crate::app::{App, EditorRow};
use mock_rules::form::{handler_takes_input, render_handler_input};
use mock_rules::{summarize_rule, InitialMatcherSelector, MockRule};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Draw the editor for the rule currently open
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let Some(rule) = app.editor_rule() else {
        let paragraph = Paragraph::new("This rule no longer exists. Press Esc to go back.")
            .style(app.theme.dim_style())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(5)])
        .split(area);

    let rows = App::editor_rows(rule);
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| ListItem::new(row_line(app, rule, *row)))
        .collect();

    let title = if app.page.is_rule_unsaved(rule.id) {
        " Edit rule │ unsaved "
    } else {
        " Edit rule "
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(app.theme.frame_style()),
        )
        .highlight_style(app.theme.selected_style())
        .highlight_symbol(" ▶ ");

    let selected = app.editor_selected.min(rows.len() - 1);
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let summary = summarize_rule(rule);
    let summary_lines = vec![
        Line::from(vec![
            Span::styled("Match  ", app.theme.dim_style()),
            Span::raw(summary.matchers),
        ]),
        Line::from(vec![
            Span::styled("Then   ", app.theme.dim_style()),
            Span::raw(summary.handler),
        ]),
    ];
    let paragraph = Paragraph::new(summary_lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Summary ")
                .borders(Borders::ALL)
                .border_style(app.theme.frame_style()),
        );
    frame.render_widget(paragraph, chunks[1]);
}

fn row_line<'a>(app: &App, rule: &MockRule, row: EditorRow) -> Line<'a> {
    let (label, value) = match row {
        EditorRow::Title => (
            "Title",
            rule.title.clone().unwrap_or_else(|| "(none)".to_string()),
        ),
        EditorRow::InitialMatcher => {
            let selector = InitialMatcherSelector::for_rule(&rule.matchers);
            let label = selector
                .options()
                .get(selector.selected_index())
                .map(|option| option.label())
                .unwrap_or("Never");
            ("Match", label.to_string())
        }
        EditorRow::Matcher(index) => (
            "and",
            rule.matchers
                .get(index)
                .map(|matcher| matcher.explain())
                .unwrap_or_default(),
        ),
        EditorRow::NewMatcher => ("", "+ Add another matcher".to_string()),
        EditorRow::Handler => {
            let kind = rule.handler.kind();
            let value = if handler_takes_input(kind) {
                format!("{}: {}", kind.label(), render_handler_input(&rule.handler))
            } else {
                kind.label().to_string()
            };
            ("Then", value)
        }
    };

    let value_style = match row {
        EditorRow::NewMatcher => app.theme.dim_style(),
        EditorRow::Title if rule.title.is_none() => app.theme.dim_style(),
        _ => app.theme.text_style(),
    };

    Line::from(vec![
        Span::styled(format!("{:<7}", label), app.theme.key_style()),
        Span::styled(value, value_style),
    ])
}
