//! Rule list view

use crate::app::App;
use mock_rules::{summarize_rule, MockRule};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Draw the rule list view
pub fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    let rules = app.page.rules();
    let moving = app.page.moving_index();

    let items: Vec<ListItem> = rules
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            let is_selected = app.rule_list_state.selected() == Some(i);
            let is_moving = moving == Some(i);
            rule_item(app, rule, is_selected, is_moving)
        })
        .collect();

    let title = if moving.is_some() {
        format!(" Rules ({}) │ moving ", rules.len())
    } else {
        format!(" Rules ({}) ", rules.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(app.theme.frame_style()),
        )
        .highlight_style(app.theme.selected_style());

    frame.render_stateful_widget(list, area, &mut app.rule_list_state.clone());

    if rules.is_empty() {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        let paragraph = Paragraph::new("No rules. Press 'n' to add one.")
            .style(app.theme.dim_style())
            .alignment(Alignment::Center);

        let centered = Rect {
            x: inner.x,
            y: inner.y + inner.height / 2,
            width: inner.width,
            height: 1,
        };
        frame.render_widget(paragraph, centered);
    }
}

fn rule_item<'a>(app: &App, rule: &MockRule, is_selected: bool, is_moving: bool) -> ListItem<'a> {
    let summary = summarize_rule(rule);
    let collapsed = app.page.is_collapsed(rule.id);
    let unsaved = app.page.is_rule_unsaved(rule.id);

    let marker = if is_moving {
        " ⇅ "
    } else if is_selected {
        " ▶ "
    } else {
        "   "
    };
    let marker_color = if is_moving {
        app.theme.moving
    } else {
        app.theme.selected_bg
    };

    let heading = rule
        .title
        .clone()
        .unwrap_or_else(|| summary.matchers.clone());

    let mut first = vec![
        Span::styled(marker, Style::default().fg(marker_color)),
        Span::styled(if collapsed { "▸ " } else { "▾ " }, app.theme.dim_style()),
        Span::styled(heading, app.theme.text_style().add_modifier(Modifier::BOLD)),
    ];
    if unsaved {
        first.push(Span::styled(" ●", Style::default().fg(app.theme.unsaved)));
    }
    if collapsed {
        first.push(Span::styled(" │ ", app.theme.frame_style()));
        first.push(Span::styled(summary.handler.clone(), app.theme.dim_style()));
    }

    let mut lines = vec![Line::from(first)];
    if !collapsed {
        lines.push(detail_line(app, "Match", &summary.matchers));
        lines.push(detail_line(app, "Then", &summary.handler));
    }

    ListItem::new(lines)
}

fn detail_line<'a>(app: &App, label: &'static str, text: &str) -> Line<'a> {
    Line::from(vec![
        Span::raw("       "),
        Span::styled(format!("{:<6}", label), app.theme.dim_style()),
        Span::styled(text.to_string(), app.theme.text_style()),
    ])
}
