//! Signal card grid: one bordered card per visible signal, row-major.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use signaldeck_core::coalesce::NOT_AVAILABLE;
use signaldeck_core::{DataType, Signal};

use crate::app::AppState;
use crate::theme::Theme;

pub const CARD_WIDTH: u16 = 40;
pub const CARD_HEIGHT: u16 = 14;
pub const REASONING_LIMIT: usize = 200;

/// How many cards fit side by side.
pub fn columns_for(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

/// First row to draw so that `cursor_row` stays on screen.
pub fn scroll_offset(cursor_row: usize, visible_rows: usize) -> usize {
    if visible_rows == 0 {
        return cursor_row;
    }
    cursor_row.saturating_sub(visible_rows - 1)
}

/// Cut to `limit` characters and mark the cut with an ellipsis.
pub fn truncate_reasoning(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit).collect();
    format!("{cut}...")
}

/// `62` → `62%`. Unknown values are shown as-is.
pub fn percent(value: &str) -> String {
    if value == NOT_AVAILABLE || value.ends_with('%') {
        value.to_string()
    } else {
        format!("{value}%")
    }
}

/// `7` → `7/10`. Unknown values are shown as-is.
pub fn out_of_ten(value: &str) -> String {
    if value == NOT_AVAILABLE {
        value.to_string()
    } else {
        format!("{value}/10")
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = app.theme();
    let visible = app.visible();

    if visible.is_empty() {
        let msg = if app.loading {
            "Loading signals..."
        } else if app.snapshot.is_none() {
            "No data yet. Press r to refresh."
        } else {
            "No signals match the current filters. Press c to clear."
        };
        let para = Paragraph::new(Span::styled(msg, theme.muted_style()));
        f.render_widget(para, area);
        return;
    }

    let columns = columns_for(area.width);
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let first_row = scroll_offset(app.cursor / columns, visible_rows);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    for (r, row_area) in rows.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);
        for (c, cell) in cells.iter().enumerate() {
            let idx = (first_row + r) * columns + c;
            if let Some(signal) = visible.get(idx) {
                render_card(f, *cell, signal, idx == app.cursor, &theme);
            }
        }
    }
}

fn render_card(f: &mut Frame, area: Rect, signal: &Signal, selected: bool, theme: &Theme) {
    let trend_color = theme.trend_color(signal.trend);
    let mut title = vec![
        Span::styled(format!(" {} ", signal.pair), theme.accent_bold()),
        Span::styled(
            format!("[{}] ", signal.trend.as_str().to_uppercase()),
            Style::default().fg(trend_color).add_modifier(Modifier::BOLD),
        ),
    ];
    if signal.data_type != DataType::Main {
        title.push(Span::styled(format!("({}) ", signal.data_type.as_str()), theme.muted_style()));
    }

    let border = if selected {
        theme.panel_border(true).add_modifier(Modifier::BOLD)
    } else {
        theme.panel_border(false)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Line::from(title));

    let class = &signal.classification;
    let rec = &signal.recommendation;
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} ", signal.action.as_str().to_uppercase()),
                Style::default()
                    .fg(theme.action_color(signal.action))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                class.confidence.clone(),
                Style::default().fg(theme.confidence_color(signal.confidence_level())),
            ),
            Span::styled(format!("  {}", class.kind), theme.muted_style()),
        ]),
        field("Entry", &rec.entry_range, theme),
        field("Targets", &rec.targets, theme),
        field("Stop", &rec.stop_loss, theme),
        field("R:R", &rec.risk_reward_ratio, theme),
        Line::from(vec![
            Span::styled("Win ", theme.muted_style()),
            Span::styled(percent(&class.win_rate), theme.text_style()),
            Span::styled("  Size ", theme.muted_style()),
            Span::styled(percent(&signal.position_sizing.position_size), theme.text_style()),
            Span::styled("  Conf ", theme.muted_style()),
            Span::styled(out_of_ten(&class.confluence_score), theme.text_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            truncate_reasoning(&signal.reasoning, REASONING_LIMIT),
            theme.muted_style(),
        )),
    ];

    let para = Paragraph::new(lines)
        .block(block)
        .style(theme.base())
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn field<'a>(label: &'a str, value: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<8}"), theme.muted_style()),
        Span::styled(value, theme.text_style()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasoning_is_cut_at_limit() {
        let long = "x".repeat(250);
        let cut = truncate_reasoning(&long, REASONING_LIMIT);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_reasoning("short", REASONING_LIMIT), "short");
        assert_eq!(truncate_reasoning(&"y".repeat(200), REASONING_LIMIT).len(), 200);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(201);
        let cut = truncate_reasoning(&text, REASONING_LIMIT);
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn suffixes_skip_unknown_values() {
        assert_eq!(percent("62"), "62%");
        assert_eq!(percent("62%"), "62%");
        assert_eq!(percent("N/A"), "N/A");
        assert_eq!(out_of_ten("7"), "7/10");
        assert_eq!(out_of_ten("N/A"), "N/A");
    }

    #[test]
    fn grid_geometry() {
        assert_eq!(columns_for(10), 1);
        assert_eq!(columns_for(120), 3);
        assert_eq!(scroll_offset(0, 2), 0);
        assert_eq!(scroll_offset(5, 2), 4);
        assert_eq!(scroll_offset(3, 0), 3);
    }
}
