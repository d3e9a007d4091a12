//! Help overlay: keyboard shortcuts.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::centered_rect;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = app.theme();
    let popup = centered_rect(70, 80, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent_style())
        .title(" Help [Esc]close ")
        .title_style(theme.accent_bold());

    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global", &theme);
    key(&mut lines, "q", "Quit", &theme);
    key(&mut lines, "r", "Refresh all signals", &theme);
    key(&mut lines, "t", "Toggle dark / light theme", &theme);
    key(&mut lines, "s", "Data status per pair", &theme);
    key(&mut lines, "e", "Error history", &theme);
    key(&mut lines, "?", "This help", &theme);
    lines.push(Line::from(""));

    section(&mut lines, "Filters", &theme);
    key(&mut lines, "Tab / Shift+Tab", "Focus next / previous filter", &theme);
    key(&mut lines, "Space / f", "Cycle the focused filter", &theme);
    key(&mut lines, "c", "Clear all filters", &theme);
    lines.push(Line::from(""));

    section(&mut lines, "Cards", &theme);
    key(&mut lines, "h j k l / arrows", "Move selection", &theme);
    key(&mut lines, "g / G", "First / last card", &theme);
    key(&mut lines, "Enter", "Open pair detail", &theme);
    lines.push(Line::from(""));

    section(&mut lines, "Pair Detail", &theme);
    key(&mut lines, "1 / 2 / 3", "Timeframes, charts, analysis", &theme);
    key(&mut lines, "Tab / h / l", "Switch tab", &theme);
    key(&mut lines, "Esc", "Close", &theme);

    let para = Paragraph::new(lines).block(block).style(theme.base());
    f.render_widget(para, popup);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str, theme: &Theme) {
    lines.push(Line::from(Span::styled(title.to_string(), theme.accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str, theme: &Theme) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>18}  ", keys), theme.accent_style()),
        Span::styled(desc.to_string(), theme.muted_style()),
    ]));
}
