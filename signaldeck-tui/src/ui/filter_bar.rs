//! Top bar: the four filter controls and the stats of what they let through.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use signaldeck_core::FilterField;

use crate::app::AppState;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = app.theme();

    let mut title = vec![Span::styled(" SignalDeck ", theme.accent_bold())];
    if app.loading {
        title.push(Span::styled("refreshing ", theme.warning_style()));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border(true))
        .title(Line::from(title));

    let mut filters: Vec<Span> = Vec::new();
    for field in FilterField::ALL {
        let focused = field == app.focused_filter;
        let criterion = app.criterion(field);
        let value_style = if focused {
            theme.accent_bold().add_modifier(Modifier::REVERSED)
        } else if criterion.is_wildcard() {
            theme.muted_style()
        } else {
            theme.accent_style()
        };
        filters.push(Span::styled(format!(" {}: ", field.label()), theme.muted_style()));
        filters.push(Span::styled(format!(" {criterion} "), value_style));
    }

    let stats = app.stats();
    let summary = Line::from(vec![
        Span::styled(" Total ", theme.muted_style()),
        Span::styled(stats.total.to_string(), theme.text_style()),
        Span::styled("  Bullish ", theme.muted_style()),
        Span::styled(stats.bullish.to_string(), Style::default().fg(theme.positive)),
        Span::styled("  Bearish ", theme.muted_style()),
        Span::styled(stats.bearish.to_string(), Style::default().fg(theme.negative)),
        Span::styled("  Wait ", theme.muted_style()),
        Span::styled(stats.wait.to_string(), Style::default().fg(theme.warning)),
    ]);

    let para = Paragraph::new(vec![Line::from(filters), summary])
        .block(block)
        .style(theme.base());
    f.render_widget(para, area);
}
