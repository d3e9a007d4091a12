//! Bottom status bar: key hints, source, last status message.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{AppState, StatusLevel};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = app.theme();
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(
        " r:Refresh Tab:Filter Space:Cycle Enter:Detail s:Status ?:Help",
        theme.muted_style(),
    ));
    spans.push(Span::raw(" | "));
    spans.push(Span::styled(app.source_name.as_str(), theme.muted_style()));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme.accent_style(),
            StatusLevel::Warning => theme.warning_style(),
            StatusLevel::Error => theme.negative_style(),
        };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg.as_str(), style));
    }

    let para = Paragraph::new(Line::from(spans)).style(theme.base());
    f.render_widget(para, area);
}
