//! Overlay widgets: pair detail, data status, error history.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};

use signaldeck_core::Signal;

use crate::app::{AppState, DetailTab};
use crate::theme::Theme;
use crate::ui::cards::percent;
use crate::ui::centered_rect;

/// Per-pair drill-down with timeframe, chart and analysis tabs.
pub fn render_detail(f: &mut Frame, area: Rect, app: &AppState, pair: &str, tab: DetailTab) {
    let theme = app.theme();
    let popup = centered_rect(85, 85, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent_style())
        .title(format!(" {pair} [1-3]tab [Esc]close "))
        .title_style(theme.accent_bold());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let titles: Vec<Line> = DetailTab::ALL
        .iter()
        .map(|t| Line::from(format!("{} {}", t.index() + 1, t.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(tab.index())
        .style(theme.muted_style())
        .highlight_style(theme.accent_bold().add_modifier(Modifier::UNDERLINED));
    f.render_widget(tabs, chunks[0]);

    let lines = match tab {
        DetailTab::Timeframes => timeframe_lines(app, pair, &theme),
        DetailTab::Charts => chart_lines(app, pair, &theme),
        DetailTab::Analysis => match app.signals().iter().find(|s| s.pair == pair) {
            Some(signal) => analysis_lines(signal, &theme),
            None => vec![Line::from(Span::styled("No signal for this pair.", theme.muted_style()))],
        },
    };
    let para = Paragraph::new(lines).style(theme.base()).wrap(Wrap { trim: false });
    f.render_widget(para, chunks[1]);
}

fn timeframe_lines<'a>(app: &'a AppState, pair: &str, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("{:<6}{:<10}{:<7}{:<10}{:<8}{:<22}{}", "TF", "TREND", "ACTION", "CONF", "WIN", "ENTRY", "TARGETS"),
        theme.accent_bold(),
    ))];

    if let Some(card) = app.signals().iter().find(|s| s.pair == pair) {
        lines.push(timeframe_row("card", card, theme));
    }

    let timeframes = app
        .snapshot
        .as_ref()
        .map(|s| s.refresh.set.timeframes())
        .unwrap_or_default();
    match app.timeframe_signals(pair) {
        Some(loaded) => {
            for tf in timeframes {
                match loaded.iter().find(|s| s.timeframe.as_deref() == Some(tf.as_str())) {
                    Some(s) => lines.push(timeframe_row(tf, s, theme)),
                    None => lines.push(Line::from(vec![
                        Span::styled(format!("{tf:<6}"), theme.text_style()),
                        Span::styled("no data", theme.muted_style()),
                    ])),
                }
            }
        }
        None => lines.push(Line::from(Span::styled(
            "Loading timeframe documents...",
            theme.muted_style(),
        ))),
    }

    if let Some(outcome) = app.outcome(pair) {
        lines.push(Line::from(""));
        let source = if outcome.main_loaded {
            "main document"
        } else if outcome.timeframes.is_empty() {
            "none"
        } else {
            "aggregated timeframes"
        };
        lines.push(Line::from(vec![
            Span::styled("Card built from: ", theme.muted_style()),
            Span::styled(source, theme.accent_style()),
        ]));
    }
    lines
}

fn timeframe_row<'a>(label: &str, s: &'a Signal, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<6}"), theme.text_style()),
        Span::styled(
            format!("{:<10}", s.trend.as_str()),
            Style::default().fg(theme.trend_color(s.trend)),
        ),
        Span::styled(
            format!("{:<7}", s.action.as_str()),
            Style::default().fg(theme.action_color(s.action)),
        ),
        Span::styled(
            format!("{:<10}", s.classification.confidence),
            Style::default().fg(theme.confidence_color(s.confidence_level())),
        ),
        Span::styled(format!("{:<8}", percent(&s.classification.win_rate)), theme.text_style()),
        Span::styled(format!("{:<22}", s.recommendation.entry_range), theme.text_style()),
        Span::styled(s.recommendation.targets.as_str(), theme.text_style()),
    ])
}

fn chart_lines<'a>(app: &'a AppState, pair: &str, theme: &Theme) -> Vec<Line<'a>> {
    let charts = app.charts(pair);
    if charts.is_empty() {
        return vec![Line::from(Span::styled("No chart locations.", theme.muted_style()))];
    }
    charts
        .iter()
        .map(|c| {
            let badge = match c.exists {
                Some(true) => "available",
                Some(false) => "missing",
                None => "unchecked",
            };
            Line::from(vec![
                Span::styled(format!("{:<6}", c.timeframe), theme.text_style()),
                Span::styled(
                    format!("{badge:<11}"),
                    Style::default().fg(theme.availability_color(c.exists)),
                ),
                Span::styled(c.location.as_str(), theme.muted_style()),
            ])
        })
        .collect()
}

fn analysis_lines<'a>(s: &'a Signal, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = Vec::new();

    let c = &s.classification;
    section(&mut lines, theme, "Classification", vec![
        ("Type", c.kind.clone()),
        ("Confidence", c.confidence.clone()),
        ("Confluence", c.confluence_score.clone()),
        ("Win rate", c.win_rate.clone()),
    ]);
    let r = &s.recommendation;
    section(&mut lines, theme, "Recommendation", vec![
        ("Action", r.action.clone()),
        ("Entry", r.entry_range.clone()),
        ("Targets", r.targets.clone()),
        ("Stop loss", r.stop_loss.clone()),
        ("Risk/reward", r.risk_reward_ratio.clone()),
    ]);
    let p = &s.position_sizing;
    section(&mut lines, theme, "Position Sizing", vec![
        ("Tier", p.confidence_tier.clone()),
        ("Size", p.position_size.clone()),
        ("Portfolio risk", p.portfolio_risk.clone()),
    ]);
    let t = &s.technical_analysis;
    section(&mut lines, theme, "Technical Analysis", vec![
        ("Primary timeframe", t.primary_timeframe.clone()),
        ("Trend", t.trend.clone()),
        ("Volume", t.volume_confirmation.clone()),
        ("Pattern strength", t.pattern_strength.clone()),
    ]);
    let m = &s.risk_management;
    section(&mut lines, theme, "Risk Management", vec![
        ("Stop type", m.stop_loss_type.clone()),
        ("Reward targets", m.reward_targets.to_string()),
        ("Exit strategy", m.exit_strategy.clone()),
        ("Max drawdown", m.max_drawdown.clone()),
    ]);

    lines.push(Line::from(Span::styled("Reasoning", theme.accent_bold())));
    lines.push(Line::from(Span::styled(s.reasoning.as_str(), theme.text_style())));
    lines.push(Line::from(Span::styled(
        format!("{} | {}", s.data_type, s.timestamp),
        theme.muted_style(),
    )));
    lines
}

fn section<'a>(lines: &mut Vec<Line<'a>>, theme: &Theme, title: &'static str, rows: Vec<(&'static str, String)>) {
    lines.push(Line::from(Span::styled(title, theme.accent_bold())));
    for (label, value) in rows {
        lines.push(Line::from(vec![
            Span::styled(format!("  {label:<20}"), theme.muted_style()),
            Span::styled(value, theme.text_style()),
        ]));
    }
    lines.push(Line::from(""));
}

/// Which pairs loaded, from which documents.
pub fn render_data_status(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = app.theme();
    let popup = centered_rect(80, 75, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent_style())
        .title(" Data Status [Esc]close ")
        .title_style(theme.accent_bold());

    let Some(snapshot) = &app.snapshot else {
        let para = Paragraph::new(Span::styled("No refresh has completed yet.", theme.muted_style()))
            .block(block);
        f.render_widget(para, popup);
        return;
    };
    let status = &snapshot.status;

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled("Resolved ", theme.muted_style()),
        Span::styled(
            format!("{}/{}", status.resolved_count(), status.rows.len()),
            theme.accent_bold(),
        ),
        Span::styled(format!("  timeframes {}", status.timeframes.join(",")), theme.muted_style()),
    ]));
    if let Some(err) = &status.config_error {
        lines.push(Line::from(Span::styled(
            format!("Pair list unavailable: {err}"),
            theme.negative_style(),
        )));
    }
    if status.sample {
        lines.push(Line::from(Span::styled("Showing sample signal", theme.warning_style())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("{:<14}{:<6}{:<12}{}", "PAIR", "MAIN", "SOURCE", "TIMEFRAMES"),
        theme.accent_bold(),
    )));

    for row in &status.rows {
        let resolved = row
            .resolved
            .map(|d| d.as_str().to_string())
            .unwrap_or_else(|| "missing".into());
        let row_style = if row.is_missing() {
            theme.negative_style()
        } else {
            theme.text_style()
        };
        let mut spans = vec![
            Span::styled(format!("{:<14}", row.symbol), row_style),
            Span::styled(
                format!("{:<6}", if row.main_loaded { "yes" } else { "no" }),
                Style::default().fg(theme.availability_color(Some(row.main_loaded))),
            ),
            Span::styled(format!("{resolved:<12}"), row_style),
        ];
        for tf in &status.timeframes {
            let loaded = row
                .timeframes_checked
                .then(|| row.timeframes_loaded.contains(tf));
            spans.push(Span::styled(
                format!("{tf} "),
                Style::default().fg(theme.availability_color(loaded)),
            ));
        }
        lines.push(Line::from(spans));
    }

    let para = Paragraph::new(lines).block(block).style(theme.base());
    f.render_widget(para, popup);
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = app.theme();
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.negative_style())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme.negative_style());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme.muted_style()));
        f.render_widget(text, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app
        .error_history
        .iter()
        .enumerate()
        .skip(app.error_scroll)
        .take(inner.height as usize)
    {
        let style = if i == app.error_scroll {
            theme.negative_style().add_modifier(Modifier::BOLD)
        } else {
            theme.muted_style()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", err.timestamp.format("%H:%M:%S")), theme.muted_style()),
            Span::styled(format!("[{}] ", err.category.label()), theme.warning_style()),
            Span::styled(err.message.as_str(), style),
        ]));
        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme.muted_style()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}
