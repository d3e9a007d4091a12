//! Keyboard input dispatch: overlays first, then global keys, then the grid.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, DetailTab, Overlay};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::Help | Overlay::DataStatus => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Char('s')
            ) {
                app.overlay = Overlay::None;
            }
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::Detail { .. } => {
            handle_detail_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('r') => app.request_refresh(),
        KeyCode::Char('?') => app.overlay = Overlay::Help,
        KeyCode::Char('s') => app.overlay = Overlay::DataStatus,
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
        }
        KeyCode::Char('t') => app.toggle_theme(),

        // 3. Filter bar.
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => app.focus_next_filter(false),
        KeyCode::Tab => app.focus_next_filter(true),
        KeyCode::BackTab => app.focus_next_filter(false),
        KeyCode::Char(' ') | KeyCode::Char('f') => app.cycle_focused_filter(),
        KeyCode::Char('c') => app.clear_filters(),

        // 4. Card grid.
        KeyCode::Char('j') | KeyCode::Down => {
            let step = app.columns.max(1) as isize;
            app.move_cursor(step);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let step = app.columns.max(1) as isize;
            app.move_cursor(-step);
        }
        KeyCode::Char('l') | KeyCode::Right => app.move_cursor(1),
        KeyCode::Char('h') | KeyCode::Left => app.move_cursor(-1),
        KeyCode::Home | KeyCode::Char('g') => app.cursor = 0,
        KeyCode::End | KeyCode::Char('G') => {
            let len = app.visible().len();
            app.cursor = len.saturating_sub(1);
        }
        KeyCode::Enter => app.open_detail(),
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_detail_overlay(app: &mut AppState, key: KeyEvent) {
    let Overlay::Detail { pair, tab } = &app.overlay else {
        return;
    };
    let (pair, tab) = (pair.clone(), *tab);
    let next = match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
            app.overlay = Overlay::None;
            return;
        }
        KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => tab.next(),
        KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => tab.prev(),
        KeyCode::Char('1') => DetailTab::Timeframes,
        KeyCode::Char('2') => DetailTab::Charts,
        KeyCode::Char('3') => DetailTab::Analysis,
        _ => return,
    };
    app.overlay = Overlay::Detail { pair, tab: next };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{snapshot, test_app};
    use crate::theme::ThemeMode;
    use crossterm::event::KeyEventState;
    use signaldeck_core::{Criterion, FilterField};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut app, _rx) = test_app();
        let key = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key(&mut app, key);
        assert!(app.running);
    }

    #[test]
    fn quit_and_refresh() {
        let (mut app, rx) = test_app();
        handle_key(&mut app, press(KeyCode::Char('r')));
        assert_eq!(app.generation, 1);
        assert_eq!(rx.try_iter().count(), 1);
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn overlays_swallow_quit() {
        let (mut app, _rx) = test_app();
        handle_key(&mut app, press(KeyCode::Char('?')));
        assert_eq!(app.overlay, Overlay::Help);
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert_eq!(app.overlay, Overlay::None);
        assert!(app.running);
    }

    #[test]
    fn filter_keys_drive_criteria() {
        let (mut app, _rx) = test_app();
        app.apply_snapshot(0, snapshot());
        handle_key(&mut app, press(KeyCode::Tab));
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.focused_filter, FilterField::Trend);
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert_eq!(app.criterion(FilterField::Trend), &Criterion::Is("bullish".into()));
        handle_key(&mut app, press(KeyCode::Char('c')));
        assert!(app.criteria.is_wildcard());
    }

    #[test]
    fn detail_tabs_switch_by_number_and_tab() {
        let (mut app, _rx) = test_app();
        app.apply_snapshot(0, snapshot());
        handle_key(&mut app, press(KeyCode::Enter));
        handle_key(&mut app, press(KeyCode::Char('3')));
        assert_eq!(
            app.overlay,
            Overlay::Detail { pair: "BTC-USDT".into(), tab: DetailTab::Analysis }
        );
        handle_key(&mut app, press(KeyCode::Tab));
        assert!(matches!(app.overlay, Overlay::Detail { tab: DetailTab::Timeframes, .. }));
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn theme_toggles() {
        let (mut app, _rx) = test_app();
        handle_key(&mut app, press(KeyCode::Char('t')));
        assert_eq!(app.theme_mode, ThemeMode::Light);
    }
}
