//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDateTime;

use signaldeck_core::filter::{filter, observed_values};
use signaldeck_core::{Action, Criterion, FilterCriteria, FilterField, Signal, SignalStats, Trend};
use signaldeck_runner::{ChartRef, PairOutcome};

use crate::theme::{Theme, ThemeMode};
use crate::worker::{RefreshSnapshot, WorkerCommand, WorkerResponse};

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Data,
    Worker,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Config => "CFG",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Worker => "WRK",
        }
    }
}

/// Tabs of the per-pair detail overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Timeframes,
    Charts,
    Analysis,
}

impl DetailTab {
    pub const ALL: [DetailTab; 3] = [DetailTab::Timeframes, DetailTab::Charts, DetailTab::Analysis];

    pub fn label(self) -> &'static str {
        match self {
            DetailTab::Timeframes => "Timeframes",
            DetailTab::Charts => "Charts",
            DetailTab::Analysis => "Analysis",
        }
    }

    pub fn index(self) -> usize {
        match self {
            DetailTab::Timeframes => 0,
            DetailTab::Charts => 1,
            DetailTab::Analysis => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Detail { pair: String, tab: DetailTab },
    DataStatus,
    Help,
    ErrorHistory,
}

/// Top-level application state.
pub struct AppState {
    pub running: bool,

    // Latest accepted refresh.
    pub snapshot: Option<RefreshSnapshot>,
    /// Timeframe signals fetched on demand for main-document pairs.
    pub drill_down: HashMap<String, Vec<Signal>>,
    /// Generation of the most recent refresh request.
    pub generation: u64,
    pub loading: bool,

    // Grid
    pub criteria: FilterCriteria,
    pub focused_filter: FilterField,
    pub cursor: usize,
    pub columns: usize,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub theme_mode: ThemeMode,
    pub source_name: String,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        source_name: String,
    ) -> Self {
        Self {
            running: true,
            snapshot: None,
            drill_down: HashMap::new(),
            generation: 0,
            loading: false,
            criteria: FilterCriteria::all(),
            focused_filter: FilterField::Pair,
            cursor: 0,
            columns: 1,
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(50),
            error_scroll: 0,
            overlay: Overlay::None,
            theme_mode: ThemeMode::default(),
            source_name,
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::for_mode(self.theme_mode)
    }

    /// All signals of the current snapshot.
    pub fn signals(&self) -> &[Signal] {
        self.snapshot
            .as_ref()
            .map(|s| s.refresh.set.signals())
            .unwrap_or_default()
    }

    /// Signals passing the current criteria, in resolution order.
    pub fn visible(&self) -> Vec<&Signal> {
        filter(self.signals(), &self.criteria)
    }

    pub fn stats(&self) -> SignalStats {
        SignalStats::from_signals(self.visible())
    }

    pub fn selected(&self) -> Option<&Signal> {
        self.visible().get(self.cursor).copied()
    }

    pub fn outcome(&self, pair: &str) -> Option<&PairOutcome> {
        self.snapshot.as_ref()?.refresh.set.outcome(pair)
    }

    /// Per-timeframe signals for the detail view. `None` while a drill-down
    /// fetch is still outstanding.
    pub fn timeframe_signals(&self, pair: &str) -> Option<&[Signal]> {
        match self.outcome(pair) {
            Some(o) if !o.timeframes_checked => self.drill_down.get(pair).map(Vec::as_slice),
            Some(o) => Some(o.timeframe_signals.as_slice()),
            None => Some(&[][..]),
        }
    }

    pub fn charts(&self, pair: &str) -> &[ChartRef] {
        self.snapshot
            .as_ref()
            .and_then(|s| s.charts.get(pair))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ask the worker for a fresh cycle under a new generation.
    pub fn request_refresh(&mut self) {
        self.generation += 1;
        match self.worker_tx.send(WorkerCommand::Refresh {
            generation: self.generation,
        }) {
            Ok(()) => {
                self.loading = true;
                self.set_status("Refreshing signals...");
            }
            Err(e) => {
                self.loading = false;
                self.push_error(
                    ErrorCategory::Worker,
                    format!("worker unavailable: {e}"),
                    "refresh".into(),
                );
            }
        }
    }

    /// Install a worker result. Returns false when a newer refresh has been
    /// requested since, in which case the result is dropped.
    pub fn apply_snapshot(&mut self, generation: u64, snapshot: RefreshSnapshot) -> bool {
        if generation < self.generation {
            return false;
        }
        self.loading = false;

        let refresh = &snapshot.refresh;
        if let Some(err) = &refresh.config_error {
            self.push_error(
                ErrorCategory::Config,
                format!("Pair list unavailable, showing sample data: {err}"),
                self.source_name.clone(),
            );
        } else if let Some(notice) = &refresh.notice {
            self.push_error(ErrorCategory::Data, notice.clone(), self.source_name.clone());
        } else if refresh.set.is_sample() {
            self.set_warning("No signals loaded; showing sample signal");
        } else {
            let missing = snapshot.status.missing().count();
            if missing == 0 {
                self.set_status(format!("Loaded {} signals", refresh.set.len()));
            } else {
                self.set_warning(format!(
                    "Loaded {} signals, {missing} pairs without data (press s)",
                    refresh.set.len()
                ));
            }
        }

        self.snapshot = Some(snapshot);
        self.drill_down.clear();
        self.clamp_cursor();
        if let Overlay::Detail { pair, .. } = &self.overlay {
            let pair = pair.clone();
            self.request_timeframes(&pair);
        }
        true
    }

    /// Store drill-down signals fetched by the worker. Results requested
    /// before the latest refresh are dropped.
    pub fn apply_timeframes(&mut self, generation: u64, pair: String, signals: Vec<Signal>) -> bool {
        if generation < self.generation {
            return false;
        }
        self.drill_down.insert(pair, signals);
        true
    }

    /// Ask the worker for a pair's timeframe documents unless they are
    /// already known.
    fn request_timeframes(&mut self, pair: &str) {
        if self.timeframe_signals(pair).is_some() {
            return;
        }
        let cmd = WorkerCommand::LoadTimeframes {
            generation: self.generation,
            pair: pair.to_string(),
        };
        if let Err(e) = self.worker_tx.send(cmd) {
            self.push_error(
                ErrorCategory::Worker,
                format!("worker unavailable: {e}"),
                pair.to_string(),
            );
        }
    }

    /// Options a filter control steps through, not counting the wildcard.
    pub fn filter_options(&self, field: FilterField) -> Vec<String> {
        match field {
            FilterField::Pair => observed_values(self.signals(), FilterField::Pair),
            FilterField::Timeframe => observed_values(self.signals(), FilterField::Timeframe),
            FilterField::Trend => Trend::ALL.iter().map(|t| t.as_str().to_string()).collect(),
            FilterField::Action => Action::ALL.iter().map(|a| a.as_str().to_string()).collect(),
        }
    }

    pub fn cycle_focused_filter(&mut self) {
        let field = self.focused_filter;
        let next = self.criteria.get(field).cycle(&self.filter_options(field));
        self.criteria.set(field, next);
        self.clamp_cursor();
    }

    pub fn focus_next_filter(&mut self, forward: bool) {
        let all = FilterField::ALL;
        let i = all.iter().position(|f| *f == self.focused_filter).unwrap_or(0);
        let j = if forward { (i + 1) % all.len() } else { (i + all.len() - 1) % all.len() };
        self.focused_filter = all[j];
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::all();
        self.set_status("Filters cleared");
        self.clamp_cursor();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    pub fn open_detail(&mut self) {
        if let Some(pair) = self.selected().map(|s| s.pair.clone()) {
            self.request_timeframes(&pair);
            self.overlay = Overlay::Detail {
                pair,
                tab: DetailTab::Timeframes,
            };
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme_mode = self.theme_mode.toggle();
        self.set_status(format!("Theme: {}", self.theme_mode.label()));
    }

    /// Criterion currently applied to `field`, for display.
    pub fn criterion(&self, field: FilterField) -> &Criterion {
        self.criteria.get(field)
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > 50 {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}
