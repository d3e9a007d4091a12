//! SignalDeck TUI: a card grid of normalized trading signals.
//!
//! Layout:
//! 1. Filter bar with the four criteria and live stats
//! 2. Card grid, one card per resolved pair
//! 3. Status bar
//!
//! Overlays: pair detail (timeframes, charts, analysis), data status,
//! error history, help.

mod app;
mod input;
mod persistence;
mod theme;
mod ui;
mod worker;

use std::fs::File;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use signaldeck_runner::{DeckConfig, SignalRepository};

use crate::app::{AppState, ErrorCategory};
use crate::worker::{WorkerCommand, WorkerResponse};

#[derive(Parser, Debug)]
#[command(name = "signaldeck-tui", version, about = "Terminal dashboard for trading signals")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read documents from this site directory
    #[arg(long, conflicts_with = "url")]
    dir: Option<String>,

    /// Read documents from this base URL
    #[arg(long)]
    url: Option<String>,

    /// Log file (defaults to the config directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("signaldeck");
    let state_path = config_dir.join("state.json");
    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| config_dir.join("signaldeck.log"));
    init_logging(&log_path)?;

    let config = load_config(&args)?;
    let source = config.build_source().context("building document source")?;
    let source_name = source.name().to_string();
    info!(source = %source_name, timeframes = ?config.timeframes, "starting");
    let repo = SignalRepository::new(source).with_timeframes(config.timeframes.clone());

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let persisted = persistence::load(&state_path);

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(repo, cmd_rx, resp_tx)?;

    let mut app = AppState::new(cmd_tx.clone(), resp_rx, source_name);
    persistence::apply(&mut app, persisted);
    app.request_refresh();

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    if let Err(e) = persistence::save(&state_path, &persistence::extract(&app)) {
        warn!(error = %e, "could not save display preferences");
    }

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn load_config(args: &Args) -> Result<DeckConfig> {
    let mut config = match &args.config {
        Some(path) => DeckConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DeckConfig::default(),
    };
    if let Some(dir) = &args.dir {
        config = config.for_dir(dir.clone());
    }
    if let Some(url) = &args.url {
        config = config.for_url(url.clone());
    }
    config.validate()?;
    Ok(config)
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        app.columns = ui::cards::columns_for(terminal.size()?.width);
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        loop {
            match app.worker_rx.try_recv() {
                Ok(resp) => handle_worker_response(app, resp),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if app.loading {
                        app.loading = false;
                        app.push_error(ErrorCategory::Worker, "worker stopped".into(), String::new());
                    }
                    break;
                }
            }
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}

fn handle_worker_response(app: &mut AppState, resp: WorkerResponse) {
    match resp {
        WorkerResponse::Refreshed { generation, snapshot } => {
            if !app.apply_snapshot(generation, *snapshot) {
                info!(generation, latest = app.generation, "dropped superseded refresh");
            }
        }
        WorkerResponse::Timeframes { generation, pair, signals } => {
            if !app.apply_timeframes(generation, pair, signals) {
                info!(generation, latest = app.generation, "dropped superseded drill-down");
            }
        }
    }
}
