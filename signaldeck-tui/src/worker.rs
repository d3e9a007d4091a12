//! Background worker thread: every refresh runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Each
//! refresh carries the generation number it was requested under; the main
//! thread drops responses older than its latest request, so a superseded
//! refresh completes harmlessly and is simply ignored.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use signaldeck_core::Signal;
use signaldeck_runner::{
    ChartRef, DataStatus, DocumentSource, Refresh, SignalRepository,
};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Refresh { generation: u64 },
    /// Fetch per-timeframe documents for a pair whose card came from its
    /// main document.
    LoadTimeframes { generation: u64, pair: String },
    Shutdown,
}

/// One completed refresh cycle, ready to swap into the app state.
#[derive(Debug, Clone)]
pub struct RefreshSnapshot {
    pub refresh: Refresh,
    pub status: DataStatus,
    /// Chart locations per pair, in timeframe order.
    pub charts: HashMap<String, Vec<ChartRef>>,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Refreshed {
        generation: u64,
        snapshot: Box<RefreshSnapshot>,
    },
    Timeframes {
        generation: u64,
        pair: String,
        signals: Vec<Signal>,
    },
}

pub type Repository = SignalRepository<Box<dyn DocumentSource>>;

/// Spawn the background worker thread.
pub fn spawn_worker(
    repo: Repository,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("signaldeck-worker".into())
        .spawn(move || worker_loop(repo, rx, tx))
}

fn worker_loop(repo: Repository, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Refresh { generation }) => {
                debug!(generation, "refresh started");
                let snapshot = build_snapshot(&repo);
                info!(
                    generation,
                    signals = snapshot.refresh.set.len(),
                    "refresh finished"
                );
                let resp = WorkerResponse::Refreshed {
                    generation,
                    snapshot: Box::new(snapshot),
                };
                if tx.send(resp).is_err() {
                    break;
                }
            }
            Ok(WorkerCommand::LoadTimeframes { generation, pair }) => {
                let signals = repo.timeframe_signals(&pair);
                debug!(generation, pair = %pair, loaded = signals.len(), "timeframes loaded");
                let resp = WorkerResponse::Timeframes {
                    generation,
                    pair,
                    signals,
                };
                if tx.send(resp).is_err() {
                    break;
                }
            }
        }
    }
}

/// Run one refresh and gather everything the UI needs from the source.
pub fn build_snapshot<S: DocumentSource>(repo: &SignalRepository<S>) -> RefreshSnapshot {
    let refresh = repo.refresh();
    let status = DataStatus::from_refresh(&refresh);
    let charts = refresh
        .set
        .signals()
        .iter()
        .map(|s| {
            let refs = repo
                .timeframes()
                .iter()
                .map(|tf| repo.source().chart_location(&s.pair, tf))
                .collect();
            (s.pair.clone(), refs)
        })
        .collect();
    RefreshSnapshot {
        refresh,
        status,
        charts,
    }
}
