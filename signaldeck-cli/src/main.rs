//! SignalDeck CLI: resolve, filter and inspect signals without the TUI.
//!
//! Commands:
//! - `resolve`: run one refresh cycle and print every resolved signal
//! - `list`: same, narrowed by pair/timeframe/trend/action criteria
//! - `show`: one pair in full, with its per-timeframe breakdown
//! - `status`: which documents loaded for each configured pair
//! - `normalize`: normalize a single JSON document from disk

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use signaldeck_core::{normalize, Criterion, FilterCriteria, Signal, SignalError, SignalStats};
use signaldeck_runner::{
    DataStatus, DeckConfig, DocumentSource, PairOutcome, Refresh, SignalRepository,
};

#[derive(Parser)]
#[command(name = "signaldeck", version, about = "Trading signal normalization and inspection")]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read documents from a site directory.
    #[arg(long, global = true, conflicts_with = "url")]
    dir: Option<String>,

    /// Read documents from a base URL.
    #[arg(long, global = true)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one refresh and print every resolved signal.
    Resolve {
        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print resolved signals that pass the given criteria.
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show one pair in full.
    Show {
        /// Pair symbol, e.g. BTC-USDT.
        pair: String,

        /// Print JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Report which documents loaded for each configured pair.
    Status {
        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Normalize one JSON document from disk and print the signal.
    Normalize {
        /// Path to the document.
        file: PathBuf,

        /// Pair the document belongs to.
        #[arg(long)]
        pair: String,

        /// Timeframe code, for per-timeframe documents.
        #[arg(long)]
        timeframe: Option<String>,
    },
}

/// Criteria flags. Omitted or `all` means no restriction.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    #[arg(long)]
    pair: Option<String>,
    #[arg(long)]
    timeframe: Option<String>,
    /// bullish, bearish or neutral
    #[arg(long)]
    trend: Option<String>,
    /// buy, sell or wait
    #[arg(long)]
    action: Option<String>,
}

impl FilterArgs {
    fn criteria(&self) -> FilterCriteria {
        let pick = |v: &Option<String>| v.as_deref().map(Criterion::parse).unwrap_or_default();
        FilterCriteria {
            pair: pick(&self.pair),
            timeframe: pick(&self.timeframe),
            trend: pick(&self.trend),
            action: pick(&self.action),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { json } => {
            let refresh = refresh(&cli.source)?;
            print_signals(&refresh.set.signals().iter().collect::<Vec<_>>(), json)
        }
        Commands::List { filters, json } => {
            let refresh = refresh(&cli.source)?;
            let criteria = filters.criteria();
            debug!(?criteria, "filtering");
            let hits = signaldeck_core::filter(refresh.set.signals(), &criteria);
            print_signals(&hits, json)
        }
        Commands::Show { pair, json } => run_show(&cli.source, &pair, json),
        Commands::Status { json } => {
            let refresh = refresh(&cli.source)?;
            let status = DataStatus::from_refresh(&refresh);
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print!("{}", status_table(&status));
            }
            Ok(())
        }
        Commands::Normalize { file, pair, timeframe } => {
            let signal = run_normalize(&file, &pair, timeframe.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&signal)?);
            Ok(())
        }
    }
}

fn load_config(args: &SourceArgs) -> Result<DeckConfig> {
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

fn repository(args: &SourceArgs) -> Result<SignalRepository<Box<dyn DocumentSource>>> {
    let config = load_config(args)?;
    let source = config.build_source()?;
    Ok(SignalRepository::new(source).with_timeframes(config.timeframes))
}

fn refresh(args: &SourceArgs) -> Result<Refresh> {
    let refresh = repository(args)?.refresh();
    if let Some(err) = &refresh.config_error {
        eprintln!("warning: pair list unavailable ({err}); showing fallback data");
    }
    if let Some(notice) = &refresh.notice {
        eprintln!("warning: {notice}");
    }
    Ok(refresh)
}

fn run_show(args: &SourceArgs, pair: &str, json: bool) -> Result<()> {
    let repo = repository(args)?;
    let outcome = resolve_with_breakdown(&repo, pair);
    let Some(signal) = &outcome.signal else {
        bail!("no data for {pair}: neither the main document nor any timeframe loaded");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    print!("{}", signal_detail(signal));
    if !outcome.timeframe_signals.is_empty() {
        println!();
        print!("{}", signal_table(&outcome.timeframe_signals.iter().collect::<Vec<_>>()));
    }
    Ok(())
}

/// Resolve one pair and fill its per-timeframe breakdown. Resolution skips
/// the timeframe documents when the main document loads, so they are
/// fetched here instead.
fn resolve_with_breakdown<S: DocumentSource>(repo: &SignalRepository<S>, pair: &str) -> PairOutcome {
    let mut outcome = repo.resolve_pair(pair);
    if outcome.main_loaded {
        outcome.timeframe_signals = repo.timeframe_signals(pair);
    }
    outcome
}

fn run_normalize(file: &Path, pair: &str, timeframe: Option<&str>) -> Result<Signal> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let doc: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", file.display()))?;
    match normalize(&doc, pair, timeframe) {
        Ok(signal) => Ok(signal),
        Err(e @ SignalError::EmptyBody { .. }) => bail!("{}: {e}", file.display()),
        Err(e) => Err(e.into()),
    }
}

fn print_signals(signals: &[&Signal], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(signals)?);
    } else {
        print!("{}", signal_table(signals));
        println!("{}", stats_line(&SignalStats::from_signals(signals.iter().copied())));
    }
    Ok(())
}

fn signal_table(signals: &[&Signal]) -> String {
    let mut out = format!(
        "{:<12} {:<5} {:<8} {:<6} {:<8} {:<11} {:<22} {}\n",
        "PAIR", "TF", "TREND", "ACTION", "CONF", "SOURCE", "ENTRY", "TARGETS"
    );
    for s in signals {
        out.push_str(&format!(
            "{:<12} {:<5} {:<8} {:<6} {:<8} {:<11} {:<22} {}\n",
            s.pair,
            s.timeframe.as_deref().unwrap_or("-"),
            s.trend.as_str(),
            s.action.as_str(),
            s.classification.confidence,
            s.data_type.as_str(),
            s.recommendation.entry_range,
            s.recommendation.targets,
        ));
    }
    out
}

fn stats_line(stats: &SignalStats) -> String {
    format!(
        "{} signals: {} bullish, {} bearish, {} wait",
        stats.total, stats.bullish, stats.bearish, stats.wait
    )
}

fn signal_detail(s: &Signal) -> String {
    let c = &s.classification;
    let r = &s.recommendation;
    let p = &s.position_sizing;
    let t = &s.technical_analysis;
    let m = &s.risk_management;
    let rows = [
        ("Pair", s.label()),
        ("Source", s.data_type.to_string()),
        ("Timestamp", s.timestamp.clone()),
        ("Trend", s.trend.to_string()),
        ("Action", s.action.to_string()),
        ("Type", c.kind.clone()),
        ("Confidence", c.confidence.clone()),
        ("Confluence", c.confluence_score.clone()),
        ("Win rate", c.win_rate.clone()),
        ("Entry", r.entry_range.clone()),
        ("Targets", r.targets.clone()),
        ("Stop loss", r.stop_loss.clone()),
        ("Risk/reward", r.risk_reward_ratio.clone()),
        ("Tier", p.confidence_tier.clone()),
        ("Position size", p.position_size.clone()),
        ("Portfolio risk", p.portfolio_risk.clone()),
        ("Primary TF", t.primary_timeframe.clone()),
        ("TA trend", t.trend.clone()),
        ("Volume", t.volume_confirmation.clone()),
        ("Pattern", t.pattern_strength.clone()),
        ("Stop type", m.stop_loss_type.clone()),
        ("Reward targets", m.reward_targets.to_string()),
        ("Exit strategy", m.exit_strategy.clone()),
        ("Max drawdown", m.max_drawdown.clone()),
    ];
    let mut out = String::new();
    for (label, value) in rows {
        out.push_str(&format!("{label:<16}{value}\n"));
    }
    out.push_str(&format!("\n{}\n", s.reasoning));
    out
}

fn status_table(status: &DataStatus) -> String {
    let mut out = String::new();
    if let Some(err) = &status.config_error {
        out.push_str(&format!("pair list unavailable: {err}\n"));
    }
    out.push_str(&format!(
        "{}/{} pairs resolved{}\n",
        status.resolved_count(),
        status.rows.len(),
        if status.sample { " (sample shown)" } else { "" }
    ));
    out.push_str(&format!("{:<12} {:<5} {:<11} {}\n", "PAIR", "MAIN", "SOURCE", "MISSING TIMEFRAMES"));
    for row in &status.rows {
        out.push_str(&format!(
            "{:<12} {:<5} {:<11} {}\n",
            row.symbol,
            if row.main_loaded { "yes" } else { "no" },
            row.resolved.map(|d| d.as_str()).unwrap_or("missing"),
            if row.timeframes_checked {
                row.timeframes_missing.join(",")
            } else {
                "-".to_string()
            },
        ));
    }
    out
}
