//! Forex Client: polls live forex quotes through the local proxy and feeds them to the
//! display panels.
//!
//! One scheduler polls the union of two symbol groups, so a single request per
//! interval goes through the rate limited proxy:
//! - the tracked pair list, shown by the pairs table, the chart and the execution panel;
//! - the pairs held by the demo portfolio.
//!
//! Usage example (CLI):
//! ```bash
//! forex_client --proxy-url http://127.0.0.1:3000 --pairs EURUSD,GBPUSD --interval-secs 5
//! forex_client --simulate --history EUR/USD --trade buy:10000:sl=1.08
//! ```
//!
//! The symbols file passed with `--path` holds one symbol per line, either `EUR/USD`
//! or `EURUSD`.
#![warn(missing_docs)]
mod args;

use crate::args::Args;
use clap::Parser;
use forex_client::panels::chart::ChartPanel;
use forex_client::panels::execution::ExecutionPanel;
use forex_client::panels::pairs::PairsPanel;
use forex_client::panels::portfolio::PortfolioPanel;
use forex_client::panels::{Panel, run_panel};
use forex_client::simulated::SimulatedSource;
use forex_client::{FeedEvent, ForexPipeline, PollScheduler, ProxySource, QuoteSource};
use crossbeam_channel::Receiver;
use forex_common::symbols::{MajorPair, SymbolParser};
use forex_common::{FeedError, Result, Symbol};
use log::{error, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Per-request timeout for calls to the proxy.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .map_err(|e| FeedError::Config(format!("Ctrl+C handler: {}", e)))?;
    }

    let mut symbols = load_symbols(&args)?;
    let focus = match &args.history {
        Some(symbol) => symbol.clone(),
        None => symbols
            .first()
            .cloned()
            .ok_or_else(|| FeedError::InvalidInput("no symbols to track".to_string()))?,
    };
    if !symbols.contains(&focus) {
        symbols.push(focus.clone());
    }
    info!("Symbols: {:?}", symbols);

    let source: Arc<dyn QuoteSource> = if args.simulate {
        info!("Simulation mode: prices are generated locally");
        Arc::new(SimulatedSource::default())
    } else {
        Arc::new(ProxySource::new(&args.proxy_url, REQUEST_TIMEOUT)?)
    };
    let pipeline = Arc::new(ForexPipeline::with_source(source));

    let mut chart = ChartPanel::new(focus.clone());
    if args.history.is_some() {
        match pipeline.get_historical_data(&focus, args.history_interval) {
            Some(series) => chart.seed(&series),
            None => warn!("No history for {}, chart starts empty", focus),
        }
    }
    let mut execution = ExecutionPanel::new(focus);
    if let Some(ticket) = args.trade.clone() {
        execution = execution.with_pending(ticket);
    }
    let portfolio = PortfolioPanel::default();

    let held = portfolio.symbols();
    let groups = [symbols.as_slice(), held.as_slice()];
    let mut feed = PollScheduler::merged("dashboard", pipeline, &groups)?;

    let pairs_handle = spawn_panel(PairsPanel::new(symbols), feed.subscribe()?);
    let chart_handle = spawn_panel(chart, feed.subscribe()?);
    let execution_handle = spawn_panel(execution, feed.subscribe()?);
    let portfolio_handle = spawn_panel(portfolio, feed.subscribe()?);

    feed.start(Duration::from_secs(args.interval_secs))?;

    info!("Client is running. Press Ctrl+C to exit.");
    while !shutdown.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(200));
    }

    feed.stop();

    join_panel(pairs_handle);
    join_panel(chart_handle);
    join_panel(portfolio_handle);
    if let Some(execution) = join_panel(execution_handle) {
        for fill in execution.history() {
            info!("TRADE {}", fill);
        }
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn spawn_panel<P: Panel + 'static>(panel: P, events: Receiver<FeedEvent>) -> JoinHandle<P> {
    thread::spawn(move || run_panel(panel, events))
}

fn join_panel<P>(handle: JoinHandle<P>) -> Option<P> {
    match handle.join() {
        Ok(panel) => Some(panel),
        Err(_) => {
            error!("Panel thread panicked");
            None
        }
    }
}

/// Symbols from `--path` when given, otherwise the selected majors (all by default).
fn load_symbols(args: &Args) -> Result<Vec<Symbol>> {
    if let Some(raw) = &args.path {
        let path = normalize_path(raw);
        if !is_file_exist(&path) {
            return Err(FeedError::Config(format!(
                "symbols file not found: {}",
                path.display()
            )));
        }
        let symbols = Symbol::parse_from_file(BufReader::new(File::open(&path)?))?;
        if symbols.is_empty() {
            return Err(FeedError::InvalidInput(format!(
                "no symbols in {}",
                path.display()
            )));
        }
        return Ok(symbols);
    }
    if args.pairs.is_empty() {
        return Ok(MajorPair::all_symbols());
    }
    Ok(args.pairs.iter().map(|pair| pair.symbol()).collect())
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &PathBuf) -> bool {
    path.exists() && path.is_file()
}
