//! Command-line arguments for the forex client.
use clap::Parser;
use forex_client::panels::execution::TradeTicket;
use forex_common::Symbol;
use forex_common::net::{PROXY_PORT, addr};
use forex_common::quote::Interval;
use forex_common::symbols::MajorPair;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Base URL of the local forex proxy.
    #[arg(long, env = "FOREX_PROXY_URL", default_value_t = format!("http://{}", addr("127.0.0.1", PROXY_PORT)))]
    pub proxy_url: String,

    /// Seconds between poll cycles.
    #[arg(long, default_value_t = 10)]
    pub interval_secs: u64,

    /// Major pairs to track, comma separated (e.g. EURUSD,USDJPY). Defaults to all majors.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub pairs: Vec<MajorPair>,

    /// Path to a text file with one symbol per line. Overrides `--pairs`.
    #[arg(long)]
    pub path: Option<String>,

    /// Generate prices locally instead of calling the proxy.
    #[arg(long)]
    pub simulate: bool,

    /// Load candles for this symbol and seed the chart with them.
    #[arg(long)]
    pub history: Option<Symbol>,

    /// Candle interval used with `--history`.
    #[arg(long, value_enum, default_value_t = Interval::Daily)]
    pub history_interval: Interval,

    /// Mock order to fill on the first quote, `side:amount[:sl=price][:tp=price]`.
    #[arg(long)]
    pub trade: Option<TradeTicket>,
}
