//! Command-line arguments for the forex proxy.
//!
//! Every option can also come from the environment (or a `.env` file next to the
//! binary). The vendor key and base URL have no defaults.
use clap::Parser;
use forex_common::net::{MIN_REQUEST_INTERVAL_MS, PROXY_PORT, addr};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Vendor API key, appended to every upstream request.
    #[arg(long, env = "FOREX_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Vendor API base URL, e.g. `https://vendor.example/api/v1`.
    #[arg(long, env = "FOREX_BASE_URL")]
    pub base_url: String,

    /// Local address to listen on.
    #[arg(long, env = "FOREX_PROXY_BIND", default_value_t = addr("127.0.0.1", PROXY_PORT))]
    pub bind: String,

    /// Minimum milliseconds between admitted live requests.
    #[arg(long, env = "FOREX_MIN_INTERVAL_MS", default_value_t = MIN_REQUEST_INTERVAL_MS)]
    pub min_interval_ms: u64,
}
