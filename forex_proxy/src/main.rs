//! Forex proxy: a local HTTP front for the vendor quote API.
//!
//! The proxy keeps the vendor key out of clients, throttles live requests with a
//! minimum-interval `RateLimiter` and maps vendor failures to small JSON error bodies.
//!
//! Building blocks:
//! - `Args`/`Config`: CLI and environment settings (a `.env` file is honoured).
//! - `Upstream`: the vendor API behind a trait, implemented with `reqwest`.
//! - `routes`: the axum handlers for the live and historical routes.
//!
//! Usage example (CLI):
//! ```bash
//! FOREX_API_KEY=... forex_proxy --base-url https://vendor.example/api/v1 --bind 127.0.0.1:3000
//! ```
#![warn(missing_docs)]
mod args;
mod config;
mod routes;
mod upstream;

use crate::args::Args;
use crate::config::Config;
use crate::routes::{AppState, router};
use crate::upstream::HttpUpstream;
use clap::Parser;
use forex_common::Result;
use forex_common::rate_limit::RateLimiter;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

/// Per-request timeout for vendor calls.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logger();
    let config = Config::from_args(Args::parse())?;
    info!("Starting forex proxy: {:?}", config);

    let upstream = HttpUpstream::new(&config.base_url, &config.api_key, UPSTREAM_TIMEOUT)?;
    let state = AppState::new(Arc::new(upstream), RateLimiter::new(config.min_interval));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("Forex proxy listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Forex proxy stopped");
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C received. Shutting down proxy..."),
        Err(e) => {
            error!("Unable to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
