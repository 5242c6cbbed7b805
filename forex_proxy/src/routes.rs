//! HTTP routes of the proxy.
//!
//! - `GET /api/forex?pairs=EURUSD,GBPUSD`: live quotes, throttled by the shared
//!   `RateLimiter`.
//! - `GET /api/forex/historical?symbol=EURUSD&interval=daily`: candles for the last
//!   week, not throttled.
//!
//! Every error answer is a JSON object with a single `error` field. A successful
//! upstream body is passed through unchanged.

use crate::upstream::{TimeseriesQuery, Upstream, UpstreamResponse};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use forex_common::net::{HISTORICAL_ROUTE, LIVE_ROUTE};
use forex_common::quote::Interval;
use forex_common::rate_limit::RateLimiter;
use forex_common::symbols::{compact_csv, parse_csv};
use forex_common::{FeedError, Result, Symbol};
use log::{debug, error, info, warn};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

type Reply = (StatusCode, Json<Value>);

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    upstream: Arc<dyn Upstream>,
    limiter: Arc<Mutex<RateLimiter>>,
}

impl AppState {
    /// Handlers backed by `upstream`, throttling live calls with `limiter`.
    pub fn new(upstream: Arc<dyn Upstream>, limiter: RateLimiter) -> Self {
        Self {
            upstream,
            limiter: Arc::new(Mutex::new(limiter)),
        }
    }
}

/// Router with both routes mounted.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(LIVE_ROUTE, get(forex))
        .route(HISTORICAL_ROUTE, get(historical))
        .with_state(state)
}

/// Query of the live route.
#[derive(Debug, Default, Deserialize)]
pub struct LiveParams {
    /// Comma separated pairs.
    pub pairs: Option<String>,
}

/// Query of the historical route.
#[derive(Debug, Default, Deserialize)]
pub struct HistoricalParams {
    /// Pair, either form.
    pub symbol: Option<String>,
    /// Candle width, `daily` when absent.
    pub interval: Option<String>,
}

fn error_reply(status: StatusCode, message: impl Into<String>) -> Reply {
    (status, Json(json!({ "error": message.into() })))
}

fn internal_error() -> Reply {
    error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// `GET /api/forex`.
pub async fn forex(State(state): State<AppState>, Query(params): Query<LiveParams>) -> Reply {
    let raw = params.pairs.unwrap_or_default();
    let symbols = match parse_csv(&raw) {
        Ok(symbols) if symbols.is_empty() => {
            return error_reply(StatusCode::BAD_REQUEST, "Currency pairs not provided");
        }
        Ok(symbols) => symbols,
        Err(e) => {
            warn!("kind={} rejected pairs {:?}: {}", e.kind(), raw, e);
            return error_reply(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    if let Err(reply) = admit(&state) {
        return reply;
    }

    let currency = compact_csv(&symbols);
    info!("Fetching forex prices for: {}", currency);
    relay("live", state.upstream.live(&currency).await)
}

fn admit(state: &AppState) -> std::result::Result<(), Reply> {
    let mut limiter = state.limiter.lock().map_err(|e| {
        error!("rate limiter lock poisoned: {}", e);
        internal_error()
    })?;
    limiter.check().map_err(|e| {
        debug!("kind={} {}", e.kind(), e);
        let message = match e {
            FeedError::RateLimited(message) => message,
            other => other.to_string(),
        };
        error_reply(StatusCode::TOO_MANY_REQUESTS, message)
    })
}

/// `GET /api/forex/historical`.
pub async fn historical(
    State(state): State<AppState>,
    Query(params): Query<HistoricalParams>,
) -> Reply {
    let Some(raw) = params.symbol.filter(|s| !s.trim().is_empty()) else {
        return error_reply(StatusCode::BAD_REQUEST, "Symbol not provided");
    };
    let symbol = match raw.parse::<Symbol>() {
        Ok(symbol) => symbol,
        Err(e) => return error_reply(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let interval = match params.interval.as_deref() {
        None | Some("") => Interval::default(),
        Some(raw) => match raw.parse::<Interval>() {
            Ok(interval) => interval,
            Err(_) => {
                return error_reply(StatusCode::BAD_REQUEST, format!("Invalid interval: {}", raw));
            }
        },
    };

    let query = TimeseriesQuery::last_days(&symbol, interval, Utc::now().date_naive());
    info!(
        "Fetching {} history for {} ({} to {})",
        interval, symbol, query.start_date, query.end_date
    );
    relay("timeseries", state.upstream.timeseries(&query).await)
}

/// Turn an upstream outcome into the proxy answer.
fn relay(endpoint: &str, outcome: Result<UpstreamResponse>) -> Reply {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            error!("kind={} endpoint={} upstream call failed: {}", e.kind(), endpoint, e);
            return internal_error();
        }
    };

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    if !status.is_success() {
        error!(
            "Vendor API error: endpoint={} status={} body={}",
            endpoint, status, response.body
        );
        return error_reply(
            status,
            format!(
                "API request failed: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            ),
        );
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => {
            error!("kind=serde_json endpoint={} unparsable vendor body: {}", endpoint, e);
            internal_error()
        }
    }
}
