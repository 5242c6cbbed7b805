//! Quote sources: where a poll cycle gets its raw vendor payload from.
//!
//! `QuoteSource` is the seam between the pipeline and the network. The production
//! implementation, `ProxySource`, talks to the local proxy over HTTP; `SimulatedSource`
//! (see `simulated`) produces vendor-shaped payloads locally.
//!
//! Each call issues exactly one request. Throttling is the proxy's job; this side only
//! maps a 429 answer to `FeedError::RateLimited`.

use forex_common::net::{HISTORICAL_ROUTE, LIVE_ROUTE, join_url};
use forex_common::quote::Interval;
use forex_common::symbols::compact_csv;
use forex_common::{FeedError, Result, Symbol};
use log::{debug, error, info};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;

/// Something that can answer live and historical quote requests with vendor JSON.
pub trait QuoteSource: Send + Sync {
    /// One live request for `symbols`. Callers guarantee `symbols` is not empty.
    fn fetch_live(&self, symbols: &[Symbol]) -> Result<Value>;

    /// One timeseries request for `symbol` over the recent history window.
    fn fetch_timeseries(&self, symbol: &Symbol, interval: Interval) -> Result<Value>;
}

/// Blocking HTTP client for the local proxy routes.
pub struct ProxySource {
    client: Client,
    base_url: String,
}

impl ProxySource {
    /// Build a source for the proxy at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_json(&self, route: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = join_url(&self.base_url, route);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .map_err(|e| FeedError::transport(None, format!("GET {}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| FeedError::transport(Some(status.as_u16()), format!("read body: {}", e)))?;
        debug!("Raw API response ({}): {}", status, body);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::RateLimited(error_message(&body)));
        }
        if !status.is_success() {
            error!("API error response: status={} body={}", status, body);
            return Err(FeedError::transport(
                Some(status.as_u16()),
                format!(
                    "API request failed: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                ),
            ));
        }

        serde_json::from_str(&body)
            .map_err(|e| FeedError::MalformedResponse(format!("unparsable body: {}", e)))
    }
}

impl QuoteSource for ProxySource {
    fn fetch_live(&self, symbols: &[Symbol]) -> Result<Value> {
        let pairs = compact_csv(symbols);
        info!("Fetching forex prices for: {}", pairs);
        self.get_json(LIVE_ROUTE, &[("pairs", pairs)])
    }

    fn fetch_timeseries(&self, symbol: &Symbol, interval: Interval) -> Result<Value> {
        info!("Fetching {} history for: {}", interval, symbol);
        self.get_json(
            HISTORICAL_ROUTE,
            &[("symbol", symbol.compact()), ("interval", interval.to_string())],
        )
    }
}

/// Pulls the `error` field out of a proxy error body, or returns the body itself.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
