//! Calls to the vendor quote API.
//!
//! `Upstream` hides the HTTP client from the route handlers so they can be exercised
//! without a network. Implementations return the raw status and body; mapping to
//! proxy responses happens in `routes`.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use forex_common::net::{HISTORY_DAYS, UPSTREAM_LIVE_PATH, UPSTREAM_TIMESERIES_PATH, join_url};
use forex_common::quote::Interval;
use forex_common::{FeedError, Result, Symbol};
use log::debug;
use reqwest::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;

/// Status and body of an upstream answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw body text.
    pub body: String,
}

/// Parameters of a timeseries request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeseriesQuery {
    /// Compact pair, e.g. `EURUSD`.
    pub currency: String,
    /// First day, `YYYY-MM-DD`.
    pub start_date: String,
    /// Last day, `YYYY-MM-DD`.
    pub end_date: String,
    /// Candle width.
    pub interval: Interval,
}

impl TimeseriesQuery {
    /// The `HISTORY_DAYS` days ending on `today`.
    pub fn last_days(symbol: &Symbol, interval: Interval, today: NaiveDate) -> Self {
        let start = today - ChronoDuration::days(HISTORY_DAYS);
        Self {
            currency: symbol.compact(),
            start_date: start.format("%Y-%m-%d").to_string(),
            end_date: today.format("%Y-%m-%d").to_string(),
            interval,
        }
    }
}

/// Vendor API as seen by the proxy.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Live quotes for a comma separated list of compact pairs.
    async fn live(&self, currency: &str) -> Result<UpstreamResponse>;

    /// Candles for one pair.
    async fn timeseries(&self, query: &TimeseriesQuery) -> Result<UpstreamResponse>;
}

/// `Upstream` backed by `reqwest`.
pub struct HttpUpstream {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpUpstream {
    /// Client for the vendor at `base_url`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<UpstreamResponse> {
        let url = join_url(&self.base_url, path);
        debug!("GET {} {:?}", url, redacted(query));
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            // The error carries the full URL, api key included.
            .map_err(|e| FeedError::transport(None, format!("GET {}: {}", url, e.without_url())))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FeedError::transport(Some(status), format!("read body: {}", e.without_url())))?;
        Ok(UpstreamResponse { status, body })
    }
}

fn redacted<'a>(query: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    query
        .iter()
        .map(|&(k, v)| if k == "api_key" { (k, "***") } else { (k, v) })
        .collect()
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn live(&self, currency: &str) -> Result<UpstreamResponse> {
        self.get(
            UPSTREAM_LIVE_PATH,
            &[("currency", currency), ("api_key", self.api_key.as_str())],
        )
        .await
    }

    async fn timeseries(&self, query: &TimeseriesQuery) -> Result<UpstreamResponse> {
        let interval = query.interval.to_string();
        self.get(
            UPSTREAM_TIMESERIES_PATH,
            &[
                ("api_key", self.api_key.as_str()),
                ("currency", query.currency.as_str()),
                ("start_date", query.start_date.as_str()),
                ("end_date", query.end_date.as_str()),
                ("interval", interval.as_str()),
                ("format", "json"),
            ],
        )
        .await
    }
}
