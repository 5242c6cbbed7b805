//! Validated proxy configuration.

use crate::args::Args;
use forex_common::{FeedError, Result};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Runtime settings derived from [`Args`].
#[derive(Clone)]
pub struct Config {
    /// Vendor API key.
    pub api_key: String,
    /// Vendor base URL without a trailing slash.
    pub base_url: String,
    /// Listen address.
    pub bind: SocketAddr,
    /// Live route throttle window.
    pub min_interval: Duration,
}

impl Config {
    /// Check and normalize the raw arguments.
    pub fn from_args(args: Args) -> Result<Self> {
        let api_key = args.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(FeedError::Config("api key must not be empty".to_string()));
        }
        let base_url = args.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(FeedError::Config(format!(
                "base url must start with http:// or https://, got {:?}",
                base_url
            )));
        }
        let bind = args
            .bind
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| FeedError::Config(format!("bind address {:?}: {}", args.bind, e)))?;
        Ok(Self {
            api_key,
            base_url,
            bind,
            min_interval: Duration::from_millis(args.min_interval_ms),
        })
    }
}

// Keeps the key out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("bind", &self.bind)
            .field("min_interval", &self.min_interval)
            .finish()
    }
}
