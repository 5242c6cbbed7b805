//! Shared networking constants and helpers used by proxy and client.

/// Default TCP port the local proxy listens on.
pub const PROXY_PORT: u16 = 3000;
/// Minimum interval between admitted live requests at the proxy, milliseconds.
pub const MIN_REQUEST_INTERVAL_MS: u64 = 2000;
/// Proxy route for live quotes.
pub const LIVE_ROUTE: &str = "/api/forex";
/// Proxy route for historical candles.
pub const HISTORICAL_ROUTE: &str = "/api/forex/historical";
/// Vendor live endpoint, relative to the configured base URL.
pub const UPSTREAM_LIVE_PATH: &str = "live";
/// Vendor timeseries endpoint, relative to the configured base URL.
pub const UPSTREAM_TIMESERIES_PATH: &str = "timeseries";
/// Days of history requested for candles.
pub const HISTORY_DAYS: i64 = 7;

/// Helper to format an IPv4 address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

/// Joins a base URL and a path segment with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
