//! Quote data model shared by the pipeline and its consumers.
//!
//! A `Quote` is the uniform record every consumer sees, whatever vendor shape or
//! fallback path produced it. Timestamps are milliseconds since the Unix epoch.

use chrono::Utc;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

use crate::symbols::Symbol;

/// Point-in-time price observation with derived change metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Mid price.
    pub price: f64,
    /// Best bid.
    pub bid: f64,
    /// Best ask.
    pub ask: f64,
    /// Absolute change against the previous observation.
    pub change: f64,
    /// Relative change against the previous observation, in percent.
    pub percent_change: f64,
    /// Observation time, epoch milliseconds.
    pub timestamp: i64,
}

/// Change metrics computed by the rolling cache.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Change {
    /// `current - previous`.
    pub change: f64,
    /// `change / previous * 100`.
    pub percent_change: f64,
}

impl Change {
    /// No movement.
    pub const ZERO: Change = Change {
        change: 0.0,
        percent_change: 0.0,
    };
}

/// One cached observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateHistoryEntry {
    /// Observed mid price.
    pub price: f64,
    /// Observation time, epoch milliseconds.
    pub timestamp: i64,
}

/// Quotes keyed by symbol, iterated in symbol order.
pub type QuoteMap = BTreeMap<Symbol, Quote>;

/// Single historical candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    /// Candle start, epoch milliseconds.
    pub timestamp: i64,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
}

/// Candle width accepted by the vendor timeseries endpoint.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// One candle per day.
    #[default]
    Daily,
    /// One candle per hour.
    Hourly,
    /// One candle per minute.
    Minute,
}

/// Candles for one symbol, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    /// Requested symbol.
    pub symbol: Symbol,
    /// Candles as returned by the vendor.
    pub data: Vec<Ohlc>,
}

/// Current UTC time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_uses_vendor_spelling() {
        assert_eq!(Interval::default(), Interval::Daily);
        assert_eq!(Interval::Hourly.to_string(), "hourly");
        assert_eq!("MINUTE".parse::<Interval>().unwrap(), Interval::Minute);
        assert!("weekly".parse::<Interval>().is_err());
    }

    #[test]
    fn quote_serializes_with_snake_case_fields() {
        let quote = Quote {
            price: 1.0,
            bid: 0.9,
            ask: 1.1,
            change: 0.0,
            percent_change: 0.0,
            timestamp: 5,
        };
        let json = serde_json::to_value(quote).unwrap();
        assert_eq!(json["percent_change"], 0.0);
        assert_eq!(json["timestamp"], 5);
    }
}
