//! Vendor payload shapes and their normalization into `RawQuote`.
//!
//! The vendor answers live requests in two shapes depending on the endpoint:
//!
//! - list shape: `{"quotes": [{"base_currency": "EUR", "quote_currency": "USD", "mid": 1.08, ...}]}`
//! - keyed shape: `{"quotes": {"EURUSD": {"mid": 1.08, "bid": ..., "ask": ...}}}`
//!
//! `detect_shape` inspects the payload once and picks the matching adapter.
//! Entries that are not objects, or whose currency codes do not form a symbol,
//! are dropped with a warning; the rest of the batch is kept.

use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use serde_json::{Map, Value};

use crate::error::FeedError;
use crate::quote::Ohlc;
use crate::symbols::Symbol;
use crate::validate::{safe_parse_float, safe_parse_timestamp};

/// Sanitized vendor quote, before change tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuote {
    /// Canonical symbol.
    pub symbol: Symbol,
    /// Mid price.
    pub mid: f64,
    /// Best bid, 0 when missing.
    pub bid: f64,
    /// Best ask, 0 when missing.
    pub ask: f64,
    /// Vendor timestamp when present and numeric.
    pub timestamp: Option<i64>,
}

/// Result of the capability check on a live payload.
#[derive(Debug)]
pub enum QuotesShape<'a> {
    /// `quotes` is a non-empty array of quote objects.
    List(&'a [Value]),
    /// `quotes` is a non-empty object keyed by compact symbol.
    Keyed(&'a Map<String, Value>),
}

/// Finds the `quotes` field and classifies it.
///
/// A missing or empty `quotes` is reported as `MalformedResponse`; callers treat
/// that as a soft failure.
pub fn detect_shape(payload: &Value) -> Result<QuotesShape<'_>, FeedError> {
    let quotes = payload
        .as_object()
        .ok_or_else(|| FeedError::MalformedResponse("response is not a JSON object".into()))?
        .get("quotes")
        .ok_or_else(|| FeedError::MalformedResponse("response has no quotes field".into()))?;

    match quotes {
        Value::Array(items) if items.is_empty() => {
            Err(FeedError::MalformedResponse("quotes is empty".into()))
        }
        Value::Array(items) => Ok(QuotesShape::List(items)),
        Value::Object(map) if map.is_empty() => {
            Err(FeedError::MalformedResponse("quotes is empty".into()))
        }
        Value::Object(map) => Ok(QuotesShape::Keyed(map)),
        other => Err(FeedError::MalformedResponse(format!(
            "quotes has unsupported type: {}",
            type_name(other)
        ))),
    }
}

/// Parses a live payload into sanitized quotes using the adapter for its shape.
pub fn parse_live_quotes(payload: &Value) -> Result<Vec<RawQuote>, FeedError> {
    Ok(match detect_shape(payload)? {
        QuotesShape::List(items) => ListAdapter::normalize(items),
        QuotesShape::Keyed(map) => KeyedAdapter::normalize(map),
    })
}

/// Adapter for the list shape.
pub struct ListAdapter;

impl ListAdapter {
    /// Converts every well-formed entry, skipping the rest.
    pub fn normalize(items: &[Value]) -> Vec<RawQuote> {
        items
            .iter()
            .filter_map(|item| {
                let Some(fields) = item.as_object() else {
                    warn!("Invalid quote data, not an object: {}", item);
                    return None;
                };
                let base = fields.get("base_currency").and_then(Value::as_str).unwrap_or_default();
                let quote = fields.get("quote_currency").and_then(Value::as_str).unwrap_or_default();
                match Symbol::new(base, quote) {
                    Ok(symbol) => Some(sanitize(symbol, fields)),
                    Err(e) => {
                        warn!("Dropping quote with bad currency codes: {}", e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Adapter for the keyed shape.
pub struct KeyedAdapter;

impl KeyedAdapter {
    /// Converts every well-formed entry, skipping the rest.
    pub fn normalize(map: &Map<String, Value>) -> Vec<RawQuote> {
        map.iter()
            .filter_map(|(key, item)| {
                let Some(fields) = item.as_object() else {
                    warn!("Invalid quote data for {}, not an object: {}", key, item);
                    return None;
                };
                match key.parse::<Symbol>() {
                    Ok(symbol) => Some(sanitize(symbol, fields)),
                    Err(e) => {
                        warn!("Dropping quote with bad key: {}", e);
                        None
                    }
                }
            })
            .collect()
    }
}

fn sanitize(symbol: Symbol, fields: &Map<String, Value>) -> RawQuote {
    let bid = safe_parse_float(fields.get("bid"), 0.0);
    let ask = safe_parse_float(fields.get("ask"), 0.0);
    // Missing mid falls back to the bid/ask midpoint, then to zero.
    let midpoint = if bid > 0.0 && ask > 0.0 {
        (bid + ask) / 2.0
    } else {
        0.0
    };
    let mid = safe_parse_float(fields.get("mid"), midpoint);
    RawQuote {
        symbol,
        mid,
        bid,
        ask,
        timestamp: safe_parse_timestamp(fields.get("timestamp")).map(epoch_millis),
    }
}

/// Below this a vendor timestamp is taken to be in seconds (it would be 1973 in ms).
const SECONDS_CUTOFF: i64 = 100_000_000_000;

/// Vendor timestamps arrive in epoch seconds or milliseconds; always return milliseconds.
pub fn epoch_millis(raw: i64) -> i64 {
    if raw.abs() < SECONDS_CUTOFF {
        raw.saturating_mul(1000)
    } else {
        raw
    }
}

/// Parses a timeseries payload into candles.
///
/// Only a missing `quotes` array is an error; entries without a readable `date`
/// are skipped with a warning.
pub fn parse_timeseries(payload: &Value) -> Result<Vec<Ohlc>, FeedError> {
    let items = payload
        .get("quotes")
        .and_then(Value::as_array)
        .ok_or_else(|| FeedError::MalformedResponse("timeseries has no quotes array".into()))?;

    Ok(items
        .iter()
        .filter_map(|item| {
            let fields = item.as_object()?;
            let date = fields.get("date").and_then(Value::as_str).unwrap_or_default();
            let Some(timestamp) = parse_vendor_date(date) else {
                warn!("Dropping candle with unreadable date: {:?}", date);
                return None;
            };
            Some(Ohlc {
                timestamp,
                open: safe_parse_float(fields.get("open"), 0.0),
                high: safe_parse_float(fields.get("high"), 0.0),
                low: safe_parse_float(fields.get("low"), 0.0),
                close: safe_parse_float(fields.get("close"), 0.0),
            })
        })
        .collect())
}

/// Reads `2024-01-05`, `2024-01-05 13:00`, `2024-01-05 13:00:00` or RFC 3339, as UTC.
pub fn parse_vendor_date(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
