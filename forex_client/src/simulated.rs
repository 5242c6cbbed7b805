//! Locally simulated quote source.
//!
//! `SimulatedSource` keeps a last price per known symbol, seeded from the fallback
//! table, and moves it with a small random walk on every live request. Payloads are
//! built in the vendor list shape so they flow through the same adapters as real data.
//!
//! Design notes:
//! - All callers observe the same price path; the state sits behind a `Mutex`.
//! - Symbols missing from the fallback table are not simulated and are left out of the
//!   payload, which then degrades the same way an empty vendor answer would.

use crate::fallback::FallbackTable;
use chrono::{Duration as ChronoDuration, Utc};
use forex_common::net::HISTORY_DAYS;
use forex_common::quote::{Interval, now_millis};
use forex_common::{Result, Symbol};
use rand::Rng;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::source::QuoteSource;

/// Largest relative move per tick, in either direction.
const MAX_STEP: f64 = 0.0005;

struct Book {
    mid: f64,
    half_spread: f64,
}

/// Random-walk quote source seeded from the fallback table.
pub struct SimulatedSource {
    books: Mutex<HashMap<Symbol, Book>>,
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new(&FallbackTable::majors())
    }
}

impl SimulatedSource {
    /// Seed one book per symbol in `table`.
    pub fn new(table: &FallbackTable) -> Self {
        let books = table
            .symbols()
            .into_iter()
            .filter_map(|symbol| {
                table.get(&symbol).map(|fallback| {
                    let book = Book {
                        mid: fallback.price,
                        half_spread: ((fallback.ask - fallback.bid) / 2.0).abs(),
                    };
                    (symbol, book)
                })
            })
            .collect();
        Self {
            books: Mutex::new(books),
        }
    }

    /// Next price on a uniform random walk of at most `MAX_STEP` around `current_price`.
    pub fn next_price(current_price: f64) -> f64 {
        let mut rng = rand::rng();
        let change: f64 = rng.random_range(-MAX_STEP..MAX_STEP);
        (current_price * (1.0 + change)).max(0.0001)
    }
}

impl QuoteSource for SimulatedSource {
    fn fetch_live(&self, symbols: &[Symbol]) -> Result<Value> {
        let mut books = self.books.lock()?;
        let timestamp = now_millis();
        let quotes: Vec<Value> = symbols
            .iter()
            .filter_map(|symbol| {
                let book = books.get_mut(symbol)?;
                book.mid = Self::next_price(book.mid);
                Some(json!({
                    "base_currency": symbol.base(),
                    "quote_currency": symbol.quote(),
                    "mid": book.mid,
                    "bid": book.mid - book.half_spread,
                    "ask": book.mid + book.half_spread,
                    "timestamp": timestamp,
                }))
            })
            .collect();
        Ok(json!({ "endpoint": "live", "quotes": quotes }))
    }

    fn fetch_timeseries(&self, symbol: &Symbol, interval: Interval) -> Result<Value> {
        let start_mid = {
            let books = self.books.lock()?;
            books.get(symbol).map(|b| b.mid)
        };
        let Some(mut mid) = start_mid else {
            return Ok(json!({ "quotes": [] }));
        };

        let (step, count) = match interval {
            Interval::Daily => (ChronoDuration::days(1), HISTORY_DAYS),
            Interval::Hourly => (ChronoDuration::hours(1), HISTORY_DAYS * 24),
            Interval::Minute => (ChronoDuration::minutes(1), 60),
        };
        let end = Utc::now();
        let quotes: Vec<Value> = (0..count)
            .rev()
            .map(|i| {
                let open = mid;
                let close = Self::next_price(open);
                mid = close;
                let date = end - step * (i as i32 + 1);
                json!({
                    "date": date.format("%Y-%m-%d %H:%M:%S").to_string(),
                    "open": open,
                    "high": open.max(close),
                    "low": open.min(close),
                    "close": close,
                })
            })
            .collect();
        Ok(json!({ "quotes": quotes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forex_common::wire::{parse_live_quotes, parse_timeseries};

    #[test]
    fn next_price_stays_within_step() {
        for _ in 0..1000 {
            let p = SimulatedSource::next_price(1.0);
            assert!((p - 1.0).abs() <= MAX_STEP + 1e-12);
        }
    }

    #[test]
    fn live_payload_is_vendor_list_shaped() {
        let source = SimulatedSource::default();
        let symbols = vec![
            "EUR/USD".parse().unwrap(),
            "XAU/USD".parse().unwrap(),
        ];
        let payload = source.fetch_live(&symbols).unwrap();
        let quotes = parse_live_quotes(&payload).unwrap();
        assert_eq!(quotes.len(), 1);
        let q = &quotes[0];
        assert!(q.bid < q.mid && q.mid < q.ask);
        assert!((q.mid - 1.0845).abs() < 0.01);
    }

    #[test]
    fn timeseries_has_one_candle_per_day() {
        let source = SimulatedSource::default();
        let symbol: Symbol = "USD/JPY".parse().unwrap();
        let payload = source.fetch_timeseries(&symbol, Interval::Daily).unwrap();
        let candles = parse_timeseries(&payload).unwrap();
        assert_eq!(candles.len(), HISTORY_DAYS as usize);
        assert!(candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(candles.iter().all(|c| c.low <= c.high));
    }
}
