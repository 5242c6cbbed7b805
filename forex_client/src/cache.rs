//! Rolling per-symbol price history used for change tracking.
//!
//! Each symbol owns a bounded FIFO of `RateHistoryEntry` values. `update` appends at
//! the tail and evicts from the head once capacity is exceeded; `delta` compares a
//! price against the entry just before the latest one.
//!
//! Notes:
//! - Order is insertion order. Timestamps are stored, never sorted on.
//! - Histories are created lazily on the first valid observation and live as long as
//!   the cache.
//! - The cache is not synchronized; `ForexPipeline` owns it behind a `Mutex`.

use forex_common::Symbol;
use forex_common::quote::{Change, RateHistoryEntry};
use forex_common::validate::is_valid_number;
use log::warn;
use std::collections::{HashMap, VecDeque};

/// Default number of observations kept per symbol.
pub const DEFAULT_CAPACITY: usize = 10;

/// Bounded per-symbol price history.
#[derive(Debug)]
pub struct RateCache {
    capacity: usize,
    histories: HashMap<Symbol, VecDeque<RateHistoryEntry>>,
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RateCache {
    /// Create an empty cache keeping at most `capacity` entries per symbol (minimum 2).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(2),
            histories: HashMap::new(),
        }
    }

    /// Per-symbol capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record an observation. Invalid prices or timestamps are ignored with a warning.
    pub fn update(&mut self, symbol: &Symbol, price: f64, timestamp: i64) {
        if !is_valid_number(price) {
            warn!(
                "Invalid cache update values for {}: price={} timestamp={}",
                symbol, price, timestamp
            );
            return;
        }

        let capacity = self.capacity;
        let history = self
            .histories
            .entry(symbol.clone())
            .or_insert_with(|| VecDeque::with_capacity(capacity + 1));
        history.push_back(RateHistoryEntry { price, timestamp });
        while history.len() > capacity {
            history.pop_front();
        }
    }

    /// Change of `current_price` against the second-to-last observation.
    ///
    /// Returns `Change::ZERO` when the current price is invalid, when fewer than two
    /// observations exist, or when the previous price is not a valid positive number.
    pub fn delta(&self, symbol: &Symbol, current_price: f64) -> Change {
        if !is_valid_number(current_price) {
            warn!("Invalid current price for {}: {}", symbol, current_price);
            return Change::ZERO;
        }

        let Some(history) = self.histories.get(symbol) else {
            return Change::ZERO;
        };
        if history.len() < 2 {
            return Change::ZERO;
        }

        let previous = history[history.len() - 2].price;
        if !is_valid_number(previous) || previous <= 0.0 {
            warn!("Invalid previous price for {}: {}", symbol, previous);
            return Change::ZERO;
        }

        let change = current_price - previous;
        let percent_change = (change / previous) * 100.0;
        if !is_valid_number(change) || !is_valid_number(percent_change) {
            warn!(
                "Invalid calculated changes for {}: change={} percent_change={}",
                symbol, change, percent_change
            );
            return Change::ZERO;
        }

        Change {
            change,
            percent_change,
        }
    }

    /// Snapshot of the history for `symbol`, oldest first.
    pub fn history(&self, symbol: &Symbol) -> Vec<RateHistoryEntry> {
        self.histories
            .get(symbol)
            .map(|h| h.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of observations held for `symbol`.
    pub fn len(&self, symbol: &Symbol) -> usize {
        self.histories.get(symbol).map_or(0, VecDeque::len)
    }

    /// `true` when no symbol has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// Latest observation for `symbol`.
    pub fn latest(&self, symbol: &Symbol) -> Option<RateHistoryEntry> {
        self.histories.get(symbol).and_then(|h| h.back().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eurusd() -> Symbol {
        "EUR/USD".parse().unwrap()
    }

    #[test]
    fn delta_is_zero_below_two_observations() {
        let mut cache = RateCache::default();
        let s = eurusd();
        assert_eq!(cache.delta(&s, 1.2), Change::ZERO);
        cache.update(&s, 1.1, 1);
        assert_eq!(cache.delta(&s, 1.2), Change::ZERO);
    }

    #[test]
    fn delta_uses_second_to_last_entry() {
        let mut cache = RateCache::default();
        let s = eurusd();
        cache.update(&s, 1.0800, 1);
        cache.update(&s, 1.0845, 2);
        let d = cache.delta(&s, 1.0845);
        assert!((d.change - 0.0045).abs() < 1e-12);
        assert!((d.percent_change - 0.416_666_666).abs() < 1e-6);
    }

    #[test]
    fn keeps_last_ten_in_insertion_order() {
        let mut cache = RateCache::default();
        let s = eurusd();
        for i in 0..15 {
            cache.update(&s, 1.0 + i as f64, 100 - i);
        }
        let history = cache.history(&s);
        assert_eq!(history.len(), 10);
        let prices: Vec<f64> = history.iter().map(|e| e.price).collect();
        let expected: Vec<f64> = (5..15).map(|i| 1.0 + i as f64).collect();
        assert_eq!(prices, expected);
        assert_eq!(cache.latest(&s).map(|e| e.timestamp), Some(86));
    }

    #[test]
    fn invalid_updates_are_ignored() {
        let mut cache = RateCache::default();
        let s = eurusd();
        cache.update(&s, f64::NAN, 1);
        cache.update(&s, f64::INFINITY, 2);
        assert_eq!(cache.len(&s), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_previous_price_never_divides() {
        let mut cache = RateCache::default();
        let s = eurusd();
        cache.update(&s, 0.0, 1);
        cache.update(&s, 1.0, 2);
        assert_eq!(cache.delta(&s, 1.0), Change::ZERO);

        cache.update(&s, -3.0, 3);
        cache.update(&s, 1.0, 4);
        assert_eq!(cache.delta(&s, 1.0), Change::ZERO);
    }

    #[test]
    fn invalid_current_price_yields_zero() {
        let mut cache = RateCache::default();
        let s = eurusd();
        cache.update(&s, 1.0, 1);
        cache.update(&s, 1.1, 2);
        assert_eq!(cache.delta(&s, f64::NAN), Change::ZERO);
    }

    #[test]
    fn symbols_are_tracked_independently() {
        let mut cache = RateCache::new(3);
        let a = eurusd();
        let b: Symbol = "GBP/USD".parse().unwrap();
        for i in 0..5 {
            cache.update(&a, i as f64, i);
        }
        cache.update(&b, 9.0, 0);
        assert_eq!(cache.capacity(), 3);
        assert_eq!(cache.len(&a), 3);
        assert_eq!(cache.len(&b), 1);
    }
}
