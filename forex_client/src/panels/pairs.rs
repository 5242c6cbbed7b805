//! Quote table for the tracked currency pairs.

use super::Panel;
use forex_common::Symbol;
use forex_common::quote::{QuoteMap, now_millis};
use log::info;
use std::fmt;

/// A quote is considered live when it is younger than this, in milliseconds.
pub const LIVE_WINDOW_MS: i64 = 60_000;

/// One row of the pairs table.
#[derive(Debug, Clone, PartialEq)]
pub struct PairRow {
    /// Pair shown on the row.
    pub symbol: Symbol,
    /// Mid price.
    pub price: f64,
    /// Absolute change.
    pub change: f64,
    /// Percent change.
    pub percent_change: f64,
    /// Quote timestamp, epoch milliseconds.
    pub timestamp: i64,
    /// Quote is younger than [`LIVE_WINDOW_MS`].
    pub is_live: bool,
}

impl fmt::Display for PairRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<8} {:>10.4} {:>+9.4} {:>+7.2}% {}",
            self.symbol.to_string(),
            self.price,
            self.change,
            self.percent_change,
            if self.is_live { "LIVE" } else { "INDICATIVE" }
        )
    }
}

/// Builds table rows, in symbol order.
pub fn rows(quotes: &QuoteMap, now: i64) -> Vec<PairRow> {
    quotes
        .iter()
        .map(|(symbol, quote)| PairRow {
            symbol: symbol.clone(),
            price: quote.price,
            change: quote.change,
            percent_change: quote.percent_change,
            timestamp: quote.timestamp,
            is_live: quote.timestamp > now - LIVE_WINDOW_MS,
        })
        .collect()
}

/// Pairs list consumer.
///
/// With an empty `tracked` list every quote in a cycle gets a row.
#[derive(Debug, Default)]
pub struct PairsPanel {
    tracked: Vec<Symbol>,
    rows: Vec<PairRow>,
}

impl PairsPanel {
    /// Panel showing only `tracked`, when the feed carries other pairs too.
    pub fn new(tracked: Vec<Symbol>) -> Self {
        Self {
            tracked,
            rows: Vec::new(),
        }
    }

    /// Rows from the last successful cycle.
    pub fn rows(&self) -> &[PairRow] {
        &self.rows
    }

    /// Timestamp of the first row, the way the table header shows "last updated".
    pub fn last_updated(&self) -> Option<i64> {
        self.rows.first().map(|r| r.timestamp)
    }
}

impl Panel for PairsPanel {
    fn name(&self) -> &str {
        "pairs"
    }

    fn on_quotes(&mut self, quotes: &QuoteMap) {
        let mut rows = rows(quotes, now_millis());
        if !self.tracked.is_empty() {
            rows.retain(|row| self.tracked.contains(&row.symbol));
        }
        self.rows = rows;
        for row in &self.rows {
            info!("PAIR {}", row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forex_common::Quote;

    fn quote(price: f64, timestamp: i64) -> Quote {
        Quote {
            price,
            bid: price,
            ask: price,
            change: 0.0045,
            percent_change: 0.4167,
            timestamp,
        }
    }

    #[test]
    fn rows_flag_stale_quotes() {
        let now = 1_000_000;
        let mut quotes = QuoteMap::new();
        quotes.insert("EUR/USD".parse().unwrap(), quote(1.0845, now - 1_000));
        quotes.insert("AUD/USD".parse().unwrap(), quote(0.6523, now - LIVE_WINDOW_MS));

        let rows = rows(&quotes, now);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol.to_string(), "AUD/USD");
        assert!(!rows[0].is_live);
        assert!(rows[1].is_live);
    }

    #[test]
    fn row_formats_four_and_two_decimals() {
        let row = PairRow {
            symbol: "EUR/USD".parse().unwrap(),
            price: 1.08451,
            change: 0.0045,
            percent_change: 0.41666,
            timestamp: 0,
            is_live: true,
        };
        let text = row.to_string();
        assert!(text.contains("1.0845"));
        assert!(text.contains("+0.42%"));
        assert!(text.ends_with("LIVE"));
    }

    #[test]
    fn panel_keeps_last_rows() {
        let mut panel = PairsPanel::default();
        assert_eq!(panel.last_updated(), None);
        let mut quotes = QuoteMap::new();
        quotes.insert("GBP/USD".parse().unwrap(), quote(1.2634, 77));
        panel.on_quotes(&quotes);
        assert_eq!(panel.rows().len(), 1);
        assert_eq!(panel.last_updated(), Some(77));
    }

    #[test]
    fn panel_shows_only_tracked_pairs() {
        let mut panel = PairsPanel::new(vec!["EUR/USD".parse().unwrap()]);
        let mut quotes = QuoteMap::new();
        quotes.insert("EUR/USD".parse().unwrap(), quote(1.0845, 5));
        quotes.insert("USD/CHF".parse().unwrap(), quote(0.8812, 5));
        panel.on_quotes(&quotes);
        assert_eq!(panel.rows().len(), 1);
        assert_eq!(panel.rows()[0].symbol.to_string(), "EUR/USD");
    }
}
