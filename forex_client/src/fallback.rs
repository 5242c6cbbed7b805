//! Static last-known-good quotes served when live data is unavailable.

use forex_common::quote::{Quote, QuoteMap, now_millis};
use forex_common::symbols::MajorPair;
use forex_common::Symbol;
use std::collections::HashMap;

/// Static `{price, bid, ask}` for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackQuote {
    /// Indicative mid.
    pub price: f64,
    /// Indicative bid.
    pub bid: f64,
    /// Indicative ask.
    pub ask: f64,
}

/// Indicative prices for the majors.
pub trait MajorPairExt {
    /// Static fallback quote for this pair.
    fn fallback(self) -> FallbackQuote;
}

impl MajorPairExt for MajorPair {
    fn fallback(self) -> FallbackQuote {
        let (price, bid, ask) = match self {
            MajorPair::EURUSD => (1.0845, 1.0843, 1.0847),
            MajorPair::GBPUSD => (1.2634, 1.2632, 1.2636),
            MajorPair::USDJPY => (149.82, 149.80, 149.84),
            MajorPair::AUDUSD => (0.6523, 0.6521, 0.6525),
            MajorPair::USDCAD => (1.3756, 1.3754, 1.3758),
            MajorPair::NZDUSD => (0.5987, 0.5985, 0.5989),
            MajorPair::USDCHF => (0.8934, 0.8932, 0.8936),
            MajorPair::EURGBP => (0.8589, 0.8587, 0.8591),
        };
        FallbackQuote { price, bid, ask }
    }
}

/// Lookup table from symbol to its static fallback quote.
#[derive(Debug, Clone)]
pub struct FallbackTable {
    prices: HashMap<Symbol, FallbackQuote>,
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self::majors()
    }
}

impl FallbackTable {
    /// Table covering the eight majors.
    pub fn majors() -> Self {
        use strum::IntoEnumIterator;
        let prices = MajorPair::iter()
            .map(|pair| (pair.symbol(), pair.fallback()))
            .collect();
        Self { prices }
    }

    /// Raw entry for `symbol`.
    pub fn get(&self, symbol: &Symbol) -> Option<FallbackQuote> {
        self.prices.get(symbol).copied()
    }

    /// Known symbols, in symbol order.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.prices.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Synthetic quotes for every requested symbol present in the table.
    ///
    /// Unknown symbols are left out. Every record carries zero change and `now`.
    pub fn get_fallback(&self, symbols: &[Symbol]) -> QuoteMap {
        self.get_fallback_at(symbols, now_millis())
    }

    /// Same as [`Self::get_fallback`] with an explicit timestamp.
    pub fn get_fallback_at(&self, symbols: &[Symbol], timestamp: i64) -> QuoteMap {
        symbols
            .iter()
            .filter_map(|symbol| {
                self.get(symbol).map(|fallback| {
                    (
                        symbol.clone(),
                        Quote {
                            price: fallback.price,
                            bid: fallback.bid,
                            ask: fallback.ask,
                            change: 0.0,
                            percent_change: 0.0,
                            timestamp,
                        },
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_the_eight_majors() {
        let table = FallbackTable::majors();
        assert_eq!(table.symbols().len(), 8);
        let eurusd: Symbol = "EUR/USD".parse().unwrap();
        assert_eq!(
            table.get(&eurusd),
            Some(FallbackQuote {
                price: 1.0845,
                bid: 1.0843,
                ask: 1.0847
            })
        );
    }

    #[test]
    fn unknown_symbols_are_omitted() {
        let table = FallbackTable::default();
        let requested: Vec<Symbol> = ["USD/JPY", "BTC/USD", "EUR/GBP"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let quotes = table.get_fallback_at(&requested, 42);
        assert_eq!(quotes.len(), 2);
        for quote in quotes.values() {
            assert_eq!(quote.change, 0.0);
            assert_eq!(quote.percent_change, 0.0);
            assert_eq!(quote.timestamp, 42);
        }
        assert_eq!(quotes[&requested[0]].price, 149.82);
    }
}
