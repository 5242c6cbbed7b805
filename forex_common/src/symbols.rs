//! Currency pair symbols and helpers shared between proxy and client.
//!
//! A `Symbol` is always held in canonical `BASE/QUOTE` form. The compact
//! `BASEQUOTE` form only appears at the wire boundary (`Symbol::compact`).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::FeedError;

/// Currency pair identifier, e.g. `EUR/USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol {
    base: String,
    quote: String,
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

impl Symbol {
    /// Builds a symbol from two ISO currency codes. Codes are upper-cased.
    pub fn new(base: &str, quote: &str) -> Result<Self, FeedError> {
        let base = base.trim();
        let quote = quote.trim();
        if !is_currency_code(base) || !is_currency_code(quote) {
            return Err(FeedError::UnknownSymbol(format!("{base}/{quote}")));
        }
        Ok(Symbol {
            base: base.to_ascii_uppercase(),
            quote: quote.to_ascii_uppercase(),
        })
    }

    /// Base currency code.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote currency code.
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Wire form without the separator, e.g. `EURUSD`.
    pub fn compact(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Symbol {
    type Err = FeedError;

    /// Accepts `EUR/USD`, `eur/usd` and the compact `EURUSD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('/') {
            Some((base, quote)) => Symbol::new(base, quote),
            None if s.len() == 6 && s.is_ascii() => Symbol::new(&s[..3], &s[3..]),
            None => Err(FeedError::UnknownSymbol(s.to_string())),
        }
    }
}

impl TryFrom<String> for Symbol {
    type Error = FeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.to_string()
    }
}

/// Joins symbols in compact wire form, comma separated: `EURUSD,GBPUSD`.
pub fn compact_csv(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(Symbol::compact)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a comma separated list where each item is either form.
pub fn parse_csv(raw: &str) -> Result<Vec<Symbol>, FeedError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// Trait providing file parsing for symbols.
pub trait SymbolParser {
    /// Parses symbols from a buffered reader.
    ///
    /// Each non-empty line is parsed as a single `Symbol` using `FromStr`.
    /// Returns an error if any line cannot be parsed.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Symbol>, FeedError>;
}

impl SymbolParser for Symbol {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, FeedError> {
        let mut symbols = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(FeedError::Io)?;
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() {
                continue;
            }

            match trimmed_line.parse::<Self>() {
                Ok(symbol) => symbols.push(symbol),
                Err(e) => return Err(FeedError::ParseSymbolsFile(e.to_string())),
            }
        }
        Ok(symbols)
    }
}

/// The eight major pairs the dashboard tracks by default.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
)]
#[clap(rename_all = "UPPER")]
#[strum(ascii_case_insensitive)]
pub enum MajorPair {
    EURUSD,
    GBPUSD,
    USDJPY,
    AUDUSD,
    USDCAD,
    NZDUSD,
    USDCHF,
    EURGBP,
}

impl MajorPair {
    /// Canonical symbol for this pair.
    pub fn symbol(self) -> Symbol {
        let compact = self.to_string();
        Symbol {
            base: compact[..3].to_string(),
            quote: compact[3..].to_string(),
        }
    }

    /// All majors as symbols, in declaration order.
    pub fn all_symbols() -> Vec<Symbol> {
        use strum::IntoEnumIterator;
        MajorPair::iter().map(MajorPair::symbol).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_both_forms_case_insensitively() {
        let a: Symbol = "EUR/USD".parse().unwrap();
        let b: Symbol = "eurusd".parse().unwrap();
        let c: Symbol = " gbp/jpy ".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "EUR/USD");
        assert_eq!(a.compact(), "EURUSD");
        assert_eq!(c.base(), "GBP");
        assert_eq!(c.quote(), "JPY");
    }

    #[test]
    fn rejects_malformed_symbols() {
        for raw in ["", "EUR", "EURO/USD", "EU1/USD", "EURUSDX", "undefined/undefined"] {
            assert!(raw.parse::<Symbol>().is_err(), "{raw} should not parse");
        }
    }

    #[test]
    fn compact_csv_joins_wire_forms() {
        let symbols = parse_csv("EUR/USD, GBPUSD,,usd/jpy").unwrap();
        assert_eq!(compact_csv(&symbols), "EURUSD,GBPUSD,USDJPY");
    }

    #[test]
    fn serde_uses_canonical_string() {
        let symbol: Symbol = "USDCHF".parse().unwrap();
        let json = serde_json::to_string(&symbol).unwrap();
        assert_eq!(json, "\"USD/CHF\"");
        let back: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(back, symbol);
        assert!(serde_json::from_str::<Symbol>("\"nope\"").is_err());
    }

    #[test]
    fn parse_from_file_skips_blank_lines() {
        let input = Cursor::new("EUR/USD\n\n  AUDUSD  \n");
        let symbols = Symbol::parse_from_file(input).unwrap();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[1].to_string(), "AUD/USD");

        let bad = Cursor::new("EUR/USD\nBTC-USD\n");
        assert!(matches!(
            Symbol::parse_from_file(bad),
            Err(FeedError::ParseSymbolsFile(_))
        ));
    }

    #[test]
    fn majors_cover_eight_pairs() {
        let all = MajorPair::all_symbols();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0].to_string(), "EUR/USD");
        assert_eq!(MajorPair::EURGBP.symbol().to_string(), "EUR/GBP");
        assert_eq!("usdjpy".parse::<MajorPair>().unwrap(), MajorPair::USDJPY);
    }
}
