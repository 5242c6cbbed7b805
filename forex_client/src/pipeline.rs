//! Fetch → validate → cache → delta pipeline.
//!
//! `ForexPipeline` is the only owner of the rolling cache. A call to
//! [`ForexPipeline::get_forex_prices`] performs one source request, runs the payload
//! through the vendor adapters, records every mid in the cache and returns uniform
//! `Quote` records.
//!
//! Failure policy:
//! - empty input fails fast with `InvalidInput`, before the source is touched;
//! - transport and shape failures are logged and answered from the fallback table;
//! - a throttled call yields `Ok(None)`: no fresh data this cycle;
//! - anything else is logged and yields `Ok(None)`.
//!
//! Concurrent calls are allowed. The cache lock is only taken after the response has
//! arrived, so the response that resolves last is the one the cache ends on.

use crate::cache::RateCache;
use crate::fallback::FallbackTable;
use crate::source::QuoteSource;
use forex_common::quote::{
    Change, HistoricalSeries, Interval, Quote, QuoteMap, RateHistoryEntry, now_millis,
};
use forex_common::wire::{parse_live_quotes, parse_timeseries};
use forex_common::{FeedError, Result, Symbol};
use log::{error, info, warn};
use std::sync::{Arc, Mutex};

/// Shared price-feed pipeline.
pub struct ForexPipeline {
    source: Arc<dyn QuoteSource>,
    cache: Mutex<RateCache>,
    fallback: FallbackTable,
}

impl ForexPipeline {
    /// Wire a pipeline from its parts.
    pub fn new(source: Arc<dyn QuoteSource>, cache: RateCache, fallback: FallbackTable) -> Self {
        Self {
            source,
            cache: Mutex::new(cache),
            fallback,
        }
    }

    /// Pipeline with the default cache capacity and the majors fallback table.
    pub fn with_source(source: Arc<dyn QuoteSource>) -> Self {
        Self::new(source, RateCache::default(), FallbackTable::majors())
    }

    /// Latest quotes for `symbols`.
    ///
    /// Returns `Err(InvalidInput)` for an empty slice, `Ok(None)` when no data could be
    /// produced this cycle and `Ok(Some(_))` with live or fallback quotes otherwise.
    pub fn get_forex_prices(&self, symbols: &[Symbol]) -> Result<Option<QuoteMap>> {
        if symbols.is_empty() {
            error!("Invalid pairs array: empty");
            return Err(FeedError::InvalidInput(
                "Invalid pairs array provided".to_string(),
            ));
        }

        let payload = match self.source.fetch_live(symbols) {
            Ok(payload) => payload,
            Err(e) => return self.degrade(symbols, e),
        };
        let raw_quotes = match parse_live_quotes(&payload) {
            Ok(raw_quotes) => raw_quotes,
            Err(e) => return self.degrade(symbols, e),
        };

        let observed_at = now_millis();
        let mut cache = self.cache.lock()?;
        let mut quotes = QuoteMap::new();
        for raw in raw_quotes {
            cache.update(&raw.symbol, raw.mid, observed_at);
            let Change {
                change,
                percent_change,
            } = cache.delta(&raw.symbol, raw.mid);
            quotes.insert(
                raw.symbol,
                Quote {
                    price: raw.mid,
                    bid: raw.bid,
                    ask: raw.ask,
                    change,
                    percent_change,
                    timestamp: raw.timestamp.unwrap_or(observed_at),
                },
            );
        }
        Ok(Some(quotes))
    }

    fn degrade(&self, symbols: &[Symbol], err: FeedError) -> Result<Option<QuoteMap>> {
        let context = forex_common::symbols::compact_csv(symbols);
        match err {
            FeedError::InvalidInput(_) => Err(err),
            FeedError::RateLimited(ref message) => {
                warn!("kind={} symbols={} {}", err.kind(), context, message);
                Ok(None)
            }
            ref e if e.is_degradable() => {
                warn!(
                    "kind={} symbols={} serving fallback prices: {}",
                    e.kind(),
                    context,
                    e
                );
                Ok(Some(self.fallback.get_fallback(symbols)))
            }
            other => {
                error!(
                    "kind={} symbols={} error fetching forex prices: {}",
                    other.kind(),
                    context,
                    other
                );
                Ok(None)
            }
        }
    }

    /// Recent candles for `symbol`, or `None` on any failure (logged).
    pub fn get_historical_data(
        &self,
        symbol: &Symbol,
        interval: Interval,
    ) -> Option<HistoricalSeries> {
        let result = self
            .source
            .fetch_timeseries(symbol, interval)
            .and_then(|payload| parse_timeseries(&payload));
        match result {
            Ok(data) => {
                info!("Loaded {} {} candles for {}", data.len(), interval, symbol);
                Some(HistoricalSeries {
                    symbol: symbol.clone(),
                    data,
                })
            }
            Err(e) => {
                error!(
                    "kind={} symbol={} error fetching historical data: {}",
                    e.kind(),
                    symbol,
                    e
                );
                None
            }
        }
    }

    /// Read-only snapshot of the cached history for `symbol`.
    pub fn cached_history(&self, symbol: &Symbol) -> Result<Vec<RateHistoryEntry>> {
        Ok(self.cache.lock()?.history(symbol))
    }
}
