mod common;

use common::{FakeSource, live_payload, symbol};
use crossbeam_channel::unbounded;
use forex_client::ForexPipeline;
use forex_client::fallback::FallbackTable;
use forex_common::quote::Interval;
use forex_common::symbols::MajorPair;
use forex_common::{FeedError, Result};
use serde_json::{Value, json};
use std::sync::Arc;
use std::thread;

fn always(payload: Value) -> impl Fn(usize) -> Result<Value> + Send + Sync {
    move |_| Ok(payload.clone())
}

#[test]
fn empty_input_is_rejected_before_any_request() {
    let source = Arc::new(FakeSource::new(always(live_payload(&[("EUR/USD", 1.08)]))));
    let pipeline = ForexPipeline::with_source(source.clone());

    let err = pipeline.get_forex_prices(&[]).unwrap_err();
    assert!(matches!(err, FeedError::InvalidInput(_)));
    assert_eq!(source.calls(), 0);
}

#[test]
fn consecutive_cycles_report_change_against_previous_price() {
    let source = Arc::new(FakeSource::new(|n| {
        let mid = if n == 0 { 1.0800 } else { 1.0850 };
        Ok(live_payload(&[("EUR/USD", mid)]))
    }));
    let pipeline = ForexPipeline::with_source(source);
    let eurusd = symbol("EUR/USD");

    let first = pipeline.get_forex_prices(&[eurusd.clone()]).unwrap().unwrap();
    assert_eq!(first[&eurusd].change, 0.0);
    assert_eq!(first[&eurusd].percent_change, 0.0);

    let second = pipeline.get_forex_prices(&[eurusd.clone()]).unwrap().unwrap();
    let quote = second[&eurusd];
    assert_eq!(quote.price, 1.0850);
    assert!((quote.change - 0.005).abs() < 1e-9);
    assert!((quote.percent_change - 0.462_962_962).abs() < 1e-6);
    assert!((quote.bid - 1.0848).abs() < 1e-9);
    assert!((quote.ask - 1.0852).abs() < 1e-9);

    let history = pipeline.cached_history(&eurusd).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].price, 1.0850);
}

#[test]
fn server_error_serves_fallback_for_every_major() {
    let source = Arc::new(FakeSource::new(|_| {
        Err(FeedError::transport(Some(500), "API request failed: 500 Internal Server Error"))
    }));
    let pipeline = ForexPipeline::with_source(source.clone());
    let majors = MajorPair::all_symbols();

    let quotes = pipeline.get_forex_prices(&majors).unwrap().unwrap();
    assert_eq!(quotes.len(), 8);
    let table = FallbackTable::majors();
    for (symbol, quote) in &quotes {
        let expected = table.get(symbol).unwrap();
        assert_eq!(quote.price, expected.price);
        assert_eq!(quote.bid, expected.bid);
        assert_eq!(quote.ask, expected.ask);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.percent_change, 0.0);
    }
    assert_eq!(source.calls(), 1);
    assert!(pipeline.cached_history(&majors[0]).unwrap().is_empty());
}

#[test]
fn malformed_payloads_degrade_to_fallback() {
    for payload in [json!({ "quotes": [] }), json!({ "error": "nope" }), json!([1, 2])] {
        let source = Arc::new(FakeSource::new(always(payload)));
        let pipeline = ForexPipeline::with_source(source);
        let usdjpy = symbol("USD/JPY");

        let quotes = pipeline.get_forex_prices(&[usdjpy.clone()]).unwrap().unwrap();
        assert_eq!(quotes[&usdjpy].price, 149.82);
    }
}

#[test]
fn fallback_leaves_out_unknown_symbols() {
    let source = Arc::new(FakeSource::new(|_| Err(FeedError::transport(None, "refused"))));
    let pipeline = ForexPipeline::with_source(source);

    let quotes = pipeline
        .get_forex_prices(&[symbol("EUR/USD"), symbol("BTC/USD")])
        .unwrap()
        .unwrap();
    assert_eq!(quotes.len(), 1);
    assert!(quotes.contains_key(&symbol("EUR/USD")));
}

#[test]
fn throttled_cycle_yields_nothing() {
    let source = Arc::new(FakeSource::new(|_| {
        Err(FeedError::RateLimited("Rate limit exceeded.".to_string()))
    }));
    let pipeline = ForexPipeline::with_source(source);
    let eurusd = symbol("EUR/USD");

    assert!(pipeline.get_forex_prices(&[eurusd.clone()]).unwrap().is_none());
    assert!(pipeline.cached_history(&eurusd).unwrap().is_empty());
}

#[test]
fn unexpected_errors_yield_nothing() {
    let source = Arc::new(FakeSource::new(|_| {
        Err(FeedError::Io(std::io::Error::other("disk on fire")))
    }));
    let pipeline = ForexPipeline::with_source(source);
    assert!(pipeline.get_forex_prices(&[symbol("EUR/USD")]).unwrap().is_none());
}

#[test]
fn keyed_shape_and_vendor_timestamp_pass_through() {
    let payload = json!({
        "quotes": {
            "GBPUSD": { "mid": "1.2634", "bid": 1.2632, "ask": 1.2636, "timestamp": 1_700_000_000_000i64 },
            "XXXXXXX": { "mid": 1.0 },
            "AUDUSD": "garbage",
        }
    });
    let source = Arc::new(FakeSource::new(always(payload)));
    let pipeline = ForexPipeline::with_source(source);

    let quotes = pipeline
        .get_forex_prices(&[symbol("GBP/USD")])
        .unwrap()
        .unwrap();
    assert_eq!(quotes.len(), 1);
    let quote = quotes[&symbol("GBP/USD")];
    assert_eq!(quote.price, 1.2634);
    assert_eq!(quote.timestamp, 1_700_000_000_000);
}

#[test]
fn response_resolving_last_wins_the_cache() {
    let (release_tx, release_rx) = unbounded::<()>();
    let (entered_tx, entered_rx) = unbounded::<()>();
    let source = Arc::new(FakeSource::new(move |n| {
        if n == 0 {
            let _ = entered_tx.send(());
            let _ = release_rx.recv();
            Ok(live_payload(&[("EUR/USD", 1.10)]))
        } else {
            Ok(live_payload(&[("EUR/USD", 1.20)]))
        }
    }));
    let pipeline = Arc::new(ForexPipeline::with_source(source));
    let eurusd = symbol("EUR/USD");

    let slow = {
        let pipeline = pipeline.clone();
        let symbols = vec![eurusd.clone()];
        thread::spawn(move || pipeline.get_forex_prices(&symbols))
    };
    entered_rx.recv().unwrap();

    let fast = pipeline.get_forex_prices(&[eurusd.clone()]).unwrap().unwrap();
    assert_eq!(fast[&eurusd].change, 0.0);

    release_tx.send(()).unwrap();
    let slow = slow.join().unwrap().unwrap().unwrap();
    assert!((slow[&eurusd].change - (1.10 - 1.20)).abs() < 1e-9);

    let history = pipeline.cached_history(&eurusd).unwrap();
    let prices: Vec<f64> = history.iter().map(|e| e.price).collect();
    assert_eq!(prices, vec![1.20, 1.10]);
}

#[test]
fn historical_data_is_none_on_failure() {
    let source = Arc::new(FakeSource::new(always(json!({}))));
    let pipeline = ForexPipeline::with_source(source);
    assert!(
        pipeline
            .get_historical_data(&symbol("EUR/USD"), Interval::Daily)
            .is_none()
    );
}

#[test]
fn historical_data_parses_candles() {
    let history = json!({
        "quotes": [
            { "date": "2024-01-01", "open": 1.10, "high": 1.11, "low": 1.09, "close": 1.105 },
            { "date": "not a date", "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0 },
            { "date": "2024-01-02", "open": "1.105", "high": 1.12, "low": 1.10, "close": 1.115 },
        ]
    });
    let source = Arc::new(FakeSource::new(always(json!({}))).with_history(history));
    let pipeline = ForexPipeline::with_source(source);

    let series = pipeline
        .get_historical_data(&symbol("EUR/USD"), Interval::Daily)
        .unwrap();
    assert_eq!(series.symbol, symbol("EUR/USD"));
    assert_eq!(series.data.len(), 2);
    assert_eq!(series.data[1].open, 1.105);
    assert_eq!(series.data[1].timestamp - series.data[0].timestamp, 86_400_000);
}
