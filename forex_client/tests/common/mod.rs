#![allow(dead_code)]

use forex_client::QuoteSource;
use forex_common::quote::Interval;
use forex_common::rate_limit::RateLimiter;
use forex_common::{FeedError, Result, Symbol};
use serde_json::{Value, json};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Test double answering live requests through a closure of the call index.
pub struct FakeSource<F> {
    calls: AtomicUsize,
    live: F,
    history: Option<Value>,
}

impl<F> FakeSource<F>
where
    F: Fn(usize) -> Result<Value> + Send + Sync,
{
    pub fn new(live: F) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            live,
            history: None,
        }
    }

    pub fn with_history(mut self, payload: Value) -> Self {
        self.history = Some(payload);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> QuoteSource for FakeSource<F>
where
    F: Fn(usize) -> Result<Value> + Send + Sync,
{
    fn fetch_live(&self, _symbols: &[Symbol]) -> Result<Value> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.live)(n)
    }

    fn fetch_timeseries(&self, _symbol: &Symbol, _interval: Interval) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.history
            .clone()
            .ok_or_else(|| FeedError::transport(Some(502), "no history"))
    }
}

/// Source behind a minimum-interval limiter, answering 1.1 for every requested pair.
pub struct ThrottledSource {
    limiter: Mutex<RateLimiter>,
    rejected: AtomicUsize,
}

impl ThrottledSource {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            limiter: Mutex::new(RateLimiter::new(min_interval)),
            rejected: AtomicUsize::new(0),
        }
    }

    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }
}

impl QuoteSource for ThrottledSource {
    fn fetch_live(&self, symbols: &[Symbol]) -> Result<Value> {
        if let Err(e) = self.limiter.lock()?.check() {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(e);
        }
        let names: Vec<String> = symbols.iter().map(Symbol::to_string).collect();
        let quotes: Vec<(&str, f64)> = names.iter().map(|n| (n.as_str(), 1.1)).collect();
        Ok(live_payload(&quotes))
    }

    fn fetch_timeseries(&self, _symbol: &Symbol, _interval: Interval) -> Result<Value> {
        Err(FeedError::transport(Some(502), "no history"))
    }
}

pub fn symbol(raw: &str) -> Symbol {
    raw.parse().unwrap()
}

/// Vendor list-shaped payload with a 2 pip spread around each mid.
pub fn live_payload(quotes: &[(&str, f64)]) -> Value {
    let items: Vec<Value> = quotes
        .iter()
        .map(|(raw, mid)| {
            let s = symbol(raw);
            json!({
                "base_currency": s.base(),
                "quote_currency": s.quote(),
                "mid": mid,
                "bid": mid - 0.0002,
                "ask": mid + 0.0002,
            })
        })
        .collect();
    json!({ "endpoint": "live", "quotes": items })
}

/// Loopback HTTP server answering every connection with one canned response.
pub struct CannedServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    pub fn start(status: &str, content_type: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        );
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let head = read_head(&mut stream);
                if let Some(line) = head.lines().next() {
                    seen.lock().unwrap().push(line.to_string());
                }
                let _ = stream.write_all(response.as_bytes());
            }
        });
        Self { url, requests }
    }

    /// Request lines received so far, e.g. `GET /api/forex?pairs=EURUSD HTTP/1.1`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}
