//! Recurring poll cycles and fan-out to display consumers.
//!
//! A `PollScheduler` polls a fixed symbol list on one interval. Consumer groups that
//! need different lists share one scheduler built with `PollScheduler::merged`.
//! `start` runs one cycle immediately and then one per tick until `stop`. Every cycle
//! runs on its own worker thread and calls the shared `ForexPipeline`; the outcome is
//! broadcast to all channels registered through `subscribe`.
//!
//! Event model:
//! - `FeedEvent::Quotes(QuoteMap)`: quotes produced by a cycle (live or fallback).
//! - `FeedEvent::Unavailable`: the cycle produced nothing (throttled or failed).
//! - `FeedEvent::Shutdown`: the scheduler stopped; consumers should exit.
//!
//! Design notes:
//! - Cycles are not serialized. A slow cycle can still be in flight when the next tick
//!   fires; both complete and the one that resolves last wins in the cache.
//! - `stop` cancels the timer only. A cycle already in flight finishes and updates the
//!   cache, but its result is not delivered.
//! - Broadcast is best-effort: a subscriber whose receiver is gone is dropped.

use crate::pipeline::ForexPipeline;
use crossbeam_channel::{Receiver, Sender, select, tick, unbounded};
use forex_common::quote::QuoteMap;
use forex_common::{FeedError, Result, Symbol};
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Message sent by a scheduler to its subscribers.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Quotes produced by one cycle.
    Quotes(QuoteMap),
    /// A cycle finished without data.
    Unavailable,
    /// The scheduler was stopped.
    Shutdown,
}

/// Lifecycle of a scheduler, as observed by the last finished step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Created, never started.
    Idle,
    /// A cycle is in flight.
    Polling,
    /// The last cycle produced quotes.
    Succeeded,
    /// The last cycle produced nothing.
    Failed,
    /// `stop` was called.
    Stopped,
}

type Subscribers = Arc<Mutex<Vec<Sender<FeedEvent>>>>;

#[derive(Clone)]
struct Cycle {
    name: Arc<str>,
    pipeline: Arc<ForexPipeline>,
    symbols: Arc<[Symbol]>,
    subscribers: Subscribers,
    state: Arc<Mutex<PollState>>,
    stopped: Arc<AtomicBool>,
}

impl Cycle {
    fn spawn(&self) {
        let cycle = self.clone();
        thread::spawn(move || cycle.run());
    }

    fn run(self) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        self.set_state(PollState::Polling);

        let outcome = self.pipeline.get_forex_prices(&self.symbols);

        let (state, event) = match outcome {
            Ok(Some(quotes)) => (PollState::Succeeded, FeedEvent::Quotes(quotes)),
            Ok(None) => (PollState::Failed, FeedEvent::Unavailable),
            Err(e) => {
                error!("{}: kind={} cycle failed: {}", self.name, e.kind(), e);
                (PollState::Failed, FeedEvent::Unavailable)
            }
        };
        if let Err(e) = self.deliver(state, event) {
            error!("{}: kind={} broadcast failed: {}", self.name, e.kind(), e);
        }
    }

    /// Publish a cycle outcome unless the scheduler was stopped meanwhile.
    ///
    /// The stop flag is read under the subscribers lock, which `stop` also takes to
    /// send `Shutdown`, so no result can follow the shutdown event.
    fn deliver(&self, state: PollState, event: FeedEvent) -> Result<()> {
        let mut subscribers = self.subscribers.lock()?;
        if self.stopped.load(Ordering::SeqCst) {
            debug!("{}: cycle resolved after stop, result not delivered", self.name);
            return Ok(());
        }
        self.set_state(state);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        Ok(())
    }

    fn set_state(&self, state: PollState) {
        match self.state.lock() {
            // `stop` raises the flag before it takes this lock.
            Ok(_) if self.stopped.load(Ordering::SeqCst) => {}
            Ok(mut current) => *current = state,
            Err(e) => error!("{}: state lock poisoned: {}", self.name, e),
        }
    }
}

fn broadcast(subscribers: &Subscribers, event: FeedEvent) -> Result<()> {
    let mut subscribers = subscribers.lock()?;
    subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    Ok(())
}

struct Running {
    stop_tx: Sender<()>,
    stopped: Arc<AtomicBool>,
    timer: JoinHandle<()>,
}

/// Periodic driver of the pipeline for one consumer group.
pub struct PollScheduler {
    name: Arc<str>,
    pipeline: Arc<ForexPipeline>,
    symbols: Arc<[Symbol]>,
    subscribers: Subscribers,
    state: Arc<Mutex<PollState>>,
    running: Option<Running>,
}

impl PollScheduler {
    /// Create an idle scheduler. `symbols` must not be empty.
    pub fn new(name: &str, pipeline: Arc<ForexPipeline>, symbols: Vec<Symbol>) -> Result<Self> {
        if symbols.is_empty() {
            return Err(FeedError::InvalidInput(format!(
                "{}: no symbols to poll",
                name
            )));
        }
        Ok(Self {
            name: Arc::from(name),
            pipeline,
            symbols: Arc::from(symbols),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            state: Arc::new(Mutex::new(PollState::Idle)),
            running: None,
        })
    }

    /// One scheduler for several consumer groups, polling the union of their symbols.
    ///
    /// Groups that poll through one rate limited proxy must share a scheduler: two
    /// timers on the same interval would race for the same admission window.
    pub fn merged(name: &str, pipeline: Arc<ForexPipeline>, groups: &[&[Symbol]]) -> Result<Self> {
        let mut symbols: Vec<Symbol> = Vec::new();
        for symbol in groups.iter().flat_map(|group| group.iter()) {
            if !symbols.contains(symbol) {
                symbols.push(symbol.clone());
            }
        }
        Self::new(name, pipeline, symbols)
    }

    /// Register a new consumer and return its event stream.
    pub fn subscribe(&self) -> Result<Receiver<FeedEvent>> {
        let (tx, rx) = unbounded();
        let mut subscribers = self.subscribers.lock()?;
        subscribers.push(tx);
        debug!(
            "{}: new subscriber. Total subscribers: {}",
            self.name,
            subscribers.len()
        );
        Ok(rx)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PollState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(PollState::Failed)
    }

    /// Symbols polled by this scheduler.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// `true` between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Run a cycle now and then every `interval` until [`Self::stop`].
    pub fn start(&mut self, interval: Duration) -> Result<()> {
        if self.running.is_some() {
            return Err(FeedError::InvalidInput(format!(
                "{}: already started",
                self.name
            )));
        }
        if interval.is_zero() {
            return Err(FeedError::InvalidInput(format!(
                "{}: poll interval must be positive",
                self.name
            )));
        }

        let stopped = Arc::new(AtomicBool::new(false));
        let cycle = Cycle {
            name: Arc::clone(&self.name),
            pipeline: Arc::clone(&self.pipeline),
            symbols: Arc::clone(&self.symbols),
            subscribers: Arc::clone(&self.subscribers),
            state: Arc::clone(&self.state),
            stopped: Arc::clone(&stopped),
        };
        let (stop_tx, stop_rx) = unbounded::<()>();

        info!(
            "{}: polling {} symbols every {:?}",
            self.name,
            self.symbols.len(),
            interval
        );
        let timer = thread::spawn(move || {
            cycle.spawn();
            let ticker = tick(interval);
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => cycle.spawn(),
                }
            }
        });

        self.running = Some(Running {
            stop_tx,
            stopped,
            timer,
        });
        Ok(())
    }

    /// Cancel the timer and tell subscribers to shut down. In-flight cycles are not cancelled.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        running.stopped.store(true, Ordering::SeqCst);
        let _ = running.stop_tx.send(());
        if running.timer.join().is_err() {
            error!("{}: timer thread panicked", self.name);
        }
        match self.state.lock() {
            Ok(mut state) => *state = PollState::Stopped,
            Err(e) => error!("{}: state lock poisoned: {}", self.name, e),
        }
        if let Err(e) = broadcast(&self.subscribers, FeedEvent::Shutdown) {
            error!("{}: kind={} shutdown broadcast failed: {}", self.name, e.kind(), e);
        }
        info!("{}: stopped", self.name);
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
