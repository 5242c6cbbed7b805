//! Display consumers fed by a `PollScheduler`.
//!
//! Each panel keeps its own view state and only sees `FeedEvent`s; none of them
//! touches the pipeline or its cache. `run_panel` drives one panel from one
//! subscription until the scheduler shuts down.
//! - `pairs`: quote table for the tracked pairs.
//! - `chart`: rolling price window for one pair.
//! - `portfolio`: allocation and margin summary.
//! - `execution`: mock order ticket and in-memory trade history.

pub mod chart;
pub mod execution;
pub mod pairs;
pub mod portfolio;

use crate::scheduler::FeedEvent;
use crossbeam_channel::Receiver;
use forex_common::quote::QuoteMap;
use log::{debug, warn};

/// A consumer of scheduler output.
pub trait Panel: Send {
    /// Label used in logs.
    fn name(&self) -> &str;

    /// Called with the quotes of every successful cycle.
    fn on_quotes(&mut self, quotes: &QuoteMap);

    /// Called when a cycle produced no data. Panels keep their previous view.
    fn on_unavailable(&mut self) {
        warn!(
            "{}: unable to fetch live prices, showing last known rates",
            self.name()
        );
    }
}

/// Feed `panel` from `events` until `Shutdown` or until the sender side is gone.
pub fn run_panel<P: Panel>(mut panel: P, events: Receiver<FeedEvent>) -> P {
    loop {
        match events.recv() {
            Ok(FeedEvent::Quotes(quotes)) => panel.on_quotes(&quotes),
            Ok(FeedEvent::Unavailable) => panel.on_unavailable(),
            Ok(FeedEvent::Shutdown) | Err(_) => break,
        }
    }
    debug!("{}: event loop finished", panel.name());
    panel
}
