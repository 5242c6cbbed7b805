//! Forex client library: the price-feed pipeline and its consumers.
//!
//! Poll cycles flow through these modules:
//! - `source`: where raw vendor JSON comes from (`ProxySource` over HTTP, or `SimulatedSource`).
//! - `pipeline`: normalization, caching and change tracking (`ForexPipeline`).
//! - `cache`: bounded per-symbol rate history.
//! - `fallback`: static quotes used when live data is unavailable.
//! - `scheduler`: recurring cycles and fan-out to subscribers (`PollScheduler`).
//! - `panels`: display consumers fed by a scheduler.
//!
//! Design notes:
//! - One `ForexPipeline` is shared (`Arc`) by every scheduler, so all consumer groups
//!   see one rolling history per symbol.
//! - Only the pipeline writes to the cache; panels receive owned `QuoteMap` snapshots.
#![warn(missing_docs)]
pub mod cache;
pub mod fallback;
pub mod panels;
pub mod pipeline;
pub mod scheduler;
pub mod simulated;
pub mod source;

pub use pipeline::ForexPipeline;
pub use scheduler::{FeedEvent, PollScheduler, PollState};
pub use source::{ProxySource, QuoteSource};
