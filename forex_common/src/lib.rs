//!
//! Common types and utilities shared by the forex proxy and the quote client.
//!
//! This crate aggregates:
//! - `error`: unified error type `FeedError` used across the workspace.
//! - `result`: handy `Result<T, FeedError>` alias.
//! - `symbols`: currency pair symbols, the major pairs and parsing helpers.
//! - `quote`: the uniform `Quote` record and history/candle types.
//! - `validate`: numeric validation of vendor fields.
//! - `wire`: vendor payload shapes and their adapters.
//! - `rate_limit`: minimum-interval limiter used at the network boundary.
//! - `net`: networking constants and small helpers.
#![warn(missing_docs)]
pub mod error;
pub mod net;
pub mod quote;
pub mod rate_limit;
pub mod result;
pub mod symbols;
pub mod validate;
pub mod wire;

pub use error::FeedError;
pub use quote::{Quote, QuoteMap};
pub use result::Result;
pub use symbols::Symbol;
