//! Error types shared between the proxy and the client pipeline.
//!
//! The `FeedError` enum unifies the feed failure taxonomy (bad input, transport,
//! throttling, malformed payloads) with the infrastructure failures of I/O,
//! serialization, locks and configuration, so every crate propagates a single error type.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by the proxy and the client.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Caller passed arguments the pipeline cannot work with. Raised before any network call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Non-2xx status or network failure talking to the quote endpoint.
    #[error("Transport error{}: {message}", status_suffix(.status))]
    Transport {
        /// HTTP status when the server answered, `None` for network failures.
        status: Option<u16>,
        /// Short human-readable context.
        message: String,
    },

    /// Boundary throttling rejected the call. A hint to retry later, never retried internally.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Body could not be parsed or lacks the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Error while parsing a symbols file into `Symbol` values.
    #[error("Parse symbols file error: {0}")]
    ParseSymbolsFile(String),

    /// A string could not be resolved into a currency pair.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),

    /// Missing or invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl FeedError {
    /// Stable short name of the variant, used as the `kind` field in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::InvalidInput(_) => "invalid_input",
            FeedError::Transport { .. } => "transport",
            FeedError::RateLimited(_) => "rate_limited",
            FeedError::MalformedResponse(_) => "malformed_response",
            FeedError::Io(_) => "io",
            FeedError::SerdeJson(_) => "serde_json",
            FeedError::ParseSymbolsFile(_) => "parse_symbols_file",
            FeedError::UnknownSymbol(_) => "unknown_symbol",
            FeedError::MutexLock(_) => "mutex_lock",
            FeedError::Config(_) => "config",
        }
    }

    /// Convenience constructor for transport failures.
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        FeedError::Transport {
            status,
            message: message.into(),
        }
    }

    /// Whether the pipeline should degrade to the fallback table for this error.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            FeedError::Transport { .. } | FeedError::MalformedResponse(_) | FeedError::SerdeJson(_)
        )
    }
}

impl<T> From<PoisonError<T>> for FeedError {
    fn from(err: PoisonError<T>) -> Self {
        FeedError::MutexLock(err.to_string())
    }
}
