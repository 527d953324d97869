//! Common error types for the funnel workspace

use thiserror::Error;

/// Common result type for funnel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the funnel crates
#[derive(Error, Debug)]
pub enum Error {
    /// Session storage rejected a read or write (disabled, quota, etc.)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Destination URL for an outbound link did not parse.
    ///
    /// Destination URLs are fixed configuration constants, so this is a
    /// programming-error class: it must fail loudly rather than silently
    /// misroute a purchase click.
    #[error("Bad destination URL '{url}': {source}")]
    BadDestination {
        url: String,
        source: url::ParseError,
    },

    /// An analytics backend rejected a dispatch
    #[error("Backend '{backend}' dispatch failed: {reason}")]
    Backend { backend: String, reason: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
