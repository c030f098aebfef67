//! Error types for the pagination engine.
//!
//! Pagination itself never fails: content problems degrade fidelity and are
//! reported as [`ContentWarning`](crate::layout::ContentWarning)s. The errors
//! here cover the edges around it: configuration, decoding, and the two-pass
//! continuation protocol.

use thiserror::Error;

/// Result type alias for folio-pager operations.
pub type Result<T> = std::result::Result<T, PaginationError>;

#[derive(Error, Debug)]
pub enum PaginationError {
    /// A configuration value is outside its usable range.
    #[error("Invalid pagination config: {0}")]
    InvalidConfig(String),

    /// A document, configuration or height table could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// An input file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A measured pass was requested for a document generation that is no
    /// longer current (the article changed or the pass was cancelled).
    #[error("Remeasure ticket {ticket} is stale (current generation is {current})")]
    StaleRemeasure { ticket: u64, current: u64 },

    /// A measured pass was requested but no estimated pass is waiting for one.
    #[error("No remeasure is pending")]
    RemeasureNotPending,
}
