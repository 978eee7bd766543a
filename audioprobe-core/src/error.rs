//! Error types for the audioprobe scanners.
//!
//! Parsing anomalies never surface here: malformed headers, truncated
//! streams, and tag/frame disagreements all degrade to invalid or zeroed
//! output fields. The only condition a scanner reports to its caller is a
//! fault in the underlying stream itself.

use thiserror::Error;

/// Top-level error type for audioprobe operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying stream failed to read or seek.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for audioprobe operations.
pub type Result<T> = std::result::Result<T, Error>;
