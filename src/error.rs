//! Error types at the library boundary.
//!
//! None of these are fatal to a running map: the orchestrator converts
//! every source failure into a "keep previous data" or "no data yet" state.

use thiserror::Error;

/// Failure to obtain a map document or a winners feed payload.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport-level failure (DNS, connect, TLS, body read).
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// No answer within the configured timeout.
    #[error("{url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// Local file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Payload was received but could not be decoded.
    #[error("failed to decode payload from {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request's cancellation scope was cancelled before it completed.
    #[error("request cancelled")]
    Cancelled,
}

/// Failure to interpret a fetched map document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("map document is not well-formed XML: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error("map document has no <svg> root element")]
    NotSvg,
}

/// Any failure while loading a map document end-to-end.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}
