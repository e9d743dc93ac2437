//! Error taxonomy for the lookup pipeline.
//!
//! Ambiguous extraction is deliberately not an error — it resolves to an
//! `Unknown` result. Only missing input and fetch-layer failures surface as
//! errors, and no failed lookup ever takes down the process.

use thiserror::Error;

/// Failures while retrieving the remote profile document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The hard per-fetch timeout elapsed. Not retried internally; the
    /// caller may retry the whole lookup.
    #[error("fetch timed out")]
    Timeout,

    /// Any transport-level failure (DNS, connect, TLS, read).
    #[error("transport error: {0}")]
    Transport(String),

    /// Headless-browser session failure, including launch failure.
    #[error("browser error: {0}")]
    Browser(String),
}

/// Failures of a whole lookup request.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The caller did not supply the required `phone` field.
    #[error("Missing phone parameter")]
    MissingPhone,

    #[error("lookup failed for {phone}: {source}")]
    Fetch {
        phone: String,
        #[source]
        source: FetchError,
    },
}
