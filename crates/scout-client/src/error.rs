//! Client-side error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure: DNS, connect, timeout, malformed body.
    #[error("network request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// The elevation provider could not supply usable samples, whether
    /// unreachable, rejecting the lookup, or answering with too few results.
    #[error("elevation data unavailable")]
    DataUnavailable,

    /// A request that requires a bearer token was attempted before login.
    #[error("no bearer token; log in first")]
    MissingToken,
}
