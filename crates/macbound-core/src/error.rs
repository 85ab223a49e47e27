//! Error types for the macbound core library
//!
//! This module defines the error handling system for macbound, using
//! thiserror for ergonomic error definitions and anyhow for flexible
//! error sources.

use thiserror::Error;

/// Main error type for macbound operations
///
/// Every variant is terminal for the current exchange: the protocol layer
/// never retries on its own. Non-401, non-2xx HTTP statuses are not errors
/// at all; they bypass verification and are returned to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Client misconfiguration, e.g. no MAC provider installed
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The exchange discipline of the configured MAC provider was violated
    #[error("Session protocol violation: {message}")]
    SessionViolation { message: String },

    /// A success response arrived without the authentication header
    #[error("Response is missing the {header_name} header")]
    MissingAuthHeader { header_name: String },

    /// The authentication header did not decode into exactly four fields
    #[error("Malformed authentication header: {message}")]
    MalformedHeader { message: String },

    /// The response header carries a protocol version this client does not speak
    #[error("Unsupported protocol version {received} (supported: {supported})")]
    UnsupportedVersion { received: u32, supported: u32 },

    /// Cryptographic MAC validation failed
    #[error("MAC validation failed: {message}")]
    MacMismatch { message: String },

    /// The server rejected the request with a 401, classified diagnostic attached
    #[error("Remote authentication rejected ({status_code}): {diagnostic}")]
    RemoteAuthentication {
        diagnostic: String,
        status_code: u16,
    },

    /// Transport-level failure (connection, request building, send)
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}
