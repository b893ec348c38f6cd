//! Errors raised while building a hub client.

use thiserror::Error;

/// Errors building a hub client.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HubError {
    /// A connection string segment is not `Key=Value`.
    #[error("malformed connection string segment #{index} (expected Key=Value)")]
    Malformed {
        /// Zero-based position of the offending segment.
        index: usize,
    },

    /// A required key is absent or empty.
    #[error("connection string is missing '{key}'")]
    MissingKey {
        /// The missing key.
        key: &'static str,
    },

    /// The host name does not form a valid URL.
    #[error("invalid hub host name '{host}'")]
    InvalidHost {
        /// The rejected host.
        host: String,
    },

    /// Only a `SharedAccessKey` was supplied.
    #[error(
        "connection string has no SharedAccessSignature; signing a SharedAccessKey is not supported"
    )]
    SignatureRequired,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
