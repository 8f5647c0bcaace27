//! Error types for the tracker domain.
//!
//! [`TransportError`] is what a [`crate::Transport`] adapter reports. It is
//! passed to callers unchanged; the resolver only wraps it transparently in
//! [`ResolverError::Transport`] so its message is preserved as-is.
//!
//! [`ResolverError::Configuration`] is the only error raised by this layer
//! itself. A lookup that finds nothing is not an error: it resolves to `None`.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failures surfaced by a transport adapter.
///
/// Every variant renders a human-readable message through `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("network error: {message}")]
    Network { message: String },

    /// The service rejected the credentials.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// The service answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed response: {message}")]
    Malformed { message: String },

    /// The service answered successfully but reported errors in its envelope.
    #[error("{}", errors.join("; "))]
    Service { errors: Vec<String> },

    /// The request could not be encoded.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

// ---------------------------------------------------------------------------
// Resolver errors
// ---------------------------------------------------------------------------

/// Errors returned by resolver operations.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Required configuration keys are absent or empty.
    ///
    /// Raised at construction; the message names every missing key.
    #[error("{}", describe_missing(missing))]
    Configuration {
        /// Missing key names, in declaration order.
        missing: Vec<&'static str>,
    },

    /// A transport call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

fn describe_missing(missing: &[&'static str]) -> String {
    match missing {
        [single] => format!("'{single}' is a required configuration key"),
        keys => format!("'{}' are required configuration keys", keys.join(",")),
    }
}
