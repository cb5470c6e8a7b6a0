//! Error types for forge API calls.
//!
//! [`ForgeError`] is the single error type returned by all [`Forge`](crate::Forge)
//! trait methods. Variants distinguish the failure layers callers care
//! about: transport, HTTP status, body shape, and descriptor completeness.

use thiserror::Error;

/// Errors returned by [`Forge`](crate::Forge) operations.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// The request never produced a usable response (DNS, TLS, connection
    /// reset, timeout).
    #[error("network error for {url}: {source}")]
    Http {
        /// The request URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The token was rejected outright. Fatal for the run when it happens
    /// while resolving the primary identity.
    #[error("authentication failed (HTTP {code}); check the token")]
    Auth {
        /// The HTTP status code (401).
        code: u16,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {code}")]
    Status {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        code: u16,
    },

    /// A 2xx response carried no body at all.
    #[error("{url} returned an empty body")]
    EmptyBody {
        /// The request URL.
        url: String,
    },

    /// The body did not parse against the expected shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// The request URL.
        url: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A payload parsed, but a field the descriptor model requires was
    /// absent or null. Partially-populated descriptors never leave this
    /// crate.
    #[error("{context}: missing required field `{field}`")]
    MissingField {
        /// Name of the absent field.
        field: &'static str,
        /// What was being parsed, for operator-facing logs.
        context: String,
    },
}
