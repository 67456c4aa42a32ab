//! Error types for the protocol layer.
//!
//! Each crate in the client defines its own error enum. A
//! `ProtocolError` always means "the bytes or the addressing were wrong",
//! never "the network failed" or "the session is gone".

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of a request body failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A response body did not match the expected shape.
    ///
    /// Common causes: an HTML error page where JSON was expected, a
    /// missing `access` field, or a truncated body.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The API base URL is unusable.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// A request path doesn't resolve to a URL under the API base.
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    /// A token is not a three-part JWT with a JSON payload.
    #[error("malformed token: {0}")]
    MalformedToken(String),
}
