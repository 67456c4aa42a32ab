//! Unified error type for the Pronovet client.

use pronovet_protocol::{ApiErrorBody, Codec, JsonCodec, ProtocolError};
use pronovet_session::SessionError;
use pronovet_transport::{HttpResponse, TransportError};

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `pronovet` facade, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each wrapping variant generates the `From` impls, so `?`
/// converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PronovetError {
    /// A transport-level error (connect, timeout, body read).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (bad base URL, encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (network failure during an authenticated
    /// request, session storage).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The API answered with a non-2xx status.
    #[error("API returned {status}: {detail}")]
    Api { status: u16, detail: String },

    /// The request hit a 401 that could not be refreshed. The session has
    /// been cleared and the login redirect has fired.
    #[error("session expired, please log in again")]
    LoggedOut,

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),
}

impl PronovetError {
    /// Builds an [`Api`](Self::Api) error from a non-2xx response, using
    /// the server's `detail` or first `non_field_errors` entry when the
    /// body carries one.
    pub fn from_response(response: &HttpResponse) -> Self {
        let fallback = format!("request failed with status {}", response.status());
        Self::from_response_or(response, &fallback)
    }

    /// Like [`from_response`](Self::from_response) with a caller-chosen
    /// message for bodies that carry none.
    pub fn from_response_or(response: &HttpResponse, fallback: &str) -> Self {
        let detail = JsonCodec
            .decode::<ApiErrorBody>(response.body())
            .ok()
            .and_then(|body| body.message().map(str::to_string))
            .unwrap_or_else(|| fallback.to_string());
        Self::Api {
            status: response.status(),
            detail,
        }
    }

    /// The HTTP status, for [`Api`](Self::Api) errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
