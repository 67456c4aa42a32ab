use std::time::Duration;

/// Errors that can occur in the transport layer.
///
/// These are network-level failures: the request never produced an HTTP
/// response. A response with a 4xx/5xx status is NOT an error here, it is
/// a successful round trip that the layers above interpret.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be built (bad URL, bad header value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No connection to the server could be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server did not answer within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Sending the request failed for another reason.
    #[error("request failed: {0}")]
    Request(String),

    /// The status line arrived but the body could not be read.
    #[error("reading response body failed: {0}")]
    Body(String),
}
