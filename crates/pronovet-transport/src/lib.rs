//! Transport abstraction layer for the Pronovet API client.
//!
//! Provides the [`HttpTransport`] trait that abstracts over whatever
//! actually moves bytes to the API server, plus the request and response
//! types that cross it.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): HTTP transport via `reqwest`

mod error;
mod http;
#[cfg(feature = "reqwest")]
mod http_client;

pub use error::TransportError;
pub use http::{HttpRequest, HttpResponse, Method};
#[cfg(feature = "reqwest")]
pub use http_client::ReqwestTransport;

use std::future::Future;
use std::sync::Arc;

/// Sends one HTTP request and returns the server's response.
///
/// An implementation performs exactly one network round trip per call.
/// It never retries, never follows up on a status code, and never touches
/// credentials: those decisions belong to the session layer.
///
/// Any HTTP status, including 401 and 5xx, is `Ok`. Only failures that
/// produced no response at all are `Err`.
pub trait HttpTransport: Send + Sync + 'static {
    /// Sends the request.
    fn send(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Sharing a transport between a client and a test harness (or between
/// several clients) goes through `Arc`.
impl<T: HttpTransport> HttpTransport for Arc<T> {
    fn send(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        (**self).send(request)
    }
}
