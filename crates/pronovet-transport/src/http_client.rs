//! HTTP transport implementation using `reqwest`.

use std::time::Duration;

use crate::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A `reqwest`-based [`HttpTransport`].
///
/// `reqwest::Client` is internally reference counted, so cloning a
/// `ReqwestTransport` shares one connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Builds a transport whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                TransportError::InvalidRequest(format!(
                    "failed to create HTTP client: {e}"
                ))
            })?;
        tracing::debug!(?timeout, "reqwest transport ready");
        Ok(Self { client, timeout })
    }

    /// Wraps an already configured client.
    ///
    /// `timeout` is only used to label [`TransportError::Timeout`]; the
    /// client's own timeout setting is what actually applies.
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// The configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_builder() {
            TransportError::InvalidRequest(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        tracing::trace!(
            method = %request.method,
            url = %request.url,
            status,
            "http round trip"
        );

        let mut out = HttpResponse::new(status, body.to_vec());
        for (name, value) in headers {
            out = out.with_header(name, value);
        }
        Ok(out)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::with_client(
            reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_default(),
            DEFAULT_TIMEOUT,
        )
    }
}
