//! Request descriptors: what a caller wants, before credentials.
//!
//! A [`RequestDescriptor`] is built per call and never persisted. It holds
//! a relative path, not a URL; it only becomes an [`HttpRequest`] when
//! resolved against an [`ApiBase`].

use pronovet_transport::{HttpRequest, Method};
use serde::Serialize;
use url::Url;

use crate::codec::JSON_CONTENT_TYPE;
use crate::{ApiBase, MultipartForm, ProtocolError, normalize_path};

/// A method, a relative path, headers, and an optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    /// Creates a descriptor. Leading slashes on `url` are stripped.
    pub fn new(method: Method, url: impl AsRef<str>) -> Self {
        Self {
            method,
            url: normalize_path(url.as_ref()).to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl AsRef<str>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl AsRef<str>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl AsRef<str>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn patch(url: impl AsRef<str>) -> Self {
        Self::new(Method::Patch, url)
    }

    pub fn delete(url: impl AsRef<str>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// The HTTP verb.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The normalized relative path (never starts with `/`).
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The raw body, if one was set.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Adds a header.
    pub fn header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a query parameter. Keys and values are form-encoded when the
    /// descriptor is resolved.
    pub fn query(
        mut self,
        key: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Sets a raw body with an explicit content type.
    pub fn body(
        mut self,
        bytes: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
    ) -> Self {
        self.body = Some(bytes.into());
        self.set_content_type(content_type.into());
        self
    }

    /// Serializes `value` as the JSON body.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if `value` can't be serialized.
    #[cfg(feature = "json")]
    pub fn json<T: Serialize>(
        self,
        value: &T,
    ) -> Result<Self, ProtocolError> {
        use crate::Codec;
        let codec = crate::JsonCodec;
        let bytes = codec.encode(value)?;
        Ok(self.body(bytes, codec.content_type()))
    }

    /// Sets a `multipart/form-data` body.
    pub fn multipart(self, form: MultipartForm) -> Self {
        let content_type = form.content_type();
        self.body(form.into_body(), content_type)
    }

    fn set_content_type(&mut self, value: String) {
        self.headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case("content-type"));
        self.headers.push(("Content-Type".to_string(), value));
    }

    /// The absolute target: base, path, then the encoded query pairs.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidPath`] if the path escapes the base.
    pub fn target(&self, base: &ApiBase) -> Result<Url, ProtocolError> {
        let mut target = base.join(&self.url)?;
        if !self.query.is_empty() {
            let mut pairs = target.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(target)
    }

    /// Resolves against `base` into a transport-level request.
    ///
    /// A body without an explicit `Content-Type` is sent as JSON.
    ///
    /// # Errors
    /// Same as [`target`](Self::target).
    pub fn resolve(&self, base: &ApiBase) -> Result<HttpRequest, ProtocolError> {
        let mut request = HttpRequest::new(self.method, self.target(base)?);
        request.headers = self.headers.clone();
        if let Some(body) = &self.body {
            if request.header("content-type").is_none() {
                request.set_header("Content-Type", JSON_CONTENT_TYPE);
            }
            request.body = Some(body.clone());
        }
        Ok(request)
    }
}
