//! The API base URL and relative-path joining.
//!
//! Every call the client makes is a path relative to one fixed base, e.g.
//! `units/` against `http://127.0.0.1:8000/api`. Callers are sloppy about
//! leading slashes (`"units/"` vs `"/units/"`), so both spellings must
//! resolve to the same target.

use std::fmt;

use url::Url;

use crate::ProtocolError;

/// The base the API is served from when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";

/// Strips every leading `/` from a relative API path.
///
/// ```rust
/// use pronovet_protocol::normalize_path;
///
/// assert_eq!(normalize_path("/units/"), "units/");
/// assert_eq!(normalize_path("units/"), "units/");
/// ```
pub fn normalize_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// A validated API base URL.
///
/// Internally the path always ends in exactly one `/`, so that
/// [`Url::join`] resolves relative paths underneath it instead of
/// replacing its last segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    url: Url,
}

impl ApiBase {
    /// Parses a base URL.
    ///
    /// Trailing slashes are dropped so that joining never produces `//`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidBaseUrl`] unless the URL parses,
    /// uses `http` or `https`, has a host, and carries neither a query nor
    /// a fragment.
    pub fn new(url: impl AsRef<str>) -> Result<Self, ProtocolError> {
        let raw = url.as_ref().trim();
        let mut url = Url::parse(raw).map_err(|e| {
            ProtocolError::InvalidBaseUrl(format!("{raw:?}: {e}"))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProtocolError::InvalidBaseUrl(format!(
                "{raw:?} must use http or https"
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ProtocolError::InvalidBaseUrl(format!(
                "{raw:?} has no host"
            )));
        }
        if url.query().is_some() {
            return Err(ProtocolError::InvalidBaseUrl(format!(
                "{raw:?} must not carry a query string"
            )));
        }
        if url.fragment().is_some() {
            return Err(ProtocolError::InvalidBaseUrl(format!(
                "{raw:?} must not carry a fragment"
            )));
        }

        let path = format!("{}/", url.path().trim_end_matches('/'));
        url.set_path(&path);
        Ok(Self { url })
    }

    /// The base without a trailing slash.
    pub fn as_str(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    /// The parsed base, with its trailing slash.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Joins a relative path onto the base.
    ///
    /// The path may carry its own query (`units/?ordering=name`).
    ///
    /// ```rust
    /// use pronovet_protocol::ApiBase;
    ///
    /// let base = ApiBase::new("http://127.0.0.1:8000/api/").unwrap();
    /// assert_eq!(base.join("/units/").unwrap().as_str(), "http://127.0.0.1:8000/api/units/");
    /// assert_eq!(base.join("units/").unwrap().as_str(), "http://127.0.0.1:8000/api/units/");
    /// ```
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidPath`] if the path doesn't parse or
    /// resolves to somewhere outside the base (`../`, an absolute URL).
    pub fn join(&self, path: &str) -> Result<Url, ProtocolError> {
        let joined = self.url.join(normalize_path(path)).map_err(|e| {
            ProtocolError::InvalidPath(format!("{path:?}: {e}"))
        })?;
        if !joined.as_str().starts_with(self.url.as_str()) {
            return Err(ProtocolError::InvalidPath(format!(
                "{path:?} resolves outside {self}"
            )));
        }
        Ok(joined)
    }
}

impl fmt::Display for ApiBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
