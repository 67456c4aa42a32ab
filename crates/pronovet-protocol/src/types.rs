//! Wire types for the token endpoints and API error bodies.

use serde::{Deserialize, Serialize};

/// Relative path of the login (token obtain) endpoint.
pub const LOGIN_PATH: &str = "token/";

/// Relative path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "token/refresh/";

/// Body of `POST token/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Success body of `POST token/`: a fresh access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Body of `POST token/refresh/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Success body of `POST token/refresh/`.
///
/// Servers that rotate refresh tokens also send a new `refresh`; the
/// client accepts it but does not need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

/// The error shapes the API returns on 4xx.
///
/// Either `{"detail": "..."}` or a validation map with
/// `non_field_errors`. Field-level errors are ignored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub non_field_errors: Vec<String>,
}

impl ApiErrorBody {
    /// The most specific human-readable message, if the body had one.
    pub fn message(&self) -> Option<&str> {
        self.detail
            .as_deref()
            .or_else(|| self.non_field_errors.first().map(String::as_str))
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_body_prefers_detail() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"detail":"No active account","non_field_errors":["other"]}"#,
        )
        .unwrap();
        assert_eq!(body.message(), Some("No active account"));
    }

    #[test]
    fn test_api_error_body_falls_back_to_non_field_errors() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"non_field_errors":["Unable to log in"]}"#,
        )
        .unwrap();
        assert_eq!(body.message(), Some("Unable to log in"));
    }

    #[test]
    fn test_api_error_body_field_errors_only_has_no_message() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"email":["Enter a valid email."]}"#)
                .unwrap();
        assert_eq!(body.message(), None);
    }

    #[test]
    fn test_refresh_response_without_rotation() {
        let resp: RefreshResponse =
            serde_json::from_str(r#"{"access":"A2"}"#).unwrap();
        assert_eq!(resp.refresh, None);
    }
}
