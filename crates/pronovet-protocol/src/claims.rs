//! Reading claims out of an access token, without verifying it.
//!
//! The server signs and verifies tokens; the client only peeks at the
//! payload to show who is logged in and when the token runs out. Nothing
//! here is a security decision.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::ProtocolError;

/// The claims the API puts into its access tokens.
///
/// Every field is optional: older tokens carry only `username`, newer ones
/// add `user_login` and the name fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccessClaims {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    /// Expiry as seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl AccessClaims {
    /// Decodes the payload segment of a JWT.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MalformedToken`] if the token doesn't have
    /// three dot-separated segments or the payload isn't base64url JSON.
    pub fn peek(token: &str) -> Result<Self, ProtocolError> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => {
                return Err(ProtocolError::MalformedToken(
                    "expected three segments".into(),
                ));
            }
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ProtocolError::MalformedToken(e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ProtocolError::MalformedToken(e.to_string()))
    }

    /// The login name, preferring the legacy `user_login` claim.
    pub fn login(&self) -> Option<&str> {
        non_empty(self.user_login.as_deref())
            .or_else(|| non_empty(self.username.as_deref()))
    }

    /// `"First Last"` when either name is set, otherwise the login name.
    pub fn display_name(&self) -> Option<String> {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let full = full.trim();
        if full.is_empty() {
            self.login().map(str::to_string)
        } else {
            Some(full.to_string())
        }
    }

    /// `true` if `exp` is set and not after `now` (Unix seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
