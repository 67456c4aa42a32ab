//! Session types: the data a logged-in client carries around.
//!
//! A "session" here is the client's side of authentication:
//! - WHO is logged in (`username`)
//! - WHAT proves it (`access_token`, short-lived)
//! - HOW to stay logged in (`refresh_token`, longer-lived)
//!
//! Lifecycle:
//!
//! ```text
//!   login ──→ [tokens stored] ──(401 + refresh ok)──→ [access replaced]
//!                  │                                        │
//!                  └──(logout / 401 + refresh failed)──→ [cleared]
//! ```

use pronovet_protocol::{AccessClaims, TokenPair};

use crate::{SessionError, SessionKey, SessionStore};

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

/// Configuration for the authenticated client.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Where [`LoginRedirect`](crate::LoginRedirect) is told to send the
    /// user when the session ends.
    ///
    /// Default: `/login`.
    pub login_route: String,

    /// Whether concurrent 401s share one refresh.
    ///
    /// When `false`, every request that hits a 401 refreshes on its own
    /// and the last write to the store wins.
    ///
    /// Default: `true`.
    pub single_flight_refresh: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_route: "/login".to_string(),
            single_flight_refresh: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A snapshot of everything in the store.
///
/// The store is the source of truth; this is a copy taken at one moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub username: Option<String>,
    pub keep_logged_in: bool,
}

impl Session {
    /// Reads every key from the store.
    pub fn load(store: &dyn SessionStore) -> Result<Self, SessionError> {
        Ok(Self {
            access_token: store.get(SessionKey::AccessToken)?,
            refresh_token: store.get(SessionKey::RefreshToken)?,
            username: store.get(SessionKey::Username)?,
            keep_logged_in: store
                .get(SessionKey::KeepLoggedIn)?
                .is_some_and(|v| v == "1"),
        })
    }

    /// Writes a freshly obtained token pair (login or registration).
    ///
    /// `keepLoggedIn` is set only when asked for, and otherwise removed,
    /// so a stale flag from an earlier login doesn't linger.
    pub fn establish(
        store: &dyn SessionStore,
        pair: &TokenPair,
        username: &str,
        keep_logged_in: bool,
    ) -> Result<(), SessionError> {
        store.set(SessionKey::AccessToken, &pair.access)?;
        store.set(SessionKey::RefreshToken, &pair.refresh)?;
        store.set(SessionKey::Username, username)?;
        if keep_logged_in {
            store.set(SessionKey::KeepLoggedIn, "1")?;
        } else {
            store.remove(SessionKey::KeepLoggedIn)?;
        }
        tracing::info!(username, keep_logged_in, "session established");
        Ok(())
    }

    /// `true` if an access token is present. Says nothing about whether
    /// the server will still accept it.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Claims peeked from the access token, if it is a readable JWT.
    pub fn claims(&self) -> Option<AccessClaims> {
        self.access_token
            .as_deref()
            .and_then(|t| AccessClaims::peek(t).ok())
    }

    /// A name to greet the user with: the token's name claims, else the
    /// stored username.
    pub fn display_name(&self) -> Option<String> {
        self.claims()
            .and_then(|c| c.display_name())
            .or_else(|| self.username.clone())
    }
}
