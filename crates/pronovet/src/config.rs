//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use pronovet_protocol::DEFAULT_API_BASE;
use pronovet_session::AuthConfig;

use crate::PronovetError;

pub const ENV_API_BASE: &str = "PRONOVET_API_BASE";
pub const ENV_TIMEOUT_SECS: &str = "PRONOVET_TIMEOUT_SECS";
pub const ENV_LOGIN_ROUTE: &str = "PRONOVET_LOGIN_ROUTE";
pub const ENV_SINGLE_FLIGHT: &str = "PRONOVET_SINGLE_FLIGHT";
pub const ENV_SESSION_FILE: &str = "PRONOVET_SESSION_FILE";

/// Everything needed to build an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root every relative path is joined to.
    ///
    /// Default: `http://127.0.0.1:8000/api`.
    pub base_url: String,

    /// Applied to every request: original, refresh, retry and login.
    ///
    /// Default: 30 seconds.
    pub timeout: Duration,

    /// Route handed to the login redirect when a session ends.
    ///
    /// Default: `/login`.
    pub login_route: String,

    /// Whether concurrent 401s share one refresh call.
    ///
    /// Default: `true`.
    pub single_flight_refresh: bool,

    /// Persist the session to this JSON file instead of keeping it in
    /// memory.
    ///
    /// Default: `None`.
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            login_route: "/login".to_string(),
            single_flight_refresh: true,
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `PRONOVET_*` environment variables.
    ///
    /// # Errors
    /// Returns [`PronovetError::Config`] if a variable is set to a value
    /// that can't be parsed.
    pub fn from_env() -> Result<Self, PronovetError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PronovetError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(base) = var(ENV_API_BASE) {
            config.base_url = base;
        }
        if let Some(secs) = var(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.parse().map_err(|_| {
                PronovetError::Config(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {secs:?}"
                ))
            })?;
            if secs == 0 {
                return Err(PronovetError::Config(format!(
                    "{ENV_TIMEOUT_SECS} must be greater than zero"
                )));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(route) = var(ENV_LOGIN_ROUTE) {
            config.login_route = route;
        }
        if let Some(flag) = var(ENV_SINGLE_FLIGHT) {
            config.single_flight_refresh = parse_bool(&flag).ok_or_else(|| {
                PronovetError::Config(format!(
                    "{ENV_SINGLE_FLIGHT} must be true/false/1/0, got {flag:?}"
                ))
            })?;
        }
        if let Some(path) = var(ENV_SESSION_FILE) {
            config.session_file = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// The session-layer part of this configuration.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            login_route: self.login_route.clone(),
            single_flight_refresh: self.single_flight_refresh,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
