//! `ApiClient` builder and the authenticated core every endpoint uses.
//!
//! This is the entry point for talking to the Pronovet API. It ties
//! together all the layers: transport → protocol → session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pronovet_protocol::{
    ApiBase, Codec, Credentials, JsonCodec, LOGIN_PATH, RequestDescriptor,
    TokenPair,
};
use pronovet_session::{
    AuthenticatedClient, FileSessionStore, LogRedirect, LoginRedirect,
    MemorySessionStore, Outcome, Session, SessionStore,
};
use pronovet_transport::{HttpResponse, HttpTransport, ReqwestTransport};
use serde::de::DeserializeOwned;

use crate::{ClientConfig, PronovetError};

/// Relative path of the logout endpoint.
pub const LOGOUT_PATH: &str = "logout/";

const INVALID_CREDENTIALS: &str = "Invalid credentials, please try again.";

/// Builder for configuring an [`ApiClient`].
///
/// # Example
///
/// ```rust,no_run
/// use pronovet::prelude::*;
///
/// # async fn run() -> Result<(), PronovetError> {
/// let client = ApiClient::builder()
///     .base_url("https://pronovet.example/api")
///     .session_file("/var/lib/pronovet/session.json")
///     .build()?;
/// client.login("jdoe", "secret", true).await?;
/// let stats = client.dashboard_stats().await?;
/// println!("{} buildings", stats.buildings);
/// # Ok(())
/// # }
/// ```
pub struct ApiClientBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn SessionStore>>,
    redirect: Option<Arc<dyn LoginRedirect>>,
}

impl ApiClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            store: None,
            redirect: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.config.login_route = route.into();
        self
    }

    pub fn single_flight_refresh(mut self, enabled: bool) -> Self {
        self.config.single_flight_refresh = enabled;
        self
    }

    /// Keeps the session in a JSON file at `path`.
    pub fn session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.session_file = Some(path.into());
        self
    }

    /// Uses `store` for the session. Takes precedence over
    /// [`session_file`](Self::session_file).
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the hook fired when a session ends. Defaults to
    /// [`LogRedirect`].
    pub fn redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Builds a client over `reqwest` with the configured timeout.
    pub fn build(self) -> Result<ApiClient<ReqwestTransport>, PronovetError> {
        let transport = ReqwestTransport::new(self.config.timeout)?;
        self.build_with(transport)
    }

    /// Builds a client over a caller-supplied transport.
    pub fn build_with<T: HttpTransport>(
        self,
        transport: T,
    ) -> Result<ApiClient<T>, PronovetError> {
        let base = ApiBase::new(&self.config.base_url)?;
        let store: Arc<dyn SessionStore> = match (self.store, &self.config.session_file) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(FileSessionStore::new(path)),
            (None, None) => Arc::new(MemorySessionStore::new()),
        };
        let redirect = self.redirect.unwrap_or_else(|| Arc::new(LogRedirect));

        tracing::debug!(
            base = %base,
            timeout_secs = self.config.timeout.as_secs(),
            single_flight = self.config.single_flight_refresh,
            persistent = self.config.session_file.is_some(),
            "building API client"
        );

        Ok(ApiClient {
            auth: AuthenticatedClient::new(
                transport,
                base,
                store,
                redirect,
                self.config.auth_config(),
            ),
            codec: JsonCodec,
        })
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A client for the Pronovet API.
///
/// Every method except [`login`](Self::login) goes through
/// [`AuthenticatedClient::execute`], so an expired access token is
/// refreshed and the request retried once without the caller noticing.
pub struct ApiClient<T: HttpTransport = ReqwestTransport> {
    auth: AuthenticatedClient<T>,
    codec: JsonCodec,
}

impl ApiClient<ReqwestTransport> {
    /// Creates a new builder.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }
}

impl<T: HttpTransport> ApiClient<T> {
    /// The session-aware client underneath.
    pub fn inner(&self) -> &AuthenticatedClient<T> {
        &self.auth
    }

    pub fn base(&self) -> &ApiBase {
        self.auth.base()
    }

    /// Sends `descriptor` with token handling and returns the raw outcome.
    pub async fn execute(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<Outcome, PronovetError> {
        Ok(self.auth.execute(descriptor).await?)
    }

    // -- Session ----------------------------------------------------------

    /// Exchanges credentials for a token pair and stores the session.
    ///
    /// # Errors
    /// - [`PronovetError::Api`] on a non-2xx answer, carrying the server's
    ///   message (or a generic "invalid credentials" one). The stored
    ///   session is left untouched.
    /// - Transport and storage errors as usual.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        keep_logged_in: bool,
    ) -> Result<(), PronovetError> {
        let descriptor = RequestDescriptor::post(LOGIN_PATH).json(&Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let response = self.auth.send_anonymous(&descriptor).await?;
        if !response.is_success() {
            tracing::info!(username, status = response.status(), "login rejected");
            return Err(PronovetError::from_response_or(
                &response,
                INVALID_CREDENTIALS,
            ));
        }

        let pair: TokenPair = self.codec.decode(response.body())?;
        Session::establish(self.store(), &pair, username, keep_logged_in)?;
        Ok(())
    }

    /// Ends the session: tells the server (best effort), clears every
    /// stored key and fires the login redirect once.
    pub async fn logout(&self) -> Result<(), PronovetError> {
        match self.auth.send_once(&RequestDescriptor::post(LOGOUT_PATH)).await {
            Ok(response) => {
                tracing::debug!(status = response.status(), "logout acknowledged");
            }
            Err(e) => {
                tracing::debug!(error = %e, "logout request failed, clearing anyway");
            }
        }
        self.auth.end_session()?;
        tracing::info!("logged out");
        Ok(())
    }

    /// `true` if an access token is stored.
    pub fn is_authenticated(&self) -> Result<bool, PronovetError> {
        Ok(self.session()?.is_authenticated())
    }

    /// A snapshot of the stored session.
    pub fn session(&self) -> Result<Session, PronovetError> {
        Ok(Session::load(self.store())?)
    }

    /// The name to greet the user with, if anyone is logged in.
    pub fn display_name(&self) -> Result<Option<String>, PronovetError> {
        Ok(self.session()?.display_name())
    }

    pub(crate) fn store(&self) -> &dyn SessionStore {
        self.auth.store().as_ref()
    }

    // -- Plumbing shared by the endpoint modules --------------------------

    /// Executes and insists on a 2xx response.
    pub(crate) async fn fetch(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<HttpResponse, PronovetError> {
        match self.auth.execute(descriptor).await? {
            Outcome::Completed(response) if response.is_success() => Ok(response),
            Outcome::Completed(response) => {
                tracing::debug!(
                    url = descriptor.url(),
                    status = response.status(),
                    "API error"
                );
                Err(PronovetError::from_response(&response))
            }
            Outcome::LoggedOut => Err(PronovetError::LoggedOut),
        }
    }

    /// Executes, insists on 2xx, and decodes the JSON body.
    pub(crate) async fn fetch_json<R: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<R, PronovetError> {
        let response = self.fetch(descriptor).await?;
        Ok(self.codec.decode(response.body())?)
    }
}
