//! The authenticated client: bearer tokens, 401 detection, one refresh,
//! one retry.
//!
//! Every call to [`AuthenticatedClient::execute`] walks this state machine
//! exactly once:
//!
//! ```text
//!   Send ──(non-401 or network error)──────────────────────→ done
//!     │
//!     └──(401)──→ NeedRefresh ──(new token)──→ Retry ──(any result)──→ done
//!                      │
//!                      └──(no token)──→ clear session, redirect ──→ LoggedOut
//! ```
//!
//! `Retry` has a single exit. A second 401 is returned to the caller
//! like any other response, so there is no path back to `NeedRefresh`
//! and no way to loop.
//!
//! # Concurrency note
//!
//! With `single_flight_refresh` on (the default), the `NeedRefresh` step
//! runs under an async mutex. The first request to get there refreshes;
//! requests queued behind it see that the stored token has already
//! changed and reuse it without another network call. The terminal clear
//! also happens under the mutex, so nobody observes a half-cleared store.

use std::sync::Arc;

use pronovet_protocol::{ApiBase, RequestDescriptor};
use pronovet_transport::{HttpRequest, HttpResponse, HttpTransport};
use tokio::sync::Mutex;

use crate::{
    AuthConfig, LoginRedirect, SessionError, SessionKey, SessionStore,
    TokenRefresher,
};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// How an authenticated request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server answered. This is the first response for anything but a
    /// 401, or the retried response (whatever its status) after a refresh.
    Completed(HttpResponse),

    /// The request got a 401 and the session could not be refreshed. The
    /// store has been cleared and the login redirect has fired; the
    /// original request was abandoned.
    LoggedOut,
}

impl Outcome {
    /// The response, if the request completed.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Completed(response) => Some(response),
            Self::LoggedOut => None,
        }
    }

    /// Consumes the outcome and returns the response, if any.
    pub fn into_response(self) -> Option<HttpResponse> {
        match self {
            Self::Completed(response) => Some(response),
            Self::LoggedOut => None,
        }
    }

    /// `true` for the forced-logout path.
    pub fn is_logged_out(&self) -> bool {
        matches!(self, Self::LoggedOut)
    }
}

// ---------------------------------------------------------------------------
// Step (internal state machine)
// ---------------------------------------------------------------------------

/// One state of a single `execute` call.
enum Step {
    /// Send with whatever token is stored (possibly none).
    Send,
    /// Got a 401 while presenting `stale`.
    NeedRefresh { stale: Option<String> },
    /// Send once more with `token`. Always followed by `Done`.
    Retry { token: String },
    Done(Outcome),
}

// ---------------------------------------------------------------------------
// AuthenticatedClient
// ---------------------------------------------------------------------------

/// Wraps an [`HttpTransport`] with session handling.
pub struct AuthenticatedClient<T: HttpTransport> {
    transport: T,
    base: ApiBase,
    store: Arc<dyn SessionStore>,
    redirect: Arc<dyn LoginRedirect>,
    refresher: TokenRefresher,
    refresh_gate: Option<Mutex<()>>,
    config: AuthConfig,
}

impl<T: HttpTransport> AuthenticatedClient<T> {
    pub fn new(
        transport: T,
        base: ApiBase,
        store: Arc<dyn SessionStore>,
        redirect: Arc<dyn LoginRedirect>,
        config: AuthConfig,
    ) -> Self {
        let refresh_gate = config.single_flight_refresh.then(|| Mutex::new(()));
        Self {
            transport,
            refresher: TokenRefresher::new(base.clone()),
            base,
            store,
            redirect,
            refresh_gate,
            config,
        }
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Performs `descriptor` against the API, handling token expiry.
    ///
    /// # Errors
    /// - [`SessionError::Transport`] if the original or the retried request
    ///   gets no response. Network errors are never retried.
    /// - A storage error if the store can't be read, or can't be cleared
    ///   on the logout path (the redirect still fires in that case).
    ///
    /// A failed refresh is NOT an error: it yields `Ok(Outcome::LoggedOut)`.
    pub async fn execute(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<Outcome, SessionError> {
        let mut step = Step::Send;
        loop {
            step = match step {
                Step::Send => {
                    let token = self.store.get(SessionKey::AccessToken)?;
                    let response =
                        self.dispatch(descriptor, token.as_deref()).await?;
                    if response.is_unauthorized() {
                        tracing::debug!(
                            url = descriptor.url(),
                            had_token = token.is_some(),
                            "got 401, refreshing"
                        );
                        Step::NeedRefresh { stale: token }
                    } else {
                        tracing::trace!(
                            url = descriptor.url(),
                            status = response.status(),
                            "request completed"
                        );
                        Step::Done(Outcome::Completed(response))
                    }
                }
                Step::NeedRefresh { stale } => {
                    self.recover(stale.as_deref()).await?
                }
                Step::Retry { token } => {
                    let response =
                        self.dispatch(descriptor, Some(&token)).await?;
                    tracing::debug!(
                        url = descriptor.url(),
                        status = response.status(),
                        "retried after refresh"
                    );
                    Step::Done(Outcome::Completed(response))
                }
                Step::Done(outcome) => return Ok(outcome),
            };
        }
    }

    /// The `NeedRefresh` step: get a usable token or end the session.
    async fn recover(&self, stale: Option<&str>) -> Result<Step, SessionError> {
        // Held until this step returns, so the clear on failure is covered.
        let _gate = match &self.refresh_gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };

        if self.refresh_gate.is_some() {
            let current = self.store.get(SessionKey::AccessToken)?;
            if let Some(current) = current {
                if Some(current.as_str()) != stale {
                    tracing::debug!("token already refreshed by a concurrent request");
                    return Ok(Step::Retry { token: current });
                }
            }
        }

        match self.refresher.refresh(&self.transport, self.store.as_ref()).await {
            Some(token) => Ok(Step::Retry { token }),
            None => {
                tracing::warn!("refresh failed, ending session");
                self.end_session()?;
                Ok(Step::Done(Outcome::LoggedOut))
            }
        }
    }

    /// Refreshes the access token (see [`TokenRefresher::refresh`]).
    pub async fn refresh(&self) -> Option<String> {
        self.refresher
            .refresh(&self.transport, self.store.as_ref())
            .await
    }

    /// Clears every session key and fires the login redirect once.
    ///
    /// The redirect fires even if clearing fails; the clear error is then
    /// returned.
    pub fn end_session(&self) -> Result<(), SessionError> {
        let cleared = self.store.clear();
        if let Err(e) = &cleared {
            tracing::error!(error = %e, "could not clear session store");
        }
        self.redirect.redirect_to_login(&self.config.login_route);
        cleared
    }

    /// Sends once with the stored token (if any). No 401 handling.
    pub async fn send_once(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<HttpResponse, SessionError> {
        let token = self.store.get(SessionKey::AccessToken)?;
        self.dispatch(descriptor, token.as_deref()).await
    }

    /// Sends once without any `Authorization` header.
    pub async fn send_anonymous(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<HttpResponse, SessionError> {
        self.dispatch(descriptor, None).await
    }

    async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
        token: Option<&str>,
    ) -> Result<HttpResponse, SessionError> {
        let request = authorize(descriptor.resolve(&self.base)?, token);
        Ok(self.transport.send(&request).await?)
    }
}

/// Replaces any caller-supplied `Authorization` with the bearer token, or
/// strips it when there is no token.
fn authorize(mut request: HttpRequest, token: Option<&str>) -> HttpRequest {
    request.remove_header("authorization");
    if let Some(token) = token {
        request.set_header("Authorization", format!("Bearer {token}"));
    }
    request
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `AuthenticatedClient`.
    //!
    //! Every test drives a `ScriptedTransport`, so call counts are exact:
    //! the properties below are about how MANY requests go out, not just
    //! what comes back.

    use std::time::Duration;

    use super::*;
    use crate::MemorySessionStore;
    use crate::testing::{
        CountingRedirect, ScriptedTransport, UnclearableStore, json,
        network_down, status,
    };
    use pronovet_transport::TransportError;

    // -- Helpers ----------------------------------------------------------

    const REFRESH: &str = "token/refresh/";

    struct Harness {
        client: AuthenticatedClient<Arc<ScriptedTransport>>,
        transport: Arc<ScriptedTransport>,
        store: Arc<MemorySessionStore>,
        redirect: Arc<CountingRedirect>,
    }

    fn harness_with(
        transport: Arc<ScriptedTransport>,
        config: AuthConfig,
    ) -> Harness {
        let store = Arc::new(MemorySessionStore::new());
        let redirect = Arc::new(CountingRedirect::default());
        let client = AuthenticatedClient::new(
            Arc::clone(&transport),
            ApiBase::new("http://api.test/api").unwrap(),
            Arc::clone(&store) as Arc<dyn SessionStore>,
            Arc::clone(&redirect) as Arc<dyn LoginRedirect>,
            config,
        );
        Harness {
            client,
            transport,
            store,
            redirect,
        }
    }

    fn harness(transport: Arc<ScriptedTransport>) -> Harness {
        harness_with(transport, AuthConfig::default())
    }

    fn logged_in(h: &Harness, access: &str, refresh: &str) {
        h.store.set(SessionKey::AccessToken, access).unwrap();
        h.store.set(SessionKey::RefreshToken, refresh).unwrap();
        h.store.set(SessionKey::Username, "jdoe").unwrap();
    }

    fn units() -> RequestDescriptor {
        RequestDescriptor::get("units/")
    }

    fn assert_session_cleared(h: &Harness) {
        for key in SessionKey::ALL {
            assert_eq!(h.store.get(key).unwrap(), None, "{key} should be gone");
        }
    }

    // =====================================================================
    // Pass-through
    // =====================================================================

    #[tokio::test]
    async fn test_execute_success_makes_one_call_with_bearer() {
        let transport = ScriptedTransport::new(|_, _| json(200, "[]"));
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let outcome = h.client.execute(&units()).await.unwrap();

        assert_eq!(outcome.response().unwrap().status(), 200);
        assert_eq!(h.transport.calls(), 1);
        let sent = &h.transport.requests()[0];
        assert_eq!(sent.url, "http://api.test/api/units/");
        assert_eq!(sent.header("Authorization"), Some("Bearer A1"));
    }

    #[tokio::test]
    async fn test_execute_non_401_errors_pass_through_untouched() {
        for code in [400, 403, 404, 500, 503] {
            let transport = ScriptedTransport::new(move |_, _| {
                json(code, r#"{"detail":"nope"}"#)
            });
            let h = harness(transport);
            logged_in(&h, "A1", "R1");

            let outcome = h.client.execute(&units()).await.unwrap();

            let response = outcome.into_response().unwrap();
            assert_eq!(response.status(), code);
            assert_eq!(response.text(), r#"{"detail":"nope"}"#);
            assert_eq!(h.transport.calls(), 1, "no retry for {code}");
            assert_eq!(h.redirect.count(), 0);
        }
    }

    #[tokio::test]
    async fn test_execute_without_token_sends_unauthenticated() {
        let transport = ScriptedTransport::new(|_, _| status(200));
        let h = harness(transport);

        h.client.execute(&units()).await.unwrap();

        assert_eq!(h.transport.requests()[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn test_execute_replaces_caller_authorization_header() {
        let transport = ScriptedTransport::new(|_, _| status(200));
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let descriptor = units().header("authorization", "Bearer forged");
        h.client.execute(&descriptor).await.unwrap();

        let sent = &h.transport.requests()[0];
        assert_eq!(sent.header("Authorization"), Some("Bearer A1"));
        assert_eq!(
            sent.headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_execute_slash_variants_hit_identical_target() {
        let transport = ScriptedTransport::new(|_, _| status(200));
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        h.client
            .execute(&RequestDescriptor::get("units/"))
            .await
            .unwrap();
        h.client
            .execute(&RequestDescriptor::get("/units/"))
            .await
            .unwrap();

        let sent = h.transport.requests();
        assert_eq!(sent[0], sent[1]);
    }

    #[tokio::test]
    async fn test_execute_network_error_propagates_without_retry() {
        let transport = ScriptedTransport::new(|_, _| network_down());
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let result = h.client.execute(&units()).await;

        assert!(matches!(
            result,
            Err(SessionError::Transport(TransportError::Connect(_)))
        ));
        assert_eq!(h.transport.calls(), 1);
        assert_eq!(
            h.store.get(SessionKey::AccessToken).unwrap().as_deref(),
            Some("A1"),
            "network errors don't touch the session"
        );
    }

    // =====================================================================
    // 401 → refresh → retry
    // =====================================================================

    #[tokio::test]
    async fn test_execute_401_refresh_ok_makes_three_calls() {
        let transport = ScriptedTransport::new(|_, n| match n {
            0 => status(401),
            1 => json(200, r#"{"access":"A2"}"#),
            _ => json(200, r#"[{"id":1}]"#),
        });
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let outcome = h.client.execute(&units()).await.unwrap();

        assert_eq!(outcome.response().unwrap().text(), r#"[{"id":1}]"#);
        assert_eq!(h.transport.calls(), 3);

        let sent = h.transport.requests();
        assert_eq!(sent[0].header("Authorization"), Some("Bearer A1"));
        assert!(sent[1].url.ends_with(REFRESH));
        assert_eq!(sent[1].body.as_deref(), Some(&br#"{"refresh":"R1"}"#[..]));
        assert_eq!(sent[2].url, "http://api.test/api/units/");
        assert_eq!(sent[2].header("Authorization"), Some("Bearer A2"));

        assert_eq!(
            h.store.get(SessionKey::AccessToken).unwrap().as_deref(),
            Some("A2")
        );
        assert_eq!(h.redirect.count(), 0);
    }

    #[tokio::test]
    async fn test_execute_retry_result_returned_whatever_its_status() {
        let transport = ScriptedTransport::new(|_, n| match n {
            0 => status(401),
            1 => json(200, r#"{"access":"A2"}"#),
            _ => json(500, r#"{"detail":"boom"}"#),
        });
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let outcome = h.client.execute(&units()).await.unwrap();

        assert_eq!(outcome.response().unwrap().status(), 500);
        assert_eq!(h.transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_execute_second_401_is_not_retried_again() {
        // Every request to the API is a 401, refresh always succeeds.
        let transport = ScriptedTransport::new(|req, _| {
            if req.url.ends_with(REFRESH) {
                json(200, r#"{"access":"A2"}"#)
            } else {
                status(401)
            }
        });
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let outcome = h.client.execute(&units()).await.unwrap();

        assert!(outcome.response().unwrap().is_unauthorized());
        assert_eq!(h.transport.calls(), 3, "exactly one refresh, one retry");
        assert_eq!(h.transport.calls_to(REFRESH), 1);
        assert_eq!(h.redirect.count(), 0);
    }

    #[tokio::test]
    async fn test_execute_retry_network_error_propagates() {
        let transport = ScriptedTransport::new(|_, n| match n {
            0 => status(401),
            1 => json(200, r#"{"access":"A2"}"#),
            _ => network_down(),
        });
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let result = h.client.execute(&units()).await;

        assert!(matches!(result, Err(SessionError::Transport(_))));
        assert_eq!(h.transport.calls(), 3);
        // The refreshed token was stored before the retry went out.
        assert_eq!(
            h.store.get(SessionKey::AccessToken).unwrap().as_deref(),
            Some("A2")
        );
    }

    #[tokio::test]
    async fn test_execute_retry_resends_method_and_body() {
        let transport = ScriptedTransport::new(|_, n| match n {
            0 => status(401),
            1 => json(200, r#"{"access":"A2"}"#),
            _ => status(201),
        });
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let descriptor = RequestDescriptor::post("buildings/")
            .body(br#"{"name":"Tower"}"#.to_vec(), "application/json");
        h.client.execute(&descriptor).await.unwrap();

        let sent = h.transport.requests();
        assert_eq!(sent[0].method, sent[2].method);
        assert_eq!(sent[0].body, sent[2].body);
        assert_eq!(sent[2].header("content-type"), Some("application/json"));
    }

    // =====================================================================
    // 401 → refresh fails → logout
    // =====================================================================

    #[tokio::test]
    async fn test_execute_401_without_refresh_token_logs_out_after_one_call() {
        let transport = ScriptedTransport::new(|_, _| status(401));
        let h = harness(transport);
        h.store.set(SessionKey::AccessToken, "A1").unwrap();
        h.store.set(SessionKey::Username, "jdoe").unwrap();
        h.store.set(SessionKey::KeepLoggedIn, "1").unwrap();

        let outcome = h.client.execute(&units()).await.unwrap();

        assert_eq!(outcome, Outcome::LoggedOut);
        assert_eq!(h.transport.calls(), 1, "no refresh attempt");
        assert_session_cleared(&h);
        assert_eq!(h.redirect.count(), 1);
        assert_eq!(h.redirect.last_route().as_deref(), Some("/login"));
    }

    #[tokio::test]
    async fn test_execute_refresh_rejected_logs_out_after_two_calls() {
        let transport = ScriptedTransport::new(|_, n| match n {
            0 => status(401),
            _ => json(400, r#"{"detail":"Token is invalid or expired"}"#),
        });
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let outcome = h.client.execute(&units()).await.unwrap();

        assert!(outcome.is_logged_out());
        assert_eq!(h.transport.calls(), 2, "no retry after failed refresh");
        assert_session_cleared(&h);
        assert_eq!(h.redirect.count(), 1);
    }

    #[tokio::test]
    async fn test_execute_refresh_network_error_logs_out_after_two_calls() {
        let transport = ScriptedTransport::new(|_, n| match n {
            0 => status(401),
            _ => network_down(),
        });
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let outcome = h.client.execute(&units()).await.unwrap();

        assert!(outcome.is_logged_out());
        assert_eq!(h.transport.calls(), 2);
        assert_session_cleared(&h);
        assert_eq!(h.redirect.count(), 1);
    }

    #[tokio::test]
    async fn test_execute_logout_uses_configured_login_route() {
        let transport = ScriptedTransport::new(|_, _| status(401));
        let h = harness_with(
            transport,
            AuthConfig {
                login_route: "/admin/login".into(),
                ..AuthConfig::default()
            },
        );

        let _ = h.client.execute(&units()).await.unwrap();

        assert_eq!(h.redirect.last_route().as_deref(), Some("/admin/login"));
    }

    // =====================================================================
    // Concurrent 401s
    // =====================================================================

    /// 401 for the stale token, 200 for the fresh one, refresh → A2.
    fn rotating_server(delay: Duration) -> Arc<ScriptedTransport> {
        ScriptedTransport::with_delay(delay, |req, _| {
            if req.url.ends_with(REFRESH) {
                json(200, r#"{"access":"A2"}"#)
            } else if req.header("authorization") == Some("Bearer A2") {
                status(200)
            } else {
                status(401)
            }
        })
    }

    #[tokio::test]
    async fn test_concurrent_401s_single_flight_share_one_refresh() {
        let h = harness(rotating_server(Duration::from_millis(20)));
        logged_in(&h, "A1", "R1");

        let units = units();
        let buildings = RequestDescriptor::get("buildings/");
        let (a, b) = tokio::join!(
            h.client.execute(&units),
            h.client.execute(&buildings)
        );

        assert_eq!(a.unwrap().response().unwrap().status(), 200);
        assert_eq!(b.unwrap().response().unwrap().status(), 200);
        assert_eq!(h.transport.calls_to(REFRESH), 1);
        assert_eq!(h.transport.calls(), 5);
    }

    #[tokio::test]
    async fn test_concurrent_401s_without_gate_refresh_independently() {
        let h = harness_with(
            rotating_server(Duration::from_millis(20)),
            AuthConfig {
                single_flight_refresh: false,
                ..AuthConfig::default()
            },
        );
        logged_in(&h, "A1", "R1");

        let units = units();
        let buildings = RequestDescriptor::get("buildings/");
        let (a, b) = tokio::join!(
            h.client.execute(&units),
            h.client.execute(&buildings)
        );

        assert_eq!(a.unwrap().response().unwrap().status(), 200);
        assert_eq!(b.unwrap().response().unwrap().status(), 200);
        assert_eq!(h.transport.calls_to(REFRESH), 2);
        assert_eq!(h.transport.calls(), 6);
        assert_eq!(
            h.store.get(SessionKey::AccessToken).unwrap().as_deref(),
            Some("A2")
        );
    }

    #[tokio::test]
    async fn test_concurrent_401s_failed_refresh_logs_everyone_out() {
        let transport = ScriptedTransport::with_delay(
            Duration::from_millis(20),
            |_, _| status(401),
        );
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let requests: Vec<RequestDescriptor> = (0..4)
            .map(|i| RequestDescriptor::get(format!("units/{i}/")))
            .collect();
        let outcomes = futures_util::future::join_all(
            requests.iter().map(|d| h.client.execute(d)),
        )
        .await;

        for outcome in outcomes {
            assert!(outcome.unwrap().is_logged_out());
        }
        // The first caller's refresh fails and clears the store; the rest
        // find no refresh token and give up without a network call.
        assert_eq!(h.transport.calls_to(REFRESH), 1);
        assert_eq!(h.transport.calls(), 5);
        assert_session_cleared(&h);
        assert_eq!(h.redirect.count(), 4);
    }

    // =====================================================================
    // refresh() / end_session() / send helpers
    // =====================================================================

    #[tokio::test]
    async fn test_refresh_with_no_refresh_token_is_a_no_op() {
        let transport = ScriptedTransport::new(|_, _| status(200));
        let h = harness(transport);

        assert_eq!(h.client.refresh().await, None);
        assert_eq!(h.transport.calls(), 0);
        assert!(h.store.is_empty());
        assert_eq!(h.redirect.count(), 0);
    }

    #[tokio::test]
    async fn test_end_session_clears_and_redirects_once() {
        let transport = ScriptedTransport::new(|_, _| status(200));
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        h.client.end_session().unwrap();

        assert_session_cleared(&h);
        assert_eq!(h.redirect.count(), 1);
    }

    #[tokio::test]
    async fn test_execute_logout_clear_failure_still_redirects_then_errors() {
        let transport = ScriptedTransport::new(|_, n| match n {
            0 => status(401),
            _ => status(400),
        });
        let store = Arc::new(UnclearableStore::default());
        store.set(SessionKey::AccessToken, "A1").unwrap();
        store.set(SessionKey::RefreshToken, "R1").unwrap();
        let redirect = Arc::new(CountingRedirect::default());
        let client = AuthenticatedClient::new(
            Arc::clone(&transport),
            ApiBase::new("http://api.test/api").unwrap(),
            Arc::clone(&store) as Arc<dyn SessionStore>,
            Arc::clone(&redirect) as Arc<dyn LoginRedirect>,
            AuthConfig::default(),
        );

        let result = client.execute(&units()).await;

        assert!(matches!(result, Err(SessionError::Io(_))));
        assert_eq!(redirect.count(), 1);
        assert_eq!(transport.calls(), 2, "no retry after failed refresh");
    }

    #[tokio::test]
    async fn test_end_session_clear_failure_still_redirects() {
        let transport = ScriptedTransport::new(|_, _| status(200));
        let redirect = Arc::new(CountingRedirect::default());
        let client = AuthenticatedClient::new(
            transport,
            ApiBase::new("http://api.test/api").unwrap(),
            Arc::new(UnclearableStore::default()) as Arc<dyn SessionStore>,
            Arc::clone(&redirect) as Arc<dyn LoginRedirect>,
            AuthConfig::default(),
        );

        let result = client.end_session();

        assert!(matches!(result, Err(SessionError::Io(_))));
        assert_eq!(redirect.count(), 1);
        assert_eq!(redirect.last_route().as_deref(), Some("/login"));
    }

    #[tokio::test]
    async fn test_send_anonymous_never_attaches_token() {
        let transport = ScriptedTransport::new(|_, _| status(401));
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let response = h
            .client
            .send_anonymous(&RequestDescriptor::post("token/"))
            .await
            .unwrap();

        assert!(response.is_unauthorized());
        assert_eq!(h.transport.calls(), 1);
        assert_eq!(h.transport.requests()[0].header("authorization"), None);
        assert_eq!(h.redirect.count(), 0, "no 401 handling");
    }

    #[tokio::test]
    async fn test_send_once_attaches_token_without_refreshing() {
        let transport = ScriptedTransport::new(|_, _| status(401));
        let h = harness(transport);
        logged_in(&h, "A1", "R1");

        let response = h
            .client
            .send_once(&RequestDescriptor::post("logout/"))
            .await
            .unwrap();

        assert!(response.is_unauthorized());
        assert_eq!(h.transport.calls(), 1);
        assert_eq!(
            h.transport.requests()[0].header("authorization"),
            Some("Bearer A1")
        );
    }

    #[test]
    fn test_outcome_accessors() {
        let done = Outcome::Completed(HttpResponse::new(204, ""));
        assert!(!done.is_logged_out());
        assert_eq!(done.response().map(|r| r.status()), Some(204));

        let out = Outcome::LoggedOut;
        assert!(out.is_logged_out());
        assert!(out.into_response().is_none());
    }
}
