//! Test doubles shared by the unit tests in this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pronovet_transport::{
    HttpRequest, HttpResponse, HttpTransport, TransportError,
};

use crate::{LoginRedirect, MemorySessionStore, SessionError, SessionKey, SessionStore};

type Handler = dyn Fn(&HttpRequest, usize) -> Result<HttpResponse, TransportError>
    + Send
    + Sync;

/// A transport that answers from a closure and records every request.
///
/// The closure gets the request and its zero-based call index, so a test
/// can either script by order (`match n { 0 => 401, .. }`) or route by
/// URL and header.
pub(crate) struct ScriptedTransport {
    handler: Box<Handler>,
    log: Mutex<Vec<HttpRequest>>,
    delay: Duration,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest, usize) -> Result<HttpResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        })
    }

    /// Like `new`, but every call sleeps first so that concurrent
    /// requests overlap.
    pub(crate) fn with_delay<F>(delay: Duration, handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest, usize) -> Result<HttpResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
            delay,
        })
    }

    /// Number of requests dispatched so far.
    pub(crate) fn calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// Copies of every request dispatched so far, in order.
    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    /// How many requests went to a URL ending in `suffix`.
    pub(crate) fn calls_to(&self, suffix: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.ends_with(suffix))
            .count()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn send(
        &self,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let index = {
            let mut log = self.log.lock().unwrap();
            log.push(request.clone());
            log.len() - 1
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.handler)(request, index)
    }
}

/// Counts redirects and remembers the last route.
#[derive(Default)]
pub(crate) struct CountingRedirect {
    count: AtomicUsize,
    last_route: Mutex<Option<String>>,
}

impl CountingRedirect {
    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub(crate) fn last_route(&self) -> Option<String> {
        self.last_route.lock().unwrap().clone()
    }
}

impl LoginRedirect for CountingRedirect {
    fn redirect_to_login(&self, route: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
        *self.last_route.lock().unwrap() = Some(route.to_string());
    }
}

/// A store that reads and writes normally but can never be cleared.
#[derive(Default)]
pub(crate) struct UnclearableStore {
    inner: MemorySessionStore,
}

impl SessionStore for UnclearableStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError> {
        self.inner.get(key)
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), SessionError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: SessionKey) -> Result<(), SessionError> {
        self.inner.remove(key)
    }

    fn clear(&self) -> Result<(), SessionError> {
        Err(SessionError::Io(std::io::Error::other("read-only file system")))
    }
}

pub(crate) fn json(status: u16, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(status, body.as_bytes().to_vec())
        .with_header("Content-Type", "application/json"))
}

pub(crate) fn status(code: u16) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(code, Vec::new()))
}

pub(crate) fn network_down() -> Result<HttpResponse, TransportError> {
    Err(TransportError::Connect("connection refused".into()))
}
