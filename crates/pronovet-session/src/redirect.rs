//! The "send the user back to login" hook.
//!
//! When a session ends for good (explicit logout, or a 401 that a refresh
//! couldn't fix) the client clears the store and then tells its host to
//! show the login screen. What that means depends on the host:
//!
//! - a browser shell does a hard navigation, so no in-memory state from
//!   the old session survives
//! - a CLI prints "please log in again" and exits
//! - a test counts the calls
//!
//! The client only calls [`LoginRedirect::redirect_to_login`]; it never
//! assumes anything about what happens next.

/// Invoked exactly once each time a session is ended.
///
/// # Example
///
/// ```rust
/// use pronovet_session::LoginRedirect;
///
/// struct PrintRedirect;
///
/// impl LoginRedirect for PrintRedirect {
///     fn redirect_to_login(&self, route: &str) {
///         eprintln!("session expired, open {route} to sign in again");
///     }
/// }
/// ```
pub trait LoginRedirect: Send + Sync + 'static {
    /// Sends the user to `route` (the configured login route).
    fn redirect_to_login(&self, route: &str);
}

/// Any `Fn(&str)` closure works as a redirect hook.
impl<F> LoginRedirect for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn redirect_to_login(&self, route: &str) {
        self(route)
    }
}

/// A redirect hook that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self, route: &str) {
        tracing::warn!(route, "session ended, redirecting to login");
    }
}
