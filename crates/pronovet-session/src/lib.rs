//! Session handling for the Pronovet API client.
//!
//! This crate owns everything that makes a request "authenticated":
//!
//! 1. **Storage** ([`SessionStore`]): where the access token, refresh
//!    token, username and keep-logged-in flag live between requests
//! 2. **Refresh** ([`TokenRefresher`]): trading the refresh token for a
//!    new access token
//! 3. **Execution** ([`AuthenticatedClient`]): attaching the bearer
//!    token, spotting a 401, refreshing once and retrying once, or ending
//!    the session and sending the user to login ([`LoginRedirect`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Facade (above)  ← login, resources, profile; built on execute()
//!     ↕
//! Session Layer (this crate)  ← tokens, refresh, retry, logout
//!     ↕
//! Protocol Layer (below)  ← ApiBase, RequestDescriptor, token payloads
//! ```

mod client;
mod error;
mod redirect;
mod refresh;
mod session;
mod store;

#[cfg(test)]
mod testing;

pub use client::{AuthenticatedClient, Outcome};
pub use error::SessionError;
pub use redirect::{LogRedirect, LoginRedirect};
pub use refresh::TokenRefresher;
pub use session::{AuthConfig, Session};
pub use store::{FileSessionStore, MemorySessionStore, SessionKey, SessionStore};
