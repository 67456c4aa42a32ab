//! # Pronovet
//!
//! Typed async client for the Pronovet property management API.
//!
//! The client keeps a session (access token, refresh token, username)
//! in a [`SessionStore`](pronovet_session::SessionStore), attaches the
//! access token to every call, and on a 401 refreshes it and retries
//! once. If the session can't be refreshed it is cleared, the login
//! redirect fires, and the call fails with [`PronovetError::LoggedOut`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pronovet::prelude::*;
//!
//! # async fn run() -> Result<(), PronovetError> {
//! let client = ApiClient::builder()
//!     .config(ClientConfig::from_env()?)
//!     .build()?;
//!
//! client.login("jdoe", "secret", false).await?;
//! let units: Page<serde_json::Value> = client
//!     .list(Resource::Units, &ListQuery::new().page(1).page_size(25))
//!     .await?;
//! println!("{} units", units.count);
//! client.logout().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod dashboard;
mod error;
mod profile;
mod resources;

pub use client::{ApiClient, ApiClientBuilder, LOGOUT_PATH};
pub use config::{
    ClientConfig, ENV_API_BASE, ENV_LOGIN_ROUTE, ENV_SESSION_FILE,
    ENV_SINGLE_FLIGHT, ENV_TIMEOUT_SECS,
};
pub use dashboard::{DashboardStats, ExpiringContact};
pub use error::PronovetError;
pub use profile::{Profile, ProfileUpdate, Registration, UserLog, UserType};
pub use resources::{BuildingLog, LastEdited, ListQuery, Page, Resource};

pub mod prelude {
    //! Everything most callers need in one import.

    pub use crate::{
        ApiClient, ApiClientBuilder, BuildingLog, ClientConfig, DashboardStats,
        ExpiringContact, LastEdited, ListQuery, Page, Profile, ProfileUpdate,
        PronovetError, Registration, Resource, UserLog,
    };
    pub use pronovet_protocol::{ApiBase, RequestDescriptor};
    pub use pronovet_session::{
        FileSessionStore, LogRedirect, LoginRedirect, MemorySessionStore,
        Outcome, Session, SessionKey, SessionStore,
    };
    pub use pronovet_transport::{HttpResponse, HttpTransport, Method};
}
