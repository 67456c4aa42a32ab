//! Wire protocol for the Pronovet API client.
//!
//! This crate defines the vocabulary the client and the API share:
//!
//! - **Addressing** ([`ApiBase`], [`normalize_path`]): where a relative
//!   path like `units/` actually goes.
//! - **Requests** ([`RequestDescriptor`]): what a caller asks for,
//!   before any credential is attached.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how bodies are
//!   converted to/from bytes.
//! - **Uploads** ([`MultipartForm`]): `multipart/form-data` bodies.
//! - **Types** ([`TokenPair`], [`RefreshRequest`], ...): the token
//!   endpoint payloads.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (descriptors, bodies) → Session (tokens)
//! ```

mod base;
#[cfg(feature = "json")]
mod claims;
mod codec;
mod error;
mod multipart;
mod request;
mod types;

pub use base::{ApiBase, DEFAULT_API_BASE, normalize_path};
#[cfg(feature = "json")]
pub use claims::AccessClaims;
pub use codec::{Codec, JSON_CONTENT_TYPE};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use multipart::MultipartForm;
pub use request::RequestDescriptor;
pub use types::{
    ApiErrorBody, Credentials, LOGIN_PATH, REFRESH_PATH, RefreshRequest,
    RefreshResponse, TokenPair,
};

// Parsed targets are `url::Url`; re-exported so callers can name them.
pub use url::Url;

// The verb type is part of every descriptor, so it is re-exported here
// to spare callers a direct dependency on the transport crate.
pub use pronovet_transport::Method;
