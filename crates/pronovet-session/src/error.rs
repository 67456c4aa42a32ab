//! Error types for the session layer.

use pronovet_protocol::ProtocolError;
use pronovet_transport::TransportError;

/// Errors that can escape an authenticated request.
///
/// Note what is NOT here: a 401, a failed refresh, or a forced logout.
/// Those are handled inside the session layer and reported through
/// [`Outcome`](crate::Outcome), not as errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The original or retried request never got a response.
    /// Passed through exactly as the transport reported it.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A body could not be encoded or decoded, or a path did not resolve
    /// under the API base.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The durable session store could not be read or written.
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The durable session store holds something that isn't a session.
    #[error("session storage is corrupt: {0}")]
    Corrupt(String),
}
