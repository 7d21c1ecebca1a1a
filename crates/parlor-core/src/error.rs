//! Backend failure taxonomy.
//!
//! Every round-trip to the chat backend resolves into one of these
//! variants. The transport maps HTTP status codes here so that session
//! logic never sees a status code, only a typed outcome it can recover
//! from.

use thiserror::Error;

/// Failures a backend round-trip can produce.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The room id does not exist (HTTP 404).
    #[error("room not found")]
    RoomNotFound,

    /// Wrong or missing join password for a private room (HTTP 401).
    ///
    /// Recovered by re-prompting; the session is left untouched.
    #[error("unauthorized: wrong or missing room password")]
    Unauthorized,

    /// The write password was wrong or has gone stale (HTTP 403).
    ///
    /// Can arrive on ANY send: write capability is revalidated
    /// server-side per message, so a grant is never trusted past the
    /// round-trip that used it.
    #[error("write permission denied")]
    WritePermissionDenied,

    /// The backend rejected the request as malformed (HTTP 400), e.g. an
    /// invalid room key on a fetch or an out-of-range username.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Transport failure: connection error, timeout, or a body that did
    /// not parse as the expected shape.
    #[error("network failure: {0}")]
    Network(String),
}

impl BackendError {
    /// Returns true if this error is transient and may succeed on retry.
    ///
    /// Only network failures qualify. Semantic denials (wrong password,
    /// unknown room, rejected input) will fail identically until the user
    /// changes something, so retrying them is never useful.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
