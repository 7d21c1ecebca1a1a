//! Controller error taxonomy.

use parlor_core::BackendError;
use parlor_proto::RoomVisibility;
use thiserror::Error;

/// Errors surfaced by [`crate::Controller::handle`].
///
/// These are user-visible outcomes: the caller renders them as alerts.
/// Recoverable situations (wrong password, revoked write access) are NOT
/// errors — the controller answers those with re-prompt actions instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A join or create round-trip is already outstanding.
    ///
    /// The busy gate: without it two overlapping join completions would
    /// race on the session and the last RESPONSE to arrive would win.
    #[error("a room join is already in progress")]
    JoinInProgress,

    /// A join password was submitted but no room is awaiting one.
    #[error("no room join is awaiting a password")]
    NoPendingJoin,

    /// A write password was submitted outside any room.
    #[error("not in a room")]
    NotJoined,

    /// A room name is required to create a room.
    #[error("room name must not be empty")]
    RoomNameRequired,

    /// The room kind demands a password and none was supplied.
    #[error("{0} rooms require a password")]
    PasswordRequired(RoomVisibility),

    /// The chosen room password is shorter than the minimum.
    #[error("room password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// The requested display name is empty or too long.
    #[error("username must be between 1 and {max} characters")]
    InvalidUsername {
        /// Maximum accepted length.
        max: usize,
    },

    /// A backend round-trip failed in a way the flow cannot absorb.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_convert_transparently() {
        let err: SessionError = BackendError::RoomNotFound.into();
        assert_eq!(err.to_string(), "room not found");
    }

    #[test]
    fn password_required_names_the_room_kind() {
        let err = SessionError::PasswordRequired(RoomVisibility::Announcement);
        assert_eq!(err.to_string(), "announcement rooms require a password");
    }
}
