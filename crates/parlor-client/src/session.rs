//! Owned session state.

use parlor_proto::{RoomId, RoomKey, RoomVisibility, UserId};

/// The room the session is currently inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRoom {
    /// Room identifier.
    pub room_id: RoomId,

    /// Access token returned by the join; required for every fetch.
    pub room_key: RoomKey,

    /// Display name.
    pub name: String,

    /// Access-visibility mode.
    pub visibility: RoomVisibility,
}

/// Session state owned by the controller.
///
/// Exactly one per controller. Joining another room replaces the active
/// room wholesale; there is no leave path. Only the controller mutates
/// this — callers observe it through the read accessors.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(crate) active: Option<ActiveRoom>,
    pub(crate) can_write: bool,
    pub(crate) cached_password: String,
    pub(crate) current_user: Option<UserId>,
}

impl Session {
    /// The active room. `None` means "not joined".
    pub fn active_room(&self) -> Option<&ActiveRoom> {
        self.active.as_ref()
    }

    /// Whether sends may go to the backend right now.
    ///
    /// True after joining a public or private room; false after joining an
    /// announcement room until a write password is accepted. Revoked
    /// whenever the backend refuses a send.
    pub fn can_write(&self) -> bool {
        self.can_write
    }

    /// The password attached to outgoing sends.
    ///
    /// Empty unless a private-room join or an accepted write password
    /// cached one. Cleared when the backend refuses a send.
    pub fn cached_password(&self) -> &str {
        &self.cached_password
    }

    /// The session-bound user id, once `get_current_user` resolved.
    ///
    /// Needed to keep the session's own messages from triggering
    /// notifications.
    pub fn current_user(&self) -> Option<&UserId> {
        self.current_user.as_ref()
    }
}
