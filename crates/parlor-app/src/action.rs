//! Application side-effects and intents.
//!
//! [`AppAction`]s are instructions produced by the [`crate::App`] state
//! machine for the runtime to execute: render and notification side
//! effects stay in the driver, protocol intents go through the
//! [`crate::Bridge`] to the session controller.

use parlor_proto::{RoomId, RoomVisibility};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Play the new-message notification.
    Notify,

    /// Quit the application.
    Quit,

    /// Create a room and enter it.
    CreateRoom {
        /// Display name for the room.
        name: String,
        /// Access-visibility mode.
        visibility: RoomVisibility,
        /// Room password; empty for public rooms.
        password: String,
    },

    /// Join an existing room.
    JoinRoom {
        /// Room to join.
        room_id: RoomId,
    },

    /// Answer the pending join-password prompt.
    SubmitRoomPassword {
        /// Candidate join password.
        password: String,
    },

    /// Dismiss the pending join-password prompt.
    CancelJoin,

    /// Send a message to the active room.
    SendMessage {
        /// Message body.
        body: String,
    },

    /// Answer the pending write-password prompt.
    SubmitWritePassword {
        /// Candidate write password.
        password: String,
    },

    /// Request a new display name.
    SetUsername {
        /// Requested name.
        username: String,
    },
}
