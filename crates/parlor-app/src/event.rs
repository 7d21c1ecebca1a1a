//! Application input events.
//!
//! [`AppEvent`]s carry session outcomes from the [`crate::Bridge`] into
//! the [`crate::App`] view model. User interactions do not arrive as
//! events; they enter through the App's intent methods and come out as
//! [`crate::AppAction`]s.

use parlor_proto::{MessageRecord, RoomId, RoomSummary, RoomVisibility, UserId};

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic tick.
    Tick,

    /// Fresh room directory snapshot.
    DirectoryUpdated {
        /// Every room the backend listed.
        rooms: Vec<RoomSummary>,
    },

    /// The session identity was resolved.
    IdentityLoaded {
        /// Session-bound user id.
        user_id: UserId,
        /// Display name, when the backend knows one.
        username: Option<String>,
    },

    /// The session entered a room.
    RoomJoined {
        /// Room that became active.
        room_id: RoomId,
        /// Display name.
        room_name: String,
        /// Access-visibility mode.
        visibility: RoomVisibility,
        /// Whether the compose box starts unlocked.
        can_write: bool,
    },

    /// A full message snapshot for the active room.
    MessagesUpdated {
        /// History, oldest-first.
        messages: Vec<MessageRecord>,
    },

    /// A new message from another user arrived (notification trigger).
    MessageArrived {
        /// The newest message.
        message: MessageRecord,
    },

    /// A private room wants its join password.
    RoomPasswordRequired {
        /// Room awaiting the password.
        room_id: RoomId,
        /// Display name for the dialog.
        room_name: String,
        /// The previous attempt was refused.
        rejected: bool,
    },

    /// An announcement room wants its write password.
    WritePasswordRequired {
        /// Room the capability is scoped to.
        room_id: RoomId,
        /// Display name for the dialog.
        room_name: String,
        /// The previous attempt was refused.
        rejected: bool,
    },

    /// The write password was accepted; unlock the compose box.
    WriteGranted,

    /// Put preserved text back into the compose box.
    DraftRestored {
        /// The preserved message body.
        body: String,
    },

    /// The display name change was accepted.
    UsernameUpdated {
        /// The new name.
        username: String,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
