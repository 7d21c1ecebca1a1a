//! Observable application state types.
//!
//! These structures are the "View Model": the subset of session state a
//! frontend needs for rendering, with none of the request bookkeeping the
//! controller keeps underneath.

use parlor_proto::{MessageRecord, RoomId, RoomVisibility};

/// A modal prompt the frontend should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// A private room wants its join password.
    RoomPassword {
        /// Room awaiting the password.
        room_id: RoomId,
        /// Display name for the dialog title.
        room_name: String,
        /// The previous attempt was refused; show an inline error.
        rejected: bool,
    },

    /// An announcement room wants its write password.
    WritePassword {
        /// Room the capability is scoped to.
        room_id: RoomId,
        /// Display name for the dialog title.
        room_name: String,
        /// The previous attempt was refused; show an inline error.
        rejected: bool,
    },
}

/// View of the room the session is currently inside.
#[derive(Debug, Clone)]
pub struct RoomView {
    /// Room identifier.
    pub room_id: RoomId,

    /// Display name.
    pub name: String,

    /// Access-visibility mode (drives the badge and the input state).
    pub visibility: RoomVisibility,

    /// Latest full history snapshot, oldest-first. Replaced wholesale on
    /// every poll cycle.
    pub messages: Vec<MessageRecord>,

    /// The compose box is locked pending a write password.
    pub write_restricted: bool,

    /// Compose box contents preserved across a permission detour.
    pub draft: String,
}

impl RoomView {
    /// Create the view for a freshly joined room.
    pub fn new(
        room_id: RoomId,
        name: String,
        visibility: RoomVisibility,
        write_restricted: bool,
    ) -> Self {
        Self {
            room_id,
            name,
            visibility,
            messages: Vec::new(),
            write_restricted,
            draft: String::new(),
        }
    }
}
