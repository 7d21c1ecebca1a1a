//! Room visibility model and directory records.

use serde::{Deserialize, Serialize};

use crate::ids::RoomId;

/// Access-visibility mode of a room.
///
/// The wire carries this as an `(is_private, is_announcement)` flag pair;
/// the enum is the client-side view of that pair. Visibility decides both
/// join gating (Private rooms demand a password up front) and write gating
/// (Announcement rooms are free to read, password-gated to write).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomVisibility {
    /// Open to read and write, no password anywhere.
    Public,
    /// Password required to join; joining grants write access.
    Private,
    /// Open to read without a password; writing requires the room password.
    Announcement,
}

impl RoomVisibility {
    /// Derive the visibility from the wire flag pair.
    ///
    /// Announcement wins when both flags are set: the backend's join gate
    /// tests `is_private && !is_announcement`, so a room flagged both ways
    /// behaves as an announcement channel.
    pub fn from_flags(is_private: bool, is_announcement: bool) -> Self {
        if is_announcement {
            Self::Announcement
        } else if is_private {
            Self::Private
        } else {
            Self::Public
        }
    }

    /// The wire flag pair `(is_private, is_announcement)` for this mode.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Self::Public => (false, false),
            Self::Private => (true, false),
            Self::Announcement => (false, true),
        }
    }

    /// Whether joining requires a password before the join call.
    pub fn join_needs_password(self) -> bool {
        matches!(self, Self::Private)
    }
}

impl std::fmt::Display for RoomVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Announcement => "announcement",
        };
        f.write_str(label)
    }
}

/// One entry of the `get_rooms` directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room identifier.
    pub id: RoomId,

    /// Display name.
    pub name: String,

    /// Members who have joined at least once.
    pub user_count: u64,

    /// Stored messages (the backend caps history at 100).
    pub message_count: u64,

    /// Wire flag: password required to join.
    pub is_private: bool,

    /// Wire flag: read open, write password-gated.
    pub is_announcement: bool,

    /// Creation timestamp, ISO 8601.
    pub created: String,

    /// Timestamp of the latest message, or `created` for an empty room.
    pub last_activity: String,
}

impl RoomSummary {
    /// Visibility derived from the wire flags.
    pub fn visibility(&self) -> RoomVisibility {
        RoomVisibility::from_flags(self.is_private, self.is_announcement)
    }
}

/// Response body of `get_room_info/{id}`.
///
/// Fetched during the join flow to name the room in the password prompt.
/// An unknown room answers HTTP 404 instead of this body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    /// Room identifier.
    pub id: RoomId,

    /// Display name.
    pub name: String,

    /// Wire flag: password required to join.
    pub is_private: bool,

    /// Wire flag: read open, write password-gated.
    pub is_announcement: bool,

    /// Members who have joined at least once.
    pub user_count: u64,

    /// Stored messages.
    pub message_count: u64,

    /// Creation timestamp, ISO 8601.
    pub created: String,
}

impl RoomInfo {
    /// Visibility derived from the wire flags.
    pub fn visibility(&self) -> RoomVisibility {
        RoomVisibility::from_flags(self.is_private, self.is_announcement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_round_trip() {
        for mode in [
            RoomVisibility::Public,
            RoomVisibility::Private,
            RoomVisibility::Announcement,
        ] {
            let (private, announcement) = mode.flags();
            assert_eq!(RoomVisibility::from_flags(private, announcement), mode);
        }
    }

    #[test]
    fn announcement_wins_flag_collision() {
        assert_eq!(
            RoomVisibility::from_flags(true, true),
            RoomVisibility::Announcement
        );
    }

    #[test]
    fn only_private_needs_join_password() {
        assert!(RoomVisibility::Private.join_needs_password());
        assert!(!RoomVisibility::Public.join_needs_password());
        assert!(!RoomVisibility::Announcement.join_needs_password());
    }

    #[test]
    fn room_summary_parses_directory_entry() {
        let json = r#"{
            "id": "9f8e7d6c5b4a3921",
            "name": "General",
            "user_count": 3,
            "message_count": 42,
            "is_private": false,
            "is_announcement": false,
            "created": "2025-01-05T10:00:00",
            "last_activity": "2025-01-05T12:30:00"
        }"#;

        let room: RoomSummary = serde_json::from_str(json).unwrap();
        assert_eq!(room.name, "General");
        assert_eq!(room.visibility(), RoomVisibility::Public);
        assert_eq!(room.message_count, 42);
    }
}
