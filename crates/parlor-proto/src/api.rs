//! Request and response bodies per endpoint.
//!
//! One pair of types per backend route. Optional response fields the
//! backend sometimes omits deserialize through `#[serde(default)]` rather
//! than failing the whole body.

use serde::{Deserialize, Serialize};

use crate::ids::{RoomId, RoomKey, UserId};
use crate::message::MessageRecord;
use crate::room::{RoomSummary, RoomVisibility};

/// Response body of `get_current_user`.
///
/// Both fields are `null` when the backend session has no identity yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Session-bound user identifier.
    pub user_id: Option<UserId>,

    /// Current display name.
    pub username: Option<String>,
}

/// Request body of `create_room`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    /// Display name for the new room.
    pub room_name: String,

    /// Wire flag: password required to join.
    pub is_private: bool,

    /// Wire flag: read open, write password-gated.
    pub is_announcement: bool,

    /// Room password; empty for public rooms.
    pub room_password: String,
}

impl CreateRoomRequest {
    /// Build a request from the client-side visibility model.
    pub fn new(room_name: impl Into<String>, visibility: RoomVisibility, password: impl Into<String>) -> Self {
        let (is_private, is_announcement) = visibility.flags();
        Self {
            room_name: room_name.into(),
            is_private,
            is_announcement,
            room_password: password.into(),
        }
    }
}

/// Response body of `create_room`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    /// Identifier of the new room.
    pub room_id: RoomId,

    /// Access token for the new room.
    pub room_key: RoomKey,

    /// Echo of the requested privacy flag.
    #[serde(default)]
    pub is_private: bool,

    /// Echo of the requested announcement flag.
    #[serde(default)]
    pub is_announcement: bool,
}

/// Request body of `check_room_password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRoomPasswordRequest {
    /// Room to probe.
    pub room_id: RoomId,
}

/// Response body of `check_room_password`.
///
/// The backend omits the flags it considers irrelevant for the room kind,
/// so everything except `requires_password` defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRoomPasswordResponse {
    /// Whether a password must be supplied before `join_room`.
    pub requires_password: bool,

    /// Set for announcement rooms, which are always free to read.
    #[serde(default)]
    pub is_announcement: bool,

    /// Present when a candidate password was supplied with the probe.
    #[serde(default)]
    pub password_correct: Option<bool>,
}

/// Request body of `join_room`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    /// Room to join.
    pub room_id: RoomId,

    /// Join password; empty for public and announcement rooms.
    pub room_password: String,
}

/// Response body of a successful `join_room`.
///
/// A wrong or missing password on a private room answers HTTP 401, an
/// unknown room 404; neither reaches this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    /// Access token required for subsequent fetches.
    pub room_key: RoomKey,

    /// Display name of the joined room.
    pub room_name: String,

    /// Wire flag: password required to join.
    pub is_private: bool,

    /// Wire flag: read open, write password-gated.
    pub is_announcement: bool,
}

impl JoinRoomResponse {
    /// Visibility derived from the wire flags.
    pub fn visibility(&self) -> RoomVisibility {
        RoomVisibility::from_flags(self.is_private, self.is_announcement)
    }
}

/// Request body of `check_write_permission`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckWritePermissionRequest {
    /// Room the write capability is scoped to.
    pub room_id: RoomId,

    /// Candidate write password.
    pub room_password: String,
}

/// Response body of `check_write_permission`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckWritePermissionResponse {
    /// Whether the supplied password grants write access.
    pub can_write: bool,

    /// Set alongside a denial on announcement rooms.
    #[serde(default)]
    pub requires_password: bool,
}

/// Request body of `send_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Target room.
    pub room_id: RoomId,

    /// Message body.
    pub message: String,

    /// Cached write password; ignored by the backend outside announcement
    /// rooms.
    pub room_password: String,
}

/// Response body of `send_message`.
///
/// Success carries `status: "success"`; a write denial answers HTTP 403
/// with the reason in `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    /// `"success"` when the message was stored.
    #[serde(default)]
    pub status: Option<String>,

    /// Denial reason, present on failure bodies.
    #[serde(default)]
    pub error: Option<String>,
}

impl SendMessageResponse {
    /// Whether the backend acknowledged the send.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Request body of `get_messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetMessagesRequest {
    /// Room to fetch.
    pub room_id: RoomId,

    /// Access token from the join.
    pub room_key: RoomKey,
}

/// Response body of `get_messages`: the full history snapshot,
/// oldest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetMessagesResponse {
    /// Ordered message history.
    pub messages: Vec<MessageRecord>,
}

/// Response body of `get_rooms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRoomsResponse {
    /// Every room the backend knows about.
    pub rooms: Vec<RoomSummary>,
}

/// Request body of `update_username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUsernameRequest {
    /// New display name (the backend accepts 1 to 20 characters).
    pub username: String,
}

/// Plain acknowledgement body (`update_username` success).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `"success"` on acceptance.
    pub status: String,
}

impl StatusResponse {
    /// Whether the backend acknowledged the request.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Error body attached to non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason from the backend.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_room_request_field_names() {
        let request = CreateRoomRequest::new("Ops", RoomVisibility::Announcement, "s3cret");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["room_name"], "Ops");
        assert_eq!(json["is_private"], false);
        assert_eq!(json["is_announcement"], true);
        assert_eq!(json["room_password"], "s3cret");
    }

    #[test]
    fn check_room_password_defaults_omitted_fields() {
        // Public rooms answer with the bare flag only.
        let response: CheckRoomPasswordResponse =
            serde_json::from_str(r#"{"requires_password": false}"#).unwrap();
        assert!(!response.requires_password);
        assert!(!response.is_announcement);
        assert_eq!(response.password_correct, None);
    }

    #[test]
    fn send_message_success_and_denial_bodies() {
        let ok: SendMessageResponse = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        assert!(ok.is_success());

        let denied: SendMessageResponse =
            serde_json::from_str(r#"{"error": "write password required"}"#).unwrap();
        assert!(!denied.is_success());
        assert!(denied.error.is_some());
    }

    #[test]
    fn current_user_tolerates_null_identity() {
        let anonymous: CurrentUser =
            serde_json::from_str(r#"{"user_id": null, "username": null}"#).unwrap();
        assert!(anonymous.user_id.is_none());
    }

    #[test]
    fn join_room_response_visibility() {
        let response: JoinRoomResponse = serde_json::from_str(
            r#"{
                "room_key": "a2V5",
                "room_name": "Board",
                "is_private": false,
                "is_announcement": true
            }"#,
        )
        .unwrap();
        assert_eq!(response.visibility(), RoomVisibility::Announcement);
    }
}
