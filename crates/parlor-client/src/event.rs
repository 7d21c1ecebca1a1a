//! Controller events and actions.

use parlor_core::BackendError;
use parlor_proto::api::{
    CheckRoomPasswordRequest, CheckRoomPasswordResponse, CheckWritePermissionRequest,
    CheckWritePermissionResponse, CreateRoomRequest, CreateRoomResponse, CurrentUser,
    GetMessagesRequest, GetMessagesResponse, GetRoomsResponse, JoinRoomRequest, JoinRoomResponse,
    SendMessageRequest, SendMessageResponse, StatusResponse, UpdateUsernameRequest,
};
use parlor_proto::{MessageRecord, RoomId, RoomInfo, RoomSummary, RoomVisibility, UserId};

/// Correlation id for one backend round-trip.
///
/// Assigned by the controller when it emits a [`BackendRequest`]; the
/// executor echoes it on the [`BackendResponse`]. The controller only
/// accepts a response whose id matches the request it is still waiting
/// for, so under pure async ordering the last request SENT wins, not the
/// last response to arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub(crate) u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A backend round-trip the caller should execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    /// Correlation id to echo on the response.
    pub id: RequestId,

    /// Which endpoint to call, with its body.
    pub call: ApiCall,
}

/// One backend endpoint invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `GET /get_current_user`
    GetCurrentUser,

    /// `POST /create_room`
    CreateRoom(CreateRoomRequest),

    /// `POST /check_room_password`
    CheckRoomPassword(CheckRoomPasswordRequest),

    /// `GET /get_room_info/{room_id}`
    GetRoomInfo {
        /// Room to describe.
        room_id: RoomId,
    },

    /// `POST /join_room`
    JoinRoom(JoinRoomRequest),

    /// `POST /check_write_permission`
    CheckWritePermission(CheckWritePermissionRequest),

    /// `POST /send_message`
    SendMessage(SendMessageRequest),

    /// `POST /get_messages`
    GetMessages(GetMessagesRequest),

    /// `GET /get_rooms`
    GetRooms,

    /// `POST /update_username`
    UpdateUsername(UpdateUsernameRequest),
}

/// Completion of a backend round-trip, fed back via
/// [`SessionEvent::Response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    /// Correlation id of the originating request.
    pub id: RequestId,

    /// Typed outcome of the call.
    pub result: ApiResult,
}

/// Typed outcome per endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResult {
    /// Outcome of [`ApiCall::GetCurrentUser`].
    CurrentUser(Result<CurrentUser, BackendError>),

    /// Outcome of [`ApiCall::CreateRoom`].
    RoomCreated(Result<CreateRoomResponse, BackendError>),

    /// Outcome of [`ApiCall::CheckRoomPassword`].
    PasswordChecked(Result<CheckRoomPasswordResponse, BackendError>),

    /// Outcome of [`ApiCall::GetRoomInfo`].
    RoomInfo(Result<RoomInfo, BackendError>),

    /// Outcome of [`ApiCall::JoinRoom`].
    Joined(Result<JoinRoomResponse, BackendError>),

    /// Outcome of [`ApiCall::CheckWritePermission`].
    WriteChecked(Result<CheckWritePermissionResponse, BackendError>),

    /// Outcome of [`ApiCall::SendMessage`].
    MessageSent(Result<SendMessageResponse, BackendError>),

    /// Outcome of [`ApiCall::GetMessages`].
    Messages(Result<GetMessagesResponse, BackendError>),

    /// Outcome of [`ApiCall::GetRooms`].
    Rooms(Result<GetRoomsResponse, BackendError>),

    /// Outcome of [`ApiCall::UpdateUsername`].
    UsernameUpdated(Result<StatusResponse, BackendError>),
}

/// Events the caller feeds into the controller.
///
/// The caller is responsible for:
/// - Driving time forward via ticks
/// - Executing backend requests and feeding completions back
/// - Forwarding user intents (join room, send message, etc.)
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and simulation environments.
#[derive(Debug, Clone)]
pub enum SessionEvent<I = std::time::Instant> {
    /// Time tick for poll scheduling.
    ///
    /// The caller should send ticks periodically; the controller compares
    /// `now` against its deadlines and emits fetches when they are due.
    Tick {
        /// Current time from the environment.
        now: I,
    },

    /// User wants to create a room and enter it.
    CreateRoom {
        /// Display name for the room.
        name: String,
        /// Access-visibility mode.
        visibility: RoomVisibility,
        /// Room password; required for private and announcement rooms.
        password: String,
    },

    /// User wants to join an existing room.
    JoinRoom {
        /// Room to join.
        room_id: RoomId,
    },

    /// User answered the join-password prompt.
    SubmitJoinPassword {
        /// Candidate join password.
        password: String,
    },

    /// User dismissed the join-password prompt.
    CancelJoin,

    /// User wants to send a message to the active room.
    SendMessage {
        /// Message body (trimmed by the controller).
        body: String,
    },

    /// User answered the write-password prompt.
    SubmitWritePassword {
        /// Candidate write password.
        password: String,
    },

    /// User wants a new display name.
    SetUsername {
        /// Requested name (1 to 20 characters).
        username: String,
    },

    /// A backend round-trip completed.
    Response(BackendResponse),
}

/// Actions the controller produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Execute a backend round-trip and feed the completion back.
    CallBackend(BackendRequest),

    /// Show the join-password prompt for a private room.
    ///
    /// `rejected` is set when the previous attempt was refused, so the
    /// prompt can show an inline error.
    AskJoinPassword {
        /// Room awaiting a password.
        room_id: RoomId,
        /// Display name for the prompt.
        room_name: String,
        /// Previous attempt was refused.
        rejected: bool,
    },

    /// Show the write-password prompt for an announcement room.
    AskWritePassword {
        /// Room the write capability is scoped to.
        room_id: RoomId,
        /// Display name for the prompt.
        room_name: String,
        /// Previous attempt was refused.
        rejected: bool,
    },

    /// The session entered a room (join or create).
    SessionJoined {
        /// Room that became active.
        room_id: RoomId,
        /// Display name of the room.
        room_name: String,
        /// Access-visibility mode.
        visibility: RoomVisibility,
        /// Whether the session may write immediately.
        can_write: bool,
    },

    /// A full message snapshot for the active room.
    MessagesLoaded {
        /// History, oldest-first.
        messages: Vec<MessageRecord>,
    },

    /// A new message from another user arrived after the first load.
    ///
    /// This is the notification trigger (sound, badge); it fires at most
    /// once per snapshot and never for the session's own messages.
    MessageArrived {
        /// The newest message.
        message: MessageRecord,
    },

    /// A fresh room directory snapshot.
    DirectoryLoaded {
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

    /// A write password was accepted; the input can be unlocked.
    WriteGranted,

    /// Put this text back into the compose box.
    ///
    /// Emitted when a send was refused or deferred so the user's typed
    /// message survives the permission detour.
    RestoreDraft {
        /// The preserved message body.
        body: String,
    },

    /// The display name change was accepted.
    UsernameUpdated {
        /// The new name.
        username: String,
    },
}
