//! Session controller state machine.
//!
//! The `Controller` is the top-level state machine that owns the
//! [`Session`] and mediates three concerns: joining a room (public,
//! private or announcement), sending messages under a revocable write
//! permission, and polling the active room's history on a fixed cadence.
//!
//! # State machine
//!
//! The join flow:
//!
//! ```text
//! ┌──────┐ JoinRoom ┌──────────────────┐ needs pw ┌──────────────────┐
//! │ Idle │─────────>│ CheckingPassword │─────────>│ FetchingRoomInfo │
//! └──────┘          └──────────────────┘          └──────────────────┘
//!    ↑                    │ open room                     │
//!    │                    ↓                               ↓
//!    │              ┌─────────┐   401 / Submit  ┌──────────────────┐
//!    └──────────────│ Joining │<───────────────>│ AwaitingPassword │
//!      join ok      └─────────┘                 └──────────────────┘
//! ```
//!
//! Nested inside a joined session, the write gate flips between granted
//! and restricted: announcement rooms start restricted, and ANY send may
//! demote the gate when the backend refuses the cached password.
//!
//! Timing is deadline-based: the caller feeds [`SessionEvent::Tick`]
//! events and the controller decides when a message poll or directory
//! refresh is due. There are no timer objects, so a rejoin replaces the
//! single poll deadline instead of stacking timers.

use std::collections::HashMap;
use std::time::Duration;

use parlor_core::{BackendError, Environment};
use parlor_proto::api::{
    CheckRoomPasswordRequest, CheckRoomPasswordResponse, CheckWritePermissionRequest,
    CheckWritePermissionResponse, CreateRoomRequest, CreateRoomResponse, CurrentUser,
    GetMessagesRequest, GetMessagesResponse, GetRoomsResponse, JoinRoomRequest, JoinRoomResponse,
    SendMessageRequest, SendMessageResponse, StatusResponse, UpdateUsernameRequest,
};
use parlor_proto::{MessageId, RoomId, RoomInfo, RoomKey, RoomVisibility};

use crate::error::SessionError;
use crate::event::{
    ApiCall, ApiResult, BackendRequest, BackendResponse, RequestId, SessionAction, SessionEvent,
};
use crate::session::{ActiveRoom, Session};

/// Interval between message-history polls for the active room.
pub const DEFAULT_MESSAGE_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Interval between room-directory refreshes.
pub const DEFAULT_DIRECTORY_REFRESH_INTERVAL: Duration = Duration::from_millis(10_000);

/// Minimum accepted length for private/announcement room passwords.
pub const MIN_ROOM_PASSWORD_LEN: usize = 4;

/// Maximum display-name length the backend accepts.
const MAX_USERNAME_LEN: usize = 20;

/// Poll cadence configuration.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// How often to fetch the active room's history.
    pub message_poll_interval: Duration,

    /// How often to refresh the room directory.
    pub directory_refresh_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            message_poll_interval: DEFAULT_MESSAGE_POLL_INTERVAL,
            directory_refresh_interval: DEFAULT_DIRECTORY_REFRESH_INTERVAL,
        }
    }
}

/// Room-join flow state.
///
/// The variants that carry a `request` id have a backend round-trip
/// outstanding; while one of those is live, further join/create intents
/// are rejected so two completions can never race on the session.
enum JoinFlow {
    /// No join underway.
    Idle,

    /// Waiting for `check_room_password`.
    CheckingPassword { room_id: RoomId, request: RequestId },

    /// Waiting for `get_room_info` to name the password prompt.
    FetchingRoomInfo { room_id: RoomId, request: RequestId },

    /// A private room wants a password from the user.
    AwaitingPassword { room_id: RoomId, room_name: String },

    /// Waiting for `join_room`.
    Joining {
        room_id: RoomId,
        /// Prompt title to fall back to on a 401.
        room_name: Option<String>,
        password: String,
        request: RequestId,
    },

    /// Waiting for `create_room`.
    Creating {
        name: String,
        visibility: RoomVisibility,
        password: String,
        request: RequestId,
    },
}

/// Poll bookkeeping for the active room. Recreated on every (re)join.
struct PollState<I> {
    /// When the last fetch was issued. `None` means fetch immediately.
    last_fetch_at: Option<I>,

    /// The outstanding fetch, if any. At most one at a time.
    in_flight: Option<RequestId>,

    /// Tail message id of the most recent snapshot.
    last_seen: Option<MessageId>,

    /// Whether the first snapshot for this room has landed.
    /// The initial load never triggers a notification.
    primed: bool,
}

/// Session controller for the Parlor chat backend.
///
/// Pure state machine: feed it [`SessionEvent`]s, execute the returned
/// [`SessionAction`]s. See the module docs for the state diagram.
pub struct Controller<E: Environment> {
    /// Environment for timing.
    env: E,

    /// Poll cadences.
    config: ControllerConfig,

    /// The one session this controller owns.
    session: Session,

    /// Join flow state (doubles as the join busy flag).
    join: JoinFlow,

    /// Poll bookkeeping; `Some` exactly while a room is active.
    poll: Option<PollState<E::Instant>>,

    /// When the directory was last refreshed. `None` means refresh now.
    last_directory_at: Option<E::Instant>,

    /// Outstanding directory fetch.
    directory_in_flight: Option<RequestId>,

    /// Outstanding identity fetch.
    identity_in_flight: Option<RequestId>,

    /// Outstanding write-permission check and the candidate password.
    /// The password is cached in the session only if the check grants.
    permission_in_flight: Option<(RequestId, String)>,

    /// Outstanding sends, each with its body for draft recovery.
    sends_in_flight: HashMap<RequestId, String>,

    /// Outstanding username update and the requested name.
    username_in_flight: Option<(RequestId, String)>,

    /// Message text preserved across a write-permission detour.
    draft: Option<String>,

    /// Correlation id counter.
    next_request: u64,
}

impl<E: Environment> Controller<E> {
    /// Create a controller with default cadences.
    pub fn new(env: E) -> Self {
        Self::with_config(env, ControllerConfig::default())
    }

    /// Create a controller with explicit cadences.
    pub fn with_config(env: E, config: ControllerConfig) -> Self {
        Self {
            env,
            config,
            session: Session::default(),
            join: JoinFlow::Idle,
            poll: None,
            last_directory_at: None,
            directory_in_flight: None,
            identity_in_flight: None,
            permission_in_flight: None,
            sends_in_flight: HashMap::new(),
            username_in_flight: None,
            draft: None,
            next_request: 0,
        }
    }

    /// Read access to the session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Kick off the startup fetches: session identity and the room
    /// directory. The directory keeps refreshing on its own cadence for
    /// the controller's lifetime; there is no stop path.
    pub fn start(&mut self) -> Vec<SessionAction> {
        let now = self.env.now();
        let mut actions = Vec::new();

        if self.identity_in_flight.is_none() && self.session.current_user.is_none() {
            let (id, action) = self.call_backend(ApiCall::GetCurrentUser);
            self.identity_in_flight = Some(id);
            actions.push(action);
        }

        if self.directory_in_flight.is_none() {
            let (id, action) = self.call_backend(ApiCall::GetRooms);
            self.directory_in_flight = Some(id);
            self.last_directory_at = Some(now);
            actions.push(action);
        }

        actions
    }

    /// Process an event and return actions.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] for user-visible failures the flow
    /// cannot absorb (busy join, invalid input, unrecoverable backend
    /// answers). Recoverable denials come back as re-prompt actions, not
    /// errors.
    pub fn handle(
        &mut self,
        event: SessionEvent<E::Instant>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        match event {
            SessionEvent::Tick { now } => Ok(self.handle_tick(now)),
            SessionEvent::CreateRoom { name, visibility, password } => {
                self.handle_create(name, visibility, password)
            },
            SessionEvent::JoinRoom { room_id } => self.handle_join(room_id),
            SessionEvent::SubmitJoinPassword { password } => self.handle_join_password(password),
            SessionEvent::CancelJoin => {
                if matches!(self.join, JoinFlow::AwaitingPassword { .. }) {
                    self.join = JoinFlow::Idle;
                }
                Ok(Vec::new())
            },
            SessionEvent::SendMessage { body } => Ok(self.handle_send(body)),
            SessionEvent::SubmitWritePassword { password } => self.handle_write_password(password),
            SessionEvent::SetUsername { username } => self.handle_set_username(username),
            SessionEvent::Response(response) => self.handle_response(response),
        }
    }

    // ------------------------------------------------------------------
    // Periodic work
    // ------------------------------------------------------------------

    fn handle_tick(&mut self, now: E::Instant) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        let directory_due = self.directory_in_flight.is_none()
            && match self.last_directory_at {
                None => true,
                Some(last) => now - last >= self.config.directory_refresh_interval,
            };
        if directory_due {
            let (id, action) = self.call_backend(ApiCall::GetRooms);
            self.directory_in_flight = Some(id);
            self.last_directory_at = Some(now);
            actions.push(action);
        }

        // The message poll skips a beat while a fetch is outstanding: a
        // slow or failed cycle simply waits for the next due tick.
        let fetch_target = match (self.session.active.as_ref(), self.poll.as_ref()) {
            (Some(active), Some(poll)) if poll.in_flight.is_none() => {
                let due = match poll.last_fetch_at {
                    None => true,
                    Some(last) => now - last >= self.config.message_poll_interval,
                };
                due.then(|| (active.room_id.clone(), active.room_key.clone()))
            },
            _ => None,
        };
        if let Some((room_id, room_key)) = fetch_target {
            let (id, action) =
                self.call_backend(ApiCall::GetMessages(GetMessagesRequest { room_id, room_key }));
            if let Some(poll) = self.poll.as_mut() {
                poll.in_flight = Some(id);
                poll.last_fetch_at = Some(now);
            }
            actions.push(action);
        }

        actions
    }

    // ------------------------------------------------------------------
    // User intents
    // ------------------------------------------------------------------

    fn handle_create(
        &mut self,
        name: String,
        visibility: RoomVisibility,
        password: String,
    ) -> Result<Vec<SessionAction>, SessionError> {
        if self.join_request_outstanding() {
            return Err(SessionError::JoinInProgress);
        }

        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(SessionError::RoomNameRequired);
        }
        if visibility != RoomVisibility::Public {
            if password.is_empty() {
                return Err(SessionError::PasswordRequired(visibility));
            }
            if password.chars().count() < MIN_ROOM_PASSWORD_LEN {
                return Err(SessionError::PasswordTooShort { min: MIN_ROOM_PASSWORD_LEN });
            }
        }

        let (id, action) = self.call_backend(ApiCall::CreateRoom(CreateRoomRequest::new(
            name.clone(),
            visibility,
            password.clone(),
        )));
        self.join = JoinFlow::Creating { name, visibility, password, request: id };
        Ok(vec![action])
    }

    fn handle_join(&mut self, room_id: RoomId) -> Result<Vec<SessionAction>, SessionError> {
        if self.join_request_outstanding() {
            return Err(SessionError::JoinInProgress);
        }

        // From AwaitingPassword this supersedes the pending prompt, the
        // same way picking another room replaced the pending modal.
        let (id, action) = self.call_backend(ApiCall::CheckRoomPassword(
            CheckRoomPasswordRequest { room_id: room_id.clone() },
        ));
        self.join = JoinFlow::CheckingPassword { room_id, request: id };
        Ok(vec![action])
    }

    fn handle_join_password(
        &mut self,
        password: String,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let JoinFlow::AwaitingPassword { room_id, room_name } = &self.join else {
            return Err(SessionError::NoPendingJoin);
        };
        if password.is_empty() {
            return Err(SessionError::PasswordRequired(RoomVisibility::Private));
        }
        let room_id = room_id.clone();
        let room_name = room_name.clone();
        Ok(self.begin_join(room_id, Some(room_name), password))
    }

    fn handle_send(&mut self, body: String) -> Vec<SessionAction> {
        let body = body.trim().to_owned();
        let Some(active) = self.session.active.as_ref() else {
            return Vec::new();
        };
        if body.is_empty() {
            return Vec::new();
        }

        if !self.session.can_write {
            // No backend contact while restricted: stash the draft and
            // ask for the write password instead.
            let room_id = active.room_id.clone();
            let room_name = active.name.clone();
            self.draft = Some(body);
            return vec![SessionAction::AskWritePassword { room_id, room_name, rejected: false }];
        }

        let request = SendMessageRequest {
            room_id: active.room_id.clone(),
            message: body.clone(),
            room_password: self.session.cached_password.clone(),
        };
        let (id, action) = self.call_backend(ApiCall::SendMessage(request));
        self.sends_in_flight.insert(id, body);
        vec![action]
    }

    fn handle_write_password(
        &mut self,
        password: String,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let Some(active) = self.session.active.as_ref() else {
            return Err(SessionError::NotJoined);
        };
        if password.is_empty() {
            return Err(SessionError::PasswordRequired(active.visibility));
        }

        let room_id = active.room_id.clone();
        let (id, action) = self.call_backend(ApiCall::CheckWritePermission(
            CheckWritePermissionRequest { room_id, room_password: password.clone() },
        ));
        // A resubmission supersedes the previous check; its response goes
        // stale.
        self.permission_in_flight = Some((id, password));
        Ok(vec![action])
    }

    fn handle_set_username(
        &mut self,
        username: String,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let username = username.trim().to_owned();
        if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
            return Err(SessionError::InvalidUsername { max: MAX_USERNAME_LEN });
        }

        let (id, action) = self.call_backend(ApiCall::UpdateUsername(UpdateUsernameRequest {
            username: username.clone(),
        }));
        self.username_in_flight = Some((id, username));
        Ok(vec![action])
    }

    // ------------------------------------------------------------------
    // Backend completions
    // ------------------------------------------------------------------

    fn handle_response(
        &mut self,
        response: BackendResponse,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let BackendResponse { id, result } = response;
        match result {
            ApiResult::PasswordChecked(result) => self.on_password_checked(id, result),
            ApiResult::RoomInfo(result) => self.on_room_info(id, result),
            ApiResult::Joined(result) => self.on_joined(id, result),
            ApiResult::RoomCreated(result) => self.on_room_created(id, result),
            ApiResult::MessageSent(result) => self.on_message_sent(id, result),
            ApiResult::WriteChecked(result) => self.on_write_checked(id, result),
            ApiResult::Messages(result) => Ok(self.on_messages(id, result)),
            ApiResult::Rooms(result) => Ok(self.on_rooms(id, result)),
            ApiResult::CurrentUser(result) => Ok(self.on_current_user(id, result)),
            ApiResult::UsernameUpdated(result) => self.on_username_updated(id, result),
        }
    }

    fn on_password_checked(
        &mut self,
        id: RequestId,
        result: Result<CheckRoomPasswordResponse, BackendError>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let JoinFlow::CheckingPassword { room_id, request } = &self.join else {
            return Ok(Vec::new());
        };
        if *request != id {
            return Ok(Vec::new());
        }
        let room_id = room_id.clone();

        match result {
            Ok(check) if check.requires_password && !check.is_announcement => {
                // Private room: name it before prompting.
                let (info_id, action) =
                    self.call_backend(ApiCall::GetRoomInfo { room_id: room_id.clone() });
                self.join = JoinFlow::FetchingRoomInfo { room_id, request: info_id };
                Ok(vec![action])
            },
            Ok(_) => Ok(self.begin_join(room_id, None, String::new())),
            Err(err) => {
                self.join = JoinFlow::Idle;
                Err(err.into())
            },
        }
    }

    fn on_room_info(
        &mut self,
        id: RequestId,
        result: Result<RoomInfo, BackendError>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let JoinFlow::FetchingRoomInfo { room_id, request } = &self.join else {
            return Ok(Vec::new());
        };
        if *request != id {
            return Ok(Vec::new());
        }
        let room_id = room_id.clone();

        match result {
            Ok(info) => {
                self.join = JoinFlow::AwaitingPassword {
                    room_id: room_id.clone(),
                    room_name: info.name.clone(),
                };
                Ok(vec![SessionAction::AskJoinPassword {
                    room_id,
                    room_name: info.name,
                    rejected: false,
                }])
            },
            Err(err) => {
                self.join = JoinFlow::Idle;
                Err(err.into())
            },
        }
    }

    fn on_joined(
        &mut self,
        id: RequestId,
        result: Result<JoinRoomResponse, BackendError>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let JoinFlow::Joining { room_id, room_name, password, request } = &self.join else {
            return Ok(Vec::new());
        };
        if *request != id {
            return Ok(Vec::new());
        }
        let room_id = room_id.clone();
        let prompt_name = room_name.clone();
        let password = password.clone();

        match result {
            Ok(join) => {
                let visibility = join.visibility();
                // Announcement rooms never get implicit write access from
                // a join; the password travels only for private rooms.
                let can_write = visibility != RoomVisibility::Announcement;
                let cached = if visibility == RoomVisibility::Private {
                    password
                } else {
                    String::new()
                };
                Ok(self.install_session(
                    room_id,
                    join.room_key,
                    join.room_name,
                    visibility,
                    can_write,
                    cached,
                ))
            },
            Err(BackendError::Unauthorized) => {
                // Wrong password: back to the prompt, session untouched.
                let room_name = prompt_name.unwrap_or_default();
                self.join = JoinFlow::AwaitingPassword {
                    room_id: room_id.clone(),
                    room_name: room_name.clone(),
                };
                Ok(vec![SessionAction::AskJoinPassword { room_id, room_name, rejected: true }])
            },
            Err(err) => {
                self.join = JoinFlow::Idle;
                Err(err.into())
            },
        }
    }

    fn on_room_created(
        &mut self,
        id: RequestId,
        result: Result<CreateRoomResponse, BackendError>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let JoinFlow::Creating { name, visibility, password, request } = &self.join else {
            return Ok(Vec::new());
        };
        if *request != id {
            return Ok(Vec::new());
        }
        let name = name.clone();
        let visibility = *visibility;
        let password = password.clone();

        match result {
            Ok(created) => {
                // The creator writes immediately: an announcement creator
                // keeps the password they just chose.
                let cached = if visibility == RoomVisibility::Public {
                    String::new()
                } else {
                    password
                };
                Ok(self.install_session(
                    created.room_id,
                    created.room_key,
                    name,
                    visibility,
                    true,
                    cached,
                ))
            },
            Err(err) => {
                self.join = JoinFlow::Idle;
                Err(err.into())
            },
        }
    }

    fn on_message_sent(
        &mut self,
        id: RequestId,
        result: Result<SendMessageResponse, BackendError>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let Some(body) = self.sends_in_flight.remove(&id) else {
            return Ok(Vec::new());
        };

        match result {
            Ok(ack) if ack.is_success() => Ok(self.refresh_messages_now()),
            Ok(ack) if ack.error.is_some() => Ok(self.demote_write(body)),
            Ok(_) => Ok(Vec::new()),
            Err(BackendError::WritePermissionDenied) => Ok(self.demote_write(body)),
            Err(err) => Err(err.into()),
        }
    }

    fn on_write_checked(
        &mut self,
        id: RequestId,
        result: Result<CheckWritePermissionResponse, BackendError>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let Some((request, password)) = self.permission_in_flight.take() else {
            return Ok(Vec::new());
        };
        if request != id {
            self.permission_in_flight = Some((request, password));
            return Ok(Vec::new());
        }

        match result {
            Ok(check) if check.can_write => {
                self.session.can_write = true;
                self.session.cached_password = password;
                let mut actions = vec![SessionAction::WriteGranted];
                if let Some(body) = self.draft.take() {
                    actions.push(SessionAction::RestoreDraft { body });
                }
                Ok(actions)
            },
            Ok(_) => {
                // Denied: stay restricted, password NOT cached.
                let Some(active) = self.session.active.as_ref() else {
                    return Ok(Vec::new());
                };
                Ok(vec![SessionAction::AskWritePassword {
                    room_id: active.room_id.clone(),
                    room_name: active.name.clone(),
                    rejected: true,
                }])
            },
            Err(err) => Err(err.into()),
        }
    }

    fn on_messages(
        &mut self,
        id: RequestId,
        result: Result<GetMessagesResponse, BackendError>,
    ) -> Vec<SessionAction> {
        let Some(poll) = self.poll.as_mut() else {
            return Vec::new();
        };
        if poll.in_flight != Some(id) {
            // Stale: a rejoin replaced the poll state after this fetch
            // went out.
            return Vec::new();
        }
        poll.in_flight = None;

        let Ok(snapshot) = result else {
            // A failed cycle waits for the next tick; nothing to show.
            return Vec::new();
        };

        // New-message detection keys on the tail message id, not the
        // count: an id change catches a same-count replacement, and an
        // unchanged id stays silent no matter how counts move.
        let tail_id = snapshot.messages.last().map(|m| m.id.clone());
        let mut arrived = None;
        if poll.primed && tail_id != poll.last_seen {
            if let Some(newest) = snapshot.messages.last() {
                if self.session.current_user.as_ref() != Some(&newest.user_id) {
                    arrived = Some(newest.clone());
                }
            }
        }
        poll.last_seen = tail_id;
        poll.primed = true;

        let mut actions = vec![SessionAction::MessagesLoaded { messages: snapshot.messages }];
        if let Some(message) = arrived {
            actions.push(SessionAction::MessageArrived { message });
        }
        actions
    }

    fn on_rooms(
        &mut self,
        id: RequestId,
        result: Result<GetRoomsResponse, BackendError>,
    ) -> Vec<SessionAction> {
        if self.directory_in_flight != Some(id) {
            return Vec::new();
        }
        self.directory_in_flight = None;

        match result {
            Ok(directory) => vec![SessionAction::DirectoryLoaded { rooms: directory.rooms }],
            // Directory refreshes are background noise; the next cycle
            // retries.
            Err(_) => Vec::new(),
        }
    }

    fn on_current_user(
        &mut self,
        id: RequestId,
        result: Result<CurrentUser, BackendError>,
    ) -> Vec<SessionAction> {
        if self.identity_in_flight != Some(id) {
            return Vec::new();
        }
        self.identity_in_flight = None;

        match result {
            Ok(user) => match user.user_id {
                Some(user_id) => {
                    self.session.current_user = Some(user_id.clone());
                    vec![SessionAction::IdentityLoaded { user_id, username: user.username }]
                },
                None => Vec::new(),
            },
            // Best effort: the next join re-issues the fetch.
            Err(_) => Vec::new(),
        }
    }

    fn on_username_updated(
        &mut self,
        id: RequestId,
        result: Result<StatusResponse, BackendError>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let Some((request, username)) = self.username_in_flight.take() else {
            return Ok(Vec::new());
        };
        if request != id {
            self.username_in_flight = Some((request, username));
            return Ok(Vec::new());
        }

        match result {
            Ok(ack) if ack.is_success() => Ok(vec![SessionAction::UsernameUpdated { username }]),
            Ok(_) => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn join_request_outstanding(&self) -> bool {
        matches!(
            self.join,
            JoinFlow::CheckingPassword { .. }
                | JoinFlow::FetchingRoomInfo { .. }
                | JoinFlow::Joining { .. }
                | JoinFlow::Creating { .. }
        )
    }

    fn begin_join(
        &mut self,
        room_id: RoomId,
        room_name: Option<String>,
        password: String,
    ) -> Vec<SessionAction> {
        let (id, action) = self.call_backend(ApiCall::JoinRoom(JoinRoomRequest {
            room_id: room_id.clone(),
            room_password: password.clone(),
        }));
        self.join = JoinFlow::Joining { room_id, room_name, password, request: id };
        vec![action]
    }

    /// Replace the session with a freshly joined room and restart the
    /// message poll from scratch.
    fn install_session(
        &mut self,
        room_id: RoomId,
        room_key: RoomKey,
        name: String,
        visibility: RoomVisibility,
        can_write: bool,
        cached_password: String,
    ) -> Vec<SessionAction> {
        self.join = JoinFlow::Idle;
        self.draft = None;
        self.session.active = Some(ActiveRoom {
            room_id: room_id.clone(),
            room_key: room_key.clone(),
            name: name.clone(),
            visibility,
        });
        self.session.can_write = can_write;
        self.session.cached_password = cached_password;

        let mut actions = vec![SessionAction::SessionJoined {
            room_id: room_id.clone(),
            room_name: name,
            visibility,
            can_write,
        }];

        // One poll chain per controller: the previous room's state is
        // dropped here, so its outstanding fetch (if any) goes stale.
        let now = self.env.now();
        let (fetch_id, fetch) =
            self.call_backend(ApiCall::GetMessages(GetMessagesRequest { room_id, room_key }));
        self.poll = Some(PollState {
            last_fetch_at: Some(now),
            in_flight: Some(fetch_id),
            last_seen: None,
            primed: false,
        });
        actions.push(fetch);

        if self.session.current_user.is_none() && self.identity_in_flight.is_none() {
            let (id, action) = self.call_backend(ApiCall::GetCurrentUser);
            self.identity_in_flight = Some(id);
            actions.push(action);
        }

        actions
    }

    /// Demote the write gate after the backend refused a send: the cached
    /// password is stale (someone changed it, or it never was right).
    fn demote_write(&mut self, body: String) -> Vec<SessionAction> {
        self.session.can_write = false;
        self.session.cached_password.clear();
        self.draft = Some(body.clone());

        let Some(active) = self.session.active.as_ref() else {
            return Vec::new();
        };
        vec![
            SessionAction::AskWritePassword {
                room_id: active.room_id.clone(),
                room_name: active.name.clone(),
                rejected: false,
            },
            SessionAction::RestoreDraft { body },
        ]
    }

    /// Fetch the active room's history out of cadence (after a send), so
    /// the author sees their message without waiting out the interval.
    fn refresh_messages_now(&mut self) -> Vec<SessionAction> {
        let Some(active) = self.session.active.as_ref() else {
            return Vec::new();
        };
        let room_id = active.room_id.clone();
        let room_key = active.room_key.clone();

        match self.poll.as_ref() {
            Some(poll) if poll.in_flight.is_none() => {},
            // An outstanding fetch will carry the new message anyway.
            _ => return Vec::new(),
        }

        let now = self.env.now();
        let (id, action) =
            self.call_backend(ApiCall::GetMessages(GetMessagesRequest { room_id, room_key }));
        if let Some(poll) = self.poll.as_mut() {
            poll.in_flight = Some(id);
            poll.last_fetch_at = Some(now);
        }
        vec![action]
    }

    fn call_backend(&mut self, call: ApiCall) -> (RequestId, SessionAction) {
        self.next_request += 1;
        let id = RequestId(self.next_request);
        (id, SessionAction::CallBackend(BackendRequest { id, call }))
    }
}
