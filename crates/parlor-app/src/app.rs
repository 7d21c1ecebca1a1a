//! Application state machine.
//!
//! [`App`] manages the interactive state of the client completely
//! decoupled from I/O and session mechanics: the room directory, the
//! active room's view, modal prompts, and the status line.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs
//! and produces [`crate::AppAction`] instructions for the runtime to
//! execute. User intents enter through the methods
//! ([`App::join_room`], [`App::send_message`], ...) the frontend calls.

use parlor_proto::{RoomId, RoomSummary, RoomVisibility, UserId};

use crate::{AppAction, AppEvent, Prompt, RoomView};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone, Default)]
pub struct App {
    /// Room directory, refreshed on the controller's cadence.
    directory: Vec<RoomSummary>,
    /// The joined room's view. `None` while browsing.
    active: Option<RoomView>,
    /// The modal prompt currently shown. `None` if none.
    prompt: Option<Prompt>,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
    /// Session-bound user id, once resolved.
    user_id: Option<UserId>,
    /// Current display name, once known.
    username: Option<String>,
}

impl App {
    /// Create an empty App.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::DirectoryUpdated { rooms } => {
                self.directory = rooms;
                vec![AppAction::Render]
            },
            AppEvent::IdentityLoaded { user_id, username } => {
                self.user_id = Some(user_id);
                if username.is_some() {
                    self.username = username;
                }
                vec![AppAction::Render]
            },
            AppEvent::RoomJoined { room_id, room_name, visibility, can_write } => {
                self.status_message = Some(format!("Joined {room_name}"));
                self.active = Some(RoomView::new(room_id, room_name, visibility, !can_write));
                self.prompt = None;
                vec![AppAction::Render]
            },
            AppEvent::MessagesUpdated { messages } => {
                if let Some(room) = self.active.as_mut() {
                    // Whole-snapshot replacement, mirroring the poll.
                    room.messages = messages;
                }
                vec![AppAction::Render]
            },
            AppEvent::MessageArrived { message: _ } => {
                vec![AppAction::Notify, AppAction::Render]
            },
            AppEvent::RoomPasswordRequired { room_id, room_name, rejected } => {
                self.prompt = Some(Prompt::RoomPassword { room_id, room_name, rejected });
                vec![AppAction::Render]
            },
            AppEvent::WritePasswordRequired { room_id, room_name, rejected } => {
                if let Some(room) = self.active.as_mut() {
                    room.write_restricted = true;
                }
                self.prompt = Some(Prompt::WritePassword { room_id, room_name, rejected });
                vec![AppAction::Render]
            },
            AppEvent::WriteGranted => {
                if let Some(room) = self.active.as_mut() {
                    room.write_restricted = false;
                }
                if matches!(self.prompt, Some(Prompt::WritePassword { .. })) {
                    self.prompt = None;
                }
                self.status_message = Some("Write access granted".into());
                vec![AppAction::Render]
            },
            AppEvent::DraftRestored { body } => {
                if let Some(room) = self.active.as_mut() {
                    room.draft = body;
                }
                vec![AppAction::Render]
            },
            AppEvent::UsernameUpdated { username } => {
                self.status_message = Some(format!("You are now {username}"));
                self.username = Some(username);
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    // ------------------------------------------------------------------
    // User intents
    // ------------------------------------------------------------------

    /// Join an existing room.
    pub fn join_room(&self, room_id: RoomId) -> Vec<AppAction> {
        vec![AppAction::JoinRoom { room_id }, AppAction::Render]
    }

    /// Create a new room and enter it.
    pub fn create_room(
        &mut self,
        name: String,
        visibility: RoomVisibility,
        password: String,
    ) -> Vec<AppAction> {
        self.status_message = Some(format!("Creating {name}..."));
        vec![AppAction::CreateRoom { name, visibility, password }, AppAction::Render]
    }

    /// Answer the pending join-password prompt.
    pub fn submit_room_password(&self, password: String) -> Vec<AppAction> {
        vec![AppAction::SubmitRoomPassword { password }, AppAction::Render]
    }

    /// Answer the pending write-password prompt.
    pub fn submit_write_password(&self, password: String) -> Vec<AppAction> {
        vec![AppAction::SubmitWritePassword { password }, AppAction::Render]
    }

    /// Dismiss whatever prompt is showing.
    pub fn dismiss_prompt(&mut self) -> Vec<AppAction> {
        self.prompt = None;
        vec![AppAction::CancelJoin, AppAction::Render]
    }

    /// Send a message to the active room and clear the compose box.
    pub fn send_message(&mut self, body: String) -> Vec<AppAction> {
        if let Some(room) = self.active.as_mut() {
            room.draft.clear();
        }
        vec![AppAction::SendMessage { body }, AppAction::Render]
    }

    /// Request a new display name.
    pub fn set_username(&self, username: String) -> Vec<AppAction> {
        vec![AppAction::SetUsername { username }, AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The room directory as of the last refresh.
    pub fn directory(&self) -> &[RoomSummary] {
        &self.directory
    }

    /// The joined room's view. `None` while browsing.
    pub fn active_room(&self) -> Option<&RoomView> {
        self.active.as_ref()
    }

    /// The modal prompt currently shown.
    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    /// Transient status message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Session-bound user id, once resolved.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Current display name, once known.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use parlor_proto::{MessageId, MessageRecord};

    use super::*;

    fn joined_app(can_write: bool) -> App {
        let mut app = App::new();
        let _ = app.handle(AppEvent::RoomJoined {
            room_id: RoomId::new("room-1"),
            room_name: "General".into(),
            visibility: if can_write { RoomVisibility::Public } else { RoomVisibility::Announcement },
            can_write,
        });
        app
    }

    fn record(id: &str, body: &str) -> MessageRecord {
        MessageRecord {
            id: MessageId::new(id),
            username: "someone".into(),
            message: body.into(),
            timestamp: "2025-01-05T12:00:00".into(),
            user_id: parlor_proto::UserId::new("them"),
        }
    }

    #[test]
    fn room_joined_resets_prompt_and_view() {
        let mut app = App::new();
        let _ = app.handle(AppEvent::RoomPasswordRequired {
            room_id: RoomId::new("room-1"),
            room_name: "General".into(),
            rejected: false,
        });
        assert!(app.prompt().is_some());

        let _ = app.handle(AppEvent::RoomJoined {
            room_id: RoomId::new("room-1"),
            room_name: "General".into(),
            visibility: RoomVisibility::Private,
            can_write: true,
        });
        assert!(app.prompt().is_none());
        let room = app.active_room().unwrap();
        assert!(!room.write_restricted);
        assert_eq!(room.name, "General");
    }

    #[test]
    fn announcement_join_locks_compose_box() {
        let app = joined_app(false);
        assert!(app.active_room().unwrap().write_restricted);
    }

    #[test]
    fn messages_updated_replaces_snapshot() {
        let mut app = joined_app(true);
        let _ = app.handle(AppEvent::MessagesUpdated {
            messages: vec![record("m1", "one"), record("m2", "two")],
        });
        let _ = app.handle(AppEvent::MessagesUpdated { messages: vec![record("m3", "three")] });

        let room = app.active_room().unwrap();
        assert_eq!(room.messages.len(), 1);
        assert_eq!(room.messages[0].message, "three");
    }

    #[test]
    fn message_arrived_notifies_then_renders() {
        let mut app = joined_app(true);
        let actions = app.handle(AppEvent::MessageArrived { message: record("m9", "ping") });
        assert_eq!(actions, vec![AppAction::Notify, AppAction::Render]);
    }

    #[test]
    fn write_granted_unlocks_and_clears_prompt() {
        let mut app = joined_app(false);
        let _ = app.handle(AppEvent::WritePasswordRequired {
            room_id: RoomId::new("room-1"),
            room_name: "General".into(),
            rejected: false,
        });
        assert!(app.prompt().is_some());

        let _ = app.handle(AppEvent::WriteGranted);
        assert!(app.prompt().is_none());
        assert!(!app.active_room().unwrap().write_restricted);
    }

    #[test]
    fn draft_restored_fills_compose_box() {
        let mut app = joined_app(false);
        let _ = app.handle(AppEvent::DraftRestored { body: "urgent notice".into() });
        assert_eq!(app.active_room().unwrap().draft, "urgent notice");
    }

    #[test]
    fn send_message_clears_draft() {
        let mut app = joined_app(true);
        let _ = app.handle(AppEvent::DraftRestored { body: "half-typed".into() });

        let actions = app.send_message("half-typed".into());
        assert!(matches!(actions.as_slice(), [AppAction::SendMessage { .. }, AppAction::Render]));
        assert_eq!(app.active_room().unwrap().draft, "");
    }

    #[test]
    fn api_join_room() {
        let app = App::new();
        let actions = app.join_room(RoomId::new("room-2"));
        assert!(matches!(actions.as_slice(), [AppAction::JoinRoom { .. }, AppAction::Render]));
    }

    #[test]
    fn error_lands_in_status_line() {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Error { message: "room not found".into() });
        assert_eq!(app.status_message(), Some("Error: room not found"));
    }

    #[test]
    fn identity_does_not_erase_known_username() {
        let mut app = App::new();
        let _ = app.handle(AppEvent::UsernameUpdated { username: "sam".into() });
        let _ = app.handle(AppEvent::IdentityLoaded {
            user_id: parlor_proto::UserId::new("me"),
            username: None,
        });
        assert_eq!(app.username(), Some("sam"));
    }
}
