//! Session-to-Application translation layer.
//!
//! The [`Bridge`] wraps the low-level [`parlor_client::Controller`] and
//! adapts it to the application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`]s into controller events.
//! - Accumulates outgoing [`BackendRequest`]s to be dispatched by the
//!   driver in the next I/O cycle.
//! - Interprets controller actions and converts them back into
//!   [`crate::AppEvent`]s to update the view model.
//! - Manages time ticks generically to support both real-time execution
//!   and deterministic simulation.

use parlor_client::{
    BackendRequest, BackendResponse, Controller, Environment, Session, SessionAction, SessionEvent,
};

use crate::{AppAction, AppEvent};

/// Bridge between App and the session controller.
///
/// Generic over Environment to support both production and simulation.
/// The Instant type is determined by the Environment's associated type.
pub struct Bridge<E: Environment> {
    controller: Controller<E>,
    outgoing: Vec<BackendRequest>,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge with the given environment.
    pub fn new(env: E) -> Self {
        Self { controller: Controller::new(env), outgoing: Vec::new() }
    }

    /// Read access to the controller's session state.
    pub fn session(&self) -> &Session {
        self.controller.session()
    }

    /// Kick off the startup fetches (identity, room directory).
    pub fn start(&mut self) -> Vec<AppEvent> {
        let actions = self.controller.start();
        self.process_session_actions(actions)
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        match action {
            AppAction::CreateRoom { name, visibility, password } => {
                self.dispatch(SessionEvent::CreateRoom { name, visibility, password })
            },
            AppAction::JoinRoom { room_id } => self.dispatch(SessionEvent::JoinRoom { room_id }),
            AppAction::SubmitRoomPassword { password } => {
                self.dispatch(SessionEvent::SubmitJoinPassword { password })
            },
            AppAction::CancelJoin => self.dispatch(SessionEvent::CancelJoin),
            AppAction::SendMessage { body } => self.dispatch(SessionEvent::SendMessage { body }),
            AppAction::SubmitWritePassword { password } => {
                self.dispatch(SessionEvent::SubmitWritePassword { password })
            },
            AppAction::SetUsername { username } => {
                self.dispatch(SessionEvent::SetUsername { username })
            },
            AppAction::Render | AppAction::Notify | AppAction::Quit => vec![],
        }
    }

    /// Handle a backend completion.
    pub fn handle_response(&mut self, response: BackendResponse) -> Vec<AppEvent> {
        self.dispatch(SessionEvent::Response(response))
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: E::Instant) -> Vec<AppEvent> {
        self.dispatch(SessionEvent::Tick { now })
    }

    /// Take pending outgoing backend requests.
    pub fn take_outgoing(&mut self) -> Vec<BackendRequest> {
        std::mem::take(&mut self.outgoing)
    }

    fn dispatch(&mut self, event: SessionEvent<E::Instant>) -> Vec<AppEvent> {
        match self.controller.handle(event) {
            Ok(actions) => self.process_session_actions(actions),
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    fn process_session_actions(&mut self, actions: Vec<SessionAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                SessionAction::CallBackend(request) => {
                    self.outgoing.push(request);
                },
                SessionAction::AskJoinPassword { room_id, room_name, rejected } => {
                    events.push(AppEvent::RoomPasswordRequired { room_id, room_name, rejected });
                },
                SessionAction::AskWritePassword { room_id, room_name, rejected } => {
                    events.push(AppEvent::WritePasswordRequired { room_id, room_name, rejected });
                },
                SessionAction::SessionJoined { room_id, room_name, visibility, can_write } => {
                    events.push(AppEvent::RoomJoined { room_id, room_name, visibility, can_write });
                },
                SessionAction::MessagesLoaded { messages } => {
                    events.push(AppEvent::MessagesUpdated { messages });
                },
                SessionAction::MessageArrived { message } => {
                    events.push(AppEvent::MessageArrived { message });
                },
                SessionAction::DirectoryLoaded { rooms } => {
                    events.push(AppEvent::DirectoryUpdated { rooms });
                },
                SessionAction::IdentityLoaded { user_id, username } => {
                    events.push(AppEvent::IdentityLoaded { user_id, username });
                },
                SessionAction::WriteGranted => events.push(AppEvent::WriteGranted),
                SessionAction::RestoreDraft { body } => {
                    events.push(AppEvent::DraftRestored { body });
                },
                SessionAction::UsernameUpdated { username } => {
                    events.push(AppEvent::UsernameUpdated { username });
                },
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use parlor_client::{ApiCall, ApiResult, RequestId};
    use parlor_proto::api::{CheckRoomPasswordResponse, JoinRoomResponse};
    use parlor_proto::{RoomId, RoomKey};

    use super::*;

    #[derive(Clone)]
    struct TestEnv {
        base: Instant,
    }

    impl Environment for TestEnv {
        type Instant = Instant;

        fn now(&self) -> Instant {
            self.base
        }

        fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            async {}
        }
    }

    fn bridge() -> Bridge<TestEnv> {
        Bridge::new(TestEnv { base: Instant::now() })
    }

    fn take_one(bridge: &mut Bridge<TestEnv>, pred: impl Fn(&ApiCall) -> bool) -> RequestId {
        let outgoing = bridge.take_outgoing();
        outgoing
            .iter()
            .find(|request| pred(&request.call))
            .map(|request| request.id)
            .unwrap()
    }

    #[test]
    fn join_produces_room_joined_event() {
        let mut bridge = bridge();

        let events =
            bridge.process_app_action(AppAction::JoinRoom { room_id: RoomId::new("room-1") });
        assert!(events.is_empty());
        let check = take_one(&mut bridge, |c| matches!(c, ApiCall::CheckRoomPassword(_)));

        let events = bridge.handle_response(BackendResponse {
            id: check,
            result: ApiResult::PasswordChecked(Ok(CheckRoomPasswordResponse {
                requires_password: false,
                is_announcement: false,
                password_correct: None,
            })),
        });
        assert!(events.is_empty());
        let join = take_one(&mut bridge, |c| matches!(c, ApiCall::JoinRoom(_)));

        let events = bridge.handle_response(BackendResponse {
            id: join,
            result: ApiResult::Joined(Ok(JoinRoomResponse {
                room_key: RoomKey::new("key"),
                room_name: "General".into(),
                is_private: false,
                is_announcement: false,
            })),
        });
        assert!(events.iter().any(|e| matches!(e, AppEvent::RoomJoined { .. })));
        assert!(bridge.session().active_room().is_some());
    }

    #[test]
    fn controller_errors_become_error_events() {
        let mut bridge = bridge();

        // Submitting a join password with no pending join is an error.
        let events =
            bridge.process_app_action(AppAction::SubmitRoomPassword { password: "pw".into() });
        assert!(events.iter().any(|e| matches!(e, AppEvent::Error { .. })));
    }

    #[test]
    fn render_and_quit_do_not_reach_the_controller() {
        let mut bridge = bridge();
        assert!(bridge.process_app_action(AppAction::Render).is_empty());
        assert!(bridge.process_app_action(AppAction::Quit).is_empty());
        assert!(bridge.take_outgoing().is_empty());
    }

    #[test]
    fn start_queues_identity_and_directory_fetches() {
        let mut bridge = bridge();
        let events = bridge.start();
        assert!(events.is_empty());

        let outgoing = bridge.take_outgoing();
        assert!(outgoing.iter().any(|r| matches!(r.call, ApiCall::GetCurrentUser)));
        assert!(outgoing.iter().any(|r| matches!(r.call, ApiCall::GetRooms)));
    }
}
