//! Session controller
//!
//! Action-based session state machine for the Parlor chat backend. Manages
//! the room join flow, the write-permission gate, message-poll scheduling
//! and new-message detection.
//!
//! # Architecture
//!
//! The controller is Sans-IO: it receives events ([`SessionEvent`]),
//! processes them through pure state machine logic, and returns actions
//! ([`SessionAction`]) for the caller to execute. Backend round-trips are
//! actions on the way out ([`BackendRequest`]) and events on the way back
//! ([`BackendResponse`]); between the two the controller keeps a pending
//! ledger so a response that was superseded — a second join, a rejoin —
//! is recognized as stale and dropped instead of clobbering the session.
//!
//! # Components
//!
//! - [`Controller`]: the state machine
//! - [`Session`]: the owned session state (active room, key, write gate)
//! - [`SessionEvent`] / [`SessionAction`]: inputs and outputs
//! - [`ControllerConfig`]: poll cadences
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::HttpBackend`]: channel-based HTTP dispatch over reqwest
//! - [`transport::connect`]: build a backend for a base URL

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod controller;
mod error;
mod event;
mod session;

#[cfg(feature = "transport")]
pub mod transport;

pub use controller::{
    Controller, ControllerConfig, DEFAULT_DIRECTORY_REFRESH_INTERVAL,
    DEFAULT_MESSAGE_POLL_INTERVAL, MIN_ROOM_PASSWORD_LEN,
};
pub use error::SessionError;
pub use event::{
    ApiCall, ApiResult, BackendRequest, BackendResponse, RequestId, SessionAction, SessionEvent,
};
pub use parlor_core::{BackendError, Environment};
pub use session::{ActiveRoom, Session};
