//! Wire contract for the Parlor chat backend.
//!
//! The backend is a plain REST service speaking JSON. This crate holds the
//! request and response bodies for every endpoint, the string id newtypes,
//! and the room visibility model. Field names here ARE the wire contract:
//! they must serialize exactly as the backend expects, so nothing in this
//! crate renames or restructures fields.
//!
//! # Components
//!
//! - [`ids`]: opaque string identifiers ([`RoomId`], [`RoomKey`], [`UserId`],
//!   [`MessageId`])
//! - [`room`]: room visibility model and directory records
//! - [`message`]: message records as returned by `get_messages`
//! - [`api`]: request/response bodies per endpoint

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod api;
mod ids;
mod message;
mod room;

pub use ids::{MessageId, RoomId, RoomKey, UserId};
pub use message::MessageRecord;
pub use room::{RoomInfo, RoomSummary, RoomVisibility};
