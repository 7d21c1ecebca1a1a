//! Opaque string identifiers.
//!
//! The backend mints every identifier (hex tokens for users, rooms and
//! messages, base64 for room keys); the client never inspects their
//! structure. Newtypes keep a room id from being passed where a room key
//! belongs while serializing as the bare string the wire expects.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier string.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// The raw identifier as sent on the wire.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

string_id! {
    /// Room identifier (`room_id` on the wire).
    RoomId
}

string_id! {
    /// Opaque room access token returned on join (`room_key` on the wire).
    ///
    /// Required for every message fetch; possession means "joined".
    RoomKey
}

string_id! {
    /// User identifier bound to the backend session (`user_id` on the wire).
    UserId
}

string_id! {
    /// Server-assigned message identifier (`id` on the wire).
    MessageId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_strings() {
        let id = RoomId::new("a1b2c3d4e5f60718");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"a1b2c3d4e5f60718\"");

        let back: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_display_raw_value() {
        let key = RoomKey::new("c2VjcmV0LWtleQ==");
        assert_eq!(key.to_string(), "c2VjcmV0LWtleQ==");
        assert_eq!(key.as_str(), "c2VjcmV0LWtleQ==");
    }
}
