//! Message records as returned by `get_messages`.

use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, UserId};

/// One message of a room's history snapshot.
///
/// The backend returns history oldest-first and already decrypted; the
/// client treats the last element of each snapshot as the newest message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Server-assigned message identifier.
    ///
    /// Ids are stable across snapshots, which makes them the reliable
    /// signal for "something new arrived" (unlike the raw message count,
    /// which stays flat when an old message rotates out as a new one
    /// lands).
    pub id: MessageId,

    /// Author's display name at fetch time.
    pub username: String,

    /// Message body.
    pub message: String,

    /// Server timestamp, ISO 8601.
    pub timestamp: String,

    /// Author's user identifier.
    pub user_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_record() {
        let json = r#"{
            "id": "0f1e2d3c4b5a6978",
            "username": "Anon_4f2a",
            "message": "hello there",
            "timestamp": "2025-01-05T12:30:00.123456",
            "user_id": "a1b2c3d4e5f60718"
        }"#;

        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.username, "Anon_4f2a");
        assert_eq!(record.user_id, UserId::new("a1b2c3d4e5f60718"));
    }
}
