use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
}

/// A single chat message. Append order into the room's log is the
/// authoritative order; `timestamp` is display-only and may come from the
/// client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Literal text, or an opaque reference to an uploaded image.
    pub content: String,
    pub user_id: String,
    pub username: String,
    pub room_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "reportReason")]
    pub reason: String,
    pub reported_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub reported_at: OffsetDateTime,
}

/// A two-party conversation. Identities are opaque tokens; the room id is a
/// canonical function of the unordered pair, so both participants resolve to
/// the same room no matter who asks first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub participants: [String; 2],
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub is_reported: bool,
    #[serde(flatten)]
    pub report: Option<Report>,
}

impl Room {
    /// Canonical id for an unordered participant pair: sort, then join.
    pub fn key(a: &str, b: &str) -> String {
        let mut pair = [a, b];
        pair.sort_unstable();
        pair.join("-")
    }
}

/// Live binding of one connection to an identity and a room. Exists from the
/// join event until disconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub user_id: String,
    pub username: String,
    pub room_id: String,
}
