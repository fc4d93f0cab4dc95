//! Relay core: the event contract and the state changes behind it, kept
//! apart from the WebSocket plumbing in `ws.rs` so it can be driven directly
//! by tests through the bus.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    AppState,
    model::{Message, MessageKind, PresenceEntry},
    store::Envelope,
};

/// Events a client may emit over its connection. Wire names and payload
/// fields match the original Socket.IO contract.
#[derive(Debug, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    JoinRoom {
        room_id: String,
        user_id: String,
        username: String,
    },
    SendMessage {
        room_id: String,
        message: String,
        user_id: String,
        username: String,
        #[serde(default, with = "time::serde::rfc3339::option")]
        timestamp: Option<OffsetDateTime>,
    },
    SendImage {
        room_id: String,
        image_url: String,
        user_id: String,
        username: String,
        #[serde(default, with = "time::serde::rfc3339::option")]
        timestamp: Option<OffsetDateTime>,
    },
    Typing {
        room_id: String,
        username: String,
    },
    StopTyping {
        room_id: String,
    },
}

/// Events fanned out to connections in a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    UserJoined {
        user_id: String,
        username: String,
        message: String,
    },
    ReceiveMessage(Message),
    UserTyping {
        username: String,
    },
    UserStopTyping,
    UserLeft {
        user_id: String,
        username: String,
        message: String,
    },
    /// Only sent point-to-point, back to the offending connection.
    Error {
        message: String,
    },
}

/// A send that was refused because the connection never joined the room.
/// Only possible with `require_join_to_send` set.
#[derive(Debug, PartialEq, Eq)]
pub struct SendRejected;

/// Subscribes the connection to the room's fan-out group, records presence
/// (a re-join just overwrites), and tells everyone already there. The joiner
/// does not receive its own join notification.
pub fn join(
    state: &AppState,
    conn_id: Uuid,
    room_id: &str,
    user_id: String,
    username: String,
) -> broadcast::Receiver<Envelope<ServerEvent>> {
    let rx = state.bus.subscribe(room_id);

    state.presence.join(
        conn_id,
        PresenceEntry {
            user_id: user_id.clone(),
            username: username.clone(),
            room_id: room_id.to_owned(),
        },
    );

    tracing::info!(%conn_id, %room_id, %username, "joined room");
    let message = format!("{username} joined the chat");
    state.bus.broadcast(
        room_id,
        ServerEvent::UserJoined {
            user_id,
            username,
            message,
        },
        Some(conn_id),
    );

    rx
}

/// Appends a message and echoes it to every connection in the room,
/// including the sender: the echo is what places the message in the sender's
/// own view. A missing client timestamp defaults to now; client timestamps
/// are display-only either way, order is set by the append.
pub fn send(
    state: &AppState,
    conn_id: Uuid,
    kind: MessageKind,
    room_id: String,
    content: String,
    user_id: String,
    username: String,
    timestamp: Option<OffsetDateTime>,
) -> Result<Message, SendRejected> {
    if state.config.require_join_to_send {
        let joined = state
            .presence
            .get(conn_id)
            .is_some_and(|entry| entry.room_id == room_id);
        if !joined {
            tracing::warn!(%conn_id, %room_id, "send from unjoined connection rejected");
            return Err(SendRejected);
        }
    }

    let message = Message {
        id: Uuid::new_v4(),
        kind,
        content,
        user_id,
        username,
        room_id,
        timestamp: timestamp.unwrap_or_else(OffsetDateTime::now_utc),
    };

    state.log.append(message.clone());
    tracing::debug!(id = %message.id, room_id = %message.room_id, ?kind, "message relayed");
    state.bus.broadcast(
        &message.room_id,
        ServerEvent::ReceiveMessage(message.clone()),
        None,
    );

    Ok(message)
}

/// Transient signal to everyone else in the room; never recorded.
pub fn typing(state: &AppState, conn_id: Uuid, room_id: &str, username: String) {
    state
        .bus
        .broadcast(room_id, ServerEvent::UserTyping { username }, Some(conn_id));
}

pub fn stop_typing(state: &AppState, conn_id: Uuid, room_id: &str) {
    state
        .bus
        .broadcast(room_id, ServerEvent::UserStopTyping, Some(conn_id));
}

/// Removes presence and notifies the room the entry pointed at. The tracker
/// hands the entry out at most once, so a transport that signals disconnect
/// twice still produces one departure notification.
pub fn disconnect(state: &AppState, conn_id: Uuid) {
    let Some(entry) = state.presence.leave(conn_id) else {
        return;
    };

    tracing::info!(%conn_id, room_id = %entry.room_id, username = %entry.username, "left room");
    let message = format!("{} left the chat", entry.username);
    state.bus.broadcast(
        &entry.room_id,
        ServerEvent::UserLeft {
            user_id: entry.user_id,
            username: entry.username,
            message,
        },
        Some(conn_id),
    );
}
