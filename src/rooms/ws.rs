use axum::{
    debug_handler,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::{
    AppState,
    model::MessageKind,
    rooms::relay::{self, ClientEvent, ServerEvent},
    store::Envelope,
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn chat_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, socket: WebSocket) {
    let conn_id = Uuid::new_v4();
    tracing::info!(%conn_id, "connection opened");

    let (mut sink, mut stream) = socket.split();

    // single writer per socket; room fan-out and direct replies both funnel
    // through here
    let (out_tx, mut out_rx) = mpsc::channel::<String>(64);
    let writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if sink.send(WsMessage::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let mut forward: Option<tokio::task::JoinHandle<()>> = None;

    while let Some(Ok(frame)) = stream.next().await {
        let text = match frame {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => break,
            _ => continue,
        };

        let event = match serde_json::from_str::<ClientEvent>(&text) {
            Ok(event) => event,
            Err(err) => {
                tracing::debug!(%conn_id, %err, "skipping malformed frame");
                continue;
            }
        };

        match event {
            ClientEvent::JoinRoom {
                room_id,
                user_id,
                username,
            } => {
                let rx = relay::join(&state, conn_id, &room_id, user_id, username);
                // a re-join replaces the previous subscription
                if let Some(task) = forward.take() {
                    task.abort();
                }
                forward = Some(spawn_forwarder(conn_id, rx, out_tx.clone()));
            }
            ClientEvent::SendMessage {
                room_id,
                message,
                user_id,
                username,
                timestamp,
            } => {
                relay_send(
                    &state,
                    conn_id,
                    MessageKind::Text,
                    room_id,
                    message,
                    user_id,
                    username,
                    timestamp,
                    &out_tx,
                )
                .await;
            }
            ClientEvent::SendImage {
                room_id,
                image_url,
                user_id,
                username,
                timestamp,
            } => {
                relay_send(
                    &state,
                    conn_id,
                    MessageKind::Image,
                    room_id,
                    image_url,
                    user_id,
                    username,
                    timestamp,
                    &out_tx,
                )
                .await;
            }
            ClientEvent::Typing { room_id, username } => {
                relay::typing(&state, conn_id, &room_id, username);
            }
            ClientEvent::StopTyping { room_id } => {
                relay::stop_typing(&state, conn_id, &room_id);
            }
        }
    }

    relay::disconnect(&state, conn_id);
    if let Some(task) = forward.take() {
        task.abort();
    }
    writer.abort();
    tracing::info!(%conn_id, "connection closed");
}

#[allow(clippy::too_many_arguments)]
async fn relay_send(
    state: &AppState,
    conn_id: Uuid,
    kind: MessageKind,
    room_id: String,
    content: String,
    user_id: String,
    username: String,
    timestamp: Option<time::OffsetDateTime>,
    out_tx: &mpsc::Sender<String>,
) {
    let sent = relay::send(
        state, conn_id, kind, room_id, content, user_id, username, timestamp,
    );

    if sent.is_err() {
        let reply = ServerEvent::Error {
            message: "join the room before sending".to_owned(),
        };
        if let Ok(json) = serde_json::to_string(&reply) {
            let _ = out_tx.send(json).await;
        }
    }
}

/// Drains the room's fan-out channel into this connection's writer,
/// applying the envelope's exclusion. A failure here is this connection's
/// problem alone; the bus never waits for it.
fn spawn_forwarder(
    conn_id: Uuid,
    mut rx: broadcast::Receiver<Envelope<ServerEvent>>,
    out: mpsc::Sender<String>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    if envelope.except == Some(conn_id) {
                        continue;
                    }
                    let Ok(json) = serde_json::to_string(&envelope.payload) else {
                        continue;
                    };
                    if out.send(json).await.is_err() {
                        break;
                    }
                }
                // this connection fell behind; drop what it missed rather
                // than holding up the room
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(%conn_id, missed, "dropping lagged room events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
