use std::sync::Arc;

use axum::{Json, debug_handler, extract::{Path, State}};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    AppResult,
    appresult::AppError,
    model::{Message, Room},
    store::{MessageLog, RoomNotFound, RoomRegistry},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportBody {
    reason: String,
    reported_by: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn report_room(
    Path(room_id): Path<String>,
    State(registry): State<Arc<RoomRegistry>>,
    Json(ReportBody { reason, reported_by }): Json<ReportBody>,
) -> AppResult<Json<Value>> {
    let report = registry
        .report(&room_id, reason, reported_by)
        .map_err(|RoomNotFound(id)| AppError::NotFound(format!("conversation {id} not found")))?;

    tracing::info!(
        %room_id,
        reported_by = %report.reported_by,
        reason = %report.reason,
        "conversation reported"
    );

    Ok(Json(json!({
        "success": true,
        "message": "conversation reported"
    })))
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportedChat {
    #[serde(flatten)]
    room: Room,
    messages: Vec<Message>,
}

/// Every flagged room joined with its current history, for moderator review.
/// Reads live state from both stores; a report landing mid-listing may or
/// may not be included.
#[debug_handler(state = crate::AppState)]
pub async fn reported_chats(
    State(registry): State<Arc<RoomRegistry>>,
    State(log): State<Arc<MessageLog>>,
) -> Json<Vec<ReportedChat>> {
    let chats = registry
        .list_flagged()
        .into_iter()
        .map(|room| {
            let messages = log.snapshot(&room.id);
            ReportedChat { room, messages }
        })
        .collect();

    Json(chats)
}
