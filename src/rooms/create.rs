use std::sync::Arc;

use axum::{Json, debug_handler, extract::State};
use serde::{Deserialize, Serialize};

use crate::{AppResult, model::Room, store::RoomRegistry};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateRoomBody {
    user1_id: String,
    user2_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateRoomResponse {
    room_id: String,
    room: Room,
}

/// Idempotent create-or-fetch: the same pair always lands in the same room,
/// whichever participant asks and in whichever order.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn create_room(
    State(registry): State<Arc<RoomRegistry>>,
    Json(CreateRoomBody { user1_id, user2_id }): Json<CreateRoomBody>,
) -> AppResult<Json<CreateRoomResponse>> {
    let (room, created) = registry.ensure_room(&user1_id, &user2_id);
    if created {
        tracing::info!(room_id = %room.id, "created chat room");
    }

    Ok(Json(CreateRoomResponse {
        room_id: room.id.clone(),
        room,
    }))
}
