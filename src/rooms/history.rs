use std::sync::Arc;

use axum::{Json, debug_handler, extract::{Path, State}};

use crate::{model::Message, store::MessageLog};

/// Full history in append order. An unknown room id yields an empty list,
/// not an error.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn room_history(
    Path(room_id): Path<String>,
    State(log): State<Arc<MessageLog>>,
) -> Json<Vec<Message>> {
    Json(log.snapshot(&room_id))
}
