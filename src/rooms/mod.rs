mod create;
mod history;
mod report;
pub mod relay;
mod ws;

use axum::{Router, routing::{get, post}};

use crate::AppState;

pub use report::reported_chats;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create::create_room))
        .route("/{room_id}/messages", get(history::room_history))
        .route("/{room_id}/report", post(report::report_room))
}

pub fn ws_router() -> Router<AppState> {
    Router::new().route("/ws", get(ws::chat_ws))
}
