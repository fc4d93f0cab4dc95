pub mod appresult;
pub mod config;
pub mod model;
pub mod rooms;
pub mod store;
pub mod upload;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::{get, post}};
use tower_http::{cors::CorsLayer, services::ServeDir};

pub use appresult::{AppError, AppResult};
pub use config::Config;

use rooms::relay::ServerEvent;
use store::{MessageLog, PresenceTracker, RoomBus, RoomRegistry};

/// Every store is built once here and passed around by handle; nothing in
/// the crate reaches for ambient globals.
#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<RoomRegistry>,
    pub log: Arc<MessageLog>,
    pub presence: Arc<PresenceTracker>,
    pub bus: Arc<RoomBus<ServerEvent>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            registry: Arc::new(RoomRegistry::default()),
            log: Arc::new(MessageLog::new(config.room_history_limit)),
            presence: Arc::new(PresenceTracker::default()),
            bus: Arc::new(RoomBus::new()),
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    // frames and JSON bodies stay small; only uploads need headroom
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes + 64 * 1024);

    Router::new()
        .nest("/api/chat", rooms::router())
        .route("/api/admin/reported-chats", get(rooms::reported_chats))
        .merge(rooms::ws_router())
        .route(
            "/upload",
            post(upload::upload_image).layer(upload_limit),
        )
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
