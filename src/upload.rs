use std::path::Path;
use std::sync::Arc;

use axum::{Json, debug_handler, extract::{Multipart, State}};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{AppResult, Config, appresult::AppError};

/// Matches the reference relay's accepted raster formats.
const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadResponse {
    image_url: String,
}

/// Stores one image under the upload directory and hands back the opaque
/// reference the relay will carry in `send_image` messages. Type and size
/// violations are the caller's error, never retried.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn upload_image(
    State(config): State<Arc<Config>>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("malformed upload: {err}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_owned();
        let ext = Path::new(&file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::BadRequest("only images are allowed".to_owned()));
        }
        if !field.content_type().is_some_and(|ct| ct.starts_with("image/")) {
            return Err(AppError::BadRequest("only images are allowed".to_owned()));
        }

        let data = field.bytes().await.map_err(|_| {
            AppError::BadRequest("image exceeds the upload size limit".to_owned())
        })?;
        if data.len() > config.max_upload_bytes {
            return Err(AppError::BadRequest("image exceeds the upload size limit".to_owned()));
        }

        let unique_name = format!(
            "{}-{}.{ext}",
            OffsetDateTime::now_utc().unix_timestamp(),
            Uuid::new_v4()
        );
        tokio::fs::create_dir_all(&config.upload_dir).await?;
        tokio::fs::write(config.upload_dir.join(&unique_name), &data).await?;

        tracing::info!(name = %unique_name, bytes = data.len(), "image stored");
        return Ok(Json(UploadResponse {
            image_url: format!("/uploads/{unique_name}"),
        }));
    }

    Err(AppError::BadRequest("no image uploaded".to_owned()))
}
