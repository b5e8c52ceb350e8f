use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::error::{AppError, Result, FILE_TOO_LARGE, MAX_IMAGE_BYTES};
use crate::services::upload_service::{extension_for, INVALID_FILE_TYPE};
use crate::AppState;

/// Request body ceiling for the upload route: the image plus multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

pub async fn upload_handler(
    State(app_state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if extension_for(&content_type).is_none() {
            return Err(AppError::Validation(INVALID_FILE_TYPE.to_string()));
        }

        // Stop reading as soon as the limit is crossed
        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(AppError::Validation(FILE_TOO_LARGE.to_string()));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            break;
        }

        let image_url = app_state
            .upload_service
            .store_image(&content_type, bytes)
            .await?;

        tracing::info!(user_id = user.id, %image_url, "Image uploaded");
        return Ok(Json(json!({ "imageUrl": image_url })));
    }

    Err(AppError::Validation("No file provided".to_string()))
}
