use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{AppError, Result};
use crate::models::OutfitDetails;
use crate::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "outfits/share.html")]
struct SharedOutfitTemplate {
    details: OutfitDetails,
}

#[derive(Template, WebTemplate)]
#[template(path = "outfits/share_missing.html")]
struct SharedOutfitMissingTemplate;

pub async fn get_shared_outfit(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<OutfitDetails>> {
    let outfit = app_state.share_service.resolve(&slug).await?;
    Ok(Json(outfit))
}

pub async fn shared_outfit_page(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    match app_state.share_service.resolve(&slug).await {
        Ok(details) => SharedOutfitTemplate { details }.into_response(),
        Err(AppError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, SharedOutfitMissingTemplate).into_response()
        }
        Err(e) => e.into_response(),
    }
}
