use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{AuthUser, MaybeUser};
use crate::error::{AppError, Result};
use crate::handlers::json::ValidatedJson;
use crate::models::{OutfitDetails, OutfitItem, OutfitPage, OutfitPayload};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    /// Unparseable pages fall back to the first one.
    fn page(&self) -> Option<i64> {
        self.page.as_deref().and_then(|p| p.trim().parse().ok())
    }
}

pub fn parse_outfit_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Validation("Invalid outfit ID".to_string()))
}

pub async fn list_outfits(
    State(app_state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<OutfitPage>> {
    let page = app_state.outfit_service.list_public(query.page()).await?;
    Ok(Json(page))
}

pub async fn create_outfit(
    State(app_state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<OutfitPayload>,
) -> Result<(StatusCode, Json<OutfitDetails>)> {
    let outfit = app_state
        .outfit_service
        .create_outfit(user.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(outfit)))
}

pub async fn get_outfit(
    State(app_state): State<AppState>,
    caller: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<OutfitDetails>> {
    let id = parse_outfit_id(&id)?;
    let outfit = app_state.outfit_service.get_outfit(id, caller.id()).await?;
    Ok(Json(outfit))
}

pub async fn update_outfit(
    State(app_state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<OutfitPayload>,
) -> Result<Json<OutfitDetails>> {
    let id = parse_outfit_id(&id)?;
    let outfit = app_state
        .outfit_service
        .update_outfit(id, user.id, payload)
        .await?;
    Ok(Json(outfit))
}

pub async fn delete_outfit(
    State(app_state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_outfit_id(&id)?;
    app_state.outfit_service.delete_outfit(id, user.id).await?;
    Ok(Json(json!({ "message": "Outfit deleted successfully" })))
}

pub async fn save_outfit(
    State(app_state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Value>)> {
    let id = parse_outfit_id(&id)?;
    let outfit = app_state.outfit_service.save_outfit(id, user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Outfit saved successfully", "outfit": outfit })),
    ))
}

pub async fn share_outfit(
    State(app_state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_outfit_id(&id)?;
    let link = app_state.share_service.share_outfit(id, user.id).await?;
    Ok(Json(json!({ "shareUrl": link.share_url })))
}

pub async fn my_outfits(
    State(app_state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<OutfitPage>> {
    let page = app_state
        .outfit_service
        .list_for_user(user.id, query.page())
        .await?;
    Ok(Json(page))
}

pub async fn my_items(
    State(app_state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<OutfitItem>>> {
    let items = app_state.outfit_service.list_items_for_user(user.id).await?;
    Ok(Json(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outfit_id() {
        assert_eq!(parse_outfit_id("42").unwrap(), 42);
        for bad in ["abc", "", "-1", "0", "1.5", "9999999999999999999999"] {
            assert!(
                matches!(parse_outfit_id(bad), Err(AppError::Validation(ref m)) if m == "Invalid outfit ID"),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_page_query_is_lenient() {
        let query = PageQuery {
            page: Some("x".to_string()),
        };
        assert_eq!(query.page(), None);
        let query = PageQuery {
            page: Some("3".to_string()),
        };
        assert_eq!(query.page(), Some(3));
    }
}
