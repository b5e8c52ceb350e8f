use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::json::ValidatedJson;
use crate::services::SetPasswordRequest;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetPasswordPayload {
    #[serde(default)]
    password: String,
    current_password: Option<String>,
}

pub async fn check_password_handler(
    State(app_state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>> {
    let has_password = app_state.user_service.has_password(user.id).await?;
    Ok(Json(json!({ "hasPassword": has_password })))
}

pub async fn set_password_handler(
    State(app_state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<SetPasswordPayload>,
) -> Result<Json<Value>> {
    app_state
        .user_service
        .set_password(SetPasswordRequest {
            user_id: user.id,
            new_password: payload.password,
            current_password: payload.current_password,
        })
        .await?;

    Ok(Json(json!({ "message": "Password set successfully" })))
}
