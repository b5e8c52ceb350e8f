use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;

use super::{MaybeUser, USER_ID_KEY};
use crate::error::Result;
use crate::handlers::json::ValidatedJson;
use crate::models::UserProfile;
use crate::services::{AuthServiceError, CreateUserRequest, LoginRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub async fn register_handler(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterPayload>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let user = app_state
        .user_service
        .create_user(CreateUserRequest {
            name: payload.name,
            email: payload.email,
            password: Some(payload.password),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login_handler(
    State(app_state): State<AppState>,
    session: Session,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> Result<Json<UserProfile>> {
    let user = app_state
        .auth_service
        .authenticate(LoginRequest {
            email: payload.email,
            password: payload.password,
        })
        .await
        .inspect_err(|_| tracing::debug!("Login rejected"))?;

    // New id on privilege change so a pre-login cookie cannot be fixated
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user.id).await?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(user.into()))
}

pub async fn logout_handler(session: Session) -> Result<Json<Value>> {
    session.flush().await?;
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

pub async fn session_handler(
    State(app_state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
) -> Result<Json<Value>> {
    let user = match user_id {
        // A session can outlive its account
        Some(id) => match app_state.auth_service.get_user_by_id(id).await {
            Ok(user) => Some(UserProfile::from(user)),
            Err(AuthServiceError::UserNotFound) => None,
            Err(err) => return Err(err.into()),
        },
        None => None,
    };

    Ok(Json(json!({ "user": user })))
}
