use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use super::USER_ID_KEY;
use crate::error::AppError;

/// Guard for route groups that only make sense for a signed-in user.
pub async fn require_auth(session: Session, request: Request, next: Next) -> Response {
    if let Ok(Some(_user_id)) = session.get::<i64>(USER_ID_KEY).await {
        next.run(request).await
    } else {
        AppError::AuthenticationFailed.into_response()
    }
}
