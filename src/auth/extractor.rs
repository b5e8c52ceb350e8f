use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use super::USER_ID_KEY;
use crate::error::AppError;

/// The signed-in caller. Rejects with 401 when there is no session user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
}

/// The caller if signed in, for endpoints that also serve anonymous users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeUser(pub Option<i64>);

impl MaybeUser {
    pub fn id(&self) -> Option<i64> {
        self.0
    }
}

async fn session_user_id<S>(parts: &mut Parts, state: &S) -> Result<Option<i64>, AppError>
where
    S: Send + Sync,
{
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| {
            tracing::error!("Session layer missing: {}", msg);
            AppError::InternalError
        })?;

    Ok(session.get::<i64>(USER_ID_KEY).await?)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        session_user_id(parts, state)
            .await?
            .map(|id| AuthUser { id })
            .ok_or(AppError::AuthenticationFailed)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_user_id(parts, state).await?))
    }
}
