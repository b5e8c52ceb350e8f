use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejections (malformed body, unknown fields, wrong content
/// type) render as the usual `{ "error": ... }` 400 body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidatedJson<T>(pub T);
