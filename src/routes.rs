use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::SessionLayer;
use crate::{auth, handlers, AppState};

/// The full application router. `uploads_dir` is served under `/uploads`
/// when images are stored locally.
pub fn build_router(
    app_state: AppState,
    session_layer: SessionLayer,
    uploads_dir: Option<&Path>,
) -> Router {
    // Routes with no anonymous variant
    let protected_routes = Router::new()
        .route("/api/my-outfits", get(handlers::my_outfits))
        .route("/api/my-items", get(handlers::my_items))
        .route(
            "/api/upload",
            post(handlers::upload_handler)
                .layer(DefaultBodyLimit::max(handlers::UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/auth/check-password",
            get(handlers::check_password_handler),
        )
        .route(
            "/api/auth/set-password",
            post(handlers::set_password_handler),
        )
        .route_layer(middleware::from_fn(auth::middleware::require_auth));

    // Mixed routes enforce sign-in per handler through `AuthUser`
    let api_routes = Router::new()
        .route(
            "/api/outfits",
            get(handlers::list_outfits).post(handlers::create_outfit),
        )
        .route(
            "/api/outfits/{id}",
            get(handlers::get_outfit)
                .put(handlers::update_outfit)
                .delete(handlers::delete_outfit),
        )
        .route("/api/outfits/{id}/share", post(handlers::share_outfit))
        .route("/api/outfits/{id}/save", post(handlers::save_outfit))
        .route("/api/share/{slug}", get(handlers::get_shared_outfit))
        .route("/api/register", post(auth::handlers::register_handler))
        .route("/api/login", post(auth::handlers::login_handler))
        .route("/api/logout", post(auth::handlers::logout_handler))
        .route("/api/auth/session", get(auth::handlers::session_handler));

    let mut app = Router::new()
        .merge(api_routes)
        .merge(protected_routes)
        .route(
            "/outfits/share/{slug}",
            get(handlers::shared_outfit_page),
        )
        .route("/health", get(|| async { "ok" }));

    if let Some(dir) = uploads_dir {
        app = app.nest_service("/uploads", ServeDir::new(dir));
    }

    app.layer(session_layer)
        .layer(middleware::from_fn(crate::middleware::add_security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
