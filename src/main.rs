use unpacked::{
    config::{session::validate_production_config, ServerConfig, SessionConfig, UploadConfig},
    db, routes, AppState,
};

use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unpacked=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    validate_production_config()?;
    let server_config = ServerConfig::from_env()?;
    let upload_config = UploadConfig::from_env()?;

    // Database connection
    let pool = db::create_pool().await?;
    db::run_migrations(&pool).await?;

    let image_store = upload_config.build_store();
    if image_store.is_none() {
        tracing::warn!("Image uploads are disabled");
    }

    let app_state = AppState::new(pool.clone(), &server_config.public_base_url, image_store);

    // Session store
    let session_store = SqliteStore::new(pool.clone()).with_table_name("sessions")?;
    session_store.migrate().await?;

    let session_layer = SessionConfig::from_env().create_layer(session_store);

    let app = routes::build_router(
        app_state,
        session_layer,
        upload_config.served_dir().map(|dir| dir.as_path()),
    );

    // Start server
    let addr = server_config.bind_address();
    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
