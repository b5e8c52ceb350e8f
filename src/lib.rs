pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

use repositories::{SqliteOutfitRepository, SqliteUserRepository};
use services::{
    AuthService, ImageStore, OutfitService, RandomSlugGenerator, ShareService, SlugGenerator,
    UploadService, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub outfit_service: Arc<OutfitService>,
    pub share_service: Arc<ShareService>,
    pub upload_service: Arc<UploadService>,
}

impl AppState {
    /// Wire the SQLite repositories into every service.
    pub fn new(
        pool: sqlx::SqlitePool,
        public_base_url: &str,
        image_store: Option<Arc<dyn ImageStore>>,
    ) -> Self {
        Self::with_slug_generator(
            pool,
            public_base_url,
            image_store,
            Arc::new(RandomSlugGenerator),
        )
    }

    pub fn with_slug_generator(
        pool: sqlx::SqlitePool,
        public_base_url: &str,
        image_store: Option<Arc<dyn ImageStore>>,
        slugs: Arc<dyn SlugGenerator>,
    ) -> Self {
        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let outfit_repository = Arc::new(SqliteOutfitRepository::new(pool));

        AppState {
            user_service: Arc::new(UserService::new(user_repository.clone())),
            auth_service: Arc::new(AuthService::new(user_repository)),
            outfit_service: Arc::new(OutfitService::new(outfit_repository.clone())),
            share_service: Arc::new(ShareService::new(
                outfit_repository,
                slugs,
                public_base_url,
            )),
            upload_service: Arc::new(UploadService::new(image_store)),
        }
    }
}
