pub mod access;
pub mod auth_service;
pub mod outfit_service;
pub mod share_service;
pub mod upload_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthServiceError, LoginRequest};
pub use outfit_service::OutfitService;
pub use share_service::{RandomSlugGenerator, ShareLink, ShareService, SlugGenerator};
pub use upload_service::{BlobImageStore, ImageStore, LocalImageStore, StorageError, UploadService};
pub use user_service::{CreateUserRequest, SetPasswordRequest, UserService, UserServiceError};
