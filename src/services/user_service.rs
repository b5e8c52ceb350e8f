use crate::error::AppError;
use crate::models::user::User;
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use std::sync::Arc;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Name is required")]
    MissingName,
    #[error("Password must be at least 6 characters long")]
    WeakPassword,
    #[error("Current password is incorrect")]
    IncorrectCurrentPassword,
    #[error("User not found")]
    UserNotFound,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::InvalidEmail
            | UserServiceError::MissingName
            | UserServiceError::WeakPassword
            | UserServiceError::IncorrectCurrentPassword => AppError::Validation(err.to_string()),
            UserServiceError::UserNotFound => AppError::AuthenticationFailed,
            UserServiceError::EmailTaken => AppError::Conflict(err.to_string()),
            UserServiceError::HashingError(msg) => {
                tracing::error!("Password hashing failed: {}", msg);
                AppError::InternalError
            }
            UserServiceError::RepositoryError(RepositoryError::Database(e)) => AppError::Database(e),
            UserServiceError::RepositoryError(RepositoryError::NotFound) => {
                AppError::AuthenticationFailed
            }
            UserServiceError::RepositoryError(RepositoryError::AlreadyExists) => {
                AppError::Conflict(UserServiceError::EmailTaken.to_string())
            }
        }
    }
}

pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    /// `None` creates an account that can only sign in through an external identity.
    pub password: Option<String>,
}

pub struct SetPasswordRequest {
    pub user_id: i64,
    pub new_password: String,
    pub current_password: Option<String>,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserServiceError> {
        let email = request.email.trim();
        let name = request.name.trim();

        self.validate_email(email)?;
        if name.is_empty() {
            return Err(UserServiceError::MissingName);
        }

        let password_hash = match request.password {
            Some(ref password) => {
                self.validate_password(password)?;
                Some(self.hash_password(password)?)
            }
            None => None,
        };

        match self
            .repository
            .create_user(email, name, password_hash)
            .await
        {
            Ok(user) => {
                tracing::info!(user_id = user.id, "User registered");
                Ok(user)
            }
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::EmailTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_email(email.trim()).await?)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), UserServiceError> {
        match self.repository.delete_user(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn has_password(&self, id: i64) -> Result<bool, UserServiceError> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserServiceError::UserNotFound)?;
        Ok(user.has_password())
    }

    /// Set or change a password. Accounts that already have one must prove it.
    pub async fn set_password(&self, request: SetPasswordRequest) -> Result<(), UserServiceError> {
        let user = self
            .repository
            .find_by_id(request.user_id)
            .await?
            .ok_or(UserServiceError::UserNotFound)?;

        if let Some(ref existing) = user.password_hash.filter(|hash| !hash.is_empty()) {
            let current = request.current_password.as_deref().unwrap_or_default();
            if !self.verify_password(current, existing) {
                return Err(UserServiceError::IncorrectCurrentPassword);
            }
        }

        self.reset_password(request.user_id, &request.new_password)
            .await
    }

    /// Overwrite a password without checking the old one. Used by the admin CLI.
    pub async fn reset_password(
        &self,
        user_id: i64,
        new_password: &str,
    ) -> Result<(), UserServiceError> {
        self.validate_password(new_password)?;
        let password_hash = self.hash_password(new_password)?;

        match self
            .repository
            .update_password(user_id, &password_hash)
            .await
        {
            Ok(()) => {
                tracing::info!(user_id, "Password updated");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    fn validate_email(&self, email: &str) -> Result<(), UserServiceError> {
        if !email.contains('@') || email.len() > 255 || email.is_empty() {
            return Err(UserServiceError::InvalidEmail);
        }
        Ok(())
    }

    fn validate_password(&self, password: &str) -> Result<(), UserServiceError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(UserServiceError::WeakPassword);
        }
        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<String, UserServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserServiceError::HashingError(e.to_string()))
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        } else {
            false
        }
    }
}
