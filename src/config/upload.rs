use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use super::{is_production, ConfigError};
use crate::services::upload_service::{BlobImageStore, ImageStore, LocalImageStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadBackend {
    Local,
    Blob,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub backend: UploadBackend,
    pub dir: PathBuf,
    pub blob_base_url: Option<String>,
    pub blob_token: Option<String>,
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match env::var("UPLOAD_BACKEND") {
            Ok(value) => match value.to_ascii_lowercase().as_str() {
                "local" => UploadBackend::Local,
                "blob" => UploadBackend::Blob,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "UPLOAD_BACKEND",
                        value,
                    })
                }
            },
            Err(_) if is_production() => UploadBackend::Blob,
            Err(_) => UploadBackend::Local,
        };

        Ok(UploadConfig {
            backend,
            dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            blob_base_url: non_empty_var("BLOB_BASE_URL"),
            blob_token: non_empty_var("BLOB_READ_WRITE_TOKEN"),
        })
    }

    /// The configured store, or `None` when the blob backend lacks credentials.
    pub fn build_store(&self) -> Option<Arc<dyn ImageStore>> {
        match self.backend {
            UploadBackend::Local => Some(Arc::new(LocalImageStore::new(self.dir.clone()))),
            UploadBackend::Blob => match (&self.blob_base_url, &self.blob_token) {
                (Some(base_url), Some(token)) => {
                    Some(Arc::new(BlobImageStore::new(base_url.clone(), token.clone())))
                }
                _ => {
                    tracing::warn!(
                        "Blob upload backend selected but BLOB_BASE_URL or BLOB_READ_WRITE_TOKEN is missing; uploads disabled"
                    );
                    None
                }
            },
        }
    }

    /// Directory to serve under `/uploads`, only for the local backend.
    pub fn served_dir(&self) -> Option<&PathBuf> {
        match self.backend {
            UploadBackend::Local => Some(&self.dir),
            UploadBackend::Blob => None,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
