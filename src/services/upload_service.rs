use crate::error::{AppError, Result, FILE_TOO_LARGE, MAX_IMAGE_BYTES};
use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const INVALID_FILE_TYPE: &str =
    "Invalid file type. Only JPEG, PNG, and WebP images are allowed.";
pub const NOT_CONFIGURED: &str = "Upload service not configured";

/// Blob keys are namespaced under this prefix.
const BLOB_PREFIX: &str = "unpacked";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Blob request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Blob store rejected upload with status {0}")]
    Rejected(u16),
}

/// Somewhere uploaded images can be written to and served from.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` under `filename` and return the public URL.
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> std::result::Result<String, StorageError>;
}

/// Writes images to a directory served by the app itself.
pub struct LocalImageStore {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: "/uploads".to_string(),
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(
        &self,
        filename: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> std::result::Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(filename), bytes).await?;
        Ok(format!("{}/{}", self.url_prefix, filename))
    }
}

/// Uploads to an HTTP blob store with a bearer token.
pub struct BlobImageStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct BlobResponse {
    url: Option<String>,
}

impl BlobImageStore {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl ImageStore for BlobImageStore {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> std::result::Result<String, StorageError> {
        let target = format!("{}/{}/{}", self.base_url, BLOB_PREFIX, filename);

        let response = self
            .client
            .put(&target)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Rejected(status.as_u16()));
        }

        // Stores that echo the public URL win; otherwise the PUT target is the URL
        let body = response.text().await?;
        let url = serde_json::from_str::<BlobResponse>(&body)
            .ok()
            .and_then(|r| r.url)
            .unwrap_or(target);

        Ok(url)
    }
}

/// Map an accepted MIME type to the file extension it is stored with.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

pub fn generate_filename(extension: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();

    format!(
        "{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        suffix,
        extension
    )
}

pub struct UploadService {
    store: Option<Arc<dyn ImageStore>>,
}

impl UploadService {
    /// `None` means no backend is configured and every upload answers 503.
    pub fn new(store: Option<Arc<dyn ImageStore>>) -> Self {
        Self { store }
    }

    pub async fn store_image(&self, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        let extension = extension_for(content_type)
            .ok_or_else(|| AppError::Validation(INVALID_FILE_TYPE.to_string()))?;

        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::Validation(FILE_TOO_LARGE.to_string()));
        }

        let store = self
            .store
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable(NOT_CONFIGURED.to_string()))?;

        let filename = generate_filename(extension);
        let size = bytes.len();
        let url = store.put(&filename, content_type, bytes).await?;

        tracing::info!(%filename, size, "Image stored");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/jpg"), Some("jpg"));
        assert_eq!(extension_for("IMAGE/PNG"), Some("png"));
        assert_eq!(extension_for("image/webp"), Some("webp"));
        assert_eq!(extension_for("image/gif"), None);
        assert_eq!(extension_for("application/pdf"), None);
    }

    #[test]
    fn test_generate_filename_shape() {
        let name = generate_filename("png");
        let (stem, ext) = name.rsplit_once('.').unwrap();
        assert_eq!(ext, "png");
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 12);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_local_store_writes_file() {
        let dir = TempDir::new().unwrap();
        let uploads = dir.path().join("nested/uploads");
        let service = UploadService::new(Some(Arc::new(LocalImageStore::new(&uploads))));

        let url = service
            .store_image("image/png", vec![0x89, b'P', b'N', b'G'])
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));
        let filename = url.trim_start_matches("/uploads/");
        let written = std::fs::read(uploads.join(filename)).unwrap();
        assert_eq!(written, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_rejects_bad_type_and_size() {
        let dir = TempDir::new().unwrap();
        let service = UploadService::new(Some(Arc::new(LocalImageStore::new(dir.path()))));

        let result = service.store_image("image/gif", vec![1, 2, 3]).await;
        assert!(matches!(result, Err(AppError::Validation(ref msg)) if msg == INVALID_FILE_TYPE));

        let result = service
            .store_image("image/jpeg", vec![0; MAX_IMAGE_BYTES + 1])
            .await;
        assert!(matches!(result, Err(AppError::Validation(ref msg)) if msg == FILE_TOO_LARGE));

        assert!(service
            .store_image("image/jpeg", vec![0; MAX_IMAGE_BYTES])
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unconfigured_store() {
        let service = UploadService::new(None);
        let result = service.store_image("image/webp", vec![1]).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(ref msg)) if msg == NOT_CONFIGURED));
    }

    #[tokio::test]
    async fn test_blob_store_puts_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/unpacked/\d+-[A-Za-z0-9]{12}\.webp$"))
            .and(header("authorization", "Bearer secret-token"))
            .and(header("content-type", "image/webp"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "url": "https://cdn.example.com/a.webp" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = BlobImageStore::new(server.uri(), "secret-token");
        let service = UploadService::new(Some(Arc::new(store)));

        let url = service.store_image("image/webp", vec![1, 2]).await.unwrap();
        assert_eq!(url, "https://cdn.example.com/a.webp");
    }

    #[tokio::test]
    async fn test_blob_store_falls_back_to_target_url() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let store = BlobImageStore::new(format!("{}/", server.uri()), "token");
        let url = store.put("x.png", "image/png", vec![1]).await.unwrap();
        assert_eq!(url, format!("{}/unpacked/x.png", server.uri()));
    }

    #[tokio::test]
    async fn test_blob_store_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let service = UploadService::new(Some(Arc::new(BlobImageStore::new(server.uri(), "bad"))));
        let result = service.store_image("image/png", vec![1]).await;
        assert!(matches!(
            result,
            Err(AppError::Storage(StorageError::Rejected(403)))
        ));
    }
}
