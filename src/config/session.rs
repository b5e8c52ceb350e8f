use std::env;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha512};
use time::Duration;
use tower_sessions::{
    cookie::{Key, SameSite},
    service::SignedCookie,
    Expiry, SessionManagerLayer,
};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::warn;

use super::{env_flag_enabled, is_production, ConfigError};

/// Signed cookie session layer backed by the SQLite session table.
pub type SessionLayer = SessionManagerLayer<SqliteStore, SignedCookie>;

const MIN_SECRET_BYTES: usize = 64;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub expiry: Duration,
    pub name: String,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        if is_production() {
            SessionConfig {
                secure: true,
                http_only: true,
                same_site: SameSite::Strict,
                expiry: Duration::hours(2),
                name: "__Host-session".to_string(),
            }
        } else {
            SessionConfig {
                secure: false,
                http_only: true,
                same_site: SameSite::Lax,
                expiry: Duration::days(7),
                name: "session".to_string(),
            }
        }
    }

    pub fn create_layer(&self, store: SqliteStore) -> SessionLayer {
        SessionManagerLayer::new(store)
            .with_secure(self.secure)
            .with_http_only(self.http_only)
            .with_same_site(self.same_site)
            .with_name(self.name.clone())
            .with_expiry(Expiry::OnInactivity(self.expiry))
            .with_signed(load_session_key())
    }
}

/// Refuse to start a production server over plain HTTP or with a weak secret.
pub fn validate_production_config() -> Result<(), ConfigError> {
    if !is_production() {
        return Ok(());
    }

    if !env_flag_enabled("FORCE_HTTPS") {
        return Err(ConfigError::Insecure(
            "Production environment requires HTTPS. Set FORCE_HTTPS=true".to_string(),
        ));
    }

    let secret = env::var("SESSION_SECRET").map_err(|_| ConfigError::Missing("SESSION_SECRET"))?;

    if decode_secret_bytes(&secret).len() < MIN_SECRET_BYTES {
        return Err(ConfigError::Insecure(format!(
            "SESSION_SECRET must be at least {} bytes in production",
            MIN_SECRET_BYTES
        )));
    }

    let lowered = secret.to_ascii_lowercase();
    if ["example", "changeme", "default"]
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return Err(ConfigError::Insecure(
            "SESSION_SECRET appears to be a default value. Generate a secure secret".to_string(),
        ));
    }

    Ok(())
}

fn load_session_key() -> Key {
    match env::var("SESSION_SECRET") {
        Ok(secret) if !secret.is_empty() => key_from_secret_bytes(&decode_secret_bytes(&secret)),
        _ => {
            warn!("SESSION_SECRET not set; generating ephemeral key (development only)");
            Key::generate()
        }
    }
}

fn decode_secret_bytes(secret: &str) -> Vec<u8> {
    STANDARD
        .decode(secret.as_bytes())
        .unwrap_or_else(|_| secret.as_bytes().to_vec())
}

fn key_from_secret_bytes(bytes: &[u8]) -> Key {
    if bytes.len() >= MIN_SECRET_BYTES {
        Key::from(&bytes[..MIN_SECRET_BYTES])
    } else {
        Key::from(Sha512::digest(bytes).as_slice())
    }
}
