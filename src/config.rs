use anyhow::Context;
use serde::Deserialize;

/// Signing secret and lifetime for session tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// OAuth client id the Google id tokens must be issued for.
    pub google_client_id: String,
    pub uploads_dir: String,
    pub no_image_path: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            ttl_seconds: std::env::var("TOKEN_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 60 * 24 * 30),
        };
        let google_client_id =
            std::env::var("GOOGLE_CLIENT_ID").context("GOOGLE_CLIENT_ID is not set")?;
        let uploads_dir = std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".into());
        let no_image_path =
            std::env::var("NO_IMAGE_PATH").unwrap_or_else(|_| "assets/no-image.jpg".into());
        Ok(Self {
            database_url,
            jwt,
            google_client_id,
            uploads_dir,
            no_image_path,
        })
    }
}
