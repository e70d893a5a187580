use std::sync::Arc;

use anyhow::Context;

use crate::auth::google::GoogleVerifier;
use crate::config::AppConfig;
use crate::storage::{DiskStore, ImageStore};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<AppConfig>,
    pub images: Arc<dyn ImageStore>,
    pub google: GoogleVerifier,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let images = Arc::new(DiskStore::new(&config.uploads_dir)) as Arc<dyn ImageStore>;
        let google = GoogleVerifier::new(config.google_client_id.clone());

        Ok(Self {
            db,
            config,
            images,
            google,
        })
    }
}
