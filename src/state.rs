use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::profiles::repo::{PgProfileRepo, ProfileRepo};
use crate::provider::{AuthAdmin, GoTrueAdmin};
use crate::storage::{Storage, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub profiles: Arc<dyn ProfileRepo>,
    pub auth_admin: Arc<dyn AuthAdmin>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init(config: AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let storage = Storage::new(&config.storage)
            .await
            .context("init object storage")?;
        let auth_admin = GoTrueAdmin::new(&config.provider);

        Ok(Self::from_parts(
            Arc::new(config),
            Arc::new(PgProfileRepo::new(db)),
            Arc::new(auth_admin),
            Arc::new(storage),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        profiles: Arc<dyn ProfileRepo>,
        auth_admin: Arc<dyn AuthAdmin>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        Self {
            config,
            profiles,
            auth_admin,
            storage,
        }
    }
}

pub async fn connect_db(config: &AppConfig) -> anyhow::Result<PgPool> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}
