use std::sync::Arc;

use crate::config::{AppConfig, StorageKind};
use crate::db;
use crate::users::{
    memory::InMemoryUserRepository, repo::PgUserRepository, repo::UserRepository,
    services::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserService,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let repo: Arc<dyn UserRepository> = match config.storage {
            StorageKind::Postgres => {
                let pool = db::connect(&config).await?;
                db::migrate(&pool).await?;
                Arc::new(PgUserRepository::new(pool))
            }
            StorageKind::Memory => {
                tracing::warn!("using in-memory storage; records are lost on shutdown");
                Arc::new(InMemoryUserRepository::new())
            }
        };

        Ok(Self::from_parts(Arc::new(config), repo))
    }

    pub fn from_parts(config: Arc<AppConfig>, repo: Arc<dyn UserRepository>) -> Self {
        Self {
            config,
            users: UserService::new(repo),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            storage: StorageKind::Memory,
            database_url: None,
            db_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(config, Arc::new(InMemoryUserRepository::new()))
    }
}
