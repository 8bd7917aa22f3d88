use std::sync::Arc;

use crate::config::{AppConfig, JwtConfig};
use crate::db::{Db, Store};
use crate::seed;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = Store::new();

        if config.seed_demo_data && seed::seed_if_empty(&db).await? {
            tracing::info!(email = seed::DEMO_EMAIL, "demo data seeded");
        }

        Ok(Self { db, config })
    }

    pub fn from_parts(db: Db, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// Empty store and fixed test JWT settings.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            page_size: 12,
            seed_demo_data: false,
        });
        Self::from_parts(Store::new(), config)
    }
}
