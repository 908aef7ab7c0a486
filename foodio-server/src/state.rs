//! Application state shared by all handlers

use std::sync::Arc;

use crate::auth::JwtService;
use crate::config::{Config, StorageBackend};
use crate::db::{Repositories, postgres};
use crate::identity;
use crate::orders::{OrderEngine, PricingPolicy, StatusPolicy};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub engine: Arc<OrderEngine>,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        jwt: JwtService,
        pricing: PricingPolicy,
        status_policy: StatusPolicy,
    ) -> Self {
        let engine = OrderEngine::new(&repos, pricing, status_policy);
        Self {
            repos,
            engine: Arc::new(engine),
            jwt: Arc::new(jwt),
        }
    }

    /// In-memory state with default policies
    pub fn in_memory(jwt: JwtService) -> Self {
        Self::new(
            Repositories::in_memory(),
            jwt,
            PricingPolicy::default(),
            StatusPolicy::default(),
        )
    }

    /// Build state from configuration: connect storage and seed the admin
    pub async fn from_config(config: &Config) -> Result<Self, BoxError> {
        let repos = match config.storage {
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or("DATABASE_URL must be set")?;
                let pool = postgres::connect(url).await?;
                tracing::info!("PostgreSQL connected, migrations applied");
                Repositories::postgres(pool)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage, data is lost on restart");
                Repositories::in_memory()
            }
        };

        let state = Self::new(
            repos,
            JwtService::with_config(config.jwt.clone()),
            config.pricing_policy,
            config.status_policy,
        );

        if let Some(bootstrap) = &config.admin {
            identity::ensure_admin(state.repos.users.as_ref(), bootstrap).await?;
        }

        tracing::info!(
            pricing_policy = %config.pricing_policy,
            status_policy = %config.status_policy,
            "Order engine ready"
        );
        Ok(state)
    }
}
