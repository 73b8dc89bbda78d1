//! Startup wiring: repositories, seed data and the token issuer.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use shopwise_auth::Hs256Tokens;
use shopwise_catalog::{AffiliateLink, Product};
use shopwise_infra::{
    AffiliateLinkRepository, InMemoryStore, PgAffiliateLinkRepository, PgProductRepository,
    ProductRepository, RepositoryError,
    repository::postgres,
    seed::{self, SeedError},
};

use crate::config::{AppConfig, Persistence};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to connect to database: {0}")]
    Database(#[source] RepositoryError),

    #[error("failed to load seed file: {0}")]
    Seed(#[from] SeedError),
}

/// Shared state handed to every handler via `Extension<Arc<AppServices>>`.
pub struct AppServices {
    pub products: Arc<dyn ProductRepository>,
    pub links: Arc<dyn AffiliateLinkRepository>,
    pub tokens: Hs256Tokens,
    pub config: AppConfig,
}

impl AppServices {
    /// Empty in-memory repositories.
    pub fn in_memory(config: AppConfig) -> Self {
        let products: Arc<dyn ProductRepository> = Arc::new(InMemoryStore::<Product>::new());
        let links: Arc<dyn AffiliateLinkRepository> = Arc::new(InMemoryStore::<AffiliateLink>::new());
        Self::with_repositories(config, products, links)
    }

    pub fn with_repositories(
        config: AppConfig,
        products: Arc<dyn ProductRepository>,
        links: Arc<dyn AffiliateLinkRepository>,
    ) -> Self {
        Self {
            products,
            links,
            tokens: Hs256Tokens::new(config.jwt_secret.as_bytes()),
            config,
        }
    }
}

impl core::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppServices")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Build services for `config`, connecting to Postgres and applying the seed
/// file when configured.
pub async fn build_services(config: AppConfig) -> Result<AppServices, StartupError> {
    let services = match &config.persistence {
        Persistence::InMemory => {
            tracing::info!("using in-memory catalog stores");
            AppServices::in_memory(config)
        }
        Persistence::Postgres { database_url } => {
            tracing::info!("using postgres catalog stores");
            let pool = postgres::connect(database_url)
                .await
                .map_err(StartupError::Database)?;
            postgres::ensure_schema(&pool)
                .await
                .map_err(StartupError::Database)?;

            let products: Arc<dyn ProductRepository> = Arc::new(PgProductRepository::new(pool.clone()));
            let links: Arc<dyn AffiliateLinkRepository> = Arc::new(PgAffiliateLinkRepository::new(pool));
            AppServices::with_repositories(config, products, links)
        }
    };

    if let Some(path) = &services.config.seed_file {
        tracing::info!(path = %path.display(), "applying seed file");
        let file = seed::load(path).await?;
        seed::apply(file, services.products.as_ref(), services.links.as_ref(), Utc::now()).await?;
    }

    Ok(services)
}
