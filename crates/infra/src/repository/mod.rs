//! Repository abstractions for catalog data.
//!
//! Handlers only ever see `Arc<dyn ProductRepository>` / `Arc<dyn AffiliateLinkRepository>`;
//! which backend sits behind them is decided once at startup.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use shopwise_catalog::{AffiliateLink, Product, SearchParams, SearchResponse, TagCount};
use shopwise_core::ProductId;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::{PgAffiliateLinkRepository, PgProductRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("in-memory store lock poisoned")]
    Poisoned,

    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn search(&self, params: &SearchParams) -> Result<SearchResponse, RepositoryError>;

    /// All tags in use with their product counts.
    async fn tags(&self) -> Result<Vec<TagCount>, RepositoryError>;

    /// Insert or replace by id.
    async fn upsert(&self, product: Product) -> Result<(), RepositoryError>;

    /// Returns whether a product was removed.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait AffiliateLinkRepository: Send + Sync {
    async fn get(&self, page_id: u64) -> Result<Option<AffiliateLink>, RepositoryError>;

    /// Insert or replace by page id.
    async fn upsert(&self, link: AffiliateLink) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        (**self).get(id).await
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchResponse, RepositoryError> {
        (**self).search(params).await
    }

    async fn tags(&self) -> Result<Vec<TagCount>, RepositoryError> {
        (**self).tags().await
    }

    async fn upsert(&self, product: Product) -> Result<(), RepositoryError> {
        (**self).upsert(product).await
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<R> AffiliateLinkRepository for Arc<R>
where
    R: AffiliateLinkRepository + ?Sized,
{
    async fn get(&self, page_id: u64) -> Result<Option<AffiliateLink>, RepositoryError> {
        (**self).get(page_id).await
    }

    async fn upsert(&self, link: AffiliateLink) -> Result<(), RepositoryError> {
        (**self).upsert(link).await
    }
}
