//! Infrastructure layer: product/affiliate repositories (in-memory and
//! Postgres) and seed loading.

pub mod repository;
pub mod seed;

pub use repository::{
    AffiliateLinkRepository, InMemoryStore, PgAffiliateLinkRepository, PgProductRepository,
    ProductRepository, RepositoryError,
};
