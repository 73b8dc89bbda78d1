//! JSON seed files for dev/demo catalogs.
//!
//! ```json
//! {
//!   "products": [{ "id": "…optional uuid…", "title": "…", "price": {"amount": 1980, "currency": "JPY"}, "url": "https://…" }],
//!   "affiliate_links": [{ "page_id": 1, "destination": "https://…" }]
//! }
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use shopwise_catalog::{NewAffiliateLink, NewProduct};
use shopwise_core::{DomainError, ProductId};

use crate::repository::{AffiliateLinkRepository, ProductRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid seed record: {0}")]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(flatten)]
    pub product: NewProduct,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub affiliate_links: Vec<NewAffiliateLink>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub products: usize,
    pub affiliate_links: usize,
}

pub async fn load(path: impl AsRef<Path>) -> Result<SeedFile, SeedError> {
    let raw = tokio::fs::read_to_string(path.as_ref()).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write every record of `seed` through the repositories.
///
/// Validation happens before anything is written, so a bad record leaves the
/// repositories untouched.
pub async fn apply(
    seed: SeedFile,
    products: &dyn ProductRepository,
    links: &dyn AffiliateLinkRepository,
    now: DateTime<Utc>,
) -> Result<SeedSummary, SeedError> {
    let products_to_write = seed
        .products
        .into_iter()
        .map(|p| p.product.into_product(p.id.unwrap_or_default(), None, now))
        .collect::<Result<Vec<_>, _>>()?;
    let links_to_write = seed
        .affiliate_links
        .into_iter()
        .map(|l| l.into_link(now))
        .collect::<Result<Vec<_>, _>>()?;

    let summary = SeedSummary {
        products: products_to_write.len(),
        affiliate_links: links_to_write.len(),
    };

    for p in products_to_write {
        products.upsert(p).await?;
    }
    for l in links_to_write {
        links.upsert(l).await?;
    }

    tracing::info!(
        products = summary.products,
        affiliate_links = summary.affiliate_links,
        "seed applied"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use shopwise_catalog::{AffiliateLink, Product};
    use std::io::Write;

    const SEED: &str = r#"{
        "products": [
            {
                "id": "0190b4a0-0000-7000-8000-000000000001",
                "title": "Desk Lamp",
                "price": { "amount": 2980, "currency": "JPY" },
                "url": "https://item.rakuten.co.jp/shop/lamp/",
                "tags": ["home"]
            }
        ],
        "affiliate_links": [
            { "page_id": 1, "destination": "https://item.rakuten.co.jp/shop/lamp/" }
        ]
    }"#;

    #[tokio::test]
    async fn load_and_apply_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let seed = load(file.path()).await.unwrap();
        let products: InMemoryStore<Product> = InMemoryStore::new();
        let links: InMemoryStore<AffiliateLink> = InMemoryStore::new();

        let summary = apply(seed, &products, &links, Utc::now()).await.unwrap();
        assert_eq!(summary, SeedSummary { products: 1, affiliate_links: 1 });

        let id: ProductId = "0190b4a0-0000-7000-8000-000000000001".parse().unwrap();
        let lamp = ProductRepository::get(&products, id).await.unwrap().unwrap();
        assert_eq!(lamp.title, "Desk Lamp");
        assert_eq!(lamp.source, shopwise_catalog::Source::Rakuten);
        assert!(AffiliateLinkRepository::get(&links, 1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn invalid_record_writes_nothing() {
        let seed: SeedFile = serde_json::from_str(
            r#"{ "products": [
                { "title": "ok", "price": { "amount": 1, "currency": "JPY" }, "url": "https://a.example" },
                { "title": "", "price": { "amount": 1, "currency": "JPY" }, "url": "https://a.example" }
            ] }"#,
        )
        .unwrap();
        let products: InMemoryStore<Product> = InMemoryStore::new();
        let links: InMemoryStore<AffiliateLink> = InMemoryStore::new();

        let err = apply(seed, &products, &links, Utc::now()).await.unwrap_err();
        assert!(matches!(err, SeedError::Invalid(_)));
        assert!(products.is_empty());
    }
}
