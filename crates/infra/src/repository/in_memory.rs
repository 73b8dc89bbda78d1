use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use shopwise_catalog::{AffiliateLink, Product, SearchParams, SearchResponse, TagCount, search, tag_counts};
use shopwise_core::{Entity, ProductId};

use super::{AffiliateLinkRepository, ProductRepository, RepositoryError};

/// In-memory entity store for tests/dev, keyed by `Entity::Id`.
#[derive(Debug)]
pub struct InMemoryStore<E: Entity> {
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> InMemoryStore<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Entity> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStore<E>
where
    E: Entity + Clone,
{
    fn get_entity(&self, id: &E::Id) -> Result<Option<E>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(map.get(id).cloned())
    }

    fn upsert_entity(&self, entity: E) -> Result<(), RepositoryError> {
        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        map.insert(entity.id().clone(), entity);
        Ok(())
    }

    fn remove_entity(&self, id: &E::Id) -> Result<bool, RepositoryError> {
        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        Ok(map.remove(id).is_some())
    }

    /// Run `f` over a snapshot of all values under the read lock.
    fn with_values<T>(&self, f: impl FnOnce(&mut dyn Iterator<Item = &E>) -> T) -> Result<T, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(f(&mut map.values()))
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore<Product> {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.get_entity(&id)
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchResponse, RepositoryError> {
        self.with_values(|values| search(values, params))
    }

    async fn tags(&self) -> Result<Vec<TagCount>, RepositoryError> {
        self.with_values(|values| tag_counts(values))
    }

    async fn upsert(&self, product: Product) -> Result<(), RepositoryError> {
        self.upsert_entity(product)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        self.remove_entity(&id)
    }
}

#[async_trait]
impl AffiliateLinkRepository for InMemoryStore<AffiliateLink> {
    async fn get(&self, page_id: u64) -> Result<Option<AffiliateLink>, RepositoryError> {
        self.get_entity(&page_id)
    }

    async fn upsert(&self, link: AffiliateLink) -> Result<(), RepositoryError> {
        self.upsert_entity(link)
    }
}
