//! Product use cases: store, cache and producer coordination.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::cache::ProductCache;
use crate::error::{ProductError, ProductResult};
use crate::events::ProductPublisher;
use crate::models::{Product, ProductsList};
use crate::pagination::Pagination;
use crate::repository::ProductRepository;

/// Operations exposed to HTTP handlers and stream processors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductUseCase: Send + Sync {
    async fn create(&self, product: Product) -> ProductResult<Product>;
    async fn update(&self, product: Product) -> ProductResult<Product>;
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Product>;
    async fn search(&self, text: &str, pagination: Pagination) -> ProductResult<ProductsList>;
    async fn publish_create(&self, product: Product) -> ProductResult<()>;
    async fn publish_update(&self, product: Product) -> ProductResult<()>;
}

pub struct ProductService<R, C, P>
where
    R: ProductRepository,
    C: ProductCache,
    P: ProductPublisher,
{
    repository: Arc<R>,
    cache: Arc<C>,
    publisher: Arc<P>,
}

impl<R, C, P> ProductService<R, C, P>
where
    R: ProductRepository,
    C: ProductCache,
    P: ProductPublisher,
{
    pub fn new(repository: Arc<R>, cache: Arc<C>, publisher: Arc<P>) -> Self {
        Self {
            repository,
            cache,
            publisher,
        }
    }

    /// Cache write that never fails the caller.
    async fn remember(&self, product: &Product) {
        if let Err(e) = self.cache.set(product).await {
            warn!(product_id = %product.id, error = %e, "Failed to cache product");
        }
    }
}

#[async_trait]
impl<R, C, P> ProductUseCase for ProductService<R, C, P>
where
    R: ProductRepository,
    C: ProductCache,
    P: ProductPublisher,
{
    #[instrument(skip(self, product), fields(product_name = %product.name))]
    async fn create(&self, product: Product) -> ProductResult<Product> {
        product.ensure_valid()?;
        self.repository.create(product).await
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update(&self, product: Product) -> ProductResult<Product> {
        product.ensure_valid()?;
        let updated = self.repository.update(product).await?;
        self.remember(&updated).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Product> {
        match self.cache.get(id).await {
            Ok(Some(product)) => {
                debug!(product_id = %id, "Cache hit");
                return Ok(product);
            }
            Ok(None) => debug!(product_id = %id, "Cache miss"),
            Err(e) => warn!(product_id = %id, error = %e, "Cache read failed, using store"),
        }

        let product = self.repository.get_by_id(id).await?;
        self.remember(&product).await;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn search(&self, text: &str, pagination: Pagination) -> ProductResult<ProductsList> {
        self.repository.search(text, pagination).await
    }

    #[instrument(skip(self, product), fields(product_name = %product.name))]
    async fn publish_create(&self, product: Product) -> ProductResult<()> {
        product.ensure_valid()?;
        let payload = serde_json::to_vec(&product)?;
        self.publisher.publish_create(payload).await
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn publish_update(&self, product: Product) -> ProductResult<()> {
        product.ensure_valid()?;
        if !product.is_persisted() {
            return Err(ProductError::Validation(
                "productId is required for update".to_string(),
            ));
        }
        let payload = serde_json::to_vec(&product)?;
        self.publisher.publish_update(payload).await
    }
}
