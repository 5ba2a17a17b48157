use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{Product, ProductsList};
use crate::pagination::Pagination;

/// Durable product storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new product. The store assigns the id and both timestamps.
    async fn create(&self, product: Product) -> ProductResult<Product>;

    /// Merge the non-empty fields of `product` into the row with its id,
    /// inserting the row when none exists. Returns the row after the write.
    async fn update(&self, product: Product) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Product>;

    /// Case-insensitive substring match over name or description.
    async fn search(&self, text: &str, pagination: Pagination) -> ProductResult<ProductsList>;
}
