//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{self, Bson, Document, doc},
    options::ReturnDocument,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductsList};
use crate::pagination::Pagination;
use crate::repository::ProductRepository;

pub const DEFAULT_COLLECTION: &str = "products";

/// Stored form of a [`Product`]: string `_id`, BSON dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    category_id: String,
    name: String,
    description: String,
    price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(default)]
    photos: Vec<String>,
    quantity: i64,
    rating: i32,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl ProductDocument {
    fn for_insert(product: Product, id: Uuid, now: bson::DateTime) -> Self {
        Self {
            id: id.to_string(),
            category_id: product.category_id,
            name: product.name,
            description: product.description,
            price: product.price,
            image_url: product.image_url,
            photos: product.photos,
            quantity: product.quantity,
            rating: product.rating,
            created_at: now,
            updated_at: now,
        }
    }
}

fn to_chrono(value: bson::DateTime) -> ProductResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value.timestamp_millis()).ok_or_else(|| {
        ProductError::Persistence(format!("timestamp out of range: {value}"))
    })
}

impl TryFrom<ProductDocument> for Product {
    type Error = ProductError;

    fn try_from(document: ProductDocument) -> ProductResult<Self> {
        let id = Uuid::parse_str(&document.id).map_err(|e| {
            ProductError::Persistence(format!("stored id '{}' is not a UUID: {e}", document.id))
        })?;

        Ok(Product {
            id,
            category_id: document.category_id,
            name: document.name,
            description: document.description,
            price: document.price,
            image_url: document.image_url,
            photos: document.photos,
            quantity: document.quantity,
            rating: document.rating,
            created_at: to_chrono(document.created_at)?,
            updated_at: to_chrono(document.updated_at)?,
        })
    }
}

/// Wrap a caller-supplied value so the pipeline never reads it as an
/// expression (`"$name"` stays a string).
fn literal(value: impl Into<Bson>) -> Bson {
    Bson::Document(doc! { "$literal": value.into() })
}

/// Build the update pipeline for a partial merge.
///
/// Empty strings, empty photo lists, a missing image and non-positive
/// price/quantity count as "not supplied" and leave the stored value alone.
/// Rating is always written since 0 is a legal rating.
///
/// `updatedAt` becomes the server clock, or one millisecond past the stored
/// value when the clock has not moved, so it strictly increases. `createdAt`
/// is only filled when the row is being inserted.
fn update_pipeline(product: &Product) -> Vec<Document> {
    let mut set = Document::new();

    if !product.category_id.is_empty() {
        set.insert("categoryId", literal(product.category_id.as_str()));
    }
    if !product.name.is_empty() {
        set.insert("name", literal(product.name.as_str()));
    }
    if !product.description.is_empty() {
        set.insert("description", literal(product.description.as_str()));
    }
    if product.price > 0.0 {
        set.insert("price", literal(product.price));
    }
    if let Some(image_url) = product.image_url.as_deref().filter(|url| !url.is_empty()) {
        set.insert("imageUrl", literal(image_url));
    }
    if !product.photos.is_empty() {
        set.insert("photos", literal(product.photos.clone()));
    }
    if product.quantity > 0 {
        set.insert("quantity", literal(product.quantity));
    }
    set.insert("rating", literal(product.rating));

    set.insert(
        "updatedAt",
        doc! { "$max": ["$$NOW", { "$add": ["$updatedAt", 1] }] },
    );
    set.insert("createdAt", doc! { "$ifNull": ["$createdAt", "$$NOW"] });

    vec![doc! { "$set": set }]
}

fn search_filter(text: &str) -> Document {
    let pattern = regex::escape(text);
    doc! {
        "$or": [
            { "name": { "$regex": pattern.as_str(), "$options": "i" } },
            { "description": { "$regex": pattern.as_str(), "$options": "i" } },
        ]
    }
}

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<ProductDocument>(collection_name),
        }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(product_name = %product.name))]
    async fn create(&self, product: Product) -> ProductResult<Product> {
        let document = ProductDocument::for_insert(product, Uuid::now_v7(), bson::DateTime::now());

        self.collection.insert_one(&document).await?;

        tracing::info!(product_id = %document.id, "Product created");
        Product::try_from(document)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update(&self, product: Product) -> ProductResult<Product> {
        if !product.is_persisted() {
            return Err(ProductError::Validation(
                "productId is required for update".to_string(),
            ));
        }

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": product.id.to_string() }, update_pipeline(&product))
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| {
                ProductError::Persistence(format!("upsert of {} returned no document", product.id))
            })?;

        tracing::info!(product_id = %product.id, "Product updated");
        Product::try_from(updated)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Product> {
        self.collection
            .find_one(doc! { "_id": id.to_string() })
            .await?
            .ok_or(ProductError::NotFound(id))
            .and_then(Product::try_from)
    }

    #[instrument(skip(self), fields(page = pagination.page(), size = pagination.size()))]
    async fn search(&self, text: &str, pagination: Pagination) -> ProductResult<ProductsList> {
        let filter = search_filter(text);

        let total_count = self.collection.count_documents(filter.clone()).await?;
        if total_count == 0 {
            return Ok(ProductsList::empty());
        }

        let limit = i64::try_from(pagination.limit())
            .map_err(|_| ProductError::Validation("size is too large".to_string()))?;
        let documents: Vec<ProductDocument> = self
            .collection
            .find(filter)
            .skip(pagination.offset())
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        let products = documents
            .into_iter()
            .map(Product::try_from)
            .collect::<ProductResult<Vec<_>>>()?;

        tracing::debug!(total_count, returned = products.len(), "Search finished");
        Ok(ProductsList::new(total_count, &pagination, products))
    }
}
