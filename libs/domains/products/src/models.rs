use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::pagination::Pagination;

/// Product entity
///
/// The same shape travels over HTTP, through the create/update topics and
/// into the cache. `id` is nil until the store has persisted the product;
/// the timestamps are owned by the store and ignored on input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "productId", default)]
    pub id: Uuid,

    #[serde(default)]
    pub category_id: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 250))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 500))]
    pub description: String,

    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default)]
    pub photos: Vec<String>,

    #[serde(default)]
    #[validate(range(min = 1))]
    pub quantity: i64,

    #[serde(default)]
    #[validate(range(min = 0, max = 10))]
    pub rating: i32,

    #[serde(default)]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_persisted(&self) -> bool {
        !self.id.is_nil()
    }

    /// Run the field rules, mapping failures to [`ProductError::Validation`].
    pub fn ensure_valid(&self) -> ProductResult<()> {
        self.validate()
            .map_err(|e| ProductError::Validation(e.to_string()))
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsList {
    pub total_count: u64,
    pub total_pages: u64,
    pub page: u64,
    pub size: u64,
    pub has_more: bool,
    pub products: Vec<Product>,
}

impl ProductsList {
    pub fn new(total_count: u64, pagination: &Pagination, products: Vec<Product>) -> Self {
        Self {
            total_count,
            total_pages: pagination.total_pages(total_count),
            page: pagination.page(),
            size: pagination.size(),
            has_more: pagination.has_more(total_count),
            products,
        }
    }

    /// No matches: every counter is zero.
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            total_pages: 0,
            page: 0,
            size: 0,
            has_more: false,
            products: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_product() -> Product {
        Product {
            category_id: "electronics".to_string(),
            name: "Mechanical keyboard".to_string(),
            description: "Tenkeyless, brown switches".to_string(),
            price: 89.9,
            quantity: 4,
            rating: 7,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_product_passes() {
        assert!(valid_product().ensure_valid().is_ok());
    }

    #[test]
    fn test_field_rules() {
        let cases: Vec<(&str, Product)> = vec![
            ("empty name", Product { name: String::new(), ..valid_product() }),
            ("long name", Product { name: "n".repeat(251), ..valid_product() }),
            ("empty description", Product { description: String::new(), ..valid_product() }),
            ("long description", Product { description: "d".repeat(501), ..valid_product() }),
            ("zero price", Product { price: 0.0, ..valid_product() }),
            ("negative price", Product { price: -1.0, ..valid_product() }),
            ("zero quantity", Product { quantity: 0, ..valid_product() }),
            ("negative rating", Product { rating: -1, ..valid_product() }),
            ("rating above ten", Product { rating: 11, ..valid_product() }),
        ];

        for (case, product) in cases {
            assert!(
                matches!(product.ensure_valid(), Err(ProductError::Validation(_))),
                "{case} should be rejected"
            );
        }
    }

    #[test]
    fn test_boundaries_accepted() {
        let product = Product {
            name: "n".repeat(250),
            description: "d".repeat(500),
            rating: 10,
            quantity: 1,
            ..valid_product()
        };
        assert!(product.ensure_valid().is_ok());
        assert!(Product { rating: 0, ..valid_product() }.ensure_valid().is_ok());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let id = Uuid::now_v7();
        let product = Product {
            id,
            image_url: Some("https://img/1.png".to_string()),
            ..valid_product()
        };
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["productId"], id.to_string());
        assert_eq!(json["categoryId"], "electronics");
        assert_eq!(json["imageUrl"], "https://img/1.png");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn test_decode_without_id_is_unpersisted() {
        let product: Product = serde_json::from_value(json!({
            "name": "Mug",
            "description": "Ceramic",
            "price": 4.5,
            "quantity": 10,
            "rating": 3
        }))
        .unwrap();

        assert!(!product.is_persisted());
        assert!(product.photos.is_empty());
        assert!(product.image_url.is_none());
    }

    #[test]
    fn test_empty_list_zeroes_every_counter() {
        let list = ProductsList::empty();

        assert_eq!(list.total_count, 0);
        assert_eq!(list.total_pages, 0);
        assert_eq!((list.page, list.size), (0, 0));
        assert!(!list.has_more);
        assert!(list.products.is_empty());
    }

    #[test]
    fn test_list_echoes_request_page() {
        let pagination = Pagination::new(2, 5).unwrap();
        let list = ProductsList::new(12, &pagination, Vec::new());

        assert_eq!((list.page, list.size), (2, 5));
        assert_eq!(list.total_pages, 3);
        assert!(list.has_more);
    }
}
