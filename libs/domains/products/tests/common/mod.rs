#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use domain_products::{
    Pagination, Product, ProductCache, ProductError, ProductRepository, ProductResult,
    ProductService, ProductsList, ProductsProducer,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use stream_worker::memory::InMemoryWriter;
use uuid::Uuid;

/// Store double with call counters and a switch to fail every write.
#[derive(Default)]
pub struct InMemoryRepository {
    rows: Mutex<Vec<Product>>,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    pub reads: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryRepository {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn stored(&self, id: Uuid) -> Option<Product> {
        self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }

    fn check_writable(&self) -> ProductResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ProductError::Persistence("primary unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryRepository {
    async fn create(&self, product: Product) -> ProductResult<Product> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        let now = Utc::now();
        let created = Product {
            id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
            ..product
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, product: Product) -> ProductResult<Product> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        if product.id.is_nil() {
            return Err(ProductError::Validation("productId is required for update".into()));
        }

        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let position = rows.iter().position(|p| p.id == product.id);
        let row = match position {
            Some(index) => &mut rows[index],
            None => {
                rows.push(Product {
                    created_at: now,
                    updated_at: now - ChronoDuration::milliseconds(1),
                    ..product.clone()
                });
                rows.last_mut().unwrap()
            }
        };

        if !product.category_id.is_empty() {
            row.category_id = product.category_id;
        }
        if !product.name.is_empty() {
            row.name = product.name;
        }
        if !product.description.is_empty() {
            row.description = product.description;
        }
        if product.price > 0.0 {
            row.price = product.price;
        }
        if let Some(image_url) = product.image_url.filter(|url| !url.is_empty()) {
            row.image_url = Some(image_url);
        }
        if !product.photos.is_empty() {
            row.photos = product.photos;
        }
        if product.quantity > 0 {
            row.quantity = product.quantity;
        }
        row.rating = product.rating;
        row.updated_at = now.max(row.updated_at + ChronoDuration::milliseconds(1));
        Ok(row.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Product> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.stored(id).ok_or(ProductError::NotFound(id))
    }

    async fn search(&self, text: &str, pagination: Pagination) -> ProductResult<ProductsList> {
        let needle = text.to_lowercase();
        let matches: Vec<Product> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        let total = matches.len() as u64;
        if total == 0 {
            return Ok(ProductsList::empty());
        }
        let page = matches
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok(ProductsList::new(total, &pagination, page))
    }
}

/// Cache double keyed by id; `poison` stores an entry that fails to decode.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<Uuid, String>>,
    pub sets: AtomicUsize,
}

impl InMemoryCache {
    pub fn poison(&self, id: Uuid) {
        self.entries.lock().unwrap().insert(id, "{not json".to_string());
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.lock().unwrap().contains_key(&id)
    }
}

#[async_trait]
impl ProductCache for InMemoryCache {
    async fn set(&self, product: &Product) -> ProductResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        let payload = serde_json::to_string(product)?;
        self.entries.lock().unwrap().insert(product.id, payload);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let entry = self.entries.lock().unwrap().get(&id).cloned();
        entry
            .map(|payload| {
                serde_json::from_str(&payload).map_err(|e| ProductError::Cache(e.to_string()))
            })
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> ProductResult<()> {
        self.entries.lock().unwrap().remove(&id);
        Ok(())
    }
}

pub type TestService = ProductService<InMemoryRepository, InMemoryCache, ProductsProducer>;

pub struct Harness {
    pub repository: Arc<InMemoryRepository>,
    pub cache: Arc<InMemoryCache>,
    pub create_topic: Arc<InMemoryWriter>,
    pub update_topic: Arc<InMemoryWriter>,
    pub service: Arc<TestService>,
}

impl Harness {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryRepository::default());
        let cache = Arc::new(InMemoryCache::default());
        let create_topic = Arc::new(InMemoryWriter::new("create-product"));
        let update_topic = Arc::new(InMemoryWriter::new("update-product"));
        let producer = Arc::new(ProductsProducer::from_writers(
            create_topic.clone(),
            update_topic.clone(),
        ));
        let service = Arc::new(ProductService::new(
            repository.clone(),
            cache.clone(),
            producer,
        ));

        Self {
            repository,
            cache,
            create_topic,
            update_topic,
            service,
        }
    }
}

pub fn product(name: &str) -> Product {
    Product {
        category_id: "outdoor".to_string(),
        name: name.to_string(),
        description: format!("{name} for camping"),
        price: 49.0,
        image_url: Some("https://img/tent.png".to_string()),
        photos: vec!["https://img/tent-1.png".to_string()],
        quantity: 12,
        rating: 8,
        ..Default::default()
    }
}
