//! Products Domain
//!
//! Product mutations arrive either synchronously over HTTP or as intents on
//! Kafka topics. Both paths end in the same use cases, which write to MongoDB
//! and keep a Redis copy of single products.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐        ┌──────────────────┐
//! │ Handlers │   │ Consumer     │◄───────│ create-product   │
//! │ (axum)   │   │ group        │        │ update-product   │
//! └────┬─────┘   └──────┬───────┘        └────────▲─────────┘
//!      │                │                         │
//! ┌────▼────────────────▼───┐   publish   ┌───────┴──────────┐
//! │ ProductService          │────────────►│ ProductsProducer │
//! └────┬───────────────┬────┘             └──────────────────┘
//!      │               │
//! ┌────▼───────┐  ┌────▼─────────┐
//! │ Repository │  │ Cache        │
//! │ (MongoDB)  │  │ (Redis)      │
//! └────────────┘  └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_products::{
//!     CacheConfig, MongoProductRepository, ProductService, ProductUseCase, ProductsProducer,
//!     RedisProductCache, handlers,
//! };
//! use stream_worker::KafkaConfig;
//!
//! # async fn example(
//! #     db: mongodb::Database,
//! #     redis: database::redis::ConnectionManager,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let producer = Arc::new(ProductsProducer::new(KafkaConfig::default()));
//! producer.run()?;
//!
//! let service: Arc<dyn ProductUseCase> = Arc::new(ProductService::new(
//!     Arc::new(MongoProductRepository::new(&db)),
//!     Arc::new(RedisProductCache::new(redis, CacheConfig::default())),
//!     producer,
//! ));
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod consumer_group;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod pagination;
pub mod processor;
pub mod repository;
pub mod service;
pub mod streams;

pub use cache::{CacheConfig, ProductCache, RedisProductCache};
pub use consumer_group::{PipelineConfig, ProductsConsumerGroup};
pub use error::{ProductError, ProductResult};
pub use events::{ProductPublisher, ProductsProducer};
pub use models::{Product, ProductsList};
pub use mongodb::MongoProductRepository;
pub use pagination::{Pagination, SearchQuery};
pub use processor::{CreateProductProcessor, UpdateProductProcessor};
pub use repository::ProductRepository;
pub use service::{ProductService, ProductUseCase};
pub use streams::{CreateProductStream, UpdateProductStream};
