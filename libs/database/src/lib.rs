//! Connectors for the stores behind the products service.
//!
//! # Features
//!
//! - `mongodb` (default) - primary product store
//! - `redis` (default) - product cache
//! - `config` - `core_config::FromEnv` for the connection configs
//!
//! Both connectors verify the connection with a round trip before handing it
//! out, and both have a `*_with_retry` variant that retries with exponential
//! backoff so a service can start before its dependencies are ready.
//!
//! ```ignore
//! use database::{mongodb, redis, BackoffPolicy};
//!
//! let client = mongodb::connect_with_retry(&mongo_config, &BackoffPolicy::default()).await?;
//! let cache = redis::connect_with_retry(&redis_config, &BackoffPolicy::default()).await?;
//! ```

pub mod common;

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{BackoffPolicy, DatabaseError, DatabaseResult, with_backoff};
