//! Redis cache-aside layer for single products.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use database::redis::{AsyncCommands, ConnectionManager};
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::Product;

pub const DEFAULT_KEY_PREFIX: &str = "products";
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Product cache keyed by id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCache: Send + Sync {
    /// Store `product` under its id with the configured expiry.
    async fn set(&self, product: &Product) -> ProductResult<()>;

    /// `Ok(None)` on a miss. A cached value that no longer decodes is a
    /// [`ProductError::Cache`].
    async fn get(&self, id: Uuid) -> ProductResult<Option<Product>>;

    async fn delete(&self, id: Uuid) -> ProductResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub key_prefix: String,
    pub ttl: Duration,
}

impl CacheConfig {
    /// `<prefix>: <id>`
    pub fn key(&self, id: Uuid) -> String {
        format!("{}: {}", self.key_prefix, id)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl: DEFAULT_TTL,
        }
    }
}

impl FromEnv for CacheConfig {
    /// - `CACHE_KEY_PREFIX` (default `products`)
    /// - `CACHE_TTL_SECS` (default 3600, must be positive)
    fn from_env() -> Result<Self, ConfigError> {
        let ttl_secs: u64 = env_parse("CACHE_TTL_SECS", DEFAULT_TTL.as_secs())?;
        if ttl_secs == 0 {
            return Err(ConfigError::ParseError {
                key: "CACHE_TTL_SECS".to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self {
            key_prefix: env_or_default("CACHE_KEY_PREFIX", DEFAULT_KEY_PREFIX),
            ttl: Duration::from_secs(ttl_secs),
        })
    }
}

pub struct RedisProductCache {
    connection: ConnectionManager,
    config: CacheConfig,
}

impl RedisProductCache {
    pub fn new(connection: ConnectionManager, config: CacheConfig) -> Self {
        Self { connection, config }
    }
}

#[async_trait]
impl ProductCache for RedisProductCache {
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn set(&self, product: &Product) -> ProductResult<()> {
        let payload = serde_json::to_string(product)?;
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(self.config.key(product.id), payload, self.config.ttl.as_secs())
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let mut conn = self.connection.clone();
        let cached: Option<String> = conn.get(self.config.key(id)).await?;

        cached
            .map(|payload| {
                serde_json::from_str(&payload)
                    .map_err(|e| ProductError::Cache(format!("undecodable entry for {id}: {e}")))
            })
            .transpose()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ProductResult<()> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(self.config.key(id)).await?;
        Ok(())
    }
}
