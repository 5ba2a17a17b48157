//! Redis connection management for the product cache.

mod config;
mod connector;

pub use config::RedisConfig;
pub use connector::{connect, connect_with_retry, ping};

pub use redis::aio::ConnectionManager;
pub use redis::{AsyncCommands, RedisResult};
