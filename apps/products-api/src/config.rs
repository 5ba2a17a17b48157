//! Configuration for Products API

use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::BackoffPolicy;
use database::mongodb::MongoConfig;
use database::redis::RedisConfig;
use domain_products::{CacheConfig, PipelineConfig};
use stream_worker::KafkaConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub redis: RedisConfig,
    pub cache: CacheConfig,
    pub kafka: KafkaConfig,
    pub pipeline: PipelineConfig,
    pub connect_backoff: BackoffPolicy,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            mongodb: MongoConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            kafka: KafkaConfig::from_env()?,
            pipeline: PipelineConfig::from_env()?,
            connect_backoff: BackoffPolicy::from_env()?,
        })
    }
}
