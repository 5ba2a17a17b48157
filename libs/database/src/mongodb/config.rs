use std::time::Duration;

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};

/// MongoDB connection settings.
///
/// ```ignore
/// let config = MongoConfig::new("mongodb://localhost:27017", "products");
/// let config = MongoConfig::from_env()?; // with the `config` feature
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MongoConfig {
    /// mongodb://[username:password@]host[:port][/?options]
    pub uri: String,
    pub database: String,
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub connect_timeout: Duration,
    pub server_selection_timeout: Duration,
}

impl MongoConfig {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            app_name: None,
            max_pool_size: 100,
            connect_timeout: Duration::from_secs(10),
            server_selection_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }
}

#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    /// - `MONGO_URI` (required)
    /// - `MONGO_DATABASE`: defaults to "products"
    /// - `MONGO_APP_NAME`: optional
    /// - `MONGO_MAX_POOL_SIZE`: defaults to 100
    /// - `MONGO_CONNECT_TIMEOUT_SECS`: defaults to 10
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(
            env_required("MONGO_URI")?,
            env_or_default("MONGO_DATABASE", "products"),
        );
        config.app_name = std::env::var("MONGO_APP_NAME").ok();
        config.max_pool_size = env_parse("MONGO_MAX_POOL_SIZE", config.max_pool_size)?;
        config.connect_timeout = Duration::from_secs(env_parse(
            "MONGO_CONNECT_TIMEOUT_SECS",
            config.connect_timeout.as_secs(),
        )?);
        Ok(config)
    }
}
