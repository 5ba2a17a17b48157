/// Errors raised while establishing or verifying a store connection.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The connection was opened but the verification round trip failed
    #[error("Connection check failed for {store}: {details}")]
    Unreachable { store: &'static str, details: String },
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
