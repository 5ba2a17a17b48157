use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use super::RedisConfig;
use crate::common::{BackoffPolicy, DatabaseError, DatabaseResult, with_backoff};

/// Build a reconnecting connection manager and verify it with `PING`.
///
/// The manager is cheap to clone; callers clone it per command.
pub async fn connect(config: &RedisConfig) -> DatabaseResult<ConnectionManager> {
    info!("connecting to Redis");

    let client = Client::open(config.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    ping(&manager).await?;

    info!("connected to Redis");
    Ok(manager)
}

pub async fn connect_with_retry(
    config: &RedisConfig,
    policy: &BackoffPolicy,
) -> DatabaseResult<ConnectionManager> {
    with_backoff("redis", policy, || connect(config)).await
}

pub async fn ping(manager: &ConnectionManager) -> DatabaseResult<()> {
    let mut conn = manager.clone();
    let reply: String = redis::cmd("PING")
        .query_async(&mut conn)
        .await
        .map_err(|e| DatabaseError::Unreachable {
            store: "redis",
            details: e.to_string(),
        })?;

    if reply == "PONG" {
        Ok(())
    } else {
        Err(DatabaseError::Unreachable {
            store: "redis",
            details: format!("unexpected PING reply: {reply}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires actual Redis
    async fn test_connect() {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        assert!(connect(&RedisConfig::new(url)).await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let result = connect(&RedisConfig::new("http://not-redis")).await;
        assert!(matches!(result, Err(DatabaseError::Redis(_))));
    }
}
