use mongodb::{Client, bson::doc, options::ClientOptions};
use tracing::info;

use super::MongoConfig;
use crate::common::{BackoffPolicy, DatabaseError, DatabaseResult, with_backoff};

/// Open a client and verify it with a `ping` against the configured database.
pub async fn connect(config: &MongoConfig) -> DatabaseResult<Client> {
    info!(database = %config.database, "connecting to MongoDB");

    let mut options = ClientOptions::parse(&config.uri).await?;
    options.max_pool_size = Some(config.max_pool_size);
    options.connect_timeout = Some(config.connect_timeout);
    options.server_selection_timeout = Some(config.server_selection_timeout);
    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    let client = Client::with_options(options)?;
    ping(&client, &config.database).await?;

    info!(database = %config.database, "connected to MongoDB");
    Ok(client)
}

pub async fn connect_with_retry(
    config: &MongoConfig,
    policy: &BackoffPolicy,
) -> DatabaseResult<Client> {
    with_backoff("mongodb", policy, || connect(config)).await
}

/// Round trip used by the connector and readiness checks.
pub async fn ping(client: &Client, database: &str) -> DatabaseResult<()> {
    client
        .database(database)
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
        .map_err(|e| DatabaseError::Unreachable {
            store: "mongodb",
            details: e.to_string(),
        })
}
