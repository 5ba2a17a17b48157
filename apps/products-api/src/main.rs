//! Products API - REST server and product intent consumers

use core_config::tracing::{init_tracing, install_color_eyre};
use domain_products::{
    MongoProductRepository, ProductService, ProductUseCase, ProductsConsumerGroup,
    ProductsProducer, RedisProductCache,
};
use std::sync::Arc;
use stream_worker::CancellationToken;
use tracing::{error, info};

mod api;
mod config;
mod server;
mod state;

use config::Config;
use state::{AppState, Backends};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment, &config.app);
    stream_worker::init_metrics()?;

    info!(
        name = config.app.name,
        version = config.app.version,
        environment = ?config.environment,
        "Starting Products API"
    );

    let mongo_client =
        database::mongodb::connect_with_retry(&config.mongodb, &config.connect_backoff).await?;
    let db = mongo_client.database(&config.mongodb.database);
    info!(database = %config.mongodb.database, "Connected to MongoDB");

    let redis = database::redis::connect_with_retry(&config.redis, &config.connect_backoff).await?;
    info!("Connected to Redis");

    let producer = Arc::new(ProductsProducer::new(config.kafka.clone()));
    producer.run()?;

    let use_case: Arc<dyn ProductUseCase> = Arc::new(ProductService::new(
        Arc::new(MongoProductRepository::new(&db)),
        Arc::new(RedisProductCache::new(redis.clone(), config.cache.clone())),
        Arc::clone(&producer),
    ));

    let shutdown = CancellationToken::new();
    tokio::spawn(server::shutdown_signal(shutdown.clone()));

    let consumers =
        ProductsConsumerGroup::connect(&config.kafka, &config.pipeline, Arc::clone(&use_case))?;
    let consumer_handle = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { consumers.run(shutdown).await }
    });

    let state = AppState {
        app: config.app.clone(),
        use_case,
        backends: Some(Backends {
            mongo_client: mongo_client.clone(),
            mongo_database: config.mongodb.database.clone(),
            redis,
        }),
    };
    let app = server::with_middleware(api::routes(state), &config.server);

    let serve_result = server::serve(app, &config.server, shutdown.clone()).await;

    // A failed listener still has to stop the consumers.
    shutdown.cancel();
    match consumer_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Consumer group stopped with an error"),
        Err(e) => error!(error = %e, "Consumer group task panicked"),
    }

    if let Err(e) = producer.close().await {
        error!(error = %e, "Failed to flush producer");
    }
    mongo_client.shutdown().await;

    serve_result.map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Products API shutdown complete");
    Ok(())
}
