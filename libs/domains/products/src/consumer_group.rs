//! Consumer group for the product intent topics.
//!
//! One worker pool per topic. Each pool runs on a child of the process
//! shutdown token, so a broker failure on one topic stops only that pool.

use core_config::{ConfigError, FromEnv, env_parse};
use std::sync::Arc;
use std::time::Duration;
use stream_worker::{
    CancellationToken, KafkaConfig, RetryPolicy, StreamDef, StreamError, StreamWorker,
    WorkerConfig,
};
use tracing::{error, info};

use crate::models::Product;
use crate::processor::{CreateProductProcessor, UpdateProductProcessor};
use crate::service::ProductUseCase;
use crate::streams::{CreateProductStream, UpdateProductStream};

/// Pool sizes and retry policy for both topics.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub create_workers: usize,
    pub update_workers: usize,
    pub retry: RetryPolicy,
    pub commit_dead_lettered: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            create_workers: CreateProductStream::WORKERS,
            update_workers: UpdateProductStream::WORKERS,
            retry: RetryPolicy::default(),
            commit_dead_lettered: false,
        }
    }
}

impl PipelineConfig {
    /// Worker settings for one topic of this pipeline.
    pub fn worker_config<S: StreamDef>(&self, workers: usize) -> WorkerConfig {
        WorkerConfig::from_stream_def::<S>()
            .with_workers(workers)
            .with_retry(self.retry)
            .with_commit_dead_lettered(self.commit_dead_lettered)
    }
}

impl FromEnv for PipelineConfig {
    /// - `CREATE_PRODUCT_WORKERS`, `UPDATE_PRODUCT_WORKERS` (default 3)
    /// - `CONSUMER_RETRY_ATTEMPTS` (default 1)
    /// - `CONSUMER_RETRY_DELAY_MS` (default 1000)
    /// - `COMMIT_DEAD_LETTERED` (default false)
    fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        let delay_ms: u64 = env_parse(
            "CONSUMER_RETRY_DELAY_MS",
            d.retry.delay.as_millis() as u64,
        )?;

        Ok(Self {
            create_workers: env_parse("CREATE_PRODUCT_WORKERS", d.create_workers)?,
            update_workers: env_parse("UPDATE_PRODUCT_WORKERS", d.update_workers)?,
            retry: RetryPolicy::new(
                env_parse("CONSUMER_RETRY_ATTEMPTS", d.retry.attempts)?,
                Duration::from_millis(delay_ms),
            ),
            commit_dead_lettered: env_parse("COMMIT_DEAD_LETTERED", d.commit_dead_lettered)?,
        })
    }
}

pub type CreateWorker = StreamWorker<Product, CreateProductProcessor>;
pub type UpdateWorker = StreamWorker<Product, UpdateProductProcessor>;

/// Both product pools.
pub struct ProductsConsumerGroup {
    create: CreateWorker,
    update: UpdateWorker,
}

impl ProductsConsumerGroup {
    pub fn new(create: CreateWorker, update: UpdateWorker) -> Self {
        Self { create, update }
    }

    /// Subscribe both topics and open their dead-letter writers.
    pub fn connect(
        kafka: &KafkaConfig,
        pipeline: &PipelineConfig,
        use_case: Arc<dyn ProductUseCase>,
    ) -> Result<Self, StreamError> {
        let create = StreamWorker::connect(
            kafka,
            Arc::new(CreateProductProcessor::new(Arc::clone(&use_case))),
            pipeline.worker_config::<CreateProductStream>(pipeline.create_workers),
        )?;
        let update = StreamWorker::connect(
            kafka,
            Arc::new(UpdateProductProcessor::new(use_case)),
            pipeline.worker_config::<UpdateProductStream>(pipeline.update_workers),
        )?;
        Ok(Self::new(create, update))
    }

    pub fn create_worker(&self) -> &CreateWorker {
        &self.create
    }

    pub fn update_worker(&self) -> &UpdateWorker {
        &self.update
    }

    /// Run both pools until `shutdown` fires or each has stopped on its own.
    ///
    /// Both pools are always drained; the first pool error is returned.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), StreamError> {
        let create_token = shutdown.child_token();
        let update_token = shutdown.child_token();

        info!(
            create_topic = CreateProductStream::TOPIC,
            update_topic = UpdateProductStream::TOPIC,
            "Starting products consumer group"
        );

        let (create, update) = tokio::join!(
            self.create.run(create_token),
            self.update.run(update_token)
        );

        for (topic, result) in [
            (CreateProductStream::TOPIC, &create),
            (UpdateProductStream::TOPIC, &update),
        ] {
            if let Err(e) = result {
                error!(topic, error = %e, "Worker pool failed");
            }
        }

        info!("Products consumer group stopped");
        create.and(update)
    }
}
