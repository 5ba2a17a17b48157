//! Publishing create/update intents onto their topics.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use stream_worker::{KafkaConfig, KafkaWriter, MessageWriter, StreamDef};
use tracing::{info, instrument, warn};

use crate::error::{ProductError, ProductResult};
use crate::streams::{CreateProductStream, UpdateProductStream};

/// Hands serialized products to the create and update topics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductPublisher: Send + Sync {
    async fn publish_create(&self, payload: Vec<u8>) -> ProductResult<()>;
    async fn publish_update(&self, payload: Vec<u8>) -> ProductResult<()>;
}

struct Writers {
    create: Arc<dyn MessageWriter>,
    update: Arc<dyn MessageWriter>,
}

/// Producer for both intent topics.
///
/// Writers are built by [`ProductsProducer::run`]; publishing before that
/// fails with [`ProductError::Transport`].
pub struct ProductsProducer {
    kafka: KafkaConfig,
    writers: OnceCell<Writers>,
}

impl ProductsProducer {
    pub fn new(kafka: KafkaConfig) -> Self {
        Self {
            kafka,
            writers: OnceCell::new(),
        }
    }

    /// A producer that is already running on the given writers.
    pub fn from_writers(create: Arc<dyn MessageWriter>, update: Arc<dyn MessageWriter>) -> Self {
        Self {
            kafka: KafkaConfig::default(),
            writers: OnceCell::with_value(Writers { create, update }),
        }
    }

    /// Build both writers exactly once. Concurrent and repeated calls wait
    /// for, then reuse, the first successful build.
    pub fn run(&self) -> ProductResult<()> {
        self.writers.get_or_try_init(|| -> ProductResult<Writers> {
            let create = KafkaWriter::new(&self.kafka, CreateProductStream::TOPIC)?;
            let update = KafkaWriter::new(&self.kafka, UpdateProductStream::TOPIC)?;

            info!(
                create_topic = CreateProductStream::TOPIC,
                update_topic = UpdateProductStream::TOPIC,
                "Products producer running"
            );
            Ok(Writers {
                create: Arc::new(create),
                update: Arc::new(update),
            })
        })?;
        Ok(())
    }

    /// Flush both writers. Both are attempted; the first error is returned.
    pub async fn close(&self) -> ProductResult<()> {
        let Some(writers) = self.writers.get() else {
            return Ok(());
        };

        let create = writers.create.close().await;
        let update = writers.update.close().await;
        for (topic, result) in [(writers.create.topic(), &create), (writers.update.topic(), &update)] {
            if let Err(e) = result {
                warn!(topic, error = %e, "Failed to flush writer");
            }
        }

        create?;
        update?;
        Ok(())
    }

    fn writers(&self) -> ProductResult<&Writers> {
        self.writers
            .get()
            .ok_or_else(|| ProductError::Transport("producer is not running".to_string()))
    }
}

#[async_trait]
impl ProductPublisher for ProductsProducer {
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn publish_create(&self, payload: Vec<u8>) -> ProductResult<()> {
        self.writers()?.create.write(&payload).await?;
        Ok(())
    }

    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn publish_update(&self, payload: Vec<u8>) -> ProductResult<()> {
        self.writers()?.update.write(&payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stream_worker::memory::InMemoryWriter;

    #[tokio::test]
    async fn test_publish_before_run_is_transport_error() {
        let producer = ProductsProducer::new(KafkaConfig::default());
        let result = producer.publish_create(b"{}".to_vec()).await;
        assert!(matches!(result, Err(ProductError::Transport(_))));
    }

    #[test]
    fn test_concurrent_run_builds_writers_once() {
        let producer = ProductsProducer::new(KafkaConfig::default());

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| producer.run().unwrap());
            }
        });
        let first = Arc::clone(&producer.writers.get().unwrap().create);

        producer.run().unwrap();
        assert!(Arc::ptr_eq(&first, &producer.writers.get().unwrap().create));
    }

    #[test]
    fn test_run_keeps_injected_writers() {
        let create: Arc<dyn MessageWriter> =
            Arc::new(InMemoryWriter::new(CreateProductStream::TOPIC));
        let update = Arc::new(InMemoryWriter::new(UpdateProductStream::TOPIC));
        let producer = ProductsProducer::from_writers(Arc::clone(&create), update);

        producer.run().unwrap();
        assert!(Arc::ptr_eq(&create, &producer.writers.get().unwrap().create));
    }

    #[tokio::test]
    async fn test_close_before_run_is_noop() {
        let producer = ProductsProducer::new(KafkaConfig::default());
        assert!(producer.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_routes_by_intent() {
        let create = Arc::new(InMemoryWriter::new(CreateProductStream::TOPIC));
        let update = Arc::new(InMemoryWriter::new(UpdateProductStream::TOPIC));
        let producer = ProductsProducer::from_writers(create.clone(), update.clone());

        producer.publish_create(b"c".to_vec()).await.unwrap();
        producer.publish_update(b"u1".to_vec()).await.unwrap();
        producer.publish_update(b"u2".to_vec()).await.unwrap();

        assert_eq!(create.written(), vec![b"c".to_vec()]);
        assert_eq!(update.written(), vec![b"u1".to_vec(), b"u2".to_vec()]);
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_as_transport() {
        let create = Arc::new(InMemoryWriter::new(CreateProductStream::TOPIC));
        let update = Arc::new(InMemoryWriter::new(UpdateProductStream::TOPIC));
        create.fail_writes(true);
        let producer = ProductsProducer::from_writers(create, update);

        let result = producer.publish_create(b"c".to_vec()).await;
        assert!(matches!(result, Err(ProductError::Transport(_))));
    }

    #[tokio::test]
    async fn test_close_flushes_both_writers() {
        let create = Arc::new(InMemoryWriter::new(CreateProductStream::TOPIC));
        let update = Arc::new(InMemoryWriter::new(UpdateProductStream::TOPIC));
        let producer = ProductsProducer::from_writers(create.clone(), update.clone());

        producer.close().await.unwrap();
        assert!(create.is_closed());
        assert!(update.is_closed());
    }
}
