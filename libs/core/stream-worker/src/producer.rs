//! Topic writer backed by librdkafka's `FutureProducer`.

use crate::balancer::LeastBytes;
use crate::config::KafkaConfig;
use crate::error::StreamError;
use crate::transport::MessageWriter;
use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Writes keyless records to a single topic.
///
/// Partitions are chosen by [`LeastBytes`]; the partition count is read from
/// cluster metadata on the first write and cached for the writer's lifetime.
pub struct KafkaWriter {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
    balancer: OnceCell<LeastBytes>,
}

impl KafkaWriter {
    pub fn new(config: &KafkaConfig, topic: impl Into<String>) -> Result<Self, StreamError> {
        let producer: FutureProducer = config.producer_client_config().create()?;
        let topic = topic.into();
        info!(topic = %topic, "Kafka writer created");

        Ok(Self {
            producer,
            topic,
            timeout: config.writer_timeout,
            balancer: OnceCell::new(),
        })
    }

    async fn balancer(&self) -> Result<&LeastBytes, StreamError> {
        self.balancer
            .get_or_try_init(|| async {
                let producer = self.producer.clone();
                let topic = self.topic.clone();
                let timeout = self.timeout;

                let partitions = tokio::task::spawn_blocking(move || {
                    producer
                        .client()
                        .fetch_metadata(Some(topic.as_str()), timeout)
                        .map(|metadata| {
                            metadata
                                .topics()
                                .first()
                                .map(|t| t.partitions().len())
                                .unwrap_or_default()
                        })
                })
                .await
                .map_err(|e| StreamError::transport(format!("metadata task failed: {e}")))??;

                if partitions == 0 {
                    return Err(StreamError::transport(format!(
                        "topic '{}' has no partitions",
                        self.topic
                    )));
                }
                debug!(topic = %self.topic, partitions, "Partition metadata loaded");
                Ok(LeastBytes::new(partitions))
            })
            .await
    }
}

#[async_trait]
impl MessageWriter for KafkaWriter {
    async fn write(&self, payload: &[u8]) -> Result<(), StreamError> {
        let partition = self.balancer().await?.pick(payload.len());
        let record = FutureRecord::<(), [u8]>::to(&self.topic)
            .payload(payload)
            .partition(partition);

        let (partition, offset) = self
            .producer
            .send(record, self.timeout)
            .await
            .map_err(|(err, _)| StreamError::Kafka(err))?;

        debug!(topic = %self.topic, partition, offset, "Record delivered");
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn close(&self) -> Result<(), StreamError> {
        let producer = self.producer.clone();
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || producer.flush(timeout))
            .await
            .map_err(|e| StreamError::transport(format!("flush task failed: {e}")))??;

        info!(topic = %self.topic, "Kafka writer flushed");
        Ok(())
    }
}
