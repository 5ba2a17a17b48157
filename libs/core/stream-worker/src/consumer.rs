//! Consumer-group reader backed by librdkafka.

use crate::config::KafkaConfig;
use crate::error::StreamError;
use crate::message::StreamMessage;
use crate::transport::MessageReader;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::BorrowedMessage;
use rdkafka::{Message, Offset, TopicPartitionList};
use std::sync::Arc;
use tracing::{debug, info};

/// One subscription shared by every worker of a pool.
///
/// `StreamConsumer::recv` is cancel-safe and may be awaited from several
/// tasks at once; each message is handed to exactly one of them.
pub struct KafkaReader {
    consumer: Arc<StreamConsumer>,
    topic: String,
    sync_commit: bool,
}

impl KafkaReader {
    pub fn new(
        config: &KafkaConfig,
        topic: impl Into<String>,
        stream_group: &str,
    ) -> Result<Self, StreamError> {
        let topic = topic.into();
        let consumer: StreamConsumer = config.consumer_client_config(stream_group).create()?;
        consumer.subscribe(&[topic.as_str()])?;

        info!(
            topic = %topic,
            group = %config.group_for(stream_group),
            sync_commit = config.commits_synchronously(),
            "Subscribed to topic"
        );

        Ok(Self {
            consumer: Arc::new(consumer),
            topic,
            sync_commit: config.commits_synchronously(),
        })
    }
}

/// Group position after `message`: the next offset to read.
///
/// Both commit modes hand this list to the client as-is. The per-message
/// `store_offset` call is avoided because librdkafka adds one to the offset
/// it is given.
fn commit_position(message: &StreamMessage) -> Result<TopicPartitionList, StreamError> {
    let mut positions = TopicPartitionList::new();
    positions.add_partition_offset(
        &message.topic,
        message.partition,
        Offset::Offset(message.offset + 1),
    )?;
    Ok(positions)
}

fn detach(message: &BorrowedMessage<'_>) -> StreamMessage {
    let mut owned = StreamMessage::new(
        message.topic(),
        message.partition(),
        message.offset(),
        message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
    );
    if let Some(ts) = message
        .timestamp()
        .to_millis()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
    {
        owned = owned.with_timestamp(ts);
    }
    owned
}

#[async_trait]
impl MessageReader for KafkaReader {
    async fn fetch(&self) -> Result<StreamMessage, StreamError> {
        let message = self.consumer.recv().await.map(|m| detach(&m))?;
        Ok(message)
    }

    async fn commit(&self, message: &StreamMessage) -> Result<(), StreamError> {
        let positions = commit_position(message)?;

        if !self.sync_commit {
            // Flushed by the client on the auto-commit interval
            self.consumer.store_offsets(&positions)?;
            return Ok(());
        }

        let consumer = Arc::clone(&self.consumer);
        tokio::task::spawn_blocking(move || consumer.commit(&positions, CommitMode::Sync))
            .await
            .map_err(|e| StreamError::transport(format!("commit task failed: {e}")))??;

        debug!(
            topic = %message.topic,
            partition = message.partition,
            offset = message.offset,
            "Committed offset"
        );
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn close(&self) -> Result<(), StreamError> {
        self.consumer.unsubscribe();
        info!(topic = %self.topic, "Left consumer group");
        Ok(())
    }
}
