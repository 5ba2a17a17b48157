//! Dead-letter envelope and the writer it goes through.

use crate::error::StreamError;
use crate::message::StreamMessage;
use crate::transport::MessageWriter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Record written to the dead-letter topic when a message exhausts its retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    /// `topic/partition/offset` of the failed message
    pub message_id: String,
    pub offset: i64,
    pub partition: i32,
    pub topic: String,
    /// Text of the last failed attempt
    pub error: String,
    /// Time of the original record, UTC
    pub time: DateTime<Utc>,
}

impl ErrorMessage {
    pub fn new(message: &StreamMessage, error: &StreamError) -> Self {
        Self {
            message_id: message.id(),
            offset: message.offset,
            partition: message.partition,
            topic: message.topic.clone(),
            error: error.to_string(),
            time: message.received_at(),
        }
    }
}

/// Publishes [`ErrorMessage`]s. Shared by all workers of a pool.
#[derive(Clone)]
pub struct DeadLetterQueue {
    writer: Arc<dyn MessageWriter>,
}

impl DeadLetterQueue {
    pub fn new(writer: Arc<dyn MessageWriter>) -> Self {
        Self { writer }
    }

    pub fn topic(&self) -> &str {
        self.writer.topic()
    }

    pub async fn publish(
        &self,
        message: &StreamMessage,
        error: &StreamError,
    ) -> Result<ErrorMessage, StreamError> {
        let envelope = ErrorMessage::new(message, error);
        let payload = serde_json::to_vec(&envelope)?;
        self.writer.write(&payload).await?;
        Ok(envelope)
    }

    pub async fn close(&self) -> Result<(), StreamError> {
        self.writer.close().await
    }
}
