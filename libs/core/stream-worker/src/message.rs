//! Owned message handed from a reader to the workers.

use chrono::{DateTime, Utc};

/// A fetched record, detached from the client that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// Broker or producer timestamp, when the record carries one
    pub timestamp: Option<DateTime<Utc>>,
    pub payload: Vec<u8>,
}

impl StreamMessage {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            timestamp: None,
            payload,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// `topic/partition/offset`, unique within a cluster.
    pub fn id(&self) -> String {
        format!("{}/{}/{}", self.topic, self.partition, self.offset)
    }

    /// Record time in UTC, falling back to now for records without one.
    pub fn received_at(&self) -> DateTime<Utc> {
        self.timestamp.unwrap_or_else(Utc::now)
    }
}
