//! Reader and writer seams between the worker pool and the broker.
//!
//! Both are shared by every worker of a pool through an `Arc`, so
//! implementations must be safe for concurrent use without outside locking.

use crate::error::StreamError;
use crate::message::StreamMessage;
use async_trait::async_trait;

#[async_trait]
pub trait MessageReader: Send + Sync {
    /// Wait for the next message. Must be cancel-safe: the worker races it
    /// against its pool's cancellation token.
    async fn fetch(&self) -> Result<StreamMessage, StreamError>;

    /// Mark `message` as processed for the consumer group.
    async fn commit(&self, message: &StreamMessage) -> Result<(), StreamError>;

    fn topic(&self) -> &str;

    /// Leave the group. Called once, after every worker has stopped.
    async fn close(&self) -> Result<(), StreamError>;
}

#[async_trait]
pub trait MessageWriter: Send + Sync {
    /// Append one value, without a key, to the writer's topic.
    async fn write(&self, payload: &[u8]) -> Result<(), StreamError>;

    fn topic(&self) -> &str;

    /// Flush anything still buffered.
    async fn close(&self) -> Result<(), StreamError>;
}
