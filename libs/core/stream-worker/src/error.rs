//! Stream error types
//!
//! Where an error is raised decides what the worker does with it:
//! - on fetch: fatal to the worker, which cancels its pool
//! - on decode/validate: the message is skipped
//! - on processing: retried, then dead-lettered
//! - on commit: logged, the offset stays uncommitted

use rdkafka::error::KafkaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    /// Broker client error (fetch, produce, commit, metadata)
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    /// Transport failure that did not come from the broker client
    #[error("Transport error: {0}")]
    Transport(String),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Payload decoded but failed structural validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The processor rejected or failed the job
    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Cancellation observed while waiting
    #[error("Shutdown requested")]
    Shutdown,
}

impl StreamError {
    pub fn processing(message: impl Into<String>) -> Self {
        StreamError::Processing(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        StreamError::Transport(message.into())
    }

    /// Short, stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamError::Kafka(_) | StreamError::Transport(_) => "transport",
            StreamError::Serialization(_) => "serialization",
            StreamError::Validation(_) => "validation",
            StreamError::Processing(_) => "processing",
            StreamError::Config(_) => "config",
            StreamError::Shutdown => "shutdown",
        }
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, StreamError::Shutdown)
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Serialization(err.to_string())
    }
}

impl From<core_config::ConfigError> for StreamError {
    fn from(err: core_config::ConfigError) -> Self {
        StreamError::Config(err.to_string())
    }
}
