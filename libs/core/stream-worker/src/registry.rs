//! Topic definitions and the traits a domain implements to plug into a worker.

use crate::error::StreamError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Static description of a consumed topic.
///
/// ```rust,ignore
/// pub struct CreateProductStream;
///
/// impl StreamDef for CreateProductStream {
///     const TOPIC: &'static str = "create-product";
///     const CONSUMER_GROUP: &'static str = "products_group";
///     const DEAD_LETTER_TOPIC: &'static str = "dead-letter-queue";
/// }
/// ```
pub trait StreamDef: Send + Sync {
    const TOPIC: &'static str;
    const CONSUMER_GROUP: &'static str;
    const DEAD_LETTER_TOPIC: &'static str;

    /// Workers sharing one reader.
    const WORKERS: usize = 3;
}

/// A message payload the worker can decode and check before processing.
pub trait StreamJob: DeserializeOwned + Send + Sync {
    /// Identifier used in logs. May be empty for jobs that are not persisted yet.
    fn job_id(&self) -> String;

    /// Structural checks run after decoding. A failure skips the message.
    fn validate_job(&self) -> Result<(), StreamError> {
        Ok(())
    }
}

/// Applies one decoded job. Called once per retry attempt.
#[async_trait]
pub trait StreamProcessor<J: StreamJob>: Send + Sync {
    async fn process(&self, job: &J) -> Result<(), StreamError>;

    /// Processor name for logs and metric labels.
    fn name(&self) -> &'static str;
}
