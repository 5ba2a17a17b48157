//! Stream Worker Framework
//!
//! Kafka consumer-group worker pools with bounded retry and a dead-letter topic.
//!
//! ## Features
//!
//! - **Worker pool**: `StreamWorker<J, P>` runs N tasks over one shared reader
//! - **Retry**: fixed attempts and delay, aborted by cancellation
//! - **Dead-letter topic**: exhausted messages are written as `ErrorMessage`
//! - **Least-bytes writer**: `KafkaWriter` with acks=all and snappy compression
//! - **Prometheus metrics**: received, succeeded, failed and dead-lettered counters
//!
//! ## Example
//!
//! ```ignore
//! use stream_worker::{KafkaConfig, StreamDef, StreamWorker, WorkerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! struct CreateProductStream;
//! impl StreamDef for CreateProductStream {
//!     const TOPIC: &'static str = "create-product";
//!     const CONSUMER_GROUP: &'static str = "products_group";
//!     const DEAD_LETTER_TOPIC: &'static str = "dead-letter-queue";
//! }
//!
//! let kafka = KafkaConfig::from_env()?;
//! let config = WorkerConfig::from_stream_def::<CreateProductStream>();
//! let worker = StreamWorker::connect(&kafka, Arc::new(processor), config)?;
//! worker.run(CancellationToken::new()).await?;
//! ```

mod balancer;
mod config;
mod consumer;
mod dlq;
mod error;
mod message;
pub mod metrics;
mod producer;
mod registry;
mod retry;
mod transport;
mod worker;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

pub use balancer::LeastBytes;
pub use config::{KafkaConfig, WorkerConfig};
pub use consumer::KafkaReader;
pub use dlq::{DeadLetterQueue, ErrorMessage};
pub use error::StreamError;
pub use message::StreamMessage;
pub use metrics::{init_metrics, render_metrics, MetricsSnapshot, StreamMetrics};
pub use producer::KafkaWriter;
pub use registry::{StreamDef, StreamJob, StreamProcessor};
pub use retry::{retry, RetryPolicy};
pub use transport::{MessageReader, MessageWriter};
pub use worker::{MessageOutcome, SkipReason, StreamWorker};

pub use tokio_util::sync::CancellationToken;
