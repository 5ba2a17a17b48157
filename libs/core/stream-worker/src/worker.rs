//! The worker pool: N tasks sharing one reader and one dead-letter writer.
//!
//! Per message, a worker runs
//!
//! ```text
//! fetch -> decode -> validate -> process (retry) -> commit
//!                                    |
//!                                    +-> exhausted -> dead-letter -> [commit]
//! ```
//!
//! Decode and validation failures are skipped without a commit, so the
//! message comes back after a restart or rebalance. A fetch failure stops
//! the worker and cancels the rest of its pool.

use crate::config::{KafkaConfig, WorkerConfig};
use crate::consumer::KafkaReader;
use crate::dlq::DeadLetterQueue;
use crate::error::StreamError;
use crate::message::StreamMessage;
use crate::metrics::StreamMetrics;
use crate::producer::KafkaWriter;
use crate::registry::{StreamJob, StreamProcessor};
use crate::retry::retry;
use crate::transport::{MessageReader, MessageWriter};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use strum::{AsRefStr, Display};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Why a message was dropped before processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// Payload did not decode into the job type
    Malformed,
    /// Decoded, but failed validation
    Invalid,
}

/// What happened to a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Processed and committed
    Committed,
    /// Not processed, not committed
    Skipped(SkipReason),
    /// Cancelled while waiting to retry; not dead-lettered, not committed
    Abandoned,
    /// Retries exhausted and the envelope was written
    DeadLettered { committed: bool },
    /// Retries exhausted and the envelope could not be written; not committed
    DeadLetterFailed,
    /// Processed or dead-lettered, but the commit failed
    CommitFailed,
}

/// Worker pool for one topic.
pub struct StreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J>,
{
    reader: Arc<dyn MessageReader>,
    dead_letters: DeadLetterQueue,
    processor: Arc<P>,
    config: WorkerConfig,
    metrics: StreamMetrics,
    _job: PhantomData<fn() -> J>,
}

impl<J, P> Clone for StreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J>,
{
    fn clone(&self) -> Self {
        Self {
            reader: Arc::clone(&self.reader),
            dead_letters: self.dead_letters.clone(),
            processor: Arc::clone(&self.processor),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            _job: PhantomData,
        }
    }
}

impl<J, P> StreamWorker<J, P>
where
    J: StreamJob + 'static,
    P: StreamProcessor<J> + 'static,
{
    pub fn new(
        reader: Arc<dyn MessageReader>,
        dead_letter_writer: Arc<dyn MessageWriter>,
        processor: Arc<P>,
        config: WorkerConfig,
    ) -> Self {
        let metrics = StreamMetrics::new(config.topic.clone(), processor.name());
        Self {
            reader,
            dead_letters: DeadLetterQueue::new(dead_letter_writer),
            processor,
            config,
            metrics,
            _job: PhantomData,
        }
    }

    /// Subscribe to `config.topic` and open a writer for its dead-letter topic.
    pub fn connect(
        kafka: &KafkaConfig,
        processor: Arc<P>,
        config: WorkerConfig,
    ) -> Result<Self, StreamError> {
        let reader = KafkaReader::new(kafka, config.topic.clone(), &config.consumer_group)?;
        let writer = KafkaWriter::new(kafka, config.dead_letter_topic.clone())?;
        Ok(Self::new(Arc::new(reader), Arc::new(writer), processor, config))
    }

    pub fn metrics(&self) -> &StreamMetrics {
        &self.metrics
    }

    /// Run the pool until `cancel` fires or a worker hits a fetch error.
    ///
    /// Returns once every worker has stopped, after closing the reader and
    /// flushing the dead-letter writer.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), StreamError> {
        if self.config.workers == 0 {
            return Err(StreamError::Config(format!(
                "topic '{}' needs at least one worker",
                self.config.topic
            )));
        }

        info!(
            topic = %self.config.topic,
            dead_letter_topic = %self.dead_letters.topic(),
            workers = self.config.workers,
            processor = self.processor.name(),
            retry_attempts = self.config.retry.attempts,
            "Starting worker pool"
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..self.config.workers {
            let worker = self.clone();
            let cancel = cancel.clone();
            workers.spawn(async move { worker.work(worker_id, cancel).await });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(topic = %self.config.topic, error = %e, "Worker task panicked");
                cancel.cancel();
            }
        }

        if let Err(e) = self.reader.close().await {
            error!(topic = %self.config.topic, error = %e, "Failed to close reader");
        }
        if let Err(e) = self.dead_letters.close().await {
            error!(topic = %self.dead_letters.topic(), error = %e, "Failed to flush dead-letter writer");
        }

        info!(topic = %self.config.topic, "Worker pool stopped");
        Ok(())
    }

    async fn work(&self, worker_id: usize, cancel: CancellationToken) {
        debug!(topic = %self.config.topic, worker_id, "Worker started");

        loop {
            let message = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                fetched = self.reader.fetch() => match fetched {
                    Ok(message) => message,
                    Err(e) => {
                        error!(
                            topic = %self.config.topic,
                            worker_id,
                            error = %e,
                            "Fetch failed, stopping pool"
                        );
                        cancel.cancel();
                        break;
                    }
                },
            };

            debug!(
                worker_id,
                topic = %message.topic,
                partition = message.partition,
                offset = message.offset,
                "Message received"
            );
            self.handle_message(&message, &cancel).await;
        }

        debug!(topic = %self.config.topic, worker_id, "Worker stopped");
    }

    /// Take one message through decode, validate, process, dead-letter and commit.
    pub async fn handle_message(
        &self,
        message: &StreamMessage,
        cancel: &CancellationToken,
    ) -> MessageOutcome {
        self.metrics.message_received();

        let job: J = match serde_json::from_slice(&message.payload) {
            Ok(job) => job,
            Err(e) => {
                self.metrics.message_failed("decode");
                warn!(message_id = %message.id(), error = %e, "Skipping undecodable message");
                return MessageOutcome::Skipped(SkipReason::Malformed);
            }
        };

        if let Err(e) = job.validate_job() {
            self.metrics.message_failed("validate");
            warn!(message_id = %message.id(), error = %e, "Skipping invalid message");
            return MessageOutcome::Skipped(SkipReason::Invalid);
        }

        let started = Instant::now();
        let processed = retry(&self.config.retry, cancel, || self.processor.process(&job)).await;

        match processed {
            Ok(()) => match self.reader.commit(message).await {
                Ok(()) => {
                    self.metrics.message_succeeded(started.elapsed());
                    debug!(message_id = %message.id(), job_id = %job.job_id(), "Message processed");
                    MessageOutcome::Committed
                }
                Err(e) => self.commit_failed(message, &e),
            },
            Err(StreamError::Shutdown) => {
                info!(message_id = %message.id(), "Shutdown while retrying, leaving message uncommitted");
                MessageOutcome::Abandoned
            }
            Err(e) => {
                self.metrics.message_failed("process");
                self.dead_letter(message, &e).await
            }
        }
    }

    async fn dead_letter(&self, message: &StreamMessage, cause: &StreamError) -> MessageOutcome {
        if let Err(e) = self.dead_letters.publish(message, cause).await {
            self.metrics.message_failed("dead_letter");
            error!(
                message_id = %message.id(),
                cause = %cause,
                error = %e,
                "Failed to publish dead-letter record, leaving message uncommitted"
            );
            return MessageOutcome::DeadLetterFailed;
        }

        self.metrics.message_dead_lettered();
        warn!(
            message_id = %message.id(),
            dead_letter_topic = %self.dead_letters.topic(),
            error = %cause,
            "Retries exhausted, message dead-lettered"
        );

        if !self.config.commit_dead_lettered {
            return MessageOutcome::DeadLettered { committed: false };
        }
        match self.reader.commit(message).await {
            Ok(()) => MessageOutcome::DeadLettered { committed: true },
            Err(e) => self.commit_failed(message, &e),
        }
    }

    fn commit_failed(&self, message: &StreamMessage, error: &StreamError) -> MessageOutcome {
        self.metrics.message_failed("commit");
        error!(message_id = %message.id(), error = %error, "Failed to commit offset");
        MessageOutcome::CommitFailed
    }
}
