//! In-memory reader and writer for driving worker pools in tests.

use crate::error::StreamError;
use crate::message::StreamMessage;
use crate::transport::{MessageReader, MessageWriter};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Serves a fixed queue of messages.
///
/// Once the queue is empty, `fetch` either fails (which stops the pool, the
/// same way a broker error would) or waits until the pool is cancelled.
pub struct InMemoryReader {
    topic: String,
    queue: Mutex<VecDeque<StreamMessage>>,
    committed: Mutex<Vec<StreamMessage>>,
    fail_commits: AtomicBool,
    wait_when_drained: bool,
    closed: AtomicBool,
}

impl InMemoryReader {
    pub fn new(topic: impl Into<String>, messages: impl IntoIterator<Item = StreamMessage>) -> Self {
        Self {
            topic: topic.into(),
            queue: Mutex::new(messages.into_iter().collect()),
            committed: Mutex::default(),
            fail_commits: AtomicBool::new(false),
            wait_when_drained: false,
            closed: AtomicBool::new(false),
        }
    }

    /// Build a queue of payloads on partition 0 with offsets 0, 1, 2, ...
    pub fn with_payloads<P: Into<Vec<u8>>>(
        topic: impl Into<String>,
        payloads: impl IntoIterator<Item = P>,
    ) -> Self {
        let topic = topic.into();
        let messages: Vec<StreamMessage> = payloads
            .into_iter()
            .enumerate()
            .map(|(offset, payload)| StreamMessage::new(&topic, 0, offset as i64, payload.into()))
            .collect();
        Self::new(topic, messages)
    }

    /// Park `fetch` on an empty queue instead of failing.
    pub fn wait_when_drained(mut self) -> Self {
        self.wait_when_drained = true;
        self
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn committed(&self) -> Vec<StreamMessage> {
        self.committed.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageReader for InMemoryReader {
    async fn fetch(&self) -> Result<StreamMessage, StreamError> {
        let next = self
            .queue
            .lock()
            .map_err(|_| StreamError::transport("reader lock poisoned"))?
            .pop_front();

        match next {
            Some(message) => Ok(message),
            None if self.wait_when_drained => std::future::pending().await,
            None => Err(StreamError::transport("in-memory reader drained")),
        }
    }

    async fn commit(&self, message: &StreamMessage) -> Result<(), StreamError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StreamError::transport("commit rejected"));
        }
        self.committed
            .lock()
            .map_err(|_| StreamError::transport("reader lock poisoned"))?
            .push(message.clone());
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn close(&self) -> Result<(), StreamError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Collects written payloads.
pub struct InMemoryWriter {
    topic: String,
    written: Mutex<Vec<Vec<u8>>>,
    fail_writes: AtomicBool,
    closed: AtomicBool,
}

impl InMemoryWriter {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            written: Mutex::default(),
            fail_writes: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn written(&self) -> Vec<Vec<u8>> {
        self.written.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageWriter for InMemoryWriter {
    async fn write(&self, payload: &[u8]) -> Result<(), StreamError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StreamError::transport("write rejected"));
        }
        self.written
            .lock()
            .map_err(|_| StreamError::transport("writer lock poisoned"))?
            .push(payload.to_vec());
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn close(&self) -> Result<(), StreamError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
