//! Prometheus metrics for worker pools
//!
//! Every event is both exported through the `metrics` facade and counted in
//! process-local atomics, so a pool's totals can be read without a recorder.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::StreamError;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Result<(), StreamError> {
    PROMETHEUS_HANDLE
        .get_or_try_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| StreamError::Config(format!("prometheus recorder: {e}")))?;
            info!("Prometheus metrics initialized");
            Ok::<_, StreamError>(handle)
        })
        .map(|_| ())
}

/// Render metrics in Prometheus text format, empty before [`init_metrics`].
pub fn render_metrics() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_default()
}

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    dead_lettered: AtomicU64,
}

/// Point-in-time copy of a pool's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub dead_lettered: u64,
}

/// Counters for one topic's pool, labelled by topic and processor.
#[derive(Clone)]
pub struct StreamMetrics {
    topic: String,
    processor: String,
    counters: Arc<Counters>,
}

impl StreamMetrics {
    pub fn new(topic: impl Into<String>, processor: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            processor: processor.into(),
            counters: Arc::default(),
        }
    }

    pub fn message_received(&self) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        counter!(
            "stream_worker_messages_received_total",
            "topic" => self.topic.clone(),
            "processor" => self.processor.clone()
        )
        .increment(1);
    }

    pub fn message_succeeded(&self, duration: Duration) {
        self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
        counter!(
            "stream_worker_messages_succeeded_total",
            "topic" => self.topic.clone(),
            "processor" => self.processor.clone()
        )
        .increment(1);

        histogram!(
            "stream_worker_message_duration_seconds",
            "topic" => self.topic.clone(),
            "processor" => self.processor.clone()
        )
        .record(duration.as_secs_f64());
    }

    /// `stage` is where the message failed: decode, validate, process,
    /// dead_letter or commit.
    pub fn message_failed(&self, stage: &'static str) {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        counter!(
            "stream_worker_messages_failed_total",
            "topic" => self.topic.clone(),
            "processor" => self.processor.clone(),
            "stage" => stage
        )
        .increment(1);
    }

    pub fn message_dead_lettered(&self) {
        self.counters.dead_lettered.fetch_add(1, Ordering::Relaxed);
        counter!(
            "stream_worker_messages_dead_lettered_total",
            "topic" => self.topic.clone(),
            "processor" => self.processor.clone()
        )
        .increment(1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.counters.received.load(Ordering::Relaxed),
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dead_lettered: self.counters.dead_lettered.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts_events() {
        let metrics = StreamMetrics::new("create-product", "create_product");
        metrics.message_received();
        metrics.message_received();
        metrics.message_succeeded(Duration::from_millis(3));
        metrics.message_failed("decode");
        metrics.message_dead_lettered();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                received: 2,
                succeeded: 1,
                failed: 1,
                dead_lettered: 1,
            }
        );
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = StreamMetrics::new("t", "p");
        metrics.clone().message_received();
        assert_eq!(metrics.snapshot().received, 1);
    }

    #[test]
    fn test_init_is_idempotent_and_renders() {
        init_metrics().unwrap();
        init_metrics().unwrap();
        StreamMetrics::new("rendered-topic", "p").message_received();
        assert!(render_metrics().contains("stream_worker_messages_received_total"));
    }
}
