//! Broker client and worker pool configuration

use crate::registry::StreamDef;
use crate::retry::RetryPolicy;
use core_config::{env_list, env_optional, env_parse, ConfigError, FromEnv};
use rdkafka::config::RDKafkaLogLevel;
use rdkafka::ClientConfig;
use std::time::Duration;

/// Connection and tuning settings shared by readers and writers.
#[derive(Debug, Clone, PartialEq)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    /// Replaces every stream's own consumer group when set
    pub group_id: Option<String>,
    /// Smallest batch the broker waits to accumulate before answering a fetch
    pub min_bytes: u32,
    pub max_bytes: u32,
    /// Messages prefetched per partition
    pub queue_capacity: u32,
    pub heartbeat_interval: Duration,
    /// Zero commits every message synchronously; otherwise offsets are stored
    /// and flushed by the client on this interval.
    pub commit_interval: Duration,
    pub dial_timeout: Duration,
    /// Total send attempts per record, including the first
    pub writer_max_attempts: u32,
    /// Bound on a single produce round trip
    pub writer_timeout: Duration,
}

impl KafkaConfig {
    pub fn new(brokers: Vec<String>) -> Self {
        Self {
            brokers,
            ..Self::default()
        }
    }

    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// The group a reader joins: the override if set, else the stream's own.
    pub fn group_for<'a>(&'a self, stream_group: &'a str) -> &'a str {
        self.group_id.as_deref().unwrap_or(stream_group)
    }

    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }

    pub fn commits_synchronously(&self) -> bool {
        self.commit_interval.is_zero()
    }

    /// Client settings for a member of `stream_group` that commits manually.
    pub fn consumer_client_config(&self, stream_group: &str) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", self.bootstrap_servers())
            .set("group.id", self.group_for(stream_group))
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.offset.store", "false")
            .set("fetch.min.bytes", self.min_bytes.to_string())
            .set("fetch.max.bytes", self.max_bytes.to_string())
            .set("queued.min.messages", self.queue_capacity.to_string())
            .set(
                "heartbeat.interval.ms",
                self.heartbeat_interval.as_millis().to_string(),
            )
            .set(
                "socket.connection.setup.timeout.ms",
                self.dial_timeout.as_millis().to_string(),
            )
            .set_log_level(RDKafkaLogLevel::Warning);

        if self.commits_synchronously() {
            config.set("enable.auto.commit", "false");
        } else {
            config.set("enable.auto.commit", "true").set(
                "auto.commit.interval.ms",
                self.commit_interval.as_millis().to_string(),
            );
        }
        config
    }

    /// Client settings for a writer: full ISR acks, bounded retries, snappy.
    pub fn producer_client_config(&self) -> ClientConfig {
        let timeout_ms = self.writer_timeout.as_millis().to_string();
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", self.bootstrap_servers())
            .set("acks", "all")
            .set(
                "message.send.max.retries",
                self.writer_max_attempts.saturating_sub(1).to_string(),
            )
            .set("compression.type", "snappy")
            .set("request.timeout.ms", &timeout_ms)
            .set("socket.timeout.ms", &timeout_ms)
            .set("message.timeout.ms", &timeout_ms)
            .set_log_level(RDKafkaLogLevel::Warning);
        config
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            group_id: None,
            min_bytes: 10_000,
            max_bytes: 10_000_000,
            queue_capacity: 100,
            heartbeat_interval: Duration::from_secs(3),
            commit_interval: Duration::ZERO,
            dial_timeout: Duration::from_secs(180),
            writer_max_attempts: 3,
            writer_timeout: Duration::from_secs(10),
        }
    }
}

impl FromEnv for KafkaConfig {
    /// - `KAFKA_BROKERS` (required): comma separated host:port list
    /// - `KAFKA_GROUP_ID`: unset, each stream joins its own group
    /// - `KAFKA_MIN_BYTES` / `KAFKA_MAX_BYTES`: 10 KB / 10 MB
    /// - `KAFKA_QUEUE_CAPACITY`: 100
    /// - `KAFKA_HEARTBEAT_INTERVAL_MS`: 3000
    /// - `KAFKA_COMMIT_INTERVAL_MS`: 0 (synchronous)
    /// - `KAFKA_DIAL_TIMEOUT_MS`: 180000
    /// - `KAFKA_WRITER_MAX_ATTEMPTS`: 3
    /// - `KAFKA_WRITER_TIMEOUT_MS`: 10000
    fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        let millis = |key: &str, default: Duration| -> Result<Duration, ConfigError> {
            Ok(Duration::from_millis(env_parse(
                key,
                default.as_millis() as u64,
            )?))
        };

        Ok(Self {
            brokers: env_list("KAFKA_BROKERS")?,
            group_id: env_optional("KAFKA_GROUP_ID"),
            min_bytes: env_parse("KAFKA_MIN_BYTES", d.min_bytes)?,
            max_bytes: env_parse("KAFKA_MAX_BYTES", d.max_bytes)?,
            queue_capacity: env_parse("KAFKA_QUEUE_CAPACITY", d.queue_capacity)?,
            heartbeat_interval: millis("KAFKA_HEARTBEAT_INTERVAL_MS", d.heartbeat_interval)?,
            commit_interval: millis("KAFKA_COMMIT_INTERVAL_MS", d.commit_interval)?,
            dial_timeout: millis("KAFKA_DIAL_TIMEOUT_MS", d.dial_timeout)?,
            writer_max_attempts: env_parse("KAFKA_WRITER_MAX_ATTEMPTS", d.writer_max_attempts)?,
            writer_timeout: millis("KAFKA_WRITER_TIMEOUT_MS", d.writer_timeout)?,
        })
    }
}

/// Settings for one topic's worker pool.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    pub topic: String,
    pub consumer_group: String,
    pub dead_letter_topic: String,
    /// Tasks sharing the topic's reader
    pub workers: usize,
    pub retry: RetryPolicy,
    /// Commit the original offset once its dead-letter record is written.
    /// Off by default: dead-lettered messages are redelivered after a
    /// restart or rebalance.
    pub commit_dead_lettered: bool,
}

impl WorkerConfig {
    pub fn new(
        topic: impl Into<String>,
        consumer_group: impl Into<String>,
        dead_letter_topic: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            consumer_group: consumer_group.into(),
            dead_letter_topic: dead_letter_topic.into(),
            workers: 3,
            retry: RetryPolicy::default(),
            commit_dead_lettered: false,
        }
    }

    pub fn from_stream_def<S: StreamDef>() -> Self {
        Self::new(S::TOPIC, S::CONSUMER_GROUP, S::DEAD_LETTER_TOPIC).with_workers(S::WORKERS)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_commit_dead_lettered(mut self, commit: bool) -> Self {
        self.commit_dead_lettered = commit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KAFKA_VARS: [&str; 10] = [
        "KAFKA_BROKERS",
        "KAFKA_GROUP_ID",
        "KAFKA_MIN_BYTES",
        "KAFKA_MAX_BYTES",
        "KAFKA_QUEUE_CAPACITY",
        "KAFKA_HEARTBEAT_INTERVAL_MS",
        "KAFKA_COMMIT_INTERVAL_MS",
        "KAFKA_DIAL_TIMEOUT_MS",
        "KAFKA_WRITER_MAX_ATTEMPTS",
        "KAFKA_WRITER_TIMEOUT_MS",
    ];

    fn with_kafka_env<F: FnOnce()>(overrides: &[(&str, &str)], f: F) {
        let vars: Vec<(&str, Option<&str>)> = KAFKA_VARS
            .iter()
            .map(|key| {
                let value = overrides.iter().find(|(k, _)| k == key).map(|(_, v)| *v);
                (*key, value)
            })
            .collect();
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn test_from_env_defaults() {
        with_kafka_env(&[("KAFKA_BROKERS", "kafka-1:9092,kafka-2:9092")], || {
            let config = KafkaConfig::from_env().unwrap();
            assert_eq!(config.brokers, vec!["kafka-1:9092", "kafka-2:9092"]);
            assert_eq!(config.group_id, None);
            assert_eq!(config.group_for("products_group"), "products_group");
            assert_eq!(config.min_bytes, 10_000);
            assert_eq!(config.max_bytes, 10_000_000);
            assert_eq!(config.heartbeat_interval, Duration::from_secs(3));
            assert!(config.commits_synchronously());
        });
    }

    #[test]
    fn test_group_override_wins_over_stream_group() {
        with_kafka_env(
            &[("KAFKA_BROKERS", "k:9092"), ("KAFKA_GROUP_ID", "replay_group")],
            || {
                let config = KafkaConfig::from_env().unwrap();
                let client = config.consumer_client_config("products_group");
                assert_eq!(client.get("group.id"), Some("replay_group"));
            },
        );
    }

    #[test]
    fn test_from_env_requires_brokers() {
        with_kafka_env(&[], || {
            let err = KafkaConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("KAFKA_BROKERS"));
        });
    }

    #[test]
    fn test_from_env_rejects_bad_number() {
        with_kafka_env(
            &[("KAFKA_BROKERS", "k:9092"), ("KAFKA_MIN_BYTES", "lots")],
            || {
                let err = KafkaConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("KAFKA_MIN_BYTES"));
            },
        );
    }

    #[test]
    fn test_consumer_client_config_sync_commit() {
        let config = KafkaConfig::new(vec!["a:9092".into(), "b:9092".into()]);
        let client = config.consumer_client_config("products_group");

        assert_eq!(client.get("bootstrap.servers"), Some("a:9092,b:9092"));
        assert_eq!(client.get("group.id"), Some("products_group"));
        assert_eq!(client.get("enable.auto.commit"), Some("false"));
        assert_eq!(client.get("enable.auto.offset.store"), Some("false"));
        assert_eq!(client.get("heartbeat.interval.ms"), Some("3000"));
        assert_eq!(client.get("auto.commit.interval.ms"), None);
    }

    #[test]
    fn test_consumer_client_config_interval_commit() {
        let config = KafkaConfig {
            commit_interval: Duration::from_secs(1),
            ..KafkaConfig::default()
        };
        let client = config.consumer_client_config("products_group");

        assert_eq!(client.get("enable.auto.commit"), Some("true"));
        assert_eq!(client.get("auto.commit.interval.ms"), Some("1000"));
    }

    #[test]
    fn test_producer_client_config() {
        let client = KafkaConfig::default().producer_client_config();

        assert_eq!(client.get("acks"), Some("all"));
        assert_eq!(client.get("compression.type"), Some("snappy"));
        assert_eq!(client.get("message.send.max.retries"), Some("2"));
        assert_eq!(client.get("message.timeout.ms"), Some("10000"));
    }

    struct Orders;
    impl StreamDef for Orders {
        const TOPIC: &'static str = "orders";
        const CONSUMER_GROUP: &'static str = "orders_group";
        const DEAD_LETTER_TOPIC: &'static str = "orders-dlq";
        const WORKERS: usize = 5;
    }

    #[test]
    fn test_worker_config_from_stream_def() {
        let config = WorkerConfig::from_stream_def::<Orders>()
            .with_retry(RetryPolicy::new(2, Duration::from_millis(5)))
            .with_commit_dead_lettered(true);

        assert_eq!(config.topic, "orders");
        assert_eq!(config.consumer_group, "orders_group");
        assert_eq!(config.dead_letter_topic, "orders-dlq");
        assert_eq!(config.workers, 5);
        assert_eq!(config.retry.attempts, 2);
        assert!(config.commit_dead_lettered);
    }
}
