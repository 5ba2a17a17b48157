//! Byte-weighted partition choice for writers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Routes each record to the partition that has received the fewest bytes
/// from this writer so far. Ties go to the lowest partition number.
#[derive(Debug)]
pub struct LeastBytes {
    written: Vec<AtomicU64>,
}

impl LeastBytes {
    /// `partitions` is clamped to at least one.
    pub fn new(partitions: usize) -> Self {
        Self {
            written: (0..partitions.max(1)).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    pub fn partitions(&self) -> usize {
        self.written.len()
    }

    /// Pick a partition for a record of `len` bytes and charge it.
    pub fn pick(&self, len: usize) -> i32 {
        let Some((partition, counter)) = self
            .written
            .iter()
            .enumerate()
            .min_by_key(|(_, bytes)| bytes.load(Ordering::Relaxed))
        else {
            return 0;
        };
        counter.fetch_add(len as u64, Ordering::Relaxed);
        partition as i32
    }

    pub fn bytes_written(&self, partition: usize) -> u64 {
        self.written
            .get(partition)
            .map(|b| b.load(Ordering::Relaxed))
            .unwrap_or_default()
    }
}
