//! Observability and Metrics
//!
//! Counters for encode and decode calls, kept in process-wide atomics so any
//! number of codecs and threads can record without coordination.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Global metrics collector for codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Encode calls, including signing variants
    pub encodes_total: AtomicU64,
    /// Encode calls that returned an error
    pub encodes_failed: AtomicU64,
    /// Bytes produced by successful encodes
    pub bytes_encoded: AtomicU64,
    /// Encodes with a signing prefix
    pub signing_encodes: AtomicU64,
    /// Decode calls
    pub decodes_total: AtomicU64,
    /// Decode calls that returned an error
    pub decodes_failed: AtomicU64,
    /// Bytes accepted by successful decodes
    pub bytes_decoded: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            encodes_total: AtomicU64::new(0),
            encodes_failed: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            signing_encodes: AtomicU64::new(0),
            decodes_total: AtomicU64::new(0),
            decodes_failed: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record the outcome of an encode call
    pub fn encode_finished(&self, output_len: Option<usize>) {
        self.encodes_total.fetch_add(1, Ordering::Relaxed);
        match output_len {
            Some(len) => {
                self.bytes_encoded.fetch_add(len as u64, Ordering::Relaxed);
            }
            None => {
                self.encodes_failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn signing_encode(&self) {
        self.signing_encodes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of a decode call
    pub fn decode_finished(&self, input_len: usize, ok: bool) {
        self.decodes_total.fetch_add(1, Ordering::Relaxed);
        if ok {
            self.bytes_decoded.fetch_add(input_len as u64, Ordering::Relaxed);
        } else {
            self.decodes_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            encodes_total: self.encodes_total.load(Ordering::Relaxed),
            encodes_failed: self.encodes_failed.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            signing_encodes: self.signing_encodes.load(Ordering::Relaxed),
            decodes_total: self.decodes_total.load(Ordering::Relaxed),
            decodes_failed: self.decodes_failed.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            encodes_total = snapshot.encodes_total,
            encodes_failed = snapshot.encodes_failed,
            bytes_encoded = snapshot.bytes_encoded,
            signing_encodes = snapshot.signing_encodes,
            decodes_total = snapshot.decodes_total,
            decodes_failed = snapshot.decodes_failed,
            bytes_decoded = snapshot.bytes_decoded,
            uptime_seconds = snapshot.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub encodes_total: u64,
    pub encodes_failed: u64,
    pub bytes_encoded: u64,
    pub signing_encodes: u64,
    pub decodes_total: u64,
    pub decodes_failed: u64,
    pub bytes_decoded: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
