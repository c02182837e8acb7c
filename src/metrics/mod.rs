//! Cumulative run metrics kept in an external counter store.
//!
//! Every run submits one [`MetricsBatch`]; stores must apply a batch
//! all-or-nothing. Increments commute, so concurrent runs need no locking
//! beyond the store's own batch atomicity.

pub mod memory;
pub mod redis_store;

use crate::error::Result;
use crate::rules::SeverityCounts;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

pub const EXECUTIONS_KEY: &str = "metrics:executions";
pub const HIGH_KEY: &str = "metrics:high";
pub const MEDIUM_KEY: &str = "metrics:medium";
pub const LOW_KEY: &str = "metrics:low";
pub const LAST_RUN_KEY: &str = "metrics:last_run";

/// One write in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterOp {
    IncrBy { key: &'static str, delta: i64 },
    Set { key: &'static str, value: String },
}

/// Writes that must become visible together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsBatch {
    ops: Vec<CounterOp>,
}

impl MetricsBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr_by(mut self, key: &'static str, delta: i64) -> Self {
        self.ops.push(CounterOp::IncrBy { key, delta });
        self
    }

    pub fn set(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.ops.push(CounterOp::Set {
            key,
            value: value.into(),
        });
        self
    }

    pub fn ops(&self) -> &[CounterOp] {
        &self.ops
    }

    /// Keys this batch increments. Stores check these hold integers before
    /// applying anything.
    pub fn counter_keys(&self) -> Vec<&'static str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                CounterOp::IncrBy { key, .. } => Some(*key),
                CounterOp::Set { .. } => None,
            })
            .collect()
    }
}

/// Whether a stored value can be incremented.
pub(crate) fn is_counter(value: &str) -> bool {
    value.parse::<i64>().is_ok()
}

/// Capability to apply atomic batches and read single keys.
pub trait CounterStore {
    /// Apply every op in `batch`, or none of them.
    fn apply_batch(&self, batch: &MetricsBatch) -> Result<()>;

    /// Read one key. `Ok(None)` if it was never written.
    fn read(&self, key: &str) -> Result<Option<String>>;
}

impl<S: CounterStore + ?Sized> CounterStore for &S {
    fn apply_batch(&self, batch: &MetricsBatch) -> Result<()> {
        (**self).apply_batch(batch)
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }
}

/// Records runs into a counter store and renders the cumulative report.
pub struct MetricsRecorder<S> {
    store: S,
}

impl<S: CounterStore> MetricsRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Build the batch for one run. `now` is the RFC 3339 timestamp.
    pub fn batch_for(counts: SeverityCounts, now: &str) -> MetricsBatch {
        MetricsBatch::new()
            .incr_by(EXECUTIONS_KEY, 1)
            .incr_by(HIGH_KEY, to_delta(counts.high))
            .incr_by(MEDIUM_KEY, to_delta(counts.medium))
            .incr_by(LOW_KEY, to_delta(counts.low))
            .set(LAST_RUN_KEY, now)
    }

    /// Count one execution and its findings, stamped with the current time.
    pub fn record_run(&self, counts: SeverityCounts) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        self.store.apply_batch(&Self::batch_for(counts, &now))?;
        tracing::debug!(
            high = counts.high,
            medium = counts.medium,
            low = counts.low,
            "run recorded"
        );
        Ok(())
    }

    /// Render the cumulative report. Each field is read on its own; missing
    /// or unreadable fields fall back to a placeholder.
    pub fn report_cumulative(&self) -> String {
        let executions = self.read_or(EXECUTIONS_KEY, "0");
        let high = self.read_or(HIGH_KEY, "0");
        let medium = self.read_or(MEDIUM_KEY, "0");
        let low = self.read_or(LOW_KEY, "0");
        let last_run = self.read_or(LAST_RUN_KEY, "never");

        format!(
            "\n==== Cumulative Metrics ====\n\
             Total executions: {}\n\
             Total high severity issues: {}\n\
             Total medium severity issues: {}\n\
             Total low severity issues: {}\n\
             Last run: {}\n",
            executions, high, medium, low, last_run
        )
    }

    fn read_or(&self, key: &str, placeholder: &str) -> String {
        match self.store.read(key) {
            Ok(Some(value)) => value,
            Ok(None) => placeholder.to_string(),
            Err(e) => {
                tracing::warn!(key, error = %e, "metrics read failed");
                placeholder.to_string()
            }
        }
    }
}

fn to_delta(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
