use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{is_counter, CounterOp, CounterStore, MetricsBatch};
use crate::error::{GuardError, Result};

/// In-process counter store.
///
/// Used when metrics are disabled and in tests. Clones share the same data.
/// Like `RedisStore`, a batch whose counter keys hold non-integer values is
/// refused before any op runs. Beyond that, batches are staged on a copy and
/// committed only if every op succeeds.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, String>>>,
    fail_at: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every batch fail when it reaches op number `index`.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.data
            .lock()
            .map_err(|_| GuardError::Metrics("memory store lock poisoned".into()))
    }
}

impl CounterStore for MemoryStore {
    fn apply_batch(&self, batch: &MetricsBatch) -> Result<()> {
        let mut data = self.lock()?;
        for key in batch.counter_keys() {
            if let Some(value) = data.get(key).filter(|v| !is_counter(v)) {
                return Err(GuardError::Metrics(format!(
                    "value at {} is not an integer: {:?}",
                    key, value
                )));
            }
        }
        let mut staged = data.clone();

        for (index, op) in batch.ops().iter().enumerate() {
            if self.fail_at == Some(index) {
                return Err(GuardError::Metrics(format!(
                    "injected failure at op {}",
                    index
                )));
            }
            match op {
                CounterOp::IncrBy { key, delta } => {
                    let current = staged
                        .get(*key)
                        .and_then(|v| v.parse::<i64>().ok())
                        .unwrap_or(0);
                    staged.insert(key.to_string(), (current + delta).to_string());
                }
                CounterOp::Set { key, value } => {
                    staged.insert(key.to_string(), value.clone());
                }
            }
        }

        *data = staged;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }
}
