use std::time::Duration;

use redis::{Commands, ErrorKind, RedisError};

use super::{is_counter, CounterOp, CounterStore, MetricsBatch};
use crate::error::{GuardError, Result};

/// Redis-backed counter store.
///
/// Batches go out as a single `MULTI`/`EXEC` pipeline under `WATCH` on the
/// counter keys. Redis does not roll back a transaction when one queued
/// command fails, so counter values are checked first and the batch is
/// refused if any of them is not an integer. The watch makes the check and
/// the write one unit; a concurrent writer causes a retry.
///
/// A connection is opened per call with a bounded timeout so an unreachable
/// store fails fast instead of stalling the run.
pub struct RedisStore {
    client: redis::Client,
    timeout: Duration,
}

impl RedisStore {
    /// Build a store for `url` (e.g. `redis://localhost:6379/0`).
    /// No connection is made until the first batch or read.
    pub fn open(url: &str, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| GuardError::Metrics(format!("invalid store address {}: {}", url, e)))?;
        Ok(Self { client, timeout })
    }

    pub fn url(host: &str, port: u16, db: i64) -> String {
        format!("redis://{}:{}/{}", host, port, db)
    }

    fn connection(&self) -> Result<redis::Connection> {
        let conn = self.client.get_connection_with_timeout(self.timeout)?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        Ok(conn)
    }
}

impl CounterStore for RedisStore {
    fn apply_batch(&self, batch: &MetricsBatch) -> Result<()> {
        let mut conn = self.connection()?;
        let keys = batch.counter_keys();

        if keys.is_empty() {
            let mut pipe = redis::pipe();
            queue_ops(pipe.atomic(), batch);
            pipe.query::<()>(&mut conn)?;
            return Ok(());
        }

        redis::transaction(&mut conn, keys.as_slice(), |conn, pipe| {
            for key in &keys {
                let current: Option<String> = conn.get(*key)?;
                if let Some(value) = current.filter(|v| !is_counter(v)) {
                    return Err(RedisError::from((
                        ErrorKind::TypeError,
                        "counter is not an integer",
                        format!("{} = {:?}", key, value),
                    )));
                }
            }
            queue_ops(pipe, batch).query::<Option<()>>(conn)
        })?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection()?;
        let value: Option<String> = conn.get(key)?;
        Ok(value)
    }
}

fn queue_ops<'p>(pipe: &'p mut redis::Pipeline, batch: &MetricsBatch) -> &'p mut redis::Pipeline {
    for op in batch.ops() {
        match op {
            CounterOp::IncrBy { key, delta } => {
                pipe.incr(*key, *delta).ignore();
            }
            CounterOp::Set { key, value } => {
                pipe.set(*key, value.as_str()).ignore();
            }
        }
    }
    pipe
}
