//! Explicit call instrumentation
//!
//! The adapter records one trace record per predict/predict_stream
//! invocation. Instead of an ambient interceptor this is done by
//! composition: [`traced`] wraps a single future, and [`TraceGuard`]
//! is moved into a stream's state so the record covers the whole
//! streaming lifetime, including early drops by the consumer.

use std::future::Future;
use std::time::Instant;

use tracing::info;

use crate::error::Result;

/// Run `fut` and emit one trace record with timing and outcome
pub async fn traced<T, Fut>(operation: &'static str, input: &str, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    let started = Instant::now();
    info!(operation, input, "call started");

    let result = fut.await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match &result {
        Ok(_) => info!(operation, elapsed_ms, outcome = "ok", "call finished"),
        Err(e) => info!(operation, elapsed_ms, outcome = "error", error = %e, "call finished"),
    }

    result
}

/// Guard that emits a trace record when dropped
///
/// Dropping happens when the owning stream is exhausted or abandoned,
/// so the recorded duration spans the whole streaming lifetime.
#[derive(Debug)]
pub struct TraceGuard {
    operation: &'static str,
    started: Instant,
}

impl TraceGuard {
    /// Start a trace record for `operation`
    pub fn new(operation: &'static str, input: &str) -> Self {
        info!(operation, input, "call started");
        Self {
            operation,
            started: Instant::now(),
        }
    }
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        info!(operation = self.operation, elapsed_ms, "call finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_traced_passes_through_ok() {
        let result = traced("predict", "hello", async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_traced_passes_through_error() {
        let result: Result<()> = traced("predict", "hello", async {
            Err(Error::BackendApi("boom".to_string()))
        })
        .await;
        assert!(matches!(result, Err(Error::BackendApi(_))));
    }

    #[test]
    fn test_guard_drop_does_not_panic() {
        let guard = TraceGuard::new("predict_stream", "hello");
        drop(guard);
    }
}
