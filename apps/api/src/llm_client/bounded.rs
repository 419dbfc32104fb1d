//! Bounded remote call: races a generator invocation against a wall-clock deadline.
//!
//! The invocation runs as a detached tokio task. The caller waits on its `JoinHandle`
//! under `tokio::time::timeout`; the handle is the single write-once slot through which the
//! result crosses back.
//!
//! # Abandonment
//! On timeout the handle is dropped, NOT aborted. The underlying HTTP request cannot be
//! interrupted portably mid-flight, so the task runs to completion in the background and
//! its result is discarded. At most one such task exists per user action.

use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum CallError {
    #[error("call did not complete within {}s", after.as_secs_f64())]
    Timeout { after: Duration },

    #[error("upstream call failed: {0}")]
    Upstream(#[source] BoxError),
}

/// Runs `invocation` concurrently and waits for it up to `deadline`.
///
/// - Completes first with `Ok` → the value, unchanged.
/// - Completes first with `Err` (or panics) → `CallError::Upstream`.
/// - Deadline first → `CallError::Timeout`; the invocation keeps running detached.
///
/// No retries are performed.
pub async fn bounded_call<F, Fut, T, E>(deadline: Duration, invocation: F) -> Result<T, CallError>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: StdError + Send + Sync + 'static,
{
    let started = Instant::now();
    let handle = tokio::spawn(async move { invocation().await });

    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(Ok(value))) => {
            debug!(elapsed_ms = started.elapsed().as_millis() as u64, "bounded call completed");
            Ok(value)
        }
        Ok(Ok(Err(e))) => {
            warn!("bounded call failed upstream: {e}");
            Err(CallError::Upstream(Box::new(e)))
        }
        Ok(Err(join_error)) => {
            warn!("bounded call task did not finish: {join_error}");
            Err(CallError::Upstream(Box::new(join_error)))
        }
        Err(_) => {
            warn!(
                deadline_secs = deadline.as_secs_f64(),
                "bounded call timed out; abandoning in-flight invocation"
            );
            Err(CallError::Timeout { after: deadline })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use crate::llm_client::LlmError;

    #[tokio::test(start_paused = true)]
    async fn test_fast_generator_returns_result_unchanged() {
        let started = Instant::now();
        let result = bounded_call(Duration::from_secs(60), || async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, LlmError>("ATS SCORE: 81.0".to_string())
        })
        .await
        .unwrap();

        assert_eq!(result, "ATS SCORE: 81.0");
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(2), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_generator_times_out_at_deadline() {
        let started = Instant::now();
        let err = bounded_call(Duration::from_secs(2), || async {
            std::future::pending::<()>().await;
            Ok::<String, LlmError>(String::new())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CallError::Timeout { .. }));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "returned too early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "returned too late: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_generator_is_upstream_not_timeout() {
        let err = bounded_call(Duration::from_secs(60), || async {
            Err::<String, _>(LlmError::EmptyContent)
        })
        .await
        .unwrap_err();

        match err {
            CallError::Upstream(source) => {
                assert_eq!(source.to_string(), "LLM returned empty content");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_panicking_generator_is_upstream() {
        let err = bounded_call(Duration::from_secs(5), || async {
            if true {
                panic!("generator exploded");
            }
            Ok::<String, LlmError>(String::new())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CallError::Upstream(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_invocation_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let err = bounded_call(Duration::from_secs(2), move || async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, LlmError>("late".to_string())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CallError::Timeout { .. }));
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(4)).await;
        tokio::task::yield_now().await;
        assert!(finished.load(Ordering::SeqCst), "detached task was cancelled");
    }

    #[test]
    fn test_timeout_message_names_deadline() {
        let err = CallError::Timeout {
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "call did not complete within 30s");
    }
}
