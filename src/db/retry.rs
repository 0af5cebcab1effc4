//! Bounded retry with exponential backoff and a per-attempt timeout.

use std::future::Future;
use std::time::Duration;

use super::error::StoreError;

/// How store queries are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following `attempt` (0-based): base, 2×base, 4×base, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent. Each attempt is cut off after `attempt_timeout`.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    source: &str,
    mut op: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<StoreError>,
{
    let mut attempt: u32 = 0;
    loop {
        let err = match tokio::time::timeout(policy.attempt_timeout, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e.into(),
            Err(_) => StoreError::timeout(policy.attempt_timeout),
        };

        attempt += 1;
        if !err.kind.is_transient() || attempt >= policy.max_attempts {
            return Err(err);
        }

        let wait = policy.backoff(attempt - 1);
        tracing::warn!(
            source,
            attempt,
            max_attempts = policy.max_attempts,
            wait_ms = wait.as_millis() as u64,
            error = %err,
            "Store query failed, retrying"
        );
        tokio::time::sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::db::error::StoreErrorKind;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            attempt_timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(100),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn transient_failure_is_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast_policy(3), "profiles", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(StoreError::new(StoreErrorKind::Connection, "reset"))
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast_policy(5), "profiles", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::new(StoreErrorKind::Permission, "denied"))
        })
        .await;
        assert_eq!(result.unwrap_err().kind, StoreErrorKind::Permission);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast_policy(3), "rounds", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::new(StoreErrorKind::Connection, "down"))
        })
        .await;
        assert_eq!(result.unwrap_err().kind, StoreErrorKind::Connection);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn slow_attempt_times_out() {
        let policy = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
            attempt_timeout: Duration::from_millis(10),
        };
        let result: Result<(), StoreError> = with_retry(&policy, "tickets", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<(), StoreError>(())
        })
        .await;
        assert_eq!(result.unwrap_err().kind, StoreErrorKind::Timeout);
    }
}
