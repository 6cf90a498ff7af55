//! Bounded exponential backoff.
//!
//! The policy is a pure decision: given how many attempts have been made and whether the
//! last failure was transient, it says whether to try again and how long to wait first.
//! [`retry_with_backoff`] drives an async operation with it.

use crate::errors::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Total attempts (first try included) before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay after the first failed attempt; doubles after each further failure.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Wait for the given delay, then try again
    Retry(Duration),
    /// Stop and report the failure
    GiveUp,
}

/// Attempt limit and base delay for [`retry_with_backoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    pub max_attempts: u32,
    /// Delay after the first failure
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Decides the next step after `attempts_made` attempts (1-based) have failed.
    ///
    /// Non-transient failures never retry. Transient ones wait `base * 2^(attempts_made - 1)`.
    #[must_use]
    pub fn next_step(&self, attempts_made: u32, is_transient: bool) -> RetryStep {
        if !is_transient || attempts_made == 0 || attempts_made >= self.max_attempts {
            return RetryStep::GiveUp;
        }
        let exp = (attempts_made - 1).min(16);
        RetryStep::Retry(self.base_delay.saturating_mul(1 << exp))
    }
}

/// Runs `operation` until it succeeds, fails non-transiently, or runs out of attempts.
///
/// The last error is returned when retrying stops.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempts_made = 0;
    loop {
        attempts_made += 1;
        let error: Error = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        match policy.next_step(attempts_made, error.is_transient()) {
            RetryStep::Retry(delay) => {
                warn!(
                    "{label}: attempt {attempts_made} failed ({error}); retrying in {delay:?}"
                );
                tokio::time::sleep(delay).await;
            }
            RetryStep::GiveUp => {
                warn!("{label}: giving up after {attempts_made} attempt(s): {error}");
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn unavailable() -> Error {
        Error::External {
            service: "drive",
            status: Some(503),
            message: "backend unavailable".to_string(),
        }
    }

    #[test]
    fn test_delays_double_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next_step(1, true), RetryStep::Retry(Duration::from_secs(1)));
        assert_eq!(policy.next_step(2, true), RetryStep::Retry(Duration::from_secs(2)));
        assert_eq!(policy.next_step(3, true), RetryStep::GiveUp);
    }

    #[test]
    fn test_longer_policy_keeps_doubling() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
        };
        assert_eq!(policy.next_step(3, true), RetryStep::Retry(Duration::from_secs(4)));
        assert_eq!(policy.next_step(4, true), RetryStep::GiveUp);
    }

    #[test]
    fn test_non_transient_never_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next_step(1, false), RetryStep::GiveUp);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_three_transient_failures() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result: Result<()> = retry_with_backoff(RetryPolicy::default(), "grant", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 3 { Err(unavailable()) } else { Ok(()) }
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_one_transient_failure() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let value = retry_with_backoff(RetryPolicy::default(), "grant", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n == 0 { Err(unavailable()) } else { Ok(42) } }
        })
        .await
        .unwrap();

        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_is_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = retry_with_backoff(RetryPolicy::default(), "grant", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(Error::External {
                    service: "drive",
                    status: Some(403),
                    message: "forbidden".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(Error::External { status: Some(403), .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
