//! Retry policy for store requests

use std::thread;
use std::time::Duration;

use tracing::warn;

use super::StoreError;

/// Longest single wait between attempts
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How often and how patiently a failed request is repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Also retry timeouts and connection failures
    pub retry_on_timeout: bool,
    /// Delay before the first retry, doubled for each further one
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_on_timeout: true,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// A policy that gives up after the first failure
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            retry_on_timeout: false,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (zero-based)
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out
    ///
    /// # Errors
    /// Returns the last error from `op`.
    pub fn run<T>(&self, mut op: impl FnMut() -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries && e.is_retryable(self.retry_on_timeout) => {
                    let delay = self.delay_for(attempt);
                    attempt += 1;
                    warn!(attempt, ?delay, "Store request failed, retrying: {e}");
                    thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable() -> StoreError {
        StoreError::Status {
            status: 503,
            body: "busy".to_string(),
        }
    }

    fn instant(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            retry_on_timeout: true,
            backoff: Duration::ZERO,
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            backoff: Duration::from_millis(100),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
        assert_eq!(policy.delay_for(40), MAX_BACKOFF);
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = instant(3).run(|| {
            calls += 1;
            if calls < 3 { Err(unavailable()) } else { Ok(calls) }
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let mut calls = 0;
        let result: Result<(), _> = instant(2).run(|| {
            calls += 1;
            Err(unavailable())
        });
        assert!(matches!(result, Err(StoreError::Status { status: 503, .. })));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_permanent_error_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = instant(5).run(|| {
            calls += 1;
            Err(StoreError::Status {
                status: 400,
                body: "parse_exception".to_string(),
            })
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_none_policy() {
        let mut calls = 0;
        let result: Result<(), _> = RetryPolicy::none().run(|| {
            calls += 1;
            Err(unavailable())
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
