use reqwest::StatusCode;
use std::time::Duration;

/// Backoff for requests PocketBase rejected with 429 or 503.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting.
    pub fn disabled() -> Self {
        Self::immediate(1)
    }

    /// `max_attempts` attempts without sleeping between them.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub fn should_retry(&self, status: StatusCode, attempt: u32) -> bool {
        is_retryable_status(status) && attempt < self.max_attempts
    }

    pub fn next_backoff(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_backoff)
    }
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::default();
        let mut backoff = policy.initial_backoff;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(backoff.as_secs());
            backoff = policy.next_backoff(backoff);
        }
        assert_eq!(seen, vec![1, 2, 4, 8, 8]);
    }

    #[test]
    fn test_only_throttling_statuses_retry() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(StatusCode::TOO_MANY_REQUESTS, 1));
        assert!(policy.should_retry(StatusCode::SERVICE_UNAVAILABLE, 2));
        assert!(!policy.should_retry(StatusCode::SERVICE_UNAVAILABLE, 3));
        assert!(!policy.should_retry(StatusCode::INTERNAL_SERVER_ERROR, 1));
        assert!(!policy.should_retry(StatusCode::BAD_REQUEST, 1));
    }

    #[test]
    fn test_disabled_never_retries() {
        assert!(!RetryPolicy::disabled().should_retry(StatusCode::TOO_MANY_REQUESTS, 1));
    }
}
