//! Retry and fallback policy for backend failures.
//!
//! The policy is a pure function of the attempt number, the class of the
//! failure and whether another backend is available. [`AdvisorClient`]
//! applies it; nothing here sleeps or holds state.
//!
//! | Failure     | Fallback available | Otherwise                                  |
//! |-------------|--------------------|--------------------------------------------|
//! | RateLimited | switch backend     | retry same after `base · 2^attempt`        |
//! | NotFound    | switch backend     | fail                                       |
//! | Other       | fail               | fail                                       |
//!
//! Any decision on the last allowed attempt is `Fail`.
//!
//! [`AdvisorClient`]: crate::agent::AdvisorClient

use std::time::Duration;

/// Coarse class of a backend failure, derived from its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    RateLimited,
    NotFound,
    Other,
}

impl ErrorClass {
    /// Classify a provider error message.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("429") || lower.contains("rate limit") || lower.contains("quota") {
            ErrorClass::RateLimited
        } else if lower.contains("404") || lower.contains("not found") {
            ErrorClass::NotFound
        } else {
            ErrorClass::Other
        }
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try the same backend again after the delay.
    RetrySame(Duration),
    /// Move on to the next backend immediately.
    SwitchBackend,
    /// Give up and surface the error.
    Fail,
}

/// Attempt cap and backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before retrying after the failed attempt `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Decide what follows the failure of attempt `attempt` (0-based).
    pub fn decide(&self, attempt: u32, class: ErrorClass, has_fallback: bool) -> RetryDecision {
        if attempt + 1 >= self.max_attempts {
            return RetryDecision::Fail;
        }
        match (class, has_fallback) {
            (ErrorClass::RateLimited, true) | (ErrorClass::NotFound, true) => {
                RetryDecision::SwitchBackend
            }
            (ErrorClass::RateLimited, false) => RetryDecision::RetrySame(self.backoff(attempt)),
            (ErrorClass::NotFound, false) | (ErrorClass::Other, _) => RetryDecision::Fail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(5, Duration::from_millis(2000))
    }

    #[test]
    fn classifies_provider_messages() {
        assert_eq!(ErrorClass::classify("HTTP 429 Too Many Requests"), ErrorClass::RateLimited);
        assert_eq!(ErrorClass::classify("Resource exhausted: Quota exceeded"), ErrorClass::RateLimited);
        assert_eq!(ErrorClass::classify("Rate limit reached"), ErrorClass::RateLimited);
        assert_eq!(ErrorClass::classify("404 model gemini-0 not found"), ErrorClass::NotFound);
        assert_eq!(ErrorClass::classify("Model Not Found"), ErrorClass::NotFound);
        assert_eq!(ErrorClass::classify("invalid api key"), ErrorClass::Other);
    }

    #[test]
    fn rate_limit_with_fallback_switches() {
        assert_eq!(
            policy().decide(0, ErrorClass::RateLimited, true),
            RetryDecision::SwitchBackend
        );
    }

    #[test]
    fn rate_limit_without_fallback_backs_off_doubling() {
        let p = policy();
        assert_eq!(
            p.decide(0, ErrorClass::RateLimited, false),
            RetryDecision::RetrySame(Duration::from_millis(2000))
        );
        assert_eq!(
            p.decide(1, ErrorClass::RateLimited, false),
            RetryDecision::RetrySame(Duration::from_millis(4000))
        );
        assert_eq!(
            p.decide(3, ErrorClass::RateLimited, false),
            RetryDecision::RetrySame(Duration::from_millis(16000))
        );
    }

    #[test]
    fn last_attempt_fails() {
        let p = policy();
        assert_eq!(p.decide(4, ErrorClass::RateLimited, false), RetryDecision::Fail);
        assert_eq!(p.decide(4, ErrorClass::RateLimited, true), RetryDecision::Fail);
    }

    #[test]
    fn not_found_switches_or_fails() {
        let p = policy();
        assert_eq!(p.decide(0, ErrorClass::NotFound, true), RetryDecision::SwitchBackend);
        assert_eq!(p.decide(0, ErrorClass::NotFound, false), RetryDecision::Fail);
    }

    #[test]
    fn other_errors_fail_immediately() {
        let p = policy();
        assert_eq!(p.decide(0, ErrorClass::Other, true), RetryDecision::Fail);
        assert_eq!(p.decide(0, ErrorClass::Other, false), RetryDecision::Fail);
    }

    #[test]
    fn at_least_one_attempt() {
        let p = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(p.max_attempts, 1);
    }
}
