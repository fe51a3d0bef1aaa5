//! Prioritised multi-backend chat client.
//!
//! ## Fallback walk
//!
//! Each call starts at the highest-priority backend and keeps its own cursor
//! into a private copy of the backend list, so concurrent calls never observe
//! each other's switches:
//!
//! ```text
//!  attempt 0 ──▶ backend[0] ── 429 ──▶ switch ──▶ backend[1] ── 404 ──▶ drop it
//!                                                     │
//!            ◀── wrap to backend[0] ◀── switch ◀─ 429 ┘ backend[2]
//! ```
//!
//! A rate-limited backend stays in the rotation; a missing model is dropped
//! for the rest of the call. With a single backend left, rate limits back off
//! exponentially instead.

use crate::agent::backend::{ChatBackend, LlmBackend};
use crate::agent::prompts::SYSTEM_INSTRUCTION;
use crate::agent::retry::{ErrorClass, RetryDecision, RetryPolicy};
use crate::config::AdvisorConfig;
use crate::error::AdvisorError;
use crate::model::ChatTurn;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Chat client over a priority-ordered list of backends.
#[derive(Clone)]
pub struct AdvisorClient {
    backends: Vec<Arc<dyn ChatBackend>>,
    policy: RetryPolicy,
}

impl fmt::Debug for AdvisorClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisorClient")
            .field("backends", &self.backend_names())
            .field("policy", &self.policy)
            .finish()
    }
}

impl AdvisorClient {
    pub fn new(
        backends: Vec<Arc<dyn ChatBackend>>,
        policy: RetryPolicy,
    ) -> Result<Self, AdvisorError> {
        if backends.is_empty() {
            return Err(AdvisorError::InvalidConfig(
                "At least one chat backend is required".into(),
            ));
        }
        Ok(Self { backends, policy })
    }

    /// Build the client described by `config`.
    ///
    /// Pre-built backends in `config.providers` take precedence over the
    /// `provider:model` specs, which are instantiated through the provider
    /// factory. Specs whose provider cannot be configured are skipped with a
    /// warning as long as at least one backend remains.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self, AdvisorError> {
        let policy = RetryPolicy::new(
            config.max_attempts,
            Duration::from_millis(config.retry_backoff_ms),
        );
        if !config.providers.is_empty() {
            return Self::new(config.providers.clone(), policy);
        }

        let mut backends: Vec<Arc<dyn ChatBackend>> = Vec::new();
        let mut first_err = None;
        for spec in &config.backends {
            match LlmBackend::from_spec(spec, config.temperature, config.max_tokens) {
                Ok(backend) => backends.push(Arc::new(backend)),
                Err(e) => {
                    warn!("Skipping backend {spec}: {e}");
                    first_err.get_or_insert(e);
                }
            }
        }
        match (backends.is_empty(), first_err) {
            (true, Some(e)) => Err(e),
            _ => {
                info!("Chat backends: {}", backends.iter().map(|b| b.name()).collect::<Vec<_>>().join(", "));
                Self::new(backends, policy)
            }
        }
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// One interview turn under the interview system instruction.
    pub async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<String, AdvisorError> {
        self.complete(SYSTEM_INSTRUCTION, message, history).await
    }

    /// Complete `message` under an arbitrary system prompt, walking the
    /// backends according to the retry policy.
    pub async fn complete(
        &self,
        system: &str,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, AdvisorError> {
        let mut candidates = self.backends.clone();
        let mut current = 0usize;

        for attempt in 0..self.policy.max_attempts {
            let backend = Arc::clone(&candidates[current]);
            let err = match backend.complete(system, history, message).await {
                Ok(reply) => {
                    debug!("{} answered on attempt {}", backend.name(), attempt + 1);
                    return Ok(reply);
                }
                Err(e) => e,
            };

            let class = err.class();
            let has_fallback = candidates.len() > 1;
            warn!(
                "{}: attempt {}/{} failed ({:?}): {}",
                backend.name(),
                attempt + 1,
                self.policy.max_attempts,
                class,
                err
            );

            match self.policy.decide(attempt, class, has_fallback) {
                RetryDecision::SwitchBackend => {
                    if class == ErrorClass::NotFound {
                        candidates.remove(current);
                    } else {
                        current += 1;
                    }
                    current %= candidates.len();
                    info!("Switching to backend {}", candidates[current].name());
                }
                RetryDecision::RetrySame(delay) => {
                    warn!("{}: retrying in {:?}", backend.name(), delay);
                    sleep(delay).await;
                }
                RetryDecision::Fail
                    if class != ErrorClass::Other && attempt + 1 >= self.policy.max_attempts =>
                {
                    return Err(AdvisorError::BackendsExhausted {
                        attempts: attempt + 1,
                        last_error: err.message,
                    });
                }
                RetryDecision::Fail => {
                    return Err(AdvisorError::LlmApiError {
                        backend: backend.name().to_string(),
                        message: err.message,
                    });
                }
            }
        }

        Err(AdvisorError::Internal(
            "retry loop ended without a decision".into(),
        ))
    }
}
