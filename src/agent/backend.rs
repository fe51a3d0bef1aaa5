//! Chat backends: one (provider, model) pair able to complete a chat.

use crate::agent::retry::ErrorClass;
use crate::error::AdvisorError;
use crate::model::{ChatTurn, Role};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// A failed completion, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        ErrorClass::classify(&self.message)
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BackendError {}

/// Something that can answer one chat turn.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Identifier used in logs and errors, e.g. `gemini:gemini-1.5-flash`.
    fn name(&self) -> &str;

    /// Answer `message` given the system prompt and the prior turns.
    async fn complete(
        &self,
        system: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, BackendError>;
}

/// A `provider:model` pair naming one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSpec {
    pub provider: String,
    pub model: String,
}

impl BackendSpec {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// Parse a comma-separated priority list, e.g. `gemini:gemini-1.5-flash,openai:gpt-4.1-mini`.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, AdvisorError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for BackendSpec {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once(':') {
            Some((provider, model)) if !provider.trim().is_empty() && !model.trim().is_empty() => {
                Ok(Self::new(provider.trim(), model.trim()))
            }
            _ => Err(AdvisorError::InvalidConfig(format!(
                "Backend '{s}' must be written as provider:model"
            ))),
        }
    }
}

impl fmt::Display for BackendSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}

/// [`ChatBackend`] over an `edgequake_llm` provider.
pub struct LlmBackend {
    name: String,
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
}

impl LlmBackend {
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn LLMProvider>,
        temperature: f32,
        max_tokens: usize,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            temperature,
            max_tokens,
        }
    }

    /// Instantiate the provider named by `spec`; its API key is read from the
    /// environment by the provider factory.
    pub fn from_spec(
        spec: &BackendSpec,
        temperature: f32,
        max_tokens: usize,
    ) -> Result<Self, AdvisorError> {
        let provider = ProviderFactory::create_llm_provider(&spec.provider, &spec.model)
            .map_err(|e| AdvisorError::ProviderNotConfigured {
                provider: spec.to_string(),
                hint: format!(
                    "Set the provider's API key (e.g. GEMINI_API_KEY, OPENAI_API_KEY) or choose \
                     other backends with --backends / MATINTEL_BACKENDS.\nError: {e}"
                ),
            })?;
        Ok(Self::new(spec.to_string(), provider, temperature, max_tokens))
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

impl fmt::Debug for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmBackend")
            .field("name", &self.name)
            .field("provider", &"<dyn LLMProvider>")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Provider message list: system prompt, prior turns, then the new message.
fn build_messages(system: &str, history: &[ChatTurn], message: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    for turn in history {
        messages.push(match turn.role {
            Role::User => ChatMessage::user(turn.content.as_str()),
            Role::Assistant => ChatMessage::assistant(turn.content.as_str()),
        });
    }
    messages.push(ChatMessage::user(message));
    messages
}

#[async_trait]
impl ChatBackend for LlmBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        system: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, BackendError> {
        let start = Instant::now();
        let messages = build_messages(system, history, message);
        let options = self.options();

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| BackendError::new(e.to_string()))?;

        debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            self.name,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );
        Ok(response.content)
    }
}
