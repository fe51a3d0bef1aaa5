//! Interview agent: prompts, chat backends, retry policy and report extraction.

pub mod backend;
pub mod client;
pub mod prompts;
pub mod report;
pub mod retry;

pub use backend::{BackendError, BackendSpec, ChatBackend, LlmBackend};
pub use client::AdvisorClient;
pub use report::{extract_report_data, parse_report_json, strip_code_fences};
pub use retry::{ErrorClass, RetryDecision, RetryPolicy};
