//! Session persistence and the advisor service built on it.

pub mod service;
pub mod store;

pub use service::Advisor;
pub use store::{validate_id, JsonFileStore, MemoryStore, SessionEdit, SessionStore};
