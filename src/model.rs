//! Data model shared by the agent, the analysis core and the session store.
//!
//! [`ReportData`] is whatever the language model extracted from a transcript,
//! so every field is deserialised leniently: a missing field and an explicit
//! `null` both collapse to the empty value, and property values that arrive as
//! numbers or booleans are stringified. Only a wrong *shape* (e.g. `matches`
//! being a string) is rejected.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Free-text property label → free-text value, in the order the model wrote them.
pub type Properties = IndexMap<String, String>;

/// Name used when the model omitted a material's name.
pub const UNKNOWN_MATERIAL: &str = "Unknown";

/// A candidate material with its free-text engineering properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialMatch {
    #[serde(default = "unknown_name", deserialize_with = "name_or_unknown")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_properties")]
    pub properties: Properties,
}

impl MaterialMatch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Properties::new(),
        }
    }

    /// Append a property, keeping insertion order.
    pub fn with_property(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(label.into(), value.into());
        self
    }
}

/// Structured summary of an interview, as extracted by the language model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub constraints: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub matches: Vec<MaterialMatch>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendation: String,
}

impl ReportData {
    /// Document returned when extraction fails, so report generation can
    /// still proceed with empty sections.
    pub fn fallback() -> Self {
        Self {
            constraints: Vec::new(),
            matches: Vec::new(),
            explanation: "Could not generate explanation due to an error.".to_string(),
            recommendation: "Unknown".to_string(),
        }
    }
}

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "model", alias = "ai")]
    Assistant,
}

/// One message of an interview transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Title given to a session before its first message.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Maximum number of characters of the first message kept as session title.
pub const TITLE_MAX_CHARS: usize = 30;

/// A persisted interview: transcript plus the report data derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub history: Vec<ChatTurn>,

    pub created_at: DateTime<Utc>,

    /// Report data cached alongside the transcript it was derived from.
    /// Cleared whenever the transcript grows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_data: Option<ReportData>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: default_title(),
            history: Vec::new(),
            created_at: Utc::now(),
            report_data: None,
        }
    }

    /// Session title derived from the first user message.
    pub fn title_from_message(message: &str) -> String {
        if message.chars().count() > TITLE_MAX_CHARS {
            let head: String = message.chars().take(TITLE_MAX_CHARS).collect();
            format!("{head}...")
        } else {
            message.to_string()
        }
    }
}

// ── Lenient deserialisers ────────────────────────────────────────────────

fn default_title() -> String {
    DEFAULT_SESSION_TITLE.to_string()
}

fn unknown_name() -> String {
    UNKNOWN_MATERIAL.to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn name_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_name))
}

fn lenient_properties<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<IndexMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(label, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            (label, text)
        })
        .collect())
}
