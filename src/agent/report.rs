//! Structured report extraction from an interview transcript.

use crate::agent::client::AdvisorClient;
use crate::agent::prompts::{report_extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use crate::model::{ChatTurn, ReportData};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

/// Matches a Markdown code fence opener (with optional language tag) or closer.
static FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z0-9_-]*").unwrap());

/// Remove every Markdown code fence marker and trim.
pub fn strip_code_fences(text: &str) -> String {
    FENCE.replace_all(text, "").trim().to_string()
}

/// Parse a model reply as [`ReportData`], tolerating code fences.
pub fn parse_report_json(reply: &str) -> Result<ReportData, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(reply))
}

/// Ask the model to summarise `history` as [`ReportData`].
///
/// Never fails: a backend error or an unparseable reply is logged and the
/// [`ReportData::fallback`] document is returned so the report can still be
/// produced.
pub async fn extract_report_data(client: &AdvisorClient, history: &[ChatTurn]) -> ReportData {
    let prompt = report_extraction_prompt(history);
    let reply = match client.complete(EXTRACTION_SYSTEM_PROMPT, &prompt, &[]).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Report extraction failed, using fallback: {e}");
            return ReportData::fallback();
        }
    };

    match parse_report_json(&reply) {
        Ok(data) => {
            info!(
                "Extracted report: {} constraint(s), {} match(es)",
                data.constraints.len(),
                data.matches.len()
            );
            data
        }
        Err(e) => {
            warn!("Report reply is not valid JSON, using fallback: {e}");
            ReportData::fallback()
        }
    }
}
