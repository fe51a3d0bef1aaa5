//! Prompts for the interview and for report extraction.
//!
//! Both live here so a prompt change never touches retry or parsing code,
//! and so tests can inspect them without a live model.

use crate::model::{ChatTurn, Role};

/// System instruction for the interview: clarify requirements one question at
/// a time, then give a sourced final recommendation.
pub const SYSTEM_INSTRUCTION: &str = r#"You are a Material Intelligence Agent for manufacturing and product design.

Your goal: help the user select the best material for their application.

PROTOCOL:
1. When the user asks for a material (e.g. "I need a metal for..."), do NOT answer immediately.
2. Ask clarifying questions ONE AT A TIME to narrow down the requirements.
3. Wait for the user's answer before asking the next question.

Questions to ask (adapt to the context, ask only the relevant ones):
   - Maximum operating temperature?
   - Required strength or load?
   - Indoor or outdoor environment?
   - Corrosion resistance required?
   - Lightweight or high-strength?
   - Budget limits?
   - Expected lifetime?
   - Conductivity needs?
   - Sustainability or recyclability preference?

4. Once you have enough information, give a Final Recommendation:
   - Summary of the user's requirements
   - Matching materials
   - Comparison table
   - Explanation with exact property values (tensile strength, density, ...)
   - Final recommended material and its trade-offs

BEHAVIOR:
- Be professional, helpful and concise.
- If the user asks for code, skip the material protocol and provide the code.
- Do not invent properties. Use standard engineering values.
- Always reference the applicable standards (ASTM, DIN, EN, ISO) when giving material properties.
- When recommending a material, cite its standard designation (e.g. "AISI 304" or "DIN 1.4301")."#;

/// System message for the extraction call.
pub const EXTRACTION_SYSTEM_PROMPT: &str =
    "You convert engineering conversations into structured JSON. Output JSON only.";

const EXTRACTION_HEADER: &str = r#"Analyze the following conversation between a user and a Material Intelligence Agent.
Extract the following information and return it as a JSON object:

1. "constraints": a list of the specific constraints the user mentioned (e.g. "Temp > 500C", "Cost < $10/kg").
2. "matches": a list of the materials discussed or considered. For each, include "name" and an object "properties" of the property values mentioned (e.g. "Tensile Strength": "505 MPa").
3. "explanation": a brief summary (max 100 words) of the reasoning behind the final recommendation.
4. "recommendation": the name of the final recommended material.

If some information is missing or was not reached yet, leave it empty or null.

Conversation History:"#;

/// Build the extraction request for a transcript.
///
/// The transcript is rendered one turn per line as `User: ...` / `AI: ...`.
pub fn report_extraction_prompt(history: &[ChatTurn]) -> String {
    let mut prompt = String::from(EXTRACTION_HEADER);
    for turn in history {
        let speaker = match turn.role {
            Role::User => "User",
            Role::Assistant => "AI",
        };
        prompt.push('\n');
        prompt.push_str(speaker);
        prompt.push_str(": ");
        prompt.push_str(&turn.content);
    }
    prompt.push_str("\n\nReturn ONLY raw JSON.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_is_rendered_in_order() {
        let history = [
            ChatTurn::user("I need a bracket material"),
            ChatTurn::assistant("Indoor or outdoor?"),
            ChatTurn::user("Outdoor, near the sea"),
        ];
        let prompt = report_extraction_prompt(&history);
        let user = prompt.find("User: I need a bracket material").expect("first turn");
        let ai = prompt.find("AI: Indoor or outdoor?").expect("second turn");
        let last = prompt.find("User: Outdoor, near the sea").expect("third turn");
        assert!(user < ai && ai < last);
        assert!(prompt.ends_with("Return ONLY raw JSON."));
    }

    #[test]
    fn prompt_names_every_field() {
        let prompt = report_extraction_prompt(&[]);
        for field in ["\"constraints\"", "\"matches\"", "\"explanation\"", "\"recommendation\""] {
            assert!(prompt.contains(field), "missing {field}");
        }
    }

    #[test]
    fn system_instruction_asks_one_question_at_a_time() {
        assert!(SYSTEM_INSTRUCTION.contains("ONE AT A TIME"));
        assert!(SYSTEM_INSTRUCTION.contains("ASTM"));
    }
}
