//! Parse reasoning-service replies into a raw verdict
//!
//! The service is asked for a JSON object, but replies come back wrapped in
//! code fences, prefixed with chatter, or as labelled free text. Parsing runs
//! in two stages: structured JSON first, then a best-effort keyword recovery
//! over the raw text. The keyword stage is heuristic and can misclassify
//! unusual phrasing (a negated "not a mutual destruction" still reads as one).
//!
//! Nothing here validates values; see `battle::resolver` for clamping and the
//! fixed outcome mapping.

use crate::battle::outcome::OutcomeKind;
use crate::core::error::{ArenaError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Verdict as the service reported it, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVerdict {
    #[serde(default, alias = "outcome_type", alias = "outcome")]
    pub outcome_type: Option<String>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default, alias = "attacker_damage")]
    pub attacker_damage: Option<Value>,
    #[serde(default, alias = "defender_damage")]
    pub defender_damage: Option<Value>,
    #[serde(default, alias = "damage_amount", alias = "damage")]
    pub damage_amount: Option<Value>,
    #[serde(default, alias = "reasoning")]
    pub explanation: Option<String>,
}

/// Parse a reply, falling back to keyword recovery when it is not usable JSON
pub fn parse_verdict(response: &str) -> Result<RawVerdict> {
    if let Ok(json) = extract_json(response) {
        match serde_json::from_str::<RawVerdict>(json) {
            Ok(verdict) if verdict.outcome_type.is_some() => return Ok(verdict),
            Ok(_) => tracing::debug!("Structured verdict missing outcomeType, trying keywords"),
            Err(e) => tracing::debug!("Structured verdict unreadable ({}), trying keywords", e),
        }
    }

    recover_from_text(response).ok_or_else(|| {
        ArenaError::Llm(format!("Unrecognised verdict: {}", preview(response)))
    })
}

/// Extract JSON object from LLM response (handles surrounding text)
pub fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| ArenaError::Llm("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| ArenaError::Llm("No closing brace found in response".into()))?;
    if end < start {
        return Err(ArenaError::Llm("Malformed JSON braces in response".into()));
    }
    Ok(&response[start..=end])
}

/// Keyword recovery over free text.
///
/// Understands the labelled `REASONING: / OUTCOME: / DAMAGE:` layout, the
/// older DEFEAT/BLOCKED/NEUTRAL verdicts, and bare outcome names anywhere in
/// the text.
pub fn recover_from_text(text: &str) -> Option<RawVerdict> {
    // ASCII uppercasing keeps byte offsets aligned with `text`
    let upper = text.to_ascii_uppercase();

    let kind = labelled_value(text, &upper, "OUTCOME:")
        .and_then(classify_keyword)
        .or_else(|| scan_keywords(&text.to_lowercase()))?;

    let damage = labelled_value(text, &upper, "DAMAGE:").and_then(leading_integer);

    let explanation = labelled_block(text, &upper, "REASONING:")
        .or_else(|| labelled_block(text, &upper, "EXPLANATION:"))
        .map(str::to_string);

    Some(RawVerdict {
        outcome_type: Some(kind.as_str().to_string()),
        damage_amount: damage.map(Value::from),
        explanation,
        ..RawVerdict::default()
    })
}

/// Rest of the line after `label`
fn labelled_value<'a>(text: &'a str, upper: &str, label: &str) -> Option<&'a str> {
    let start = upper.find(label)? + label.len();
    let rest = &text[start..];
    let line = rest.lines().next().unwrap_or("").trim();
    (!line.is_empty()).then_some(line)
}

/// Text after `label` up to the next known label
fn labelled_block<'a>(text: &'a str, upper: &str, label: &str) -> Option<&'a str> {
    let start = upper.find(label)? + label.len();
    let tail_upper = &upper[start..];
    let end = ["OUTCOME:", "DAMAGE:"]
        .iter()
        .filter_map(|next| tail_upper.find(next))
        .min()
        .unwrap_or(tail_upper.len());
    let block = text[start..start + end].trim();
    (!block.is_empty()).then_some(block)
}

fn classify_keyword(word: &str) -> Option<OutcomeKind> {
    let cleaned = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '_');
    if let Some(kind) = OutcomeKind::parse(cleaned) {
        return Some(kind);
    }
    scan_keywords(&cleaned.to_lowercase())
}

const KEYWORDS: &[(&str, OutcomeKind)] = &[
    ("mutual_destruction", OutcomeKind::MutualDestruction),
    ("mutual destruction", OutcomeKind::MutualDestruction),
    ("backfire", OutcomeKind::BackfireWin),
    ("direct_loss", OutcomeKind::DirectLoss),
    ("direct loss", OutcomeKind::DirectLoss),
    ("direct_win", OutcomeKind::DirectWin),
    ("direct win", OutcomeKind::DirectWin),
    ("neutral", OutcomeKind::NeutralNoDamage),
    ("blocked", OutcomeKind::DirectWin),
    ("defeat", OutcomeKind::DirectLoss),
];

fn scan_keywords(lower: &str) -> Option<OutcomeKind> {
    KEYWORDS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, kind)| *kind)
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // oversized amounts saturate so validation clamps them to the cap
    let n = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * n)
}

fn preview(response: &str) -> String {
    let mut out: String = response.chars().take(80).collect();
    if response.chars().count() > 80 {
        out.push_str("...");
    }
    out
}
