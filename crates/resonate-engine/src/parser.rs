//! Recovers the rewritten text and its score tuple from a chat reply.
//!
//! The model is asked to end its answer with `[SCORES] a,b,c,d,e`, but it
//! does not always comply. Extraction is an ordered chain of strategies;
//! the first one that recovers five scores wins and anything else falls
//! through to neutral scores. Nothing here can fail the caller.

use once_cell::sync::Lazy;
use regex::Regex;
use resonate_contracts::dna::{LinguisticDna, MAX_SCORE};
use resonate_contracts::result::{ScoreSource, TransformResult};
use serde_json::Value;

use crate::prompt::SCORE_DELIMITER;

static INTEGER_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("integer run pattern is valid"));

static FIVE_SCORE_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})")
        .expect("five score run pattern is valid")
});

const UNEXPECTED_ENVELOPE: &str = "Unexpected response from the model endpoint";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreStrategy {
    /// Split once on the delimiter token and read the integers after it.
    Delimiter,
    /// Find a standalone run of five comma-separated numbers anywhere.
    InlineRun,
}

impl ScoreStrategy {
    pub const CHAIN: [ScoreStrategy; 2] = [ScoreStrategy::Delimiter, ScoreStrategy::InlineRun];

    pub fn extract(self, content: &str) -> Option<(String, LinguisticDna)> {
        match self {
            ScoreStrategy::Delimiter => extract_after_delimiter(content),
            ScoreStrategy::InlineRun => extract_inline_run(content),
        }
    }

    fn source(self) -> ScoreSource {
        match self {
            ScoreStrategy::Delimiter => ScoreSource::Delimiter,
            ScoreStrategy::InlineRun => ScoreSource::InlineRun,
        }
    }
}

/// Turns a chat-completion envelope into a result.
pub fn parse_reply(envelope: &Value) -> TransformResult {
    if envelope.get("choices").and_then(Value::as_array).is_none() {
        return TransformResult::api_error(&envelope_error_detail(envelope));
    }
    let Some(message) = envelope.pointer("/choices/0/message") else {
        return TransformResult::failed("reply contained no message");
    };
    let Some(content) = message.get("content").and_then(Value::as_str) else {
        return TransformResult::failed("reply message content was not text");
    };
    parse_content(content)
}

/// Runs the strategy chain over the raw message text.
pub fn parse_content(content: &str) -> TransformResult {
    let content = content.trim();
    for strategy in ScoreStrategy::CHAIN {
        if let Some((text, scores)) = strategy.extract(content) {
            return TransformResult::scored(text, scores, strategy.source());
        }
    }
    TransformResult::unscored(content)
}

fn envelope_error_detail(envelope: &Value) -> String {
    let detail = match envelope.get("error") {
        Some(Value::String(text)) => Some(text.trim().to_string()),
        Some(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(|text| text.trim().to_string()),
        _ => None,
    };
    detail
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNEXPECTED_ENVELOPE.to_string())
}

fn extract_after_delimiter(content: &str) -> Option<(String, LinguisticDna)> {
    let (before, after) = content.split_once(SCORE_DELIMITER)?;
    let values: Vec<u32> = INTEGER_RUN
        .find_iter(after)
        .take(5)
        .map(|found| found.as_str().parse::<u32>().unwrap_or(u32::MAX))
        .collect();
    let scores = LinguisticDna::from_leading(&values)?;
    Some((before.trim().to_string(), scores))
}

/// Picks the last qualifying run: five 1-3 digit numbers, each at most 100,
/// not glued to further digits or list items on either side.
fn extract_inline_run(content: &str) -> Option<(String, LinguisticDna)> {
    let (start, end, values) = FIVE_SCORE_RUN
        .captures_iter(content)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            if !is_standalone_run(content, whole.start(), whole.end()) {
                return None;
            }
            let values = (1..=5)
                .map(|idx| captures.get(idx)?.as_str().parse::<u32>().ok())
                .collect::<Option<Vec<u32>>>()?;
            if values.iter().any(|value| *value > u32::from(MAX_SCORE)) {
                return None;
            }
            Some((whole.start(), whole.end(), values))
        })
        .last()?;

    let scores = LinguisticDna::from_leading(&values)?;
    let stripped = format!("{}{}", &content[..start], &content[end..]);
    let text = stripped.replace(SCORE_DELIMITER, "");
    Some((text.trim().to_string(), scores))
}

fn is_standalone_run(content: &str, start: usize, end: usize) -> bool {
    let before = &content[..start];
    if before.ends_with(|ch: char| ch.is_ascii_digit()) {
        return false;
    }
    if let Some(rest) = before.trim_end().strip_suffix(',') {
        if rest.trim_end().ends_with(|ch: char| ch.is_ascii_digit()) {
            return false;
        }
    }

    let after = &content[end..];
    if after.starts_with(|ch: char| ch.is_ascii_digit()) {
        return false;
    }
    if let Some(rest) = after.trim_start().strip_prefix(',') {
        if rest.trim_start().starts_with(|ch: char| ch.is_ascii_digit()) {
            return false;
        }
    }
    true
}
