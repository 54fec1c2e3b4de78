use serde::{Deserialize, Serialize};

use crate::dna::LinguisticDna;

pub const API_ERROR_PREFIX: &str = "⚠️ ";
pub const FAILURE_PREFIX: &str = "❌ Transformation Failed: ";

/// Which parser stage produced the scores of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Scores followed the delimiter token as instructed.
    Delimiter,
    /// Scores were found as a bare comma-separated run somewhere in the reply.
    InlineRun,
    /// Nothing recoverable; neutral scores were substituted.
    Default,
    /// The transformation did not produce a rewrite at all.
    Failed,
}

impl ScoreSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreSource::Delimiter => "delimiter",
            ScoreSource::InlineRun => "inline_run",
            ScoreSource::Default => "default",
            ScoreSource::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformResult {
    pub rewritten_text: String,
    pub scores: LinguisticDna,
    pub source: ScoreSource,
}

impl TransformResult {
    pub fn scored(rewritten_text: impl Into<String>, scores: LinguisticDna, source: ScoreSource) -> Self {
        Self {
            rewritten_text: rewritten_text.into(),
            scores,
            source,
        }
    }

    /// Reply text kept as-is with neutral scores.
    pub fn unscored(rewritten_text: impl Into<String>) -> Self {
        Self::scored(rewritten_text, LinguisticDna::NEUTRAL, ScoreSource::Default)
    }

    /// The endpoint answered with an error, or could not be reached.
    pub fn api_error(detail: &str) -> Self {
        Self::scored(
            format!("{API_ERROR_PREFIX}{detail}"),
            LinguisticDna::ZERO,
            ScoreSource::Failed,
        )
    }

    /// The endpoint answered but the reply could not be read.
    pub fn failed(reason: &str) -> Self {
        Self::scored(
            format!("{FAILURE_PREFIX}{reason}"),
            LinguisticDna::ZERO,
            ScoreSource::Failed,
        )
    }

    pub fn is_failure(&self) -> bool {
        self.source == ScoreSource::Failed
    }
}

#[cfg(test)]
mod tests {
    use crate::dna::LinguisticDna;

    use super::{ScoreSource, TransformResult};

    #[test]
    fn api_error_is_prefixed_and_zeroed() {
        let result = TransformResult::api_error("API Error 503");
        assert_eq!(result.rewritten_text, "⚠️ API Error 503");
        assert_eq!(result.scores, LinguisticDna::ZERO);
        assert!(result.is_failure());
    }

    #[test]
    fn failed_is_prefixed_and_zeroed() {
        let result = TransformResult::failed("reply content was not text");
        assert_eq!(
            result.rewritten_text,
            "❌ Transformation Failed: reply content was not text"
        );
        assert_eq!(result.scores, LinguisticDna::ZERO);
        assert_eq!(result.source, ScoreSource::Failed);
    }

    #[test]
    fn unscored_uses_neutral_default() {
        let result = TransformResult::unscored("plain");
        assert_eq!(result.scores, LinguisticDna::NEUTRAL);
        assert_eq!(result.source.as_str(), "default");
        assert!(!result.is_failure());
    }
}
