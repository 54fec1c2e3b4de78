use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::dna::LinguisticDna;
use crate::request::TransformRequest;
use crate::result::TransformResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub original_text: String,
    pub transformed_text: String,
    pub style_label: String,
    pub scores: LinguisticDna,
    pub created_at: String,
}

/// Session-scoped state: the latest result plus every successful rewrite in
/// submission order. Entries are never edited or removed.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    current: Option<TransformResult>,
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `result` as the current one. Failed transformations replace the
    /// current result but are not appended to the history.
    pub fn record(&mut self, request: &TransformRequest, result: TransformResult) -> Option<&HistoryEntry> {
        let appended = !result.is_failure();
        if appended {
            self.entries.push(HistoryEntry {
                original_text: request.source_text.clone(),
                transformed_text: result.rewritten_text.clone(),
                style_label: request.style_label(),
                scores: result.scores,
                created_at: now_utc_iso(),
            });
        }
        self.current = Some(result);
        if appended {
            self.entries.last()
        } else {
            None
        }
    }

    pub fn current(&self) -> Option<&TransformResult> {
        self.current.as_ref()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        self.entries.as_slice()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
