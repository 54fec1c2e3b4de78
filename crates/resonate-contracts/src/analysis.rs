use serde::Serialize;

use crate::dna::LinguisticDna;

const WORDS_PER_MINUTE: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordHit {
    pub keyword: String,
    pub found: bool,
}

/// Case-insensitive substring check of each target keyword against the
/// rewritten text. Blank keywords are skipped.
pub fn keyword_hits(keywords: &[String], text: &str) -> Vec<KeywordHit> {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .map(|keyword| keyword.trim())
        .filter(|keyword| !keyword.is_empty())
        .map(|keyword| KeywordHit {
            keyword: keyword.to_string(),
            found: haystack.contains(&keyword.to_lowercase()),
        })
        .collect()
}

pub fn hit_count(hits: &[KeywordHit]) -> usize {
    hits.iter().filter(|hit| hit.found).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadingMetrics {
    pub read_time_minutes: usize,
    pub clarity: u8,
    pub impact: u8,
}

impl ReadingMetrics {
    pub fn measure(text: &str, scores: &LinguisticDna) -> Self {
        Self {
            read_time_minutes: read_time_minutes(text),
            clarity: scores.clarity(),
            impact: scores.impact(),
        }
    }
}

/// Whole minutes at 150 words per minute, never below one.
pub fn read_time_minutes(text: &str) -> usize {
    (text.split_whitespace().count() / WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use crate::dna::LinguisticDna;

    use super::{hit_count, keyword_hits, read_time_minutes, ReadingMetrics};

    #[test]
    fn keyword_hits_are_case_insensitive() {
        let keywords = vec!["ai".to_string(), "growth".to_string()];
        let hits = keyword_hits(&keywords, "Our AI roadmap ships next quarter.");
        assert_eq!(hits.len(), 2);
        assert!(hits[0].found);
        assert!(!hits[1].found);
        assert_eq!(hit_count(&hits), 1);
    }

    #[test]
    fn blank_keywords_are_ignored() {
        let keywords = vec!["  ".to_string(), " Growth ".to_string()];
        let hits = keyword_hits(&keywords, "growth mindset");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].keyword, "Growth");
        assert!(hits[0].found);
    }

    #[test]
    fn read_time_has_one_minute_floor() {
        assert_eq!(read_time_minutes(""), 1);
        assert_eq!(read_time_minutes("short note"), 1);
        assert_eq!(read_time_minutes(&"word ".repeat(450)), 3);
    }

    #[test]
    fn metrics_derive_from_scores() {
        let metrics = ReadingMetrics::measure("hi", &LinguisticDna::new([90, 60, 10, 10, 80]));
        assert_eq!(metrics.read_time_minutes, 1);
        assert_eq!(metrics.clarity, 90);
        assert_eq!(metrics.impact, 70);
    }
}
