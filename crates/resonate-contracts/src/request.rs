use crate::style::{Depth, EmojiLevel, Persona, Platform, StyleChoice, Vibe};

pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

/// Everything the user selects besides the text itself.
///
/// The interactive session keeps one of these alive between submissions and
/// stamps a fresh [`TransformRequest`] out of it for every rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSettings {
    pub persona: Persona,
    pub platform: Platform,
    pub emoji_level: EmojiLevel,
    pub depth: Depth,
    pub vibe: Vibe,
    pub target_language: String,
    pub custom_instruction: Option<String>,
    pub target_keywords: Vec<String>,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            persona: Persona::default(),
            platform: Platform::default(),
            emoji_level: EmojiLevel::default(),
            depth: Depth::default(),
            vibe: Vibe::default(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            custom_instruction: None,
            target_keywords: Vec::new(),
        }
    }
}

impl StyleSettings {
    pub fn request(&self, source_text: impl Into<String>) -> TransformRequest {
        TransformRequest {
            source_text: source_text.into(),
            settings: self.clone(),
        }
    }

    pub fn set_target_language(&mut self, raw: &str) {
        let trimmed = raw.trim();
        self.target_language = if trimmed.is_empty() {
            DEFAULT_TARGET_LANGUAGE.to_string()
        } else {
            trimmed.to_string()
        };
    }

    pub fn set_custom_instruction(&mut self, raw: &str) {
        let trimmed = raw.trim();
        self.custom_instruction = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    /// Blank entries are dropped and duplicates (ignoring case) keep their
    /// first position.
    pub fn set_target_keywords<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for keyword in keywords {
            let trimmed = keyword.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            if deduped
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(trimmed))
            {
                continue;
            }
            deduped.push(trimmed.to_string());
        }
        self.target_keywords = deduped;
    }

    pub fn style_label(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.persona.label(),
            self.platform.label(),
            self.vibe.label(),
            self.target_language
        )
    }
}

/// One submitted rewrite. Built once and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    pub source_text: String,
    pub settings: StyleSettings,
}

impl TransformRequest {
    pub fn new(source_text: impl Into<String>) -> Self {
        StyleSettings::default().request(source_text)
    }

    pub fn style_label(&self) -> String {
        self.settings.style_label()
    }
}
