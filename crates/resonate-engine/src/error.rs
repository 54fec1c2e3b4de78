use std::error::Error as StdError;

use thiserror::Error;

/// Raised before any network activity when no usable credential exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("API key is missing! Set HUGGING_FACE_API_KEY or add it to {secrets_hint}")]
    MissingCredential { secrets_hint: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("API Error {code}")]
    Status { code: u16 },
    #[error("{message}")]
    Transport { message: String },
}

impl ApiError {
    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        ApiError::Transport {
            message: error_chain_text(err, 512),
        }
    }
}

/// Why the hosted speech endpoint produced nothing. Never shown as a failure;
/// it only selects the fallback voice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioUnavailable {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("speech endpoint returned status {code}")]
    Status { code: u16 },
    #[error("speech endpoint unreachable: {message}")]
    Transport { message: String },
    #[error("speech endpoint returned an empty body")]
    EmptyBody,
}

pub(crate) fn error_chain_text(err: &(dyn StdError + 'static), max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut cause: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = cause {
        let text = current.to_string();
        let trimmed = text.trim();
        if !trimmed.is_empty()
            && !parts
                .last()
                .map(|existing| existing == trimmed)
                .unwrap_or(false)
        {
            parts.push(trimmed.to_string());
        }
        cause = current.source();
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
