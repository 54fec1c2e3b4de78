use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_CHAT_URL: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_SPEECH_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/mms-tts-eng";
pub const DEFAULT_FALLBACK_SPEECH_URL: &str = "https://translate.google.co.uk/translate_tts";
pub const DEFAULT_MODEL: &str = "meta-llama/Meta-Llama-3-8B-Instruct";
pub const DEFAULT_SECRETS_PATH: &str = ".streamlit/secrets.toml";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Value shipped in templates in place of a real token; treated as absent.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_HUGGING_FACE_API_KEY_HERE";
const TOKEN_KEYS: &[&str] = &["HUGGING_FACE_API_KEY", "HF_TOKEN"];

#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Token(String),
    Missing,
}

impl Credential {
    /// Empty values and the placeholder sentinel both resolve to `Missing`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) if !value.is_empty() && value != PLACEHOLDER_TOKEN => {
                Credential::Token(value.to_string())
            }
            _ => Credential::Missing,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Credential::Token(token) => Some(token.as_str()),
            Credential::Missing => None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.token().is_some()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Token(_) => f.write_str("Credential::Token(<redacted>)"),
            Credential::Missing => f.write_str("Credential::Missing"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub chat_url: String,
    pub speech_url: String,
    pub fallback_speech_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
    pub credential: Credential,
    pub secrets_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chat_url: DEFAULT_CHAT_URL.to_string(),
            speech_url: DEFAULT_SPEECH_URL.to_string(),
            fallback_speech_url: DEFAULT_FALLBACK_SPEECH_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            credential: Credential::Missing,
            secrets_path: PathBuf::from(DEFAULT_SECRETS_PATH),
        }
    }
}

impl EngineConfig {
    /// Endpoints and model from `RESONATE_*` variables; the token from
    /// `HUGGING_FACE_API_KEY`/`HF_TOKEN`, then from the secrets file.
    pub fn from_env(secrets_path: Option<&Path>) -> Self {
        let defaults = Self::default();
        let secrets_path = secrets_path
            .map(Path::to_path_buf)
            .unwrap_or(defaults.secrets_path);
        let token = first_non_empty_env(TOKEN_KEYS)
            .or_else(|| read_secret(&secrets_path, TOKEN_KEYS[0]));

        Self {
            chat_url: url_env("RESONATE_CHAT_URL").unwrap_or(defaults.chat_url),
            speech_url: url_env("RESONATE_TTS_URL").unwrap_or(defaults.speech_url),
            fallback_speech_url: url_env("RESONATE_FALLBACK_TTS_URL")
                .unwrap_or(defaults.fallback_speech_url),
            model: non_empty_env("RESONATE_MODEL").unwrap_or(defaults.model),
            credential: Credential::from_raw(token.as_deref()),
            secrets_path,
            ..defaults
        }
    }

    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.credential
            .token()
            .ok_or_else(|| self.missing_credential())
    }

    pub(crate) fn missing_credential(&self) -> ConfigError {
        ConfigError::MissingCredential {
            secrets_hint: self.secrets_path.display().to_string(),
        }
    }
}

/// Reads `key` from a flat TOML secrets file. Unreadable or malformed files
/// count as absent.
pub fn read_secret(path: &Path, key: &str) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let table: toml::Table = raw.parse().ok()?;
    table
        .get(key)
        .and_then(toml::Value::as_str)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn first_non_empty_env(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| non_empty_env(key))
}

fn url_env(key: &str) -> Option<String> {
    non_empty_env(key)
        .map(|value| value.trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
}
