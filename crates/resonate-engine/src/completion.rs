use anyhow::{Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};

use crate::config::EngineConfig;
use crate::error::ApiError;
use crate::prompt::PromptPair;

/// One-shot client for an OpenAI-compatible chat-completion endpoint.
///
/// Every call is attempted exactly once; there is no retry or backoff.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    config: EngineConfig,
    http: HttpClient,
}

impl CompletionClient {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build chat completion HTTP client")?;
        Ok(Self { config, http })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn payload(&self, prompt: &PromptPair) -> Value {
        json!({
            "model": self.config.model,
            "messages": prompt.messages(),
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        })
    }

    /// Returns the decoded JSON envelope of a 200 response.
    ///
    /// A missing credential fails before any request is built.
    pub fn complete(&self, prompt: &PromptPair) -> Result<Value, ApiError> {
        let api_key = self.config.require_token()?;
        let response = self
            .http
            .post(&self.config.chat_url)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&self.payload(prompt))
            .send()
            .map_err(|err| ApiError::transport(&err))?;

        let code = response.status().as_u16();
        if code != 200 {
            return Err(ApiError::Status { code });
        }
        response
            .json::<Value>()
            .map_err(|err| ApiError::transport(&err))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use crate::config::{Credential, EngineConfig};
    use crate::error::{ApiError, ConfigError};
    use crate::prompt::PromptPair;

    use super::CompletionClient;

    fn prompt() -> PromptPair {
        PromptPair {
            system: "You are Resonate AI.".to_string(),
            user: "Text: \"hi\"".to_string(),
        }
    }

    fn config(chat_url: String, credential: Credential) -> EngineConfig {
        EngineConfig {
            chat_url,
            credential,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn posts_chat_payload_with_bearer_token() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer hf_test")
            .match_body(Matcher::PartialJson(json!({
                "model": "meta-llama/Meta-Llama-3-8B-Instruct",
                "max_tokens": 1000,
                "temperature": 0.7,
                "messages": [
                    {"role": "system", "content": "You are Resonate AI."},
                    {"role": "user", "content": "Text: \"hi\""},
                ],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"Ahoy"}}]}"#)
            .create();

        let client = CompletionClient::new(config(
            format!("{}/v1/chat/completions", server.url()),
            Credential::Token("hf_test".to_string()),
        ))?;
        let envelope = client.complete(&prompt())?;

        mock.assert();
        assert_eq!(envelope["choices"][0]["message"]["content"], json!("Ahoy"));
        Ok(())
    }

    #[test]
    fn non_200_is_status_error() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat")
            .with_status(503)
            .with_body("model loading")
            .expect(1)
            .create();

        let client = CompletionClient::new(config(
            format!("{}/chat", server.url()),
            Credential::Token("hf_test".to_string()),
        ))?;
        let err = client.complete(&prompt()).err();

        mock.assert();
        assert_eq!(err, Some(ApiError::Status { code: 503 }));
        Ok(())
    }

    #[test]
    fn missing_credential_never_touches_network() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", Matcher::Any).expect(0).create();

        let client = CompletionClient::new(config(
            format!("{}/chat", server.url()),
            Credential::Missing,
        ))?;
        let err = client.complete(&prompt()).err();

        mock.assert();
        assert!(matches!(
            err,
            Some(ApiError::Config(ConfigError::MissingCredential { .. }))
        ));
        Ok(())
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() -> anyhow::Result<()> {
        let client = CompletionClient::new(config(
            "http://127.0.0.1:9/chat".to_string(),
            Credential::Token("hf_test".to_string()),
        ))?;
        let err = client.complete(&prompt()).err();
        assert!(matches!(err, Some(ApiError::Transport { .. })), "{err:?}");
        Ok(())
    }

    #[test]
    fn invalid_json_body_is_transport_error() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let _html = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create();

        let client = CompletionClient::new(config(
            format!("{}/chat", server.url()),
            Credential::Token("hf_test".to_string()),
        ))?;
        let err = client.complete(&prompt()).err();
        assert!(matches!(err, Some(ApiError::Transport { .. })), "{err:?}");
        Ok(())
    }
}
