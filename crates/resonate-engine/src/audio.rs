use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;

use crate::config::{Credential, EngineConfig};
use crate::error::{error_chain_text, AudioUnavailable, ConfigError};

/// Longest text the translate voice accepts per request.
pub const FALLBACK_CHUNK_CHARS: usize = 100;
const FALLBACK_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn mime(self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mp3",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechSource {
    Neural,
    Fallback,
}

impl SpeechSource {
    pub fn as_str(self) -> &'static str {
        match self {
            SpeechSource::Neural => "neural",
            SpeechSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpeechClip {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    pub source: SpeechSource,
    /// Why the hosted voice was skipped, when the fallback produced the clip.
    pub primary_miss: Option<AudioUnavailable>,
}

impl SpeechClip {
    pub fn base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// `data:` URL ready to embed in an `<audio>` source.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime(), self.base64())
    }
}

/// Hosted neural text-to-speech. Produces WAV bytes or reports why not.
#[derive(Debug, Clone)]
pub struct NeuralSpeech {
    endpoint: String,
    credential: Credential,
    missing: ConfigError,
    http: HttpClient,
}

impl NeuralSpeech {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build speech HTTP client")?;
        Ok(Self {
            endpoint: config.speech_url.clone(),
            credential: config.credential.clone(),
            missing: config.missing_credential(),
            http,
        })
    }

    pub fn synthesize(&self, text: &str) -> Result<Vec<u8>, AudioUnavailable> {
        let api_key = self
            .credential
            .token()
            .ok_or_else(|| AudioUnavailable::Config(self.missing.clone()))?;
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({ "inputs": text }))
            .send()
            .map_err(|err| AudioUnavailable::Transport {
                message: error_chain_text(&err, 256),
            })?;
        let code = response.status().as_u16();
        if code != 200 {
            return Err(AudioUnavailable::Status { code });
        }
        let bytes = response
            .bytes()
            .map_err(|err| AudioUnavailable::Transport {
                message: error_chain_text(&err, 256),
            })?;
        if bytes.is_empty() {
            return Err(AudioUnavailable::EmptyBody);
        }
        Ok(bytes.to_vec())
    }
}

/// Translate-service voice (English, UK host). Needs no credential and
/// returns concatenated MP3 segments.
#[derive(Debug, Clone)]
pub struct TranslateSpeech {
    endpoint: String,
    http: HttpClient,
}

impl TranslateSpeech {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build fallback speech HTTP client")?;
        Ok(Self {
            endpoint: config.fallback_speech_url.clone(),
            http,
        })
    }

    pub fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let chunks = split_speech_chunks(text, FALLBACK_CHUNK_CHARS);
        if chunks.is_empty() {
            bail!("No text to speak");
        }
        let total = chunks.len().to_string();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let response = self
                .http
                .get(&self.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", FALLBACK_LANGUAGE),
                    ("q", chunk.as_str()),
                    ("idx", idx.to_string().as_str()),
                    ("total", total.as_str()),
                    ("textlen", chunk.chars().count().to_string().as_str()),
                ])
                .send()
                .with_context(|| format!("fallback speech request failed ({})", self.endpoint))?;
            let status = response.status();
            if !status.is_success() {
                bail!(
                    "fallback speech request failed ({}) for chunk {}/{}",
                    status.as_u16(),
                    idx + 1,
                    chunks.len()
                );
            }
            let bytes = response
                .bytes()
                .context("fallback speech response body read failed")?;
            audio.extend_from_slice(&bytes);
        }
        Ok(audio)
    }
}

/// Hosted voice first; the translate voice whenever the hosted one yields
/// nothing. Fallback errors are returned to the caller.
#[derive(Debug, Clone)]
pub struct AudioClient {
    primary: NeuralSpeech,
    fallback: TranslateSpeech,
}

impl AudioClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            primary: NeuralSpeech::new(config)?,
            fallback: TranslateSpeech::new(config)?,
        })
    }

    pub fn synthesize(&self, text: &str) -> Result<SpeechClip> {
        let miss = match self.primary.synthesize(text) {
            Ok(bytes) => {
                return Ok(SpeechClip {
                    bytes,
                    format: AudioFormat::Wav,
                    source: SpeechSource::Neural,
                    primary_miss: None,
                })
            }
            Err(miss) => miss,
        };
        let bytes = self.fallback.synthesize(text)?;
        Ok(SpeechClip {
            bytes,
            format: AudioFormat::Mp3,
            source: SpeechSource::Fallback,
            primary_miss: Some(miss),
        })
    }
}

/// Splits on whitespace into chunks of at most `max_chars` characters.
/// Words longer than the limit are cut hard.
pub fn split_speech_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let letters: Vec<char> = word.chars().collect();
            chunks.extend(
                letters
                    .chunks(max_chars)
                    .map(|piece| piece.iter().collect::<String>()),
            );
            continue;
        }
        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use crate::config::{Credential, EngineConfig};
    use crate::error::AudioUnavailable;

    use super::{
        split_speech_chunks, AudioClient, AudioFormat, NeuralSpeech, SpeechSource,
        TranslateSpeech,
    };

    fn config(server_url: &str, credential: Credential) -> EngineConfig {
        EngineConfig {
            speech_url: format!("{server_url}/tts"),
            fallback_speech_url: format!("{server_url}/translate_tts"),
            credential,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn neural_returns_wav_bytes_on_200() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/tts")
            .match_header("authorization", "Bearer hf_test")
            .match_body(Matcher::Json(serde_json::json!({"inputs": "hello"})))
            .with_status(200)
            .with_body(b"RIFFwav".as_slice())
            .create();

        let speech = NeuralSpeech::new(&config(&server.url(), Credential::Token("hf_test".into())))?;
        assert_eq!(speech.synthesize("hello"), Ok(b"RIFFwav".to_vec()));
        mock.assert();
        Ok(())
    }

    #[test]
    fn neural_without_credential_skips_network() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", Matcher::Any).expect(0).create();

        let speech = NeuralSpeech::new(&config(&server.url(), Credential::Missing))?;
        let miss = speech.synthesize("hello").err();

        mock.assert();
        assert!(matches!(miss, Some(AudioUnavailable::Config(_))));
        Ok(())
    }

    #[test]
    fn neural_non_200_is_unavailable() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let _unavailable = server.mock("POST", "/tts").with_status(503).create();

        let speech = NeuralSpeech::new(&config(&server.url(), Credential::Token("hf_test".into())))?;
        assert_eq!(
            speech.synthesize("hello"),
            Err(AudioUnavailable::Status { code: 503 })
        );
        Ok(())
    }

    #[test]
    fn fallback_requests_each_chunk_and_concatenates() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let first = server
            .mock("GET", "/translate_tts")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("tl".into(), "en".into()),
                Matcher::UrlEncoded("client".into(), "tw-ob".into()),
                Matcher::UrlEncoded("idx".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body("ID3-a")
            .create();
        let second = server
            .mock("GET", "/translate_tts")
            .match_query(Matcher::UrlEncoded("idx".into(), "1".into()))
            .with_status(200)
            .with_body("ID3-b")
            .create();

        let speech = TranslateSpeech::new(&config(&server.url(), Credential::Missing))?;
        let text = format!("{} {}", "a".repeat(60), "b".repeat(60));
        let bytes = speech.synthesize(&text)?;

        first.assert();
        second.assert();
        assert_eq!(bytes, b"ID3-aID3-b".to_vec());
        Ok(())
    }

    #[test]
    fn fallback_rejects_empty_text_and_error_status() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let _throttled = server
            .mock("GET", "/translate_tts")
            .match_query(Matcher::Any)
            .with_status(429)
            .create();

        let speech = TranslateSpeech::new(&config(&server.url(), Credential::Missing))?;
        assert!(speech.synthesize("   ").is_err());
        let err = speech.synthesize("hello").err().map(|err| err.to_string());
        assert_eq!(
            err.as_deref(),
            Some("fallback speech request failed (429) for chunk 1/1")
        );
        Ok(())
    }

    #[test]
    fn audio_client_prefers_neural_then_falls_back() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let _neural = server
            .mock("POST", "/tts")
            .with_status(200)
            .with_body("RIFF")
            .create();
        let _fallback = server
            .mock("GET", "/translate_tts")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("ID3")
            .create();

        let neural = AudioClient::new(&config(&server.url(), Credential::Token("hf_test".into())))?
            .synthesize("hello")?;
        assert_eq!(neural.source, SpeechSource::Neural);
        assert_eq!(neural.format, AudioFormat::Wav);
        assert!(neural.primary_miss.is_none());
        assert_eq!(neural.data_url(), "data:audio/wav;base64,UklGRg==");

        let fallback = AudioClient::new(&config(&server.url(), Credential::Missing))?
            .synthesize("hello")?;
        assert_eq!(fallback.source, SpeechSource::Fallback);
        assert_eq!(fallback.format, AudioFormat::Mp3);
        assert_eq!(fallback.bytes, b"ID3".to_vec());
        assert!(matches!(fallback.primary_miss, Some(AudioUnavailable::Config(_))));
        Ok(())
    }

    #[test]
    fn chunks_respect_word_boundaries_and_limit() {
        assert!(split_speech_chunks("  ", 10).is_empty());
        assert_eq!(
            split_speech_chunks("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert_eq!(
            split_speech_chunks("tiny abcdefghijkl end", 5),
            vec!["tiny", "abcde", "fghij", "kl", "end"]
        );
        for chunk in split_speech_chunks(&"word ".repeat(80), 100) {
            assert!(chunk.chars().count() <= 100);
        }
    }
}
