pub mod audio;
pub mod completion;
pub mod config;
pub mod error;
pub mod parser;
pub mod prompt;

use anyhow::{bail, Result};
use resonate_contracts::analysis::{hit_count, keyword_hits, KeywordHit};
use resonate_contracts::events::{payload, EventPayload, EventWriter};
use resonate_contracts::request::TransformRequest;
use resonate_contracts::result::TransformResult;
use resonate_contracts::style::StyleChoice;
use serde_json::{json, Value};

use crate::audio::{AudioClient, SpeechClip};
use crate::completion::CompletionClient;
use crate::config::EngineConfig;
use crate::parser::parse_reply;
use crate::prompt::build_prompt;

pub const EMPTY_INPUT_MESSAGE: &str = "Input required to resonate.";

/// Prompt, call, parse. Every failure is folded into the returned result.
pub fn run_transformation(client: &CompletionClient, request: &TransformRequest) -> TransformResult {
    let prompt = build_prompt(request);
    match client.complete(&prompt) {
        Ok(envelope) => parse_reply(&envelope),
        Err(err) => TransformResult::api_error(&err.to_string()),
    }
}

/// Runs rewrites and speech for one session and records what happened.
///
/// Holds no session state itself; the caller owns history and the current
/// result. Events are only written when a writer was supplied.
pub struct ResonateEngine {
    completion: CompletionClient,
    audio: AudioClient,
    credential_present: bool,
    events: Option<EventWriter>,
}

impl ResonateEngine {
    pub fn new(config: EngineConfig, events: Option<EventWriter>) -> Result<Self> {
        let audio = AudioClient::new(&config)?;
        let credential_present = config.credential.is_present();
        let completion = CompletionClient::new(config)?;
        Ok(Self {
            completion,
            audio,
            credential_present,
            events,
        })
    }

    pub fn model(&self) -> &str {
        self.completion.model()
    }

    pub fn credential_present(&self) -> bool {
        self.credential_present
    }

    pub fn event_writer(&self) -> Option<EventWriter> {
        self.events.clone()
    }

    pub fn emit_event(&self, event_type: &str, payload: EventPayload) -> Result<()> {
        if let Some(events) = &self.events {
            events.emit(event_type, payload)?;
        }
        Ok(())
    }

    /// Best effort: a broken event log never changes what the caller gets.
    fn record(&self, event_type: &str, payload: EventPayload) {
        let _ = self.emit_event(event_type, payload);
    }

    pub fn transform(&self, request: &TransformRequest) -> Result<TransformResult> {
        if request.source_text.trim().is_empty() {
            bail!(EMPTY_INPUT_MESSAGE);
        }
        let settings = &request.settings;
        self.record(
            "transform_started",
            payload(json!({
                "model": self.model(),
                "persona": settings.persona.slug(),
                "platform": settings.platform.slug(),
                "emoji_level": settings.emoji_level.slug(),
                "depth": settings.depth.slug(),
                "vibe": settings.vibe.slug(),
                "target_language": settings.target_language,
                "custom_instruction": settings.custom_instruction.is_some(),
                "keywords": settings.target_keywords.len(),
                "source_chars": request.source_text.chars().count(),
            })),
        );

        let result = run_transformation(&self.completion, request);

        if result.is_failure() {
            self.record(
                "transform_failed",
                payload(json!({
                    "style_label": request.style_label(),
                    "detail": result.rewritten_text,
                })),
            );
        } else {
            self.record(
                "transform_finished",
                payload(json!({
                    "style_label": request.style_label(),
                    "score_source": result.source.as_str(),
                    "scores": result.scores,
                    "text_chars": result.rewritten_text.chars().count(),
                })),
            );
        }
        Ok(result)
    }

    /// Keyword hits of `result` against the request's target keywords.
    pub fn check_keywords(
        &self,
        request: &TransformRequest,
        result: &TransformResult,
    ) -> Vec<KeywordHit> {
        let hits = keyword_hits(&request.settings.target_keywords, &result.rewritten_text);
        if !hits.is_empty() {
            self.record(
                "keyword_check",
                payload(json!({
                    "found": hit_count(&hits),
                    "total": hits.len(),
                    "missing": hits
                        .iter()
                        .filter(|hit| !hit.found)
                        .map(|hit| Value::String(hit.keyword.clone()))
                        .collect::<Vec<Value>>(),
                })),
            );
        }
        hits
    }

    pub fn speak(&self, text: &str) -> Result<SpeechClip> {
        match self.audio.synthesize(text) {
            Ok(clip) => {
                self.record(
                    "speech_synthesized",
                    payload(json!({
                        "source": clip.source.as_str(),
                        "format": clip.format.extension(),
                        "bytes": clip.bytes.len(),
                        "primary_miss": clip.primary_miss.as_ref().map(ToString::to_string),
                    })),
                );
                Ok(clip)
            }
            Err(err) => {
                self.record(
                    "speech_failed",
                    payload(json!({ "error": format!("{err:#}") })),
                );
                Err(err)
            }
        }
    }
}
