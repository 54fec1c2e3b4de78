use std::collections::BTreeMap;

use serde_json::Value;

use super::command_registry::{
    CommandSpec, KEYWORDS_COMMAND, NO_ARG_COMMANDS, SETTING_COMMANDS, SPEAK_COMMAND,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub action: String,
    pub raw: String,
    pub text: Option<String>,
    pub command_args: BTreeMap<String, Value>,
}

impl Intent {
    fn new(action: &str, raw: &str) -> Self {
        Self {
            action: action.to_string(),
            raw: raw.to_string(),
            text: None,
            command_args: BTreeMap::new(),
        }
    }
}

fn find_action(command: &str, specs: &[CommandSpec]) -> Option<&'static str> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

/// Comma-separated when a comma is present, shell-style words otherwise, so
/// both `/keywords ai, growth` and `/keywords "machine learning" ai` work.
fn parse_keyword_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    if arg.contains(',') {
        return arg
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.trim().is_empty())
            .collect(),
        Err(_) => arg
            .split_whitespace()
            .map(str::to_string)
            .filter(|value| !value.is_empty())
            .collect(),
    }
}

fn parse_optional_path_arg(arg: &str) -> Option<String> {
    if arg.trim().is_empty() {
        return None;
    }
    let parts = shell_words::split(arg).unwrap_or_else(|_| vec![arg.trim().to_string()]);
    let joined = parts.join(" ");
    (!joined.trim().is_empty()).then_some(joined)
}

pub fn parse_intent(text: &str) -> Intent {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return Intent::new("noop", text);
    }

    if let Some(slash_tail) = raw_trimmed.strip_prefix('/') {
        let command_len = slash_tail
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .count();
        if command_len > 0 {
            let command = slash_tail[..command_len].to_ascii_lowercase();
            let arg = slash_tail[command_len..].trim();

            if let Some(action) = find_action(&command, SETTING_COMMANDS) {
                let mut intent = Intent::new(action, text);
                intent
                    .command_args
                    .insert("value".to_string(), Value::String(arg.to_string()));
                return intent;
            }

            if command == KEYWORDS_COMMAND.command {
                let mut intent = Intent::new(KEYWORDS_COMMAND.action, text);
                intent.command_args.insert(
                    "keywords".to_string(),
                    Value::Array(
                        parse_keyword_args(arg)
                            .into_iter()
                            .map(Value::String)
                            .collect(),
                    ),
                );
                return intent;
            }

            if command == SPEAK_COMMAND.command {
                let mut intent = Intent::new(SPEAK_COMMAND.action, text);
                intent.command_args.insert(
                    "path".to_string(),
                    parse_optional_path_arg(arg)
                        .map(Value::String)
                        .unwrap_or(Value::Null),
                );
                return intent;
            }

            if let Some(action) = find_action(&command, NO_ARG_COMMANDS) {
                return Intent::new(action, text);
            }

            let mut intent = Intent::new("unknown", text);
            intent
                .command_args
                .insert("command".to_string(), Value::String(command));
            intent
                .command_args
                .insert("arg".to_string(), Value::String(arg.to_string()));
            return intent;
        }
    }

    let mut intent = Intent::new("transform", text);
    intent.text = Some(raw_trimmed.to_string());
    intent
}
