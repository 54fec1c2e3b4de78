use std::fs;
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use resonate_contracts::analysis::{hit_count, KeywordHit, ReadingMetrics};
use resonate_contracts::chat::{parse_intent, Intent, CHAT_HELP_COMMANDS};
use resonate_contracts::dna::LinguisticDna;
use resonate_contracts::events::{payload, EventWriter};
use resonate_contracts::history::SessionHistory;
use resonate_contracts::request::{StyleSettings, TransformRequest};
use resonate_contracts::result::TransformResult;
use resonate_contracts::style::{Depth, EmojiLevel, Persona, Platform, StyleChoice, Vibe};
use resonate_engine::audio::SpeechClip;
use resonate_engine::config::EngineConfig;
use resonate_engine::{ResonateEngine, EMPTY_INPUT_MESSAGE};
use serde_json::{json, Value};

const BAR_CELLS: usize = 20;
const HISTORY_PREVIEW_CHARS: usize = 60;

#[derive(Debug, Parser)]
#[command(
    name = "resonate",
    version,
    about = "Rewrite text in a chosen voice and score how it lands"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Transform one piece of text and print the result.
    Run(RunArgs),
    /// Interactive session with history and slash commands.
    Chat(ChatArgs),
    /// Read text aloud into an audio file.
    Speak(SpeakArgs),
    /// List every persona, platform, emoji level, depth and vibe.
    Options,
}

#[derive(Debug, Args)]
struct EngineArgs {
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    secrets: Option<PathBuf>,
    #[arg(long)]
    model: Option<String>,
}

#[derive(Debug, Args)]
struct InputArgs {
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct StyleArgs {
    #[arg(long)]
    persona: Option<Persona>,
    #[arg(long)]
    platform: Option<Platform>,
    #[arg(long)]
    emoji: Option<EmojiLevel>,
    #[arg(long)]
    depth: Option<Depth>,
    #[arg(long)]
    vibe: Option<Vibe>,
    #[arg(long)]
    lang: Option<String>,
    #[arg(long)]
    instruction: Option<String>,
    /// Comma-separated keywords the rewrite must contain.
    #[arg(long, value_delimiter = ',')]
    keywords: Vec<String>,
}

#[derive(Debug, Parser)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    style: StyleArgs,
    #[command(flatten)]
    engine: EngineArgs,
    /// Also read the rewrite aloud into this file.
    #[arg(long)]
    speak: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct ChatArgs {
    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Debug, Parser)]
struct SpeakArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    engine: EngineArgs,
    #[arg(long)]
    out: Option<PathBuf>,
    /// Print a base64 data URL instead of writing a file.
    #[arg(long)]
    data_url: bool,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("resonate error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_transform(args),
        Command::Chat(args) => {
            run_chat(args)?;
            Ok(0)
        }
        Command::Speak(args) => run_speak(args),
        Command::Options => {
            println!("{}", render_options());
            Ok(0)
        }
    }
}

impl StyleArgs {
    fn settings(&self) -> StyleSettings {
        let mut settings = StyleSettings::default();
        if let Some(persona) = self.persona {
            settings.persona = persona;
        }
        if let Some(platform) = self.platform {
            settings.platform = platform;
        }
        if let Some(emoji) = self.emoji {
            settings.emoji_level = emoji;
        }
        if let Some(depth) = self.depth {
            settings.depth = depth;
        }
        if let Some(vibe) = self.vibe {
            settings.vibe = vibe;
        }
        if let Some(lang) = self.lang.as_deref() {
            settings.set_target_language(lang);
        }
        if let Some(instruction) = self.instruction.as_deref() {
            settings.set_custom_instruction(instruction);
        }
        settings.set_target_keywords(&self.keywords);
        settings
    }
}

fn build_engine(args: &EngineArgs, command: &str) -> Result<ResonateEngine> {
    let mut config = EngineConfig::from_env(args.secrets.as_deref());
    if let Some(model) = args
        .model
        .as_deref()
        .map(str::trim)
        .filter(|model| !model.is_empty())
    {
        config.model = model.to_string();
    }
    let events = args
        .events
        .as_ref()
        .map(|path| EventWriter::for_command(path, command, &config.model));
    let engine = ResonateEngine::new(config, events)?;
    log_event(
        &engine,
        "session_started",
        json!({ "credential_present": engine.credential_present() }),
    );
    Ok(engine)
}

/// Session events are advisory; a write failure is reported and the
/// session carries on.
fn log_event(engine: &ResonateEngine, event_type: &str, body: Value) {
    if let Err(err) = engine.emit_event(event_type, payload(body)) {
        eprintln!("event log write failed ({event_type}): {err:#}");
    }
}

fn finish_session(engine: &ResonateEngine, transforms: usize) {
    log_event(
        engine,
        "session_finished",
        json!({ "transforms": transforms }),
    );
}

fn read_source_text(input: &InputArgs) -> Result<String> {
    if let Some(text) = input.text.as_ref() {
        return Ok(text.clone());
    }
    if let Some(path) = input.file.as_ref() {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read text from stdin")?;
    Ok(buffer)
}

fn run_transform(args: RunArgs) -> Result<i32> {
    let text = read_source_text(&args.input)?;
    if text.trim().is_empty() {
        println!("{EMPTY_INPUT_MESSAGE}");
        return Ok(1);
    }
    let engine = build_engine(&args.engine, "run")?;
    let request = args.style.settings().request(text);
    let result = engine.transform(&request)?;
    println!("{}", render_result(&engine, &request, &result));

    let mut code = if result.is_failure() { 1 } else { 0 };
    if let (Some(path), false) = (args.speak.as_deref(), result.is_failure()) {
        match speak_to_file(&engine, &result.rewritten_text, path) {
            Ok(message) => println!("{message}"),
            Err(err) => {
                println!("Audio failed: {err:#}");
                code = 1;
            }
        }
    }
    finish_session(&engine, 1);
    Ok(code)
}

fn run_speak(args: SpeakArgs) -> Result<i32> {
    let text = read_source_text(&args.input)?;
    if text.trim().is_empty() {
        println!("{EMPTY_INPUT_MESSAGE}");
        return Ok(1);
    }
    let engine = build_engine(&args.engine, "speak")?;
    if args.data_url {
        let clip = engine.speak(&text)?;
        if let Some(note) = fallback_note(&clip) {
            eprintln!("{note}");
        }
        println!("{}", clip.data_url());
    } else {
        let clip_path = args.out.unwrap_or_else(|| PathBuf::from("resonate_audio"));
        println!("{}", speak_to_file(&engine, &text, &clip_path)?);
    }
    finish_session(&engine, 0);
    Ok(0)
}

fn run_chat(args: ChatArgs) -> Result<()> {
    let engine = build_engine(&args.engine, "chat")?;
    let stdin = io::stdin();
    let mut line = String::new();
    let mut settings = StyleSettings::default();
    let mut history = SessionHistory::new();
    let mut transforms = 0usize;

    println!("Resonate chat started. Type text to transform or /help for commands.");
    if !engine.credential_present() {
        println!("API key is missing! Rewrites will fail until HUGGING_FACE_API_KEY is set.");
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let input = line.trim_end_matches(['\n', '\r']);
        let intent = parse_intent(input);
        if intent.action == "noop" {
            continue;
        }
        if let Some(message) = apply_setting(&mut settings, &intent) {
            println!("{message}");
            continue;
        }

        match intent.action.as_str() {
            "help" => {
                println!("Commands: {}", CHAT_HELP_COMMANDS.join(" "));
            }
            "quit" => break,
            "show_settings" => println!("{}", render_settings(&settings)),
            "show_options" => println!("{}", render_options()),
            "show_history" => println!("{}", render_history(&history)),
            "show_scores" => match history.current() {
                Some(result) => {
                    println!("{}", render_scores(&result.scores));
                    println!(
                        "{}",
                        render_metrics(&ReadingMetrics::measure(
                            &result.rewritten_text,
                            &result.scores
                        ))
                    );
                }
                None => println!("No transformation yet."),
            },
            "speak" => {
                let Some(result) = history.current().filter(|result| !result.is_failure()) else {
                    println!("Nothing to speak yet. Transform some text first.");
                    continue;
                };
                let path = value_as_non_empty_string(intent.command_args.get("path"))
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("resonate_audio"));
                match speak_to_file(&engine, &result.rewritten_text, &path) {
                    Ok(message) => println!("{message}"),
                    Err(err) => println!("Audio failed: {err:#}"),
                }
            }
            "transform" => {
                let text = intent.text.clone().unwrap_or_default();
                if text.trim().is_empty() {
                    println!("{EMPTY_INPUT_MESSAGE}");
                    continue;
                }
                let request = settings.request(text);
                let result = match engine.transform(&request) {
                    Ok(result) => result,
                    Err(err) => {
                        println!("Transform failed: {err:#}");
                        continue;
                    }
                };
                transforms += 1;
                println!("{}", render_result(&engine, &request, &result));
                history.record(&request, result);
            }
            "unknown" => {
                let command = value_as_non_empty_string(intent.command_args.get("command"))
                    .unwrap_or_default();
                println!("Unknown command /{command}. Type /help for commands.");
            }
            other => println!("Unhandled action: {other}"),
        }
    }

    finish_session(&engine, transforms);
    Ok(())
}

/// Applies a `/persona`-style command to the settings. Returns the message
/// to show, or `None` when the intent is not a setting change.
fn apply_setting(settings: &mut StyleSettings, intent: &Intent) -> Option<String> {
    let value = value_as_non_empty_string(intent.command_args.get("value"));
    let message = match intent.action.as_str() {
        "set_persona" => set_choice(&mut settings.persona, value),
        "set_platform" => set_choice(&mut settings.platform, value),
        "set_emoji" => set_choice(&mut settings.emoji_level, value),
        "set_depth" => set_choice(&mut settings.depth, value),
        "set_vibe" => set_choice(&mut settings.vibe, value),
        "set_language" => {
            settings.set_target_language(value.as_deref().unwrap_or_default());
            format!("Language set to {}", settings.target_language)
        }
        "set_instruction" => {
            settings.set_custom_instruction(value.as_deref().unwrap_or_default());
            match settings.custom_instruction.as_deref() {
                Some(instruction) => format!("Instruction set to: {instruction}"),
                None => "Instruction cleared".to_string(),
            }
        }
        "set_keywords" => {
            let keywords: Vec<String> = intent
                .command_args
                .get("keywords")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            settings.set_target_keywords(&keywords);
            if settings.target_keywords.is_empty() {
                "Keywords cleared".to_string()
            } else {
                format!("Keywords set to: {}", settings.target_keywords.join(", "))
            }
        }
        _ => return None,
    };
    Some(message)
}

fn set_choice<T: StyleChoice>(slot: &mut T, value: Option<String>) -> String {
    let Some(raw) = value else {
        return format!("Current {}: {}", T::KIND, slot.label());
    };
    match T::parse_choice(&raw) {
        Ok(choice) => {
            *slot = choice;
            format!("{} set to {}", capitalize(T::KIND), choice.label())
        }
        Err(err) => err,
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn speak_to_file(engine: &ResonateEngine, text: &str, path: &Path) -> Result<String> {
    let clip = engine.speak(text)?;
    let path = if path.extension().is_none() {
        path.with_extension(clip.format.extension())
    } else {
        path.to_path_buf()
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, &clip.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;

    let mut message = format!(
        "Audio saved to {} ({} voice, {})",
        path.display(),
        clip.source.as_str(),
        clip.format.extension()
    );
    if let Some(note) = fallback_note(&clip) {
        message = format!("{note}\n{message}");
    }
    Ok(message)
}

fn fallback_note(clip: &SpeechClip) -> Option<String> {
    clip.primary_miss
        .as_ref()
        .map(|miss| format!("Neural voice unavailable ({miss}); used fallback voice."))
}

fn render_result(
    engine: &ResonateEngine,
    request: &TransformRequest,
    result: &TransformResult,
) -> String {
    if result.is_failure() {
        return result.rewritten_text.clone();
    }
    let mut sections = vec![
        result.rewritten_text.clone(),
        String::new(),
        render_scores(&result.scores),
        render_metrics(&ReadingMetrics::measure(
            &result.rewritten_text,
            &result.scores,
        )),
    ];
    let hits = engine.check_keywords(request, result);
    if !hits.is_empty() {
        sections.push(render_keyword_hits(&hits));
    }
    sections.join("\n")
}

fn render_bar(value: u8) -> String {
    let filled = usize::from(value) * BAR_CELLS / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_CELLS - filled))
}

fn render_scores(scores: &LinguisticDna) -> String {
    scores
        .axes()
        .map(|(axis, value)| format!("{:<16} {} {:>3}", axis.label(), render_bar(value), value))
        .collect::<Vec<String>>()
        .join("\n")
}

fn render_metrics(metrics: &ReadingMetrics) -> String {
    format!(
        "Read time: {} min | Clarity: {}% | Impact: {}%",
        metrics.read_time_minutes, metrics.clarity, metrics.impact
    )
}

fn render_keyword_hits(hits: &[KeywordHit]) -> String {
    let marks = hits
        .iter()
        .map(|hit| format!("{} {}", if hit.found { "✅" } else { "❌" }, hit.keyword))
        .collect::<Vec<String>>()
        .join("  ");
    format!("Keywords {}/{}: {marks}", hit_count(hits), hits.len())
}

fn render_history(history: &SessionHistory) -> String {
    if history.is_empty() {
        return "History is empty.".to_string();
    }
    history
        .entries()
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            format!(
                "#{} [{}] {} | {}",
                idx + 1,
                entry.style_label,
                entry.scores.to_csv(),
                preview(&entry.transformed_text, HISTORY_PREVIEW_CHARS)
            )
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<&str>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let head: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{head}…")
}

fn render_settings(settings: &StyleSettings) -> String {
    let keywords = if settings.target_keywords.is_empty() {
        "(none)".to_string()
    } else {
        settings.target_keywords.join(", ")
    };
    [
        format!("Persona: {}", settings.persona),
        format!("Platform: {}", settings.platform),
        format!("Emoji level: {}", settings.emoji_level),
        format!("Depth: {}", settings.depth),
        format!("Vibe: {}", settings.vibe),
        format!("Language: {}", settings.target_language),
        format!(
            "Instruction: {}",
            settings.custom_instruction.as_deref().unwrap_or("(none)")
        ),
        format!("Keywords: {keywords}"),
    ]
    .join("\n")
}

fn option_block<T: StyleChoice>() -> String {
    let rows = T::all()
        .iter()
        .map(|choice| format!("  {:<20} {}", choice.slug(), choice.label()))
        .collect::<Vec<String>>()
        .join("\n");
    format!("{}:\n{rows}", capitalize(T::KIND))
}

fn render_options() -> String {
    [
        option_block::<Persona>(),
        option_block::<Platform>(),
        option_block::<EmojiLevel>(),
        option_block::<Depth>(),
        option_block::<Vibe>(),
    ]
    .join("\n\n")
}

fn value_as_non_empty_string(value: Option<&Value>) -> Option<String> {
    let raw = value
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
