use resonate_contracts::request::TransformRequest;
use resonate_contracts::style::{Depth, EmojiLevel, Persona, Platform, StyleChoice};
use serde::Serialize;

/// Marker the model is told to print right before its score tuple.
pub const SCORE_DELIMITER: &str = "[SCORES]";

const PERSONA_CLAUSES: &[(Persona, &str)] = &[
    (
        Persona::Professional,
        "Rewrite to be corporate-ready and sophisticated.",
    ),
    (
        Persona::GrammarMedic,
        "Correct grammar, spelling, and flow only.",
    ),
    (Persona::Simplifier, "Explain like I'm 5 years old."),
    (Persona::BrutallyHonest, "Remove all fluff. Just facts."),
    (Persona::HypeMan, "Make it high-energy and exciting."),
    (Persona::Academic, "Use technical, objective language."),
    (Persona::Storyteller, "Add descriptive flair."),
    (Persona::MotivationalCoach, "Focus on growth and energy."),
    (Persona::AngryCustomer, "Demanding, dissatisfied tone."),
    (Persona::PassiveAggressive, "Politely annoying."),
    (Persona::LegalFormal, "Strict legal terminology."),
    (Persona::GenZ, "Modern slang."),
    (Persona::Shakespearean, "William Shakespeare style."),
    (Persona::Pirate, "Gritty pirate captain style."),
];

const PLATFORM_CLAUSES: &[(Platform, &str)] = &[
    (Platform::Standard, "Paragraphs."),
    (Platform::WhatsApp, "Use *bold* for emphasis. Chatty."),
    (Platform::LinkedIn, "Professional spacing + 3 hashtags."),
    (Platform::Instagram, "Vibrant + hashtag block."),
    (Platform::X, "Concise hook + 2 hashtags."),
    (Platform::Email, "Subject, Greeting, Body, Sign-off."),
    (Platform::SlackDiscord, "Fast-paced formatting."),
    (Platform::Reddit, "Markdown + TL;DR."),
    (Platform::YouTubeScript, "Hook, Intro, Body, CTA."),
    (Platform::Sms, "Maximum brevity."),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn messages(&self) -> [ChatMessage; 2] {
        [
            ChatMessage {
                role: "system",
                content: self.system.clone(),
            },
            ChatMessage {
                role: "user",
                content: self.user.clone(),
            },
        ]
    }
}

fn lookup<T: PartialEq + Copy>(table: &[(T, &'static str)], key: T) -> &'static str {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, clause)| *clause)
        .unwrap_or("")
}

pub fn persona_clause(persona: Persona) -> &'static str {
    lookup(PERSONA_CLAUSES, persona)
}

pub fn platform_clause(platform: Platform) -> &'static str {
    lookup(PLATFORM_CLAUSES, platform)
}

pub fn emoji_clause(level: EmojiLevel) -> &'static str {
    match level {
        EmojiLevel::None => "No emojis.",
        EmojiLevel::Sparse => "Max 2 emojis.",
        EmojiLevel::Heavy => "Generous emojis.",
    }
}

fn length_clause(depth: Depth) -> String {
    format!("Length: {}.", depth.label())
}

fn scoring_instruction() -> String {
    format!(
        "IMPORTANT: After the transformed text, add one final line that starts with \
{SCORE_DELIMITER} followed by exactly 5 comma-separated integers from 0 to 100 \
representing (Clarity, Energy, Professionalism, Creativity, Emotion). \
Example: {SCORE_DELIMITER} 80,65,70,40,55"
    )
}

/// Builds the system and user messages for one rewrite.
///
/// Clause order: persona, platform, emoji, vibe and custom instruction,
/// keyword mandate, length, target language, then the scoring instruction,
/// which always comes last. Clauses that resolve to nothing are skipped.
pub fn build_prompt(request: &TransformRequest) -> PromptPair {
    let settings = &request.settings;
    let mut clauses: Vec<String> = vec!["You are Resonate AI.".to_string()];

    let persona = persona_clause(settings.persona);
    if !persona.is_empty() {
        clauses.push(format!("Task: {persona}"));
    }
    let platform = platform_clause(settings.platform);
    if !platform.is_empty() {
        clauses.push(format!("Format: {platform}"));
    }
    clauses.push(emoji_clause(settings.emoji_level).to_string());

    let mut atmosphere = format!("Atmosphere: {}.", settings.vibe.label());
    if let Some(instruction) = settings
        .custom_instruction
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        atmosphere.push_str(&format!(" Additional instruction: {instruction}"));
        if !instruction.ends_with(['.', '!', '?']) {
            atmosphere.push('.');
        }
    }
    clauses.push(atmosphere);

    let keywords: Vec<&str> = settings
        .target_keywords
        .iter()
        .map(|keyword| keyword.trim())
        .filter(|keyword| !keyword.is_empty())
        .collect();
    if !keywords.is_empty() {
        clauses.push(format!(
            "You MUST naturally include these keywords: {}.",
            keywords.join(", ")
        ));
    }

    clauses.push(length_clause(settings.depth));
    clauses.push(format!(
        "Write the output in {}.",
        settings.target_language.trim()
    ));
    clauses.push("Output ONLY the transformed text.".to_string());
    clauses.push(scoring_instruction());

    PromptPair {
        system: clauses.join(" "),
        user: format!("Text: \"{}\"", request.source_text),
    }
}
