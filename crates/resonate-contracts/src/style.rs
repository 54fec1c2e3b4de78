use std::fmt;
use std::str::FromStr;

/// A closed set of selectable style options.
///
/// Every choice has a machine `slug` (used on the command line) and a
/// display `label` (used in history labels and listings). Parsing accepts
/// either form, ignoring case, punctuation and emoji, so `gen-z`,
/// `"Gen Z / Slang"` and `genzslang` all resolve to the same persona.
pub trait StyleChoice: Copy + PartialEq + fmt::Debug + Sized + 'static {
    const KIND: &'static str;

    fn all() -> &'static [Self];
    fn slug(self) -> &'static str;
    fn label(self) -> &'static str;

    fn parse_choice(raw: &str) -> Result<Self, String> {
        let wanted = normalize_choice(raw);
        if wanted.is_empty() {
            return Err(format!("empty {} choice", Self::KIND));
        }
        Self::all()
            .iter()
            .copied()
            .find(|choice| {
                normalize_choice(choice.slug()) == wanted
                    || normalize_choice(choice.label()) == wanted
            })
            .ok_or_else(|| {
                format!(
                    "unknown {} '{}'; expected one of: {}",
                    Self::KIND,
                    raw.trim(),
                    Self::all()
                        .iter()
                        .map(|choice| choice.slug())
                        .collect::<Vec<&str>>()
                        .join(", ")
                )
            })
    }
}

fn normalize_choice(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Persona {
    #[default]
    Professional,
    GrammarMedic,
    Simplifier,
    BrutallyHonest,
    HypeMan,
    Academic,
    Storyteller,
    MotivationalCoach,
    AngryCustomer,
    PassiveAggressive,
    LegalFormal,
    GenZ,
    Shakespearean,
    Pirate,
}

impl StyleChoice for Persona {
    const KIND: &'static str = "persona";

    fn all() -> &'static [Self] {
        &[
            Self::Professional,
            Self::GrammarMedic,
            Self::Simplifier,
            Self::BrutallyHonest,
            Self::HypeMan,
            Self::Academic,
            Self::Storyteller,
            Self::MotivationalCoach,
            Self::AngryCustomer,
            Self::PassiveAggressive,
            Self::LegalFormal,
            Self::GenZ,
            Self::Shakespearean,
            Self::Pirate,
        ]
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::GrammarMedic => "grammar-medic",
            Self::Simplifier => "eli5",
            Self::BrutallyHonest => "brutally-honest",
            Self::HypeMan => "hype-man",
            Self::Academic => "academic",
            Self::Storyteller => "storyteller",
            Self::MotivationalCoach => "coach",
            Self::AngryCustomer => "angry-customer",
            Self::PassiveAggressive => "passive-aggressive",
            Self::LegalFormal => "legal",
            Self::GenZ => "gen-z",
            Self::Shakespearean => "shakespearean",
            Self::Pirate => "pirate",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Professional => "Professional 👔",
            Self::GrammarMedic => "Grammar Medic 🩹",
            Self::Simplifier => "Simplifier (ELI5) 👶",
            Self::BrutallyHonest => "Brutally Honest 🎯",
            Self::HypeMan => "Hype Man 🚀",
            Self::Academic => "Scientific / Academic 🧪",
            Self::Storyteller => "Storyteller / Creative 📖",
            Self::MotivationalCoach => "Motivational Coach 🏆",
            Self::AngryCustomer => "Angry Customer 😤",
            Self::PassiveAggressive => "Passive Aggressive 🙃",
            Self::LegalFormal => "Legal/Formal ⚖️",
            Self::GenZ => "Gen Z / Slang 🧢",
            Self::Shakespearean => "Shakespearean 🎭",
            Self::Pirate => "Pirate 🏴‍☠️",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    #[default]
    Standard,
    WhatsApp,
    LinkedIn,
    Instagram,
    X,
    Email,
    SlackDiscord,
    Reddit,
    YouTubeScript,
    Sms,
}

impl StyleChoice for Platform {
    const KIND: &'static str = "platform";

    fn all() -> &'static [Self] {
        &[
            Self::Standard,
            Self::WhatsApp,
            Self::LinkedIn,
            Self::Instagram,
            Self::X,
            Self::Email,
            Self::SlackDiscord,
            Self::Reddit,
            Self::YouTubeScript,
            Self::Sms,
        ]
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::WhatsApp => "whatsapp",
            Self::LinkedIn => "linkedin",
            Self::Instagram => "instagram",
            Self::X => "x",
            Self::Email => "email",
            Self::SlackDiscord => "slack",
            Self::Reddit => "reddit",
            Self::YouTubeScript => "youtube",
            Self::Sms => "sms",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard Text 📄",
            Self::WhatsApp => "WhatsApp 🟢",
            Self::LinkedIn => "LinkedIn 🔵",
            Self::Instagram => "Instagram 📸",
            Self::X => "X (Twitter) 🐦",
            Self::Email => "Email 📧",
            Self::SlackDiscord => "Slack / Discord 💬",
            Self::Reddit => "Reddit 🤖",
            Self::YouTubeScript => "YouTube Script 🎬",
            Self::Sms => "SMS 📱",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmojiLevel {
    None,
    #[default]
    Sparse,
    Heavy,
}

impl StyleChoice for EmojiLevel {
    const KIND: &'static str = "emoji level";

    fn all() -> &'static [Self] {
        &[Self::None, Self::Sparse, Self::Heavy]
    }

    fn slug(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sparse => "sparse",
            Self::Heavy => "heavy",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::None => "None 🚫",
            Self::Sparse => "Sparse 🤏",
            Self::Heavy => "Heavy ✨",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Depth {
    #[default]
    Concise,
    Detailed,
}

impl StyleChoice for Depth {
    const KIND: &'static str = "depth";

    fn all() -> &'static [Self] {
        &[Self::Concise, Self::Detailed]
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Detailed => "detailed",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Concise => "Concise",
            Self::Detailed => "Detailed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Vibe {
    #[default]
    Neutral,
    Inspiring,
    Cynical,
    Grateful,
    Sarcastic,
}

impl StyleChoice for Vibe {
    const KIND: &'static str = "vibe";

    fn all() -> &'static [Self] {
        &[
            Self::Neutral,
            Self::Inspiring,
            Self::Cynical,
            Self::Grateful,
            Self::Sarcastic,
        ]
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Inspiring => "inspiring",
            Self::Cynical => "cynical",
            Self::Grateful => "grateful",
            Self::Sarcastic => "sarcastic",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Neutral => "Neutral",
            Self::Inspiring => "Inspiring",
            Self::Cynical => "Cynical",
            Self::Grateful => "Grateful",
            Self::Sarcastic => "Sarcastic",
        }
    }
}

macro_rules! style_choice_traits {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = String;

                fn from_str(raw: &str) -> Result<Self, Self::Err> {
                    <$ty as StyleChoice>::parse_choice(raw)
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )+
    };
}

style_choice_traits!(Persona, Platform, EmojiLevel, Depth, Vibe);

#[cfg(test)]
mod tests {
    use super::{Depth, EmojiLevel, Persona, Platform, StyleChoice, Vibe};

    #[test]
    fn parse_accepts_slug_label_and_loose_spelling() {
        assert_eq!("gen-z".parse::<Persona>(), Ok(Persona::GenZ));
        assert_eq!("Gen Z / Slang 🧢".parse::<Persona>(), Ok(Persona::GenZ));
        assert_eq!("GENZSLANG".parse::<Persona>(), Ok(Persona::GenZ));
        assert_eq!("X (Twitter)".parse::<Platform>(), Ok(Platform::X));
        assert_eq!(" heavy ".parse::<EmojiLevel>(), Ok(EmojiLevel::Heavy));
        assert_eq!("Detailed".parse::<Depth>(), Ok(Depth::Detailed));
    }

    #[test]
    fn parse_rejects_unknown_with_choices_listed() {
        let err = "telepathic".parse::<Vibe>().err().unwrap_or_default();
        assert!(err.starts_with("unknown vibe 'telepathic'"));
        assert!(err.contains("sarcastic"));

        let empty = "  ".parse::<Persona>().err().unwrap_or_default();
        assert_eq!(empty, "empty persona choice");
    }

    #[test]
    fn slugs_and_labels_are_unique_per_kind() {
        fn check<T: StyleChoice>() {
            let all = T::all();
            for (idx, choice) in all.iter().enumerate() {
                for other in &all[idx + 1..] {
                    assert_ne!(choice.slug(), other.slug());
                    assert_ne!(choice.label(), other.label());
                }
                assert_eq!(T::parse_choice(choice.slug()).ok(), Some(*choice));
                assert_eq!(T::parse_choice(choice.label()).ok(), Some(*choice));
            }
        }
        check::<Persona>();
        check::<Platform>();
        check::<EmojiLevel>();
        check::<Depth>();
        check::<Vibe>();
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Persona::Pirate.to_string(), "Pirate 🏴‍☠️");
        assert_eq!(Platform::Sms.to_string(), "SMS 📱");
    }
}
