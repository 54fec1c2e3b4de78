#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
}

/// Commands whose whole remainder is a single setting value.
pub(crate) const SETTING_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "persona",
        action: "set_persona",
    },
    CommandSpec {
        command: "platform",
        action: "set_platform",
    },
    CommandSpec {
        command: "emoji",
        action: "set_emoji",
    },
    CommandSpec {
        command: "depth",
        action: "set_depth",
    },
    CommandSpec {
        command: "vibe",
        action: "set_vibe",
    },
    CommandSpec {
        command: "lang",
        action: "set_language",
    },
    CommandSpec {
        command: "instruction",
        action: "set_instruction",
    },
];

pub(crate) const KEYWORDS_COMMAND: CommandSpec = CommandSpec {
    command: "keywords",
    action: "set_keywords",
};

pub(crate) const SPEAK_COMMAND: CommandSpec = CommandSpec {
    command: "speak",
    action: "speak",
};

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "settings",
        action: "show_settings",
    },
    CommandSpec {
        command: "history",
        action: "show_history",
    },
    CommandSpec {
        command: "scores",
        action: "show_scores",
    },
    CommandSpec {
        command: "options",
        action: "show_options",
    },
    CommandSpec {
        command: "help",
        action: "help",
    },
    CommandSpec {
        command: "quit",
        action: "quit",
    },
];

pub const CHAT_HELP_COMMANDS: &[&str] = &[
    "/persona",
    "/platform",
    "/emoji",
    "/depth",
    "/vibe",
    "/lang",
    "/instruction",
    "/keywords",
    "/settings",
    "/history",
    "/scores",
    "/speak",
    "/options",
    "/help",
    "/quit",
];
