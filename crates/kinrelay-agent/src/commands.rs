//! Slash-command parsing.

/// Reply to `/help`.
pub const HELP_TEXT: &str = "Available commands:\n\
/reset [greeting] — forget the current conversation; with a greeting, start a new one\n\
/chat_break [greeting] — start a new conversation with an opening line\n\
/help — show this message";

/// A recognised slash command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `/reset [greeting]`
    Reset { greeting: Option<String> },
    /// `/chat_break [greeting]`
    ChatBreak { greeting: Option<String> },
    /// `/help`
    Help,
    /// Anything else starting with `/`.
    Unknown(String),
}

impl Command {
    /// Build a command from its name (without the slash) and raw args.
    pub fn from_parts(name: &str, args: &str) -> Self {
        let args = args.trim();
        let greeting = (!args.is_empty()).then(|| args.to_string());

        match name.to_ascii_lowercase().as_str() {
            "reset" => Command::Reset { greeting },
            "chat_break" | "chatbreak" | "chat-break" => Command::ChatBreak { greeting },
            "help" | "start" => Command::Help,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Split `/name args...` into `(name, args)`.
///
/// Returns `None` when `text` is not a command. A `@botname` suffix on the
/// command name is dropped.
pub fn split_command(text: &str) -> Option<(&str, &str)> {
    let rest = text.trim_start().strip_prefix('/')?;
    let (name, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim()),
        None => (rest, ""),
    };
    let name = name.split('@').next().unwrap_or(name);
    if name.is_empty() {
        return None;
    }
    Some((name, args))
}
