//! Slash command parsing for the chat shell.
//!
//! Lines starting with `/` control the shell and are never forwarded to the
//! chat backend, whether or not they name a known command.

/// The commands offered to the user, in the order `/help` lists them.
pub const AVAILABLE_COMMANDS: [&str; 6] = ["/copy", "/paste", "/help", "/exit", "/clear", "/invoke"];

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Copy the entered command text to the clipboard.
    Copy,

    /// Show the clipboard contents.
    Paste,

    /// List the available commands.
    Help,

    /// Leave the shell.  Also spelled `/quit` and `/q`, in any case.
    Exit,

    /// Reserved.
    Clear,

    /// Reserved.
    Invoke,

    /// Any other slash-prefixed text.
    Unknown(String),
}

impl ChatCommand {
    /// True for commands that are listed but have no behaviour yet.
    pub fn is_reserved(&self) -> bool {
        matches!(self, ChatCommand::Clear | ChatCommand::Invoke)
    }
}

/// Parses a line of input as a slash command.
///
/// Returns `None` if the line is chat text.  Only the exit aliases are
/// matched case-insensitively; every other command must match exactly.
///
/// # Examples
///
/// ```
/// # use simplechat::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/QUIT"), Some(ChatCommand::Exit));
/// assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
/// assert_eq!(parse_command("/HELP"), Some(ChatCommand::Unknown("/HELP".to_string())));
/// assert!(parse_command("hello world").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let lowered = input.to_lowercase();
    if matches!(lowered.as_str(), "/exit" | "/quit" | "/q") {
        return Some(ChatCommand::Exit);
    }

    let command = match input {
        "/help" => ChatCommand::Help,
        "/copy" => ChatCommand::Copy,
        "/paste" => ChatCommand::Paste,
        "/clear" => ChatCommand::Clear,
        "/invoke" => ChatCommand::Invoke,
        _ => ChatCommand::Unknown(input.to_string()),
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_exit_aliases() {
        for alias in ["/exit", "/quit", "/q", "/EXIT", "/Quit", "/Q", "  /q  "] {
            assert_eq!(parse_command(alias), Some(ChatCommand::Exit), "{alias}");
        }
    }

    #[test]
    fn other_commands_are_case_sensitive() {
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/copy"), Some(ChatCommand::Copy));
        assert_eq!(parse_command("/paste"), Some(ChatCommand::Paste));
        assert_eq!(
            parse_command("/Paste"),
            Some(ChatCommand::Unknown("/Paste".to_string()))
        );
    }

    #[test]
    fn reserved_commands() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/invoke"), Some(ChatCommand::Invoke));
        assert!(ChatCommand::Clear.is_reserved());
        assert!(ChatCommand::Invoke.is_reserved());
        assert!(!ChatCommand::Help.is_reserved());
    }

    #[test]
    fn arguments_make_a_command_unknown() {
        assert_eq!(
            parse_command("/copy that"),
            Some(ChatCommand::Unknown("/copy that".to_string()))
        );
        assert_eq!(
            parse_command("/model gpt-4o"),
            Some(ChatCommand::Unknown("/model gpt-4o".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("hello world"), None);
        assert_eq!(parse_command("what is 1/2?"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn available_commands_are_slash_prefixed() {
        assert!(AVAILABLE_COMMANDS.iter().all(|c| c.starts_with('/')));
        assert!(AVAILABLE_COMMANDS.contains(&"/exit"));
    }
}
