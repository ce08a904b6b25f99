//! Line editing support: slash command completion and the styled prompt.

use std::borrow::Cow;

use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use super::commands::AVAILABLE_COMMANDS;

/// ANSI escape code for the bold green prompt.
const ANSI_PROMPT: &str = "\x1b[1;32m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Finds completions for the `/word` ending at `pos`.
///
/// Returns the byte offset the completion replaces from and the matching
/// commands.  Completion is purely cosmetic and never changes what a line
/// means.
pub fn complete_command(line: &str, pos: usize) -> (usize, Vec<String>) {
    let before = &line[..pos];
    let start = before
        .rfind(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|&idx| before[idx..].starts_with('/'));
    let Some(start) = start else {
        return (pos, Vec::new());
    };
    let word = &before[start..];
    let candidates = AVAILABLE_COMMANDS
        .iter()
        .filter(|command| command.starts_with(word))
        .map(|command| command.to_string())
        .collect();
    (start, candidates)
}

/// Rustyline helper offering slash command completion.
#[derive(Debug, Clone)]
pub struct CommandHelper {
    use_color: bool,
}

impl CommandHelper {
    /// Creates a helper; `use_color` controls prompt styling.
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }
}

impl Completer for CommandHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(complete_command(line, pos))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        if self.use_color {
            Cow::Owned(format!("{ANSI_PROMPT}{prompt}{ANSI_RESET}"))
        } else {
            Cow::Borrowed(prompt)
        }
    }
}

impl Validator for CommandHelper {}

impl Helper for CommandHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_partial_command() {
        assert_eq!(
            complete_command("/pa", 3),
            (0, vec!["/paste".to_string()])
        );
    }

    #[test]
    fn bare_slash_offers_everything() {
        let (start, candidates) = complete_command("/", 1);
        assert_eq!(start, 0);
        assert_eq!(candidates.len(), AVAILABLE_COMMANDS.len());
    }

    #[test]
    fn completes_slash_word_mid_line() {
        assert_eq!(
            complete_command("try /he", 7),
            (4, vec!["/help".to_string()])
        );
    }

    #[test]
    fn plain_words_are_not_completed() {
        assert_eq!(complete_command("hello", 5), (5, Vec::new()));
        assert_eq!(complete_command("", 0), (0, Vec::new()));
    }

    #[test]
    fn no_match_yields_no_candidates() {
        assert_eq!(complete_command("/zz", 3), (0, Vec::new()));
    }
}
