//! The interactive read loop.
//!
//! [`Shell`] reads one line at a time, dispatches slash commands to the
//! built-in handlers, and forwards everything else to its [`ChatBackend`].
//! Each line is handled to completion before the next read.  Errors raised
//! while handling a line are printed and the loop carries on; only an
//! interrupt or the end of input stops it.

use std::time::Instant;

use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use super::commands::{AVAILABLE_COMMANDS, ChatCommand, parse_command};
use super::completion::CommandHelper;
use super::render::Renderer;
use crate::clipboard::Clipboard;
use crate::error::{Error, Result};
use crate::observability::{
    CHAT_DURATION, CHAT_ERRORS, CHAT_REQUESTS, SHELL_COMMANDS, SHELL_ERRORS, SHELL_LINES,
};
use crate::provider::ChatBackend;

/// The prompt shown before each line of input.
pub const PROMPT: &str = ">>> ";

/// Title of the panel showing pasted clipboard contents.
pub const PASTE_TITLE: &str = "Pasted Content";

/// The result of reading one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A line of text, without its trailing newline.
    Line(String),
    /// The user pressed Ctrl-C.
    Interrupted,
    /// The input stream ended.
    Eof,
}

/// A source of input lines.
pub trait LineReader {
    /// Reads one line, showing `prompt`.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Reads lines from the terminal with history and slash command completion.
pub struct RustylineReader {
    editor: Editor<CommandHelper, DefaultHistory>,
}

impl RustylineReader {
    /// Creates a terminal reader; `use_color` styles the prompt.
    pub fn new(use_color: bool) -> Result<Self> {
        let mut editor = Editor::<CommandHelper, DefaultHistory>::new()
            .map_err(|e| Error::io("failed to initialize line editor", readline_io(e)))?;
        editor.set_helper(Some(CommandHelper::new(use_color)));
        Ok(Self { editor })
    }
}

impl LineReader for RustylineReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(Error::io(format!("Input error: {err}"), readline_io(err))),
        }
    }
}

fn readline_io(err: ReadlineError) -> std::io::Error {
    match err {
        ReadlineError::Io(err) => err,
        other => std::io::Error::other(other.to_string()),
    }
}

/// Why the shell stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    /// The user entered an exit command.
    UserExit,
    /// The user interrupted the shell; the process should exit with status 1.
    Interrupted,
    /// The input stream ended or could no longer be read.
    StreamClosed,
}

impl ShellExit {
    /// The process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellExit::Interrupted => 1,
            ShellExit::UserExit | ShellExit::StreamClosed => 0,
        }
    }
}

/// What to do after handling one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// The interactive chat shell.
pub struct Shell<B, C, R> {
    backend: B,
    clipboard: C,
    renderer: R,
}

impl<B: ChatBackend, C: Clipboard, R: Renderer> Shell<B, C, R> {
    /// Creates a shell over an already-configured backend.
    pub fn new(backend: B, clipboard: C, renderer: R) -> Self {
        Self {
            backend,
            clipboard,
            renderer,
        }
    }

    /// The backend lines are forwarded to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The clipboard used by `/copy` and `/paste`.
    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// The renderer output goes to.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Consumes the shell, returning its renderer.
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Runs the loop until the user exits, interrupts, or input ends.
    pub async fn run<L: LineReader + ?Sized>(&mut self, input: &mut L) -> ShellExit {
        self.renderer.print_welcome();

        let exit = loop {
            let line = match input.read_line(PROMPT) {
                Ok(ReadOutcome::Line(line)) => line,
                Ok(ReadOutcome::Interrupted) => break ShellExit::Interrupted,
                Ok(ReadOutcome::Eof) => break ShellExit::StreamClosed,
                Err(err) => {
                    self.renderer.print_error(&err.to_string());
                    break ShellExit::StreamClosed;
                }
            };

            match self.handle_line(&line).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break ShellExit::UserExit,
                Err(err) => {
                    SHELL_ERRORS.click();
                    tracing::warn!(error = %err, "line failed");
                    self.renderer.print_error(&err.to_string());
                }
            }
        };

        tracing::debug!(?exit, "shell finished");
        if exit != ShellExit::Interrupted {
            self.renderer.print_goodbye();
        }
        exit
    }

    /// Handles one line of input.
    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        SHELL_LINES.click();

        if let Some(command) = parse_command(line) {
            SHELL_COMMANDS.click();
            return self.handle_command(command, line);
        }

        self.chat(line).await?;
        Ok(Flow::Continue)
    }

    fn handle_command(&mut self, command: ChatCommand, line: &str) -> Result<Flow> {
        tracing::debug!(?command, "dispatching command");
        match command {
            ChatCommand::Exit => return Ok(Flow::Exit),
            ChatCommand::Help => {
                self.renderer.print_commands(&AVAILABLE_COMMANDS);
            }
            ChatCommand::Copy => {
                self.renderer.print_status("Copying to clipboard...");
                // The entered command itself is what gets copied.
                self.clipboard.copy(line)?;
            }
            ChatCommand::Paste => {
                self.renderer.print_status("Pasting from clipboard...");
                let contents = self.clipboard.paste()?;
                if !contents.is_empty() {
                    self.renderer.print_panel(PASTE_TITLE, &contents);
                }
            }
            ChatCommand::Clear | ChatCommand::Invoke => {
                tracing::debug!(?command, "reserved command ignored");
            }
            ChatCommand::Unknown(_) => {}
        }
        Ok(Flow::Continue)
    }

    async fn chat(&mut self, line: &str) -> Result<()> {
        CHAT_REQUESTS.click();
        let start = Instant::now();
        let result = self.backend.send(line).await;
        CHAT_DURATION.add(start.elapsed().as_secs_f64());
        match result {
            Ok(response) => {
                self.renderer.print_assistant(&response);
                Ok(())
            }
            Err(err) => {
                CHAT_ERRORS.click();
                Err(err)
            }
        }
    }
}
