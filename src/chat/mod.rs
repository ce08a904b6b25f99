//! The interactive chat shell.
//!
//! This module provides a REPL built on `rustyline` that forwards free-form
//! text to a [`ChatBackend`](crate::provider::ChatBackend) and handles a
//! small set of slash commands locally:
//!
//! - `/help` lists the available commands
//! - `/copy` and `/paste` use the system clipboard
//! - `/exit`, `/quit` and `/q` leave the shell
//! - `/clear` and `/invoke` are reserved
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and the chat session configuration
//! - [`commands`]: slash command parsing
//! - [`completion`]: slash command completion for the line editor
//! - [`render`]: styled terminal output
//! - [`shell`]: the read loop itself

mod commands;
mod completion;
mod config;
mod render;
mod shell;

pub use commands::{AVAILABLE_COMMANDS, ChatCommand, parse_command};
pub use completion::{CommandHelper, complete_command};
pub use config::{ChatArgs, ChatConfig, USAGE, reject_positional};
pub use render::{Renderer, TerminalRenderer};
pub use shell::{LineReader, PROMPT, ReadOutcome, RustylineReader, Shell, ShellExit};
