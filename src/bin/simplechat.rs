//! Interactive chat with a large language model.
//!
//! # Usage
//!
//! ```bash
//! # Chat with the default provider (openai) and its default model
//! simplechat
//!
//! # Pick a provider and model
//! simplechat --provider=anthropic --model=claude-3-5-sonnet-20241022
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/copy` - Copy to the clipboard
//! - `/paste` - Show the clipboard contents
//! - `/exit` (or `/quit`, `/q`) - Exit the application

use std::io::IsTerminal;

use arrrg::CommandLine;

use simplechat::chat::{
    ChatArgs, ChatConfig, RustylineReader, TerminalRenderer, USAGE, reject_positional,
};
use simplechat::clipboard::SystemClipboard;
use simplechat::{Simplechat, logging, register_biometrics};

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("simplechat: {err}");
    std::process::exit(1);
}

/// Main entry point for the simplechat application.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let (args, free) = ChatArgs::from_command_line_relaxed(USAGE);
    if let Err(err) = reject_positional(&free) {
        fail(err);
    }
    logging::init();
    register_biometrics(biometrics::Collector::new());

    let config = ChatConfig::try_from(args).unwrap_or_else(|err| fail(err));
    let app = Simplechat::new(config).unwrap_or_else(|err| fail(err));
    tracing::debug!(%app, "initialized");

    // Ctrl+C at the prompt is read by the line editor; this covers an
    // interrupt while waiting on the backend.
    if let Err(err) = ctrlc::set_handler(|| std::process::exit(1)) {
        fail(err);
    }

    let use_color = std::io::stdout().is_terminal();
    let mut input = RustylineReader::new(use_color).unwrap_or_else(|err| fail(err));
    let exit = app
        .repl(
            &mut input,
            SystemClipboard::new(),
            TerminalRenderer::with_color(use_color),
        )
        .await;
    std::process::exit(exit.exit_code());
}
