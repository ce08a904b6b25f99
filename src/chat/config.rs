//! Configuration types for the chat shell.
//!
//! This module provides CLI argument parsing via `arrrg` and the validated
//! chat session configuration built from it.

use std::fmt;

use arrrg_derive::CommandLine;

use crate::error::Result;
use crate::provider::Provider;

/// Command-line usage for the simplechat binary.
pub const USAGE: &str = "simplechat [--provider=<provider>] [--model=<model>]";

/// Rejects positional arguments left over after flag parsing; simplechat
/// takes none.
pub fn reject_positional(free: &[String]) -> std::result::Result<(), String> {
    match free.first() {
        Some(arg) => Err(format!("unexpected argument {arg:?}\nusage: {USAGE}")),
        None => Ok(()),
    }
}

/// Command-line arguments for simplechat.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Provider to send messages to.
    #[arrrg(optional, "LLM provider to use (openai/anthropic/xai/ollama)", "PROVIDER")]
    pub provider: Option<String>,

    /// Model to use with the provider.
    #[arrrg(optional, "Specific model to use (e.g. o1-preview)", "MODEL")]
    pub model: Option<String>,
}

/// Configuration for a chat session.
///
/// Built once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// The provider messages are sent to.
    pub provider: Provider,

    /// The provider-specific model name.
    pub model: String,
}

impl ChatConfig {
    /// Creates a configuration for `provider` using its default model.
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builds a configuration from command-line arguments.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::Error::UnsupportedProvider`] when the provider is
    /// not one of the supported identifiers.
    pub fn from_args(args: ChatArgs) -> Result<Self> {
        let provider = match args.provider.as_deref() {
            Some(name) => name.parse::<Provider>()?,
            None => Provider::default(),
        };
        let config = ChatConfig::new(provider);
        Ok(match args.model {
            Some(model) if !model.trim().is_empty() => config.with_model(model),
            _ => config,
        })
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new(Provider::default())
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = crate::Error;

    fn try_from(args: ChatArgs) -> Result<Self> {
        Self::from_args(args)
    }
}

impl fmt::Display for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
