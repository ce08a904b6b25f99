//! The top-level coordinator.
//!
//! [`Simplechat`] constructs the process-wide pieces once at startup, the
//! session store and the configured chat backend, and hands them explicitly
//! to the shell.

use std::fmt;

use crate::chat::{ChatConfig, LineReader, Renderer, Shell, ShellExit};
use crate::clipboard::Clipboard;
use crate::error::Result;
use crate::provider::{self, ChatBackend};
use crate::settings;
use crate::store::Database;

/// A configured chat application.
pub struct Simplechat {
    db_url: String,
    db: Database,
    config: ChatConfig,
    backend: Box<dyn ChatBackend>,
}

impl Simplechat {
    /// Opens the configured store and connects the configured backend.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be opened or migrated.  These errors are
    /// fatal; nothing is retried.
    pub fn new(config: ChatConfig) -> Result<Self> {
        Self::with_database_url(config, &settings::database_url())
    }

    /// Like [`Simplechat::new`], with an explicit store location.
    pub fn with_database_url(config: ChatConfig, db_url: &str) -> Result<Self> {
        let db = Database::new(db_url)?;
        let backend = provider::connect(config.provider, &config.model)?;
        Ok(Self::with_backend(config, db_url, db, backend))
    }

    /// Assembles an application from parts that are already constructed.
    pub fn with_backend(
        config: ChatConfig,
        db_url: impl Into<String>,
        db: Database,
        backend: Box<dyn ChatBackend>,
    ) -> Self {
        Self {
            db_url: db_url.into(),
            db,
            config,
            backend,
        }
    }

    /// The store's connection string.
    pub fn db_url(&self) -> &str {
        &self.db_url
    }

    /// The session store.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The chat configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// The configured backend.
    pub fn backend(&self) -> &dyn ChatBackend {
        self.backend.as_ref()
    }

    /// Runs the interactive shell until it exits.
    ///
    /// The store stays open for as long as the shell runs.
    pub async fn repl<L, C, R>(self, input: &mut L, clipboard: C, renderer: R) -> ShellExit
    where
        L: LineReader + ?Sized,
        C: Clipboard,
        R: Renderer,
    {
        let Simplechat {
            db, backend, config, ..
        } = self;
        tracing::info!(%config, "starting shell");
        let mut shell = Shell::new(backend, clipboard, renderer);
        let exit = shell.run(input).await;
        drop(db);
        exit
    }
}

impl fmt::Display for Simplechat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Simplechat db_url={:?}>", self.db_url)
    }
}

impl fmt::Debug for Simplechat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simplechat")
            .field("db_url", &self.db_url)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
