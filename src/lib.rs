// Public modules
pub mod app;
pub mod chat;
pub mod clipboard;
pub mod error;
pub mod logging;
pub mod provider;
pub mod settings;
pub mod store;

mod observability;

// Re-exports
pub use app::Simplechat;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use provider::{ChatBackend, Provider};
pub use store::Database;
