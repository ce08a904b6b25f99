//! Where simplechat keeps its files.

use std::path::PathBuf;

use crate::store::DEFAULT_DATABASE_URL;

/// Environment variable overriding the database location.
pub const DB_PATH_VAR: &str = "SIMPLECHAT_DB_PATH";

const APP_DIR: &str = "simplechat";
const DB_FILE: &str = "simplechat.db";

/// The database file: `SIMPLECHAT_DB_PATH` when set, otherwise
/// `simplechat/simplechat.db` under the platform data directory.
///
/// Returns `None` when neither is available.
pub fn db_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(DB_PATH_VAR).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::data_dir().map(|dir| dir.join(APP_DIR).join(DB_FILE))
}

/// The connection string for `path`.
pub fn database_url_for(path: &std::path::Path) -> String {
    format!("sqlite:///{}", path.display())
}

/// The connection string for the configured database, falling back to
/// `simplechat.db` in the working directory.
pub fn database_url() -> String {
    match db_path() {
        Some(path) => database_url_for(&path),
        None => DEFAULT_DATABASE_URL.to_string(),
    }
}
