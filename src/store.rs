//! Local persistence for simplechat.
//!
//! [`Database`] owns a single SQLite connection for the lifetime of the
//! process and guarantees on construction that the `memory` and
//! `essence_markers` tables exist.  Beyond migration it only offers generic
//! statement execution; the tables carry no behaviour of their own yet.

use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{Connection, Params};

use crate::error::{Error, Result};
use crate::observability::STORE_MIGRATIONS;

/// Connection string used when no location is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///simplechat.db";

const URL_SCHEME: &str = "sqlite://";

const MEMORY_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS memory (
            entity TEXT,
            source TEXT,
            last_mentioned TIMESTAMP,
            mention_count INTEGER DEFAULT 1,
            PRIMARY KEY (entity, source)
        )
"#;

const ESSENCE_MARKERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS essence_markers (
        marker_type TEXT,
        marker_text TEXT,
        timestamp TIMESTAMP,
        PRIMARY KEY (marker_type, marker_text)
    )
"#;

const SCHEMA: &[&str] = &[MEMORY_TABLE, ESSENCE_MARKERS_TABLE];

/// Where a store lives, resolved from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A transient in-memory database.
    Memory,
    /// A database file on disk.
    File(PathBuf),
}

impl Location {
    /// Resolves a connection string.
    ///
    /// Accepts `sqlite:///<path>`, `sqlite://` (in-memory), `:memory:`, or a
    /// bare filesystem path.
    pub fn parse(location: &str) -> Self {
        let rest = match location.strip_prefix(URL_SCHEME) {
            Some(rest) => match rest.strip_prefix('/') {
                Some(path) => path,
                None if rest.is_empty() => return Location::Memory,
                None => rest,
            },
            None => location,
        };
        if rest.is_empty() || rest == ":memory:" {
            Location::Memory
        } else {
            Location::File(PathBuf::from(rest))
        }
    }
}

/// A single row returned by [`Database::query`], as ordered column/value
/// pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    /// Returns the value of the named column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Returns the text in the named column, if it holds text.
    pub fn text(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Iterates over the columns in select order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The number of columns in this record.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// The simplechat session store.
pub struct Database {
    conn: Connection,
    location: Location,
}

impl Database {
    /// Opens the store at `location` and migrates it.
    pub fn new(location: &str) -> Result<Self> {
        Self::open(location, true)
    }

    /// Opens the store at `location`, migrating it first when `migrate` is
    /// set.
    pub fn open(location: &str, migrate: bool) -> Result<Self> {
        let location = Location::parse(location);
        let conn = match &location {
            Location::Memory => Connection::open_in_memory(),
            Location::File(path) => {
                ensure_parent(path).map_err(|e| {
                    Error::store(format!("failed to create directory for {path:?}: {e}"), None)
                })?;
                Connection::open(path)
            }
        }
        .map_err(|e| Error::store(format!("failed to open {location:?}: {e}"), Some(e)))?;
        tracing::debug!(?location, "opened session store");

        let db = Self { conn, location };
        if migrate {
            db.migrate()?;
        }
        Ok(db)
    }

    /// Creates the `memory` and `essence_markers` tables if they are absent.
    ///
    /// Safe to run any number of times against the same store.
    pub fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            self.conn
                .execute_batch(statement)
                .map_err(|e| Error::store(format!("migration failed: {e}"), Some(e)))?;
        }
        STORE_MIGRATIONS.click();
        tracing::debug!(location = ?self.location, "session store migrated");
        Ok(())
    }

    /// Executes a statement and returns the number of rows changed.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// Runs a query and collects every row.
    pub fn query<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let mut rows = stmt.query(params)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut columns = Vec::with_capacity(names.len());
            for (idx, name) in names.iter().enumerate() {
                let value: Value = row.get(idx)?;
                columns.push((name.clone(), value));
            }
            records.push(Record { columns });
        }
        Ok(records)
    }

    /// The names of the user tables in this store, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let records = self.query(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
            [],
        )?;
        Ok(records
            .iter()
            .filter_map(|r| r.text("name").map(String::from))
            .collect())
    }

    /// Where this store lives.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The underlying connection, for callers that need more than
    /// [`Database::execute`] and [`Database::query`].
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_locations() {
        assert_eq!(Location::parse("sqlite://"), Location::Memory);
        assert_eq!(Location::parse(":memory:"), Location::Memory);
        assert_eq!(Location::parse("sqlite:///:memory:"), Location::Memory);
        assert_eq!(
            Location::parse("sqlite:///simplechat.db"),
            Location::File(PathBuf::from("simplechat.db"))
        );
        assert_eq!(
            Location::parse("sqlite:////var/lib/simplechat.db"),
            Location::File(PathBuf::from("/var/lib/simplechat.db"))
        );
        assert_eq!(
            Location::parse("/tmp/chat.db"),
            Location::File(PathBuf::from("/tmp/chat.db"))
        );
    }

    #[test]
    fn new_creates_both_tables() {
        let db = Database::new("sqlite://").unwrap();
        assert_eq!(
            db.table_names().unwrap(),
            vec!["essence_markers".to_string(), "memory".to_string()]
        );
    }

    #[test]
    fn open_without_migrate_leaves_store_empty() {
        let db = Database::open(":memory:", false).unwrap();
        assert!(db.table_names().unwrap().is_empty());
        db.migrate().unwrap();
        assert_eq!(db.table_names().unwrap().len(), 2);
    }

    #[test]
    fn mention_count_defaults_to_one() {
        let db = Database::new(":memory:").unwrap();
        db.execute(
            "INSERT INTO memory (entity, source) VALUES (?1, ?2)",
            ["rust", "chat"],
        )
        .unwrap();
        let rows = db
            .query("SELECT entity, mention_count FROM memory", [])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("entity"), Some("rust"));
        assert_eq!(rows[0].get("mention_count"), Some(&Value::Integer(1)));
    }

    #[test]
    fn memory_key_is_unique() {
        let db = Database::new(":memory:").unwrap();
        let insert = "INSERT INTO memory (entity, source) VALUES ('a', 'b')";
        db.execute(insert, []).unwrap();
        assert!(db.execute(insert, []).is_err());
    }

    #[test]
    fn uncreatable_parent_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain-file");
        std::fs::write(&file, b"not a directory").unwrap();
        let url = format!("sqlite:///{}", file.join("sub").join("simplechat.db").display());
        let err = Database::new(&url).err().expect("parent cannot be created");
        assert!(err.is_store());
        assert!(err.is_fatal());
        assert!(err.to_string().contains("failed to create directory"));
    }

    #[test]
    fn malformed_statement_is_a_store_error() {
        let db = Database::new(":memory:").unwrap();
        let err = db.query("SELEKT 1", []).unwrap_err();
        assert!(err.is_store());
    }
}
