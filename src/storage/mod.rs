use crate::error::{IdeaflowError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::{Path, PathBuf};

pub mod memory;
pub mod types;
pub use memory::MemoryStore;
pub use types::{Category, Idea};

/// Environment variable that points the vault at an alternate database file
pub const VAULT_DB_ENV: &str = "IDEAFLOW_VAULT_DB";

/// Keyed, durable storage of [`Idea`] records
///
/// `get_all` materializes records most-recently-inserted first; replacing an
/// existing id keeps its position. Reads never fail: an unreadable medium
/// yields an empty vault. Writes surface their failures.
pub trait RecordStore: Send + Sync {
    /// Every stored record, newest insertion first
    fn get_all(&self) -> Vec<Idea>;

    /// Insert or fully replace the record with `idea.id`
    fn put(&self, idea: &Idea) -> Result<()>;

    /// Overwrite the record with `idea.id` only if it is still stored
    ///
    /// Returns `false`, writing nothing, when the id is absent. Unlike `put`
    /// this never inserts, so an edit racing a delete cannot bring the
    /// record back.
    fn update(&self, idea: &Idea) -> Result<bool>;

    /// Remove the record with `id`; absent ids are ignored
    fn delete(&self, id: &str) -> Result<()>;

    /// Remove every record
    fn clear(&self) -> Result<()>;

    /// Look up a single record by exact id
    fn get(&self, id: &str) -> Option<Idea> {
        self.get_all().into_iter().find(|idea| idea.id == id)
    }

    /// Replace the whole record set so that `get_all` returns `ideas` in order
    fn replace_all(&self, ideas: &[Idea]) -> Result<()> {
        self.clear()?;
        for idea in ideas.iter().rev() {
            self.put(idea)?;
        }
        Ok(())
    }
}

/// SQLite-backed vault
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory unless
    /// `IDEAFLOW_VAULT_DB` points somewhere else.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var(VAULT_DB_ENV) {
            return Self::new_with_path(override_path);
        }

        Self::new_with_path(default_db_path()?)
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use ideaflow::storage::{RecordStore, SqliteStorage};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("vault.db")).unwrap();
    /// assert!(storage.get_all().is_empty());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create parent directory for database")
                    .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;
            }
        }

        let storage = Self { db_path };
        storage.init()?;
        tracing::debug!(path = %storage.db_path.display(), "Opened idea vault");
        Ok(storage)
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)).into())
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ideas (
                id TEXT PRIMARY KEY,
                seq INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                record JSON NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_ideas_seq ON ideas(seq);",
        )
        .context("Failed to create tables")
        .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;

        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Idea>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare("SELECT id, record FROM ideas ORDER BY seq DESC")
            .context("Failed to prepare statement")?;

        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let record: String = row.get(1)?;
                Ok((id, record))
            })
            .context("Failed to query ideas")?;

        let mut ideas = Vec::new();
        for row in rows {
            let (id, record) = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping unreadable vault row: {}", e);
                    continue;
                }
            };
            match serde_json::from_str::<Idea>(&record) {
                Ok(idea) => ideas.push(idea),
                Err(e) => tracing::warn!(id = %id, "Skipping corrupt idea record: {}", e),
            }
        }

        Ok(ideas)
    }
}

/// Upsert inside an open transaction, keeping `seq` for existing ids
fn put_in(tx: &Transaction<'_>, idea: &Idea) -> Result<()> {
    let record = serde_json::to_string(idea)
        .context("Failed to serialize idea")
        .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;

    let exists = tx
        .query_row(
            "SELECT 1 FROM ideas WHERE id = ?",
            params![idea.id],
            |_| Ok(true),
        )
        .optional()
        .context("Failed to look up idea")
        .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?
        .unwrap_or(false);

    if exists {
        tx.execute(
            "UPDATE ideas SET created_at = ?, record = ? WHERE id = ?",
            params![idea.created_at, record, idea.id],
        )
        .context("Failed to update idea")
        .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;
    } else {
        tx.execute(
            "INSERT INTO ideas (id, seq, created_at, record)
            VALUES (?, (SELECT COALESCE(MAX(seq), 0) + 1 FROM ideas), ?, ?)",
            params![idea.id, idea.created_at, record],
        )
        .context("Failed to insert idea")
        .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;
    }

    Ok(())
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "ideaflow", "ideaflow")
        .ok_or_else(|| IdeaflowError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().join("vault.db"))
}

impl RecordStore for SqliteStorage {
    fn get_all(&self) -> Vec<Idea> {
        match self.load_all() {
            Ok(ideas) => ideas,
            Err(e) => {
                tracing::warn!("Failed to read vault, treating it as empty: {:#}", e);
                Vec::new()
            }
        }
    }

    fn get(&self, id: &str) -> Option<Idea> {
        let conn = self.open().ok()?;
        let record: Option<String> = conn
            .query_row(
                "SELECT record FROM ideas WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .unwrap_or_else(|e| {
                tracing::warn!(id = %id, "Failed to read idea: {}", e);
                None
            });

        record.and_then(|r| match serde_json::from_str(&r) {
            Ok(idea) => Some(idea),
            Err(e) => {
                tracing::warn!(id = %id, "Corrupt idea record: {}", e);
                None
            }
        })
    }

    fn put(&self, idea: &Idea) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;

        put_in(&tx, idea)?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;

        tracing::debug!(id = %idea.id, "Saved idea");
        Ok(())
    }

    fn update(&self, idea: &Idea) -> Result<bool> {
        let record = serde_json::to_string(idea)
            .context("Failed to serialize idea")
            .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;

        let conn = self.open()?;
        let changed = conn
            .execute(
                "UPDATE ideas SET created_at = ?, record = ? WHERE id = ?",
                params![idea.created_at, record, idea.id],
            )
            .context("Failed to update idea")
            .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;

        tracing::debug!(id = %idea.id, changed, "Updated idea");
        Ok(changed > 0)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let conn = self.open()?;
        let removed = conn
            .execute("DELETE FROM ideas WHERE id = ?", params![id])
            .context("Failed to delete idea")
            .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;

        tracing::debug!(id = %id, removed, "Deleted idea");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM ideas", [])
            .context("Failed to clear vault")
            .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;
        Ok(())
    }

    fn replace_all(&self, ideas: &[Idea]) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;

        tx.execute("DELETE FROM ideas", [])
            .context("Failed to clear vault")
            .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;

        for idea in ideas.iter().rev() {
            put_in(&tx, idea)?;
        }

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| IdeaflowError::Storage(format!("{:#}", e)))?;

        tracing::info!(count = ideas.len(), "Replaced vault contents");
        Ok(())
    }
}
