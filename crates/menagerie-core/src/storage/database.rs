//! SQLite-backed key-value store for application state.
//!
//! The habit collection lives under [`HABITS_KEY`] as a JSON array.

use std::path::Path;

use rusqlite::{params, Connection};
use tracing::debug;

use super::{data_dir, HabitStore};
use crate::error::{DatabaseError, Result};
use crate::habit::Habit;

pub const HABITS_KEY: &str = "menagerie_habits";

/// SQLite database holding the kv table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/menagerie.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("menagerie.db"))
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl HabitStore for Database {
    fn load_habits(&self) -> Result<Vec<Habit>> {
        let Some(json) = self.kv_get(HABITS_KEY)? else {
            return Ok(Vec::new());
        };
        let habits: Vec<Habit> = serde_json::from_str(&json).map_err(|e| DatabaseError::Corrupt {
            key: HABITS_KEY.to_string(),
            message: e.to_string(),
        })?;
        debug!(count = habits.len(), "habits loaded");
        Ok(habits)
    }

    fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        let json = serde_json::to_string(habits)?;
        self.kv_set(HABITS_KEY, &json)?;
        debug!(count = habits.len(), "habits saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn empty_store_loads_nothing() {
        let db = Database::open_memory().unwrap();
        assert!(db.load_habits().unwrap().is_empty());
    }

    #[test]
    fn habits_round_trip_with_subsecond_precision() {
        let db = Database::open_memory().unwrap();
        let created = Utc.timestamp_opt(1_717_000_000, 123_456_789).unwrap();
        let mut habit = Habit::new("Meditate", "#aabbcc", 900, Some("SlowTurtle".into()), created);
        habit.health = 50.0;
        habit.revived_at = Some(created + Duration::nanoseconds(987_654_321));

        db.save_habits(std::slice::from_ref(&habit)).unwrap();
        let loaded = db.load_habits().unwrap();
        assert_eq!(loaded, vec![habit]);
    }

    #[test]
    fn corrupt_payload_is_an_error() {
        let db = Database::open_memory().unwrap();
        db.kv_set(HABITS_KEY, "[{\"id\": 7}]").unwrap();
        let err = db.load_habits().unwrap_err();
        assert!(matches!(err, CoreError::Database(DatabaseError::Corrupt { .. })));
    }
}
