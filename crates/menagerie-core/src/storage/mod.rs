mod config;
pub mod database;

pub use config::{Config, DefaultsConfig, HealthConfig, PolicyKind, TickConfig};
pub use database::{Database, HABITS_KEY};

use std::path::PathBuf;

use tracing::warn;

use crate::error::Result;
use crate::habit::Habit;

/// Durable home of the habit collection.
pub trait HabitStore {
    fn load_habits(&self) -> Result<Vec<Habit>>;
    fn save_habits(&self, habits: &[Habit]) -> Result<()>;
}

/// Load the collection, falling back to an empty one on any failure.
///
/// A partially decoded collection is never returned.
pub fn load_or_empty<S: HabitStore + ?Sized>(store: &S) -> Vec<Habit> {
    match store.load_habits() {
        Ok(habits) => habits,
        Err(e) => {
            warn!(error = %e, "failed to load habits, starting empty");
            Vec::new()
        }
    }
}

/// Persist the collection, logging instead of failing.
///
/// Returns whether the write succeeded so callers can surface it.
pub fn save_or_warn<S: HabitStore + ?Sized>(store: &S, habits: &[Habit]) -> bool {
    match store.save_habits(habits) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, count = habits.len(), "failed to save habits");
            false
        }
    }
}

/// Returns the data directory.
///
/// `MENAGERIE_DATA_DIR` wins when set. Otherwise `~/.config/menagerie[-dev]/`
/// depending on `MENAGERIE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("MENAGERIE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MENAGERIE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("menagerie-dev")
            } else {
                base_dir.join("menagerie")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
