pub mod config;
pub mod habit;
pub mod watch;

use menagerie_core::storage::{self, Config, Database};
use menagerie_core::{HabitManager, HealthEngine};
use uuid::Uuid;

/// Everything a command needs: configuration, the store and the loaded habits.
pub struct Session {
    pub config: Config,
    pub db: Database,
    pub manager: HabitManager,
}

impl Session {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load_or_default();
        let db = Database::open()?;
        let habits = storage::load_or_empty(&db);
        let engine = HealthEngine::new(config.health.decay_policy());
        Ok(Self {
            config,
            db,
            manager: HabitManager::with_habits(habits, engine),
        })
    }

    /// Write the collection back if anything changed since the last write.
    pub fn persist(&mut self) {
        if self.manager.take_dirty() && !storage::save_or_warn(&self.db, self.manager.habits()) {
            eprintln!("warning: changes could not be saved");
        }
    }

    /// Match a full id or a unique id prefix.
    pub fn find_id(&self, needle: &str) -> Result<Option<Uuid>, Box<dyn std::error::Error>> {
        if let Ok(id) = Uuid::parse_str(needle) {
            return Ok(self.manager.get(id).map(|h| h.id));
        }

        let needle = needle.to_ascii_lowercase();
        let mut matches = self
            .manager
            .habits()
            .iter()
            .filter(|h| h.id.to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(habit), None) => Ok(Some(habit.id)),
            (None, _) => Ok(None),
            (Some(_), Some(_)) => Err(format!("ambiguous habit id prefix: {needle}").into()),
        }
    }

    pub fn require_id(&self, needle: &str) -> Result<Uuid, Box<dyn std::error::Error>> {
        self.find_id(needle)?
            .ok_or_else(|| format!("habit not found: {needle}").into())
    }
}
