//! # Menagerie Core Library
//!
//! Habits are kept as virtual pets whose health decays when they are
//! neglected. This crate holds the rules for that decay and the collection
//! that owns the habits; rendering, input forms and animation live elsewhere.
//!
//! ## Architecture
//!
//! - **Cadence Model**: formatting and due-time helpers for a habit's
//!   expected completion interval
//! - **Health Engine**: pure decay calculation over one habit or a whole
//!   collection, with a configurable [`DecayPolicy`]
//! - **Lifecycle Manager**: [`HabitManager`] owns the collection and applies
//!   creation, edits, completions, revival and periodic sweeps
//! - **Storage**: SQLite key-value persistence and TOML configuration
//! - **Scheduler**: tokio-driven repeating tick with guaranteed cancellation
//!
//! ## Key Components
//!
//! - [`HabitManager`]: owner of the habit collection
//! - [`HealthEngine`]: decay state machine
//! - [`Database`]: habit persistence
//! - [`Config`]: application configuration
//! - [`TickScheduler`]: periodic sweep driver

pub mod error;
pub mod events;
pub mod habit;
pub mod scheduler;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use habit::{
    check_all_habits_health, check_habit_health, format_cadence, is_overdue,
    next_expected_completion, revive_habit, DecayPolicy, Habit, HabitDraft, HabitEntry,
    HabitManager, HabitUpdate, HealthCheck, HealthEngine, HealthStatus, HealthSweep, Vitality,
};
pub use scheduler::{TickHandle, TickScheduler};
pub use storage::{Config, Database, HabitStore};
