pub mod animal;
pub mod cadence;
mod health;
mod manager;
mod model;

pub use cadence::{format_cadence, is_overdue, next_expected_completion, CadencePreset};
pub use health::{
    check_all_habits_health, check_habit_health, revive_habit, DecayPolicy, HealthCheck,
    HealthDelta, HealthEngine, HealthStatus, HealthSweep, Vitality, DEFAULT_DECREMENT,
};
pub use manager::HabitManager;
pub use model::{clamp_health, Habit, HabitDraft, HabitEntry, HabitUpdate, FULL_HEALTH, NAME_MAX_CHARS};
