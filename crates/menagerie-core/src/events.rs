//! Lifecycle events emitted by the habit manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::habit::HealthDelta;

/// Every state change in the habit collection produces an Event.
/// Observers (the CLI, a GUI) render or notify from these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HabitCreated {
        habit_id: Uuid,
        name: String,
        at: DateTime<Utc>,
    },
    HabitUpdated {
        habit_id: Uuid,
        at: DateTime<Utc>,
    },
    HabitDeleted {
        habit_id: Uuid,
        at: DateTime<Utc>,
    },
    /// A completion was recorded. `revived` is set when the habit was dead.
    HabitCompleted {
        habit_id: Uuid,
        entry_id: Uuid,
        revived: bool,
        at: DateTime<Utc>,
    },
    HabitRevived {
        habit_id: Uuid,
        at: DateTime<Utc>,
    },
    /// Health dropped but the habit is still alive.
    HabitDecayed {
        habit_id: Uuid,
        health_before: f64,
        health_after: f64,
        at: DateTime<Utc>,
    },
    HabitDied {
        habit_id: Uuid,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Translate a health sweep delta into its event.
    pub fn from_delta(delta: &HealthDelta, at: DateTime<Utc>) -> Self {
        if delta.died {
            Event::HabitDied {
                habit_id: delta.habit_id,
                at,
            }
        } else {
            Event::HabitDecayed {
                habit_id: delta.habit_id,
                health_before: delta.health_before,
                health_after: delta.health_after,
                at,
            }
        }
    }

    pub fn habit_id(&self) -> Uuid {
        match self {
            Event::HabitCreated { habit_id, .. }
            | Event::HabitUpdated { habit_id, .. }
            | Event::HabitDeleted { habit_id, .. }
            | Event::HabitCompleted { habit_id, .. }
            | Event::HabitRevived { habit_id, .. }
            | Event::HabitDecayed { habit_id, .. }
            | Event::HabitDied { habit_id, .. } => *habit_id,
        }
    }
}
