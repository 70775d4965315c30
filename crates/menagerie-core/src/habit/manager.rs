//! Owner of the habit collection.
//!
//! All mutations run as discrete steps against `&mut self`; the periodic
//! sweep computes a full replacement collection and swaps it in only when
//! something changed. Scheduling the sweep and persisting the collection
//! are the caller's job: check [`HabitManager::take_dirty`] after each step.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::health::{revive_habit, HealthEngine};
use super::model::{Habit, HabitDraft, HabitEntry, HabitUpdate, FULL_HEALTH};
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Default)]
pub struct HabitManager {
    habits: Vec<Habit>,
    engine: HealthEngine,
    events: Vec<Event>,
    dirty: bool,
}

impl HabitManager {
    pub fn new(engine: HealthEngine) -> Self {
        Self::with_habits(Vec::new(), engine)
    }

    /// Start from a loaded collection. Loading does not mark the manager dirty.
    pub fn with_habits(habits: Vec<Habit>, engine: HealthEngine) -> Self {
        Self {
            habits,
            engine,
            events: Vec::new(),
            dirty: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: Uuid) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn engine(&self) -> &HealthEngine {
        &self.engine
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Whether the collection changed since the last call, resetting the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Events produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Validate `draft` and add a new habit with full health and one seed entry.
    pub fn create_habit(&mut self, draft: HabitDraft, now: DateTime<Utc>) -> Result<Habit, ValidationError> {
        draft.validate()?;

        let habit = Habit::new(draft.name.trim(), draft.color, draft.cadence, draft.animal, now);
        info!(habit_id = %habit.id, name = %habit.name, cadence = habit.cadence, "habit created");
        self.emit(Event::HabitCreated {
            habit_id: habit.id,
            name: habit.name.clone(),
            at: now,
        });
        self.habits.push(habit.clone());
        Ok(habit)
    }

    /// Merge user-editable fields into the habit with `id`.
    ///
    /// Returns `Ok(false)` when the id is unknown or nothing changed.
    pub fn update_habit(
        &mut self,
        id: Uuid,
        update: &HabitUpdate,
        now: DateTime<Utc>,
    ) -> Result<bool, ValidationError> {
        update.validate()?;

        let Some(habit) = self.habits.iter_mut().find(|h| h.id == id) else {
            debug!(habit_id = %id, "update ignored: unknown habit");
            return Ok(false);
        };
        if !update.apply_to(habit) {
            return Ok(false);
        }
        self.emit(Event::HabitUpdated { habit_id: id, at: now });
        Ok(true)
    }

    /// Remove the habit with `id`. Unknown ids are ignored.
    pub fn delete_habit(&mut self, id: Uuid, now: DateTime<Utc>) -> bool {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != id);
        if self.habits.len() == before {
            debug!(habit_id = %id, "delete ignored: unknown habit");
            return false;
        }
        info!(habit_id = %id, "habit deleted");
        self.emit(Event::HabitDeleted { habit_id: id, at: now });
        true
    }

    /// Record a completion at `now`.
    ///
    /// Completing a dead habit revives it with a fresh history holding only
    /// the new entry.
    pub fn add_habit_entry(&mut self, id: Uuid, now: DateTime<Utc>) -> Option<&Habit> {
        let index = self.habits.iter().position(|h| h.id == id)?;

        let habit = &mut self.habits[index];
        let revived = habit.is_dead;
        let entry = HabitEntry::new(now);
        let entry_id = entry.id;
        if revived {
            habit.entries = vec![entry];
            info!(habit_id = %id, "dead habit completed, history reset");
        } else {
            habit.entries.push(entry);
        }
        habit.last_completed_at = now;
        habit.health = FULL_HEALTH;
        habit.is_dead = false;
        habit.revived_at = None;

        self.emit(Event::HabitCompleted {
            habit_id: id,
            entry_id,
            revived,
            at: now,
        });
        self.habits.get(index)
    }

    /// Revive a dead habit without recording a completion.
    ///
    /// Living habits are left untouched; `None` means the id is unknown.
    pub fn revive_habit(&mut self, id: Uuid, now: DateTime<Utc>) -> Option<&Habit> {
        let index = self.habits.iter().position(|h| h.id == id)?;

        if self.habits[index].is_dead {
            self.habits[index] = revive_habit(&self.habits[index], now);
            info!(habit_id = %id, "habit revived");
            self.emit(Event::HabitRevived { habit_id: id, at: now });
        }
        self.habits.get(index)
    }

    /// Run one health sweep over the collection.
    ///
    /// The collection is replaced wholesale, and only if some habit changed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let sweep = self.engine.check_all(&self.habits, now);
        debug!(habits = self.habits.len(), changed = sweep.deltas.len(), "health sweep");
        if !sweep.has_any_changes {
            return false;
        }

        for delta in &sweep.deltas {
            if delta.died {
                info!(habit_id = %delta.habit_id, "habit died");
            }
            self.emit(Event::from_delta(delta, now));
        }
        self.habits = sweep.habits;
        true
    }

    fn emit(&mut self, event: Event) {
        self.events.push(event);
        self.dirty = true;
    }
}
