//! Habit health decay.
//!
//! Every habit is in one of three states relative to its decay clock
//! (the later of its last completion and its last revival):
//!
//! ```text
//! Fresh --(elapsed > cadence)--> Decayed --(policy)--> Dead --(revive/complete)--> Fresh
//! ```
//!
//! The engine never mutates its input. Callers take the returned
//! [`HealthCheck`] or [`HealthSweep`] and swap it in themselves.
//!
//! ## Policies
//!
//! - [`DecayPolicy::Halving`] (default): every check past one cadence halves
//!   health; from two cadences on the habit dies.
//! - [`DecayPolicy::FixedDecrement`]: every check past one cadence removes a
//!   fixed amount; the habit dies when health reaches zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cadence::cadence_duration;
use super::model::{clamp_health, Habit, FULL_HEALTH};

/// Decrement used by [`DecayPolicy::FixedDecrement`] unless configured otherwise.
pub const DEFAULT_DECREMENT: f64 = 25.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum DecayPolicy {
    /// Halve on every overdue check, then death at two cadences.
    #[default]
    Halving,
    /// Repeated fixed decrements on every overdue check.
    FixedDecrement {
        #[serde(default = "default_decrement")]
        decrement: f64,
    },
}

fn default_decrement() -> f64 {
    DEFAULT_DECREMENT
}

/// Coarse decay state of a habit at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vitality {
    /// Within one cadence of the decay anchor.
    Fresh,
    /// Overdue but alive.
    Decayed,
    Dead,
}

/// Display bucket derived from health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Dead,
    Perfect,
    Healthy,
    Ok,
    Weak,
    Critical,
}

impl HealthStatus {
    pub fn of(habit: &Habit) -> Self {
        Self::from_health(habit.health, habit.is_dead)
    }

    pub fn from_health(health: f64, is_dead: bool) -> Self {
        let pct = clamp_health(health) / FULL_HEALTH * 100.0;
        match pct {
            _ if is_dead => HealthStatus::Dead,
            p if p >= 100.0 => HealthStatus::Perfect,
            p if p > 75.0 => HealthStatus::Healthy,
            p if p > 50.0 => HealthStatus::Ok,
            p if p > 25.0 => HealthStatus::Weak,
            _ => HealthStatus::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Dead => "💀 Dead",
            HealthStatus::Perfect => "💚 Perfect",
            HealthStatus::Healthy => "💛 Healthy",
            HealthStatus::Ok => "🧡 OK",
            HealthStatus::Weak => "❤️ Weak",
            HealthStatus::Critical => "💔 Critical",
        }
    }
}

/// Outcome of checking one habit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub health: f64,
    pub is_dead: bool,
    pub has_changed: bool,
}

impl HealthCheck {
    fn unchanged(habit: &Habit) -> Self {
        Self {
            health: habit.health,
            is_dead: habit.is_dead,
            has_changed: false,
        }
    }
}

/// Per-habit change produced by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthDelta {
    pub habit_id: Uuid,
    pub health_before: f64,
    pub health_after: f64,
    pub died: bool,
}

/// Result of checking a whole collection.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthSweep {
    pub habits: Vec<Habit>,
    pub deltas: Vec<HealthDelta>,
    pub has_any_changes: bool,
}

/// Pure health calculator for one decay policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthEngine {
    policy: DecayPolicy,
}

impl HealthEngine {
    pub fn new(policy: DecayPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DecayPolicy {
        self.policy
    }

    /// Milliseconds since the decay anchor and the cadence in milliseconds.
    /// Negative elapsed time (clock moved backwards) reads as zero.
    fn elapsed_and_cadence_ms(habit: &Habit, now: DateTime<Utc>) -> (i64, i64) {
        let elapsed_ms = (now - habit.decay_anchor()).num_milliseconds().max(0);
        let cadence_ms = cadence_duration(habit.cadence.max(1)).num_milliseconds();
        (elapsed_ms, cadence_ms)
    }

    pub fn vitality(&self, habit: &Habit, now: DateTime<Utc>) -> Vitality {
        if habit.is_dead {
            return Vitality::Dead;
        }
        let (elapsed_ms, cadence_ms) = Self::elapsed_and_cadence_ms(habit, now);
        if elapsed_ms > cadence_ms {
            Vitality::Decayed
        } else {
            Vitality::Fresh
        }
    }

    /// Compute the habit's health at `now`.
    ///
    /// Dead habits are returned as-is: only revival or completion brings
    /// them back.
    pub fn check(&self, habit: &Habit, now: DateTime<Utc>) -> HealthCheck {
        if habit.is_dead {
            return HealthCheck::unchanged(habit);
        }

        let (elapsed_ms, cadence_ms) = Self::elapsed_and_cadence_ms(habit, now);
        if elapsed_ms <= cadence_ms {
            return HealthCheck::unchanged(habit);
        }

        let current = clamp_health(habit.health);
        let (health, is_dead) = match self.policy {
            DecayPolicy::Halving if elapsed_ms >= cadence_ms.saturating_mul(2) => (0.0, true),
            DecayPolicy::Halving => (clamp_health(current * 0.5), false),
            DecayPolicy::FixedDecrement { decrement } => {
                let health = clamp_health(current - decrement.max(0.0));
                (health, health == 0.0)
            }
        };

        HealthCheck {
            health,
            is_dead,
            has_changed: health != habit.health || is_dead != habit.is_dead,
        }
    }

    /// Check every habit, returning a replacement collection.
    ///
    /// Unchanged habits are cloned through untouched, so when
    /// `has_any_changes` is false the caller can drop the result.
    pub fn check_all(&self, habits: &[Habit], now: DateTime<Utc>) -> HealthSweep {
        let mut deltas = Vec::new();
        let habits = habits
            .iter()
            .map(|habit| {
                let check = self.check(habit, now);
                if !check.has_changed {
                    return habit.clone();
                }
                deltas.push(HealthDelta {
                    habit_id: habit.id,
                    health_before: habit.health,
                    health_after: check.health,
                    died: check.is_dead && !habit.is_dead,
                });
                Habit {
                    health: check.health,
                    is_dead: check.is_dead,
                    ..habit.clone()
                }
            })
            .collect();

        HealthSweep {
            has_any_changes: !deltas.is_empty(),
            habits,
            deltas,
        }
    }
}

/// Check one habit with the default policy.
pub fn check_habit_health(habit: &Habit, now: DateTime<Utc>) -> HealthCheck {
    HealthEngine::default().check(habit, now)
}

/// Check a collection with the default policy.
pub fn check_all_habits_health(habits: &[Habit], now: DateTime<Utc>) -> HealthSweep {
    HealthEngine::default().check_all(habits, now)
}

/// Bring a dead habit back at full health.
///
/// History is truncated to the most recent entry and the decay clock
/// restarts at `now`. Living habits are returned unchanged.
pub fn revive_habit(habit: &Habit, now: DateTime<Utc>) -> Habit {
    if !habit.is_dead {
        return habit.clone();
    }

    Habit {
        health: FULL_HEALTH,
        is_dead: false,
        entries: habit.latest_entry().cloned().into_iter().collect(),
        revived_at: Some(now),
        ..habit.clone()
    }
}
