//! Habit records and the inputs that create or edit them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::animal::{animal_for_name, is_known_animal};
use super::cadence::{self, DEFAULT_CADENCE_SECS, MIN_CADENCE_SECS};
use crate::error::ValidationError;

pub const FULL_HEALTH: f64 = 100.0;
pub const NAME_MAX_CHARS: usize = 50;

/// Clamp a health value into `[0, FULL_HEALTH]`. NaN becomes 0.
pub fn clamp_health(health: f64) -> f64 {
    if health.is_nan() {
        0.0
    } else {
        health.clamp(0.0, FULL_HEALTH)
    }
}

/// One recorded completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    pub id: Uuid,
    /// Older records stored this under `date`.
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
}

impl HabitEntry {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
        }
    }
}

/// A tracked habit and its vitality.
///
/// Health state (`health`, `is_dead`, `entries`, `last_completed_at`,
/// `revived_at`) is only written by the health engine and the completion
/// and revival flows; field edits go through [`HabitUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredHabit")]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Seconds expected between completions.
    pub cadence: u64,
    pub entries: Vec<HabitEntry>,
    pub last_completed_at: DateTime<Utc>,
    pub health: f64,
    pub is_dead: bool,
    /// Set by revival; restarts the decay clock without recording a completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revived_at: Option<DateTime<Utc>>,
}

impl Habit {
    /// Build a fresh habit with its seed entry at `now`. Input is not validated here.
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        cadence: u64,
        animal: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
            animal,
            created_at: now,
            cadence,
            entries: vec![HabitEntry::new(now)],
            last_completed_at: now,
            health: FULL_HEALTH,
            is_dead: false,
            revived_at: None,
        }
    }

    /// Instant the decay clock runs from.
    pub fn decay_anchor(&self) -> DateTime<Utc> {
        match self.revived_at {
            Some(revived) if revived > self.last_completed_at => revived,
            _ => self.last_completed_at,
        }
    }

    pub fn next_expected_completion(&self) -> DateTime<Utc> {
        cadence::next_expected_completion(self.decay_anchor(), self.cadence)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        cadence::is_overdue(now, self.decay_anchor(), self.cadence, self.is_dead)
    }

    /// The chosen animal, or a stable pick derived from the name.
    pub fn animal_or_default(&self) -> &str {
        self.animal
            .as_deref()
            .unwrap_or_else(|| animal_for_name(&self.name))
    }

    pub fn latest_entry(&self) -> Option<&HabitEntry> {
        self.entries.last()
    }
}

/// Serialized shape accepted on load.
///
/// Every field added after the first release is optional so older
/// collections still deserialize.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHabit {
    id: Uuid,
    name: String,
    color: String,
    #[serde(default)]
    animal: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    cadence: Option<u64>,
    #[serde(default)]
    entries: Vec<HabitEntry>,
    #[serde(default)]
    last_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    health: Option<f64>,
    #[serde(default)]
    is_dead: Option<bool>,
    #[serde(default)]
    revived_at: Option<DateTime<Utc>>,
}

impl From<StoredHabit> for Habit {
    fn from(stored: StoredHabit) -> Self {
        let is_dead = stored.is_dead.unwrap_or(false);
        let health = if is_dead {
            0.0
        } else {
            clamp_health(stored.health.unwrap_or(FULL_HEALTH))
        };
        let last_completed_at = stored
            .last_completed_at
            .unwrap_or(stored.created_at)
            .max(stored.created_at);
        let mut entries = stored.entries;
        if entries.is_empty() {
            entries.push(HabitEntry::new(last_completed_at));
        }

        Self {
            id: stored.id,
            name: stored.name,
            color: stored.color,
            animal: stored.animal.filter(|a| !a.is_empty()),
            created_at: stored.created_at,
            cadence: stored.cadence.unwrap_or(DEFAULT_CADENCE_SECS),
            entries,
            last_completed_at,
            health,
            is_dead,
            revived_at: stored.revived_at,
        }
    }
}

/// Input for creating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDraft {
    pub name: String,
    pub color: String,
    pub cadence: u64,
    #[serde(default)]
    pub animal: Option<String>,
}

impl HabitDraft {
    pub fn new(name: impl Into<String>, color: impl Into<String>, cadence: u64) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            cadence,
            animal: None,
        }
    }

    pub fn with_animal(mut self, animal: impl Into<String>) -> Self {
        self.animal = Some(animal.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_color(&self.color)?;
        validate_cadence(self.cadence)?;
        if let Some(animal) = &self.animal {
            validate_animal(animal)?;
        }
        Ok(())
    }
}

/// Partial edit of the user-owned fields of a habit.
///
/// Health, death, entries and timestamps are not editable through this path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub cadence: Option<u64>,
    #[serde(default)]
    pub animal: Option<String>,
}

impl HabitUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.cadence.is_none() && self.animal.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(color) = &self.color {
            validate_color(color)?;
        }
        if let Some(cadence) = self.cadence {
            validate_cadence(cadence)?;
        }
        if let Some(animal) = &self.animal {
            validate_animal(animal)?;
        }
        Ok(())
    }

    /// Merge into `habit`. Returns whether any field actually changed.
    pub fn apply_to(&self, habit: &mut Habit) -> bool {
        let mut changed = false;
        if let Some(name) = &self.name {
            let name = name.trim();
            if habit.name != name {
                habit.name = name.to_string();
                changed = true;
            }
        }
        if let Some(color) = &self.color {
            if &habit.color != color {
                habit.color = color.clone();
                changed = true;
            }
        }
        if let Some(cadence) = self.cadence {
            if habit.cadence != cadence {
                habit.cadence = cadence;
                changed = true;
            }
        }
        if let Some(animal) = &self.animal {
            if habit.animal.as_ref() != Some(animal) {
                habit.animal = Some(animal.clone());
                changed = true;
            }
        }
        changed
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let len = trimmed.chars().count();
    if len > NAME_MAX_CHARS {
        return Err(ValidationError::NameTooLong {
            len,
            max: NAME_MAX_CHARS,
        });
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<(), ValidationError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

fn validate_cadence(cadence: u64) -> Result<(), ValidationError> {
    if cadence < MIN_CADENCE_SECS {
        return Err(ValidationError::CadenceTooShort {
            cadence,
            min: MIN_CADENCE_SECS,
        });
    }
    Ok(())
}

fn validate_animal(animal: &str) -> Result<(), ValidationError> {
    if animal.trim().is_empty() {
        return Err(ValidationError::EmptyAnimal);
    }
    if !is_known_animal(animal) {
        return Err(ValidationError::UnknownAnimal(animal.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_habit_has_seed_entry_and_full_health() {
        let habit = Habit::new("Stretch", "#88aaee", 3_600, None, t0());
        assert_eq!(habit.entries.len(), 1);
        assert_eq!(habit.entries[0].timestamp, t0());
        assert_eq!(habit.last_completed_at, habit.created_at);
        assert_eq!(habit.health, FULL_HEALTH);
        assert!(!habit.is_dead);
        assert!(habit.revived_at.is_none());
    }

    #[test]
    fn draft_validation() {
        assert!(HabitDraft::new("Read", "#A1b2C3", 15).validate().is_ok());
        assert_eq!(
            HabitDraft::new("   ", "#a1b2c3", 60).validate(),
            Err(ValidationError::EmptyName)
        );
        assert!(matches!(
            HabitDraft::new("x".repeat(51), "#a1b2c3", 60).validate(),
            Err(ValidationError::NameTooLong { len: 51, max: 50 })
        ));
        assert!(matches!(
            HabitDraft::new("Read", "blue", 60).validate(),
            Err(ValidationError::InvalidColor(_))
        ));
        assert!(matches!(
            HabitDraft::new("Read", "#a1b2c3", 14).validate(),
            Err(ValidationError::CadenceTooShort { cadence: 14, min: 15 })
        ));
        assert_eq!(
            HabitDraft::new("Read", "#a1b2c3", 60).with_animal("").validate(),
            Err(ValidationError::EmptyAnimal)
        );
    }

    #[test]
    fn animal_must_be_on_roster() {
        assert!(HabitDraft::new("Read", "#a1b2c3", 60)
            .with_animal("TimberWolf")
            .validate()
            .is_ok());
        assert_eq!(
            HabitDraft::new("Read", "#a1b2c3", 60).with_animal("Dragon").validate(),
            Err(ValidationError::UnknownAnimal("Dragon".into()))
        );
        let update = HabitUpdate {
            animal: Some("snowfox".into()),
            ..Default::default()
        };
        assert_eq!(update.validate(), Err(ValidationError::UnknownAnimal("snowfox".into())));
    }

    #[test]
    fn latest_entry_is_last_recorded() {
        let mut habit = Habit::new("Stretch", "#88aaee", 60, None, t0());
        assert_eq!(habit.latest_entry().map(|e| e.timestamp), Some(t0()));
        let later = HabitEntry::new(t0() + chrono::Duration::minutes(3));
        habit.entries.push(later.clone());
        assert_eq!(habit.latest_entry(), Some(&later));
    }

    #[test]
    fn update_only_touches_user_fields() {
        let mut habit = Habit::new("Stretch", "#88aaee", 3_600, None, t0());
        habit.health = 50.0;

        let update = HabitUpdate {
            name: Some("Yoga".into()),
            cadence: Some(7_200),
            ..Default::default()
        };
        assert!(update.apply_to(&mut habit));
        assert_eq!(habit.name, "Yoga");
        assert_eq!(habit.cadence, 7_200);
        assert_eq!(habit.color, "#88aaee");
        assert_eq!(habit.health, 50.0);

        assert!(!update.apply_to(&mut habit));
        assert!(HabitUpdate::default().is_empty());
    }

    #[test]
    fn legacy_record_gets_defaults() {
        let json = r##"{
            "id": "2b1f8f0e-6d5c-4c7a-9a53-0b8f1f7b7e11",
            "name": "Water plants",
            "color": "#22cc88",
            "createdAt": "2024-05-01T12:00:00.000Z",
            "entries": [
                { "id": "d3c1a3a0-8a7e-4b8e-a8d2-0c7b5c0d9f01", "date": "2024-05-01T12:00:00.000Z" }
            ]
        }"##;
        let habit: Habit = serde_json::from_str(json).unwrap();
        assert_eq!(habit.cadence, DEFAULT_CADENCE_SECS);
        assert_eq!(habit.health, FULL_HEALTH);
        assert!(!habit.is_dead);
        assert_eq!(habit.last_completed_at, habit.created_at);
        assert_eq!(habit.entries[0].timestamp, t0());
        assert!(habit.animal.is_none());
    }

    #[test]
    fn loaded_health_is_kept_consistent() {
        let json = r##"{
            "id": "2b1f8f0e-6d5c-4c7a-9a53-0b8f1f7b7e11",
            "name": "Run",
            "color": "#22cc88",
            "createdAt": "2024-05-01T12:00:00Z",
            "entries": [],
            "health": 250,
            "isDead": false
        }"##;
        let habit: Habit = serde_json::from_str(json).unwrap();
        assert_eq!(habit.health, FULL_HEALTH);
        assert_eq!(habit.entries.len(), 1);

        let dead = json.replace("\"isDead\": false", "\"isDead\": true");
        let habit: Habit = serde_json::from_str(&dead).unwrap();
        assert!(habit.is_dead);
        assert_eq!(habit.health, 0.0);
    }

    #[test]
    fn serializes_camel_case() {
        let habit = Habit::new("Stretch", "#88aaee", 60, Some("SnowFox".into()), t0());
        let value = serde_json::to_value(&habit).unwrap();
        assert!(value.get("lastCompletedAt").is_some());
        assert!(value.get("isDead").is_some());
        assert!(value.get("revivedAt").is_none());
        assert_eq!(value["entries"][0]["timestamp"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn decay_anchor_prefers_later_revival() {
        let mut habit = Habit::new("Stretch", "#88aaee", 60, None, t0());
        assert_eq!(habit.decay_anchor(), t0());
        let later = t0() + chrono::Duration::minutes(10);
        habit.revived_at = Some(later);
        assert_eq!(habit.decay_anchor(), later);
        assert_eq!(habit.next_expected_completion(), later + chrono::Duration::seconds(60));
    }

    #[test]
    fn animal_falls_back_to_name_hash() {
        let habit = Habit::new("Stretch", "#88aaee", 60, None, t0());
        assert_eq!(habit.animal_or_default(), animal_for_name("Stretch"));
        let chosen = Habit::new("Stretch", "#88aaee", 60, Some("SnowFox".into()), t0());
        assert_eq!(chosen.animal_or_default(), "SnowFox");
    }
}
