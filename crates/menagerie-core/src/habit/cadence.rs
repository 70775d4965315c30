//! Cadence helpers.
//!
//! A cadence is the expected interval between completions, in whole seconds.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Shortest cadence accepted at the creation boundary.
pub const MIN_CADENCE_SECS: u64 = 15;

/// Cadence assumed for records stored before cadences existed.
pub const DEFAULT_CADENCE_SECS: u64 = 86_400;

const MINUTE: u64 = 60;
const HOUR: u64 = 3_600;
const DAY: u64 = 86_400;
const WEEK: u64 = 604_800;

/// A named cadence offered to users when picking an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CadencePreset {
    pub seconds: u64,
    pub label: &'static str,
}

pub const CADENCE_PRESETS: [CadencePreset; 9] = [
    CadencePreset { seconds: 15, label: "15 seconds" },
    CadencePreset { seconds: 15 * MINUTE, label: "15 minutes" },
    CadencePreset { seconds: HOUR, label: "1 hour" },
    CadencePreset { seconds: 12 * HOUR, label: "12 hours" },
    CadencePreset { seconds: DAY, label: "Daily" },
    CadencePreset { seconds: 2 * DAY, label: "2 days" },
    CadencePreset { seconds: WEEK, label: "Weekly" },
    CadencePreset { seconds: 2 * WEEK, label: "Bi-weekly" },
    CadencePreset { seconds: 30 * DAY, label: "Monthly" },
];

/// Label of the preset matching `seconds` exactly, if any.
pub fn preset_label(seconds: u64) -> Option<&'static str> {
    CADENCE_PRESETS
        .iter()
        .find(|p| p.seconds == seconds)
        .map(|p| p.label)
}

/// Render a cadence in the coarsest unit not exceeding it, flooring.
///
/// `90` → `"1m"`, `90_000` → `"1d"`, `1_209_600` → `"2w"`.
pub fn format_cadence(seconds: u64) -> String {
    match seconds {
        s if s < MINUTE => format!("{s}s"),
        s if s < HOUR => format!("{}m", s / MINUTE),
        s if s < DAY => format!("{}h", s / HOUR),
        s if s < WEEK => format!("{}d", s / DAY),
        s => format!("{}w", s / WEEK),
    }
}

/// The cadence as a chrono duration, saturating on absurd values.
pub fn cadence_duration(cadence_secs: u64) -> Duration {
    i64::try_from(cadence_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// Instant at which the next completion is due.
pub fn next_expected_completion(last_completed_at: DateTime<Utc>, cadence_secs: u64) -> DateTime<Utc> {
    last_completed_at
        .checked_add_signed(cadence_duration(cadence_secs))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whether a living habit has passed its due instant. Dead habits are never overdue.
pub fn is_overdue(
    now: DateTime<Utc>,
    last_completed_at: DateTime<Utc>,
    cadence_secs: u64,
    is_dead: bool,
) -> bool {
    !is_dead && now > next_expected_completion(last_completed_at, cadence_secs)
}
