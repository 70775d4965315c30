//! Creature tokens a habit can be drawn as.
//!
//! The core treats the token as opaque; this module only knows the roster
//! and how to pick a stable fallback for records that never chose one.

pub const AVAILABLE_ANIMALS: [&str; 15] = [
    "CluckingChicken",
    "CoralCrab",
    "CroakingToad",
    "DaintyPig",
    "HonkingGoose",
    "LeapingFrog",
    "MadBoar",
    "MeowingCat",
    "PasturingSheep",
    "SlowTurtle",
    "SnowFox",
    "SpikeyPorcupine",
    "StinkySkunk",
    "TimberWolf",
    "TinyChick",
];

pub const DEFAULT_ANIMAL: &str = "CluckingChicken";

pub fn is_known_animal(token: &str) -> bool {
    AVAILABLE_ANIMALS.contains(&token)
}

/// 32-bit shift-and-subtract hash over UTF-16 code units.
///
/// Kept bit-compatible with habits persisted by earlier clients so a
/// habit keeps the same creature after migration.
fn name_hash(name: &str) -> u64 {
    let hash = name
        .encode_utf16()
        .fold(0i32, |h, unit| (h << 5).wrapping_sub(h).wrapping_add(i32::from(unit)));
    i64::from(hash).unsigned_abs()
}

/// Stable animal for a habit name, used when a record carries no animal.
pub fn animal_for_name(name: &str) -> &'static str {
    let index = (name_hash(name) % AVAILABLE_ANIMALS.len() as u64) as usize;
    AVAILABLE_ANIMALS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(name_hash(""), 0);
        assert_eq!(name_hash("a"), 97);
        // 97 * 31 + 98
        assert_eq!(name_hash("ab"), 3_105);
    }

    #[test]
    fn fallback_is_stable_and_on_roster() {
        let first = animal_for_name("Drink water");
        assert_eq!(first, animal_for_name("Drink water"));
        assert!(is_known_animal(first));
        assert_eq!(animal_for_name(""), AVAILABLE_ANIMALS[0]);
    }

    #[test]
    fn long_names_do_not_overflow() {
        let name = "x".repeat(10_000);
        assert!(is_known_animal(animal_for_name(&name)));
    }
}
