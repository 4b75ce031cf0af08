//! Actor oracle implementing [`combat_core::ActorOracle`].

use std::collections::HashMap;

use parking_lot::RwLock;

use combat_core::{ActorOracle, CharacterId, Participant};

/// Persistent character data kept by [`InMemoryActors`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharacterRecord {
    /// Current class level; `None` for characters without a class.
    pub class_level: Option<u32>,
    pub experience: u32,
    pub autoflee: u8,
}

/// In-memory character store.
///
/// Levels are reached every [`InMemoryActors::XP_PER_LEVEL`] points of
/// cumulative experience.
#[derive(Debug, Default)]
pub struct InMemoryActors {
    characters: RwLock<HashMap<CharacterId, CharacterRecord>>,
    hit_points: RwLock<HashMap<Participant, i32>>,
}

impl InMemoryActors {
    pub const XP_PER_LEVEL: u32 = 1_000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a character at `class_level` with no experience.
    pub fn register(&self, character: CharacterId, class_level: u32) {
        let experience = class_level.saturating_sub(1) * Self::XP_PER_LEVEL;
        self.characters.write().insert(
            character,
            CharacterRecord {
                class_level: Some(class_level),
                experience,
                autoflee: 0,
            },
        );
    }

    pub fn set_autoflee(&self, character: CharacterId, percent: u8) {
        self.characters.write().entry(character).or_default().autoflee = percent.min(100);
    }

    pub fn record(&self, character: CharacterId) -> Option<CharacterRecord> {
        self.characters.read().get(&character).copied()
    }

    /// Last HP written back for `participant`.
    pub fn hp(&self, participant: Participant) -> Option<i32> {
        self.hit_points.read().get(&participant).copied()
    }
}

impl ActorOracle for InMemoryActors {
    fn class_level(&self, character: CharacterId) -> Option<u32> {
        self.characters
            .read()
            .get(&character)
            .and_then(|record| record.class_level)
    }

    fn sync_hp(&self, participant: Participant, hp: i32) {
        self.hit_points.write().insert(participant, hp);
    }

    fn autoflee(&self, character: CharacterId) -> u8 {
        self.characters
            .read()
            .get(&character)
            .map_or(0, |record| record.autoflee)
    }

    fn award_experience(&self, character: CharacterId, amount: u32) -> Option<u32> {
        let mut characters = self.characters.write();
        let record = characters.get_mut(&character)?;
        let level = record.class_level?;
        record.experience = record.experience.saturating_add(amount);

        let reached = record.experience / Self::XP_PER_LEVEL + 1;
        if reached > level {
            record.class_level = Some(reached);
            Some(reached)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_levels_up_at_thresholds() {
        let actors = InMemoryActors::new();
        let hero = CharacterId(1);
        actors.register(hero, 2);

        assert_eq!(actors.award_experience(hero, 999), None);
        assert_eq!(actors.award_experience(hero, 1), Some(3));
        assert_eq!(actors.class_level(hero), Some(3));
        assert_eq!(actors.record(hero).map(|r| r.experience), Some(2_000));
    }

    #[test]
    fn classless_characters_gain_nothing() {
        let actors = InMemoryActors::new();
        actors.set_autoflee(CharacterId(4), 30);
        assert_eq!(actors.autoflee(CharacterId(4)), 30);
        assert_eq!(actors.class_level(CharacterId(4)), None);
        assert_eq!(actors.award_experience(CharacterId(4), 100), None);
    }

    #[test]
    fn hp_writes_are_kept_per_participant() {
        let actors = InMemoryActors::new();
        let hero = Participant::Player(CharacterId(1));
        actors.sync_hp(hero, 12);
        actors.sync_hp(hero, 7);
        assert_eq!(actors.hp(hero), Some(7));
    }
}
