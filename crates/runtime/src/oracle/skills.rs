//! Skill oracle implementing [`combat_core::SkillOracle`].

use std::collections::HashMap;

use parking_lot::RwLock;
use strum::IntoEnumIterator;

use combat_core::multi_attack::{FOURTH_ATTACK_SKILL, SECOND_ATTACK_SKILL, THIRD_ATTACK_SKILL};
use combat_core::{
    ArmorCategory, BasicAttackCommand, CharacterId, CombatConfig, ProgressionCurve,
    SkillDefinition, SkillId, SkillOracle, WeaponFamily,
};

/// Skill catalog plus per-character proficiency.
#[derive(Debug, Default)]
pub struct InMemorySkills {
    catalog: Vec<SkillDefinition>,
    proficiency: RwLock<HashMap<(CharacterId, SkillId), u8>>,
}

impl InMemorySkills {
    /// Proficiency granted by [`SkillOracle::learn`] for non-instant skills.
    pub const STARTING_PROFICIENCY: u8 = 1;

    pub const WEAPON_SKILL_BASE: u32 = 100;
    pub const ARMOR_SKILL_BASE: u32 = 200;

    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every combat skill the rules look up: parry, riposte,
    /// the extra-attack tiers, one skill per weapon family and one per armor
    /// category.
    pub fn standard() -> Self {
        let mut skills = Self::new()
            .with_definition(definition(
                BasicAttackCommand::PARRY_SKILL,
                "parry",
                "Parry",
                ProgressionCurve::Hard,
            ))
            .with_definition(definition(
                BasicAttackCommand::RIPOSTE_SKILL,
                "riposte",
                "Riposte",
                ProgressionCurve::VeryHard,
            ))
            .with_definition(definition(
                SECOND_ATTACK_SKILL,
                "second_attack",
                "Second Attack",
                ProgressionCurve::Normal,
            ))
            .with_definition(definition(
                THIRD_ATTACK_SKILL,
                "third_attack",
                "Third Attack",
                ProgressionCurve::Hard,
            ))
            .with_definition(definition(
                FOURTH_ATTACK_SKILL,
                "fourth_attack",
                "Fourth Attack",
                ProgressionCurve::VeryHard,
            ));

        for (offset, family) in (0u32..).zip(WeaponFamily::iter()) {
            skills = skills.with_definition(definition(
                SkillId(Self::WEAPON_SKILL_BASE + offset),
                family.skill_key(),
                &title(family.as_ref()),
                ProgressionCurve::Normal,
            ));
        }
        for (offset, category) in (0u32..).zip(ArmorCategory::iter()) {
            skills = skills.with_definition(definition(
                SkillId(Self::ARMOR_SKILL_BASE + offset),
                category.skill_key(),
                &format!("{} Armor", title(category.as_ref())),
                ProgressionCurve::Normal,
            ));
        }
        skills
    }

    /// Adds or replaces a catalog entry.
    #[must_use]
    pub fn with_definition(mut self, definition: SkillDefinition) -> Self {
        self.catalog.retain(|existing| existing.id != definition.id);
        self.catalog.push(definition);
        self
    }

    /// Sets proficiency directly, learning the skill if needed.
    pub fn teach(&self, character: CharacterId, skill: SkillId, value: u8) {
        self.proficiency
            .write()
            .insert((character, skill), value.min(CombatConfig::MAX_PROFICIENCY));
    }

    pub fn forget(&self, character: CharacterId, skill: SkillId) {
        self.proficiency.write().remove(&(character, skill));
    }
}

impl SkillOracle for InMemorySkills {
    fn definition(&self, skill: SkillId) -> Option<SkillDefinition> {
        self.catalog.iter().find(|def| def.id == skill).cloned()
    }

    fn definition_by_key(&self, key: &str) -> Option<SkillDefinition> {
        self.catalog.iter().find(|def| def.key == key).cloned()
    }

    fn proficiency(&self, character: CharacterId, skill: SkillId) -> Option<u8> {
        self.proficiency.read().get(&(character, skill)).copied()
    }

    fn learn(&self, character: CharacterId, skill: SkillId) -> bool {
        let Some(def) = self.definition(skill) else {
            return false;
        };
        let start = if def.progression.is_instant() {
            CombatConfig::MAX_PROFICIENCY
        } else {
            Self::STARTING_PROFICIENCY
        };
        self.proficiency
            .write()
            .entry((character, skill))
            .or_insert(start);
        true
    }

    fn set_proficiency(&self, character: CharacterId, skill: SkillId, value: u8) -> bool {
        match self.proficiency.write().get_mut(&(character, skill)) {
            Some(current) => {
                *current = value.min(CombatConfig::MAX_PROFICIENCY);
                true
            }
            None => false,
        }
    }
}

fn definition(
    id: SkillId,
    key: &str,
    name: &str,
    progression: ProgressionCurve,
) -> SkillDefinition {
    SkillDefinition {
        id,
        key: key.to_owned(),
        name: name.to_owned(),
        progression,
    }
}

/// `"swords"` -> `"Swords"`.
fn title(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::increase_proficiency;

    #[test]
    fn standard_catalog_covers_weapon_and_armor_keys() {
        let skills = InMemorySkills::standard();
        let swords = skills.definition_by_key("skill_swords").unwrap();
        assert_eq!(swords.name, "Swords");
        let plate = skills.definition_by_key("skill_plate_armor").unwrap();
        assert_eq!(plate.name, "Plate Armor");
        assert_eq!(
            skills.definition(BasicAttackCommand::PARRY_SKILL).map(|d| d.name),
            Some("Parry".to_owned())
        );
    }

    #[test]
    fn learning_starts_low_and_is_idempotent() {
        let skills = InMemorySkills::standard();
        let hero = CharacterId(1);
        assert!(skills.learn(hero, SECOND_ATTACK_SKILL));
        assert_eq!(skills.proficiency(hero, SECOND_ATTACK_SKILL), Some(1));

        skills.teach(hero, SECOND_ATTACK_SKILL, 40);
        assert!(skills.learn(hero, SECOND_ATTACK_SKILL));
        assert_eq!(skills.proficiency(hero, SECOND_ATTACK_SKILL), Some(40));
        assert!(!skills.learn(hero, SkillId(9_999)));
    }

    #[test]
    fn proficiency_caps_at_one_hundred() {
        let skills = InMemorySkills::standard();
        let hero = CharacterId(1);
        assert!(!skills.set_proficiency(hero, THIRD_ATTACK_SKILL, 10));

        skills.teach(hero, THIRD_ATTACK_SKILL, 99);
        assert_eq!(
            increase_proficiency(&skills, hero, THIRD_ATTACK_SKILL, 5),
            Some(100)
        );
        skills.forget(hero, THIRD_ATTACK_SKILL);
        assert_eq!(skills.proficiency(hero, THIRD_ATTACK_SKILL), None);
    }
}
