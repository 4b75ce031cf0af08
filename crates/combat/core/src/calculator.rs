//! Level and skill based combat formulas.
//!
//! Accuracy comes from the level gap between attacker and defender. Damage
//! bonuses are scaled by how the attacker's weapon skills compare to the
//! defender's. NPCs have no skill records; their skills are derived from level.

use crate::combatant::Combatant;
use crate::config::CombatConfig;
use crate::env::{CombatEnv, Dice, WeaponFamily};
use crate::types::CombatantId;

/// Family and category skill of a combatant, each a proportion in `[0.01, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatSkills {
    pub family: f64,
    pub category: f64,
}

impl CombatSkills {
    pub const UNTRAINED: Self = Self {
        family: CombatConfig::MIN_SKILL,
        category: CombatConfig::MIN_SKILL,
    };
}

/// Attack-roll bonus from the level gap.
///
/// Positive bonuses are capped at the attacker's level; penalties are not.
pub fn level_attack_bonus(attacker_level: i32, defender_level: i32) -> i32 {
    let raw = (attacker_level - defender_level) * 2;
    if raw > 0 { raw.min(attacker_level) } else { raw }
}

/// Ratio of attacker to defender skills, applied to bonus damage.
pub fn damage_multiplier(
    attacker_family: f64,
    defender_family: f64,
    attacker_category: f64,
    defender_category: f64,
) -> f64 {
    let family_ratio = attacker_family / defender_family.max(CombatConfig::MIN_SKILL);
    let category_ratio = attacker_category / defender_category.max(CombatConfig::MIN_SKILL);
    family_ratio * category_ratio
}

pub fn mob_category_skill(level: i32) -> f64 {
    (f64::from(level) * 0.02).min(1.0)
}

pub fn mob_family_skill(level: i32) -> f64 {
    (f64::from(level) * 0.1).min(1.0)
}

/// Weapon family in the combatant's main hand. NPCs never report one.
pub fn equipped_weapon_family(env: &CombatEnv<'_>, combatant: &Combatant) -> Option<WeaponFamily> {
    let character = combatant.character_id()?;
    env.equipment().main_hand(character)
}

pub fn is_using_ranged_weapon(env: &CombatEnv<'_>, combatant: &Combatant) -> bool {
    equipped_weapon_family(env, combatant).is_some_and(WeaponFamily::is_ranged)
}

/// Skill proportions used by [`full_damage_multiplier`].
///
/// Players read the proficiency of their main-hand family and category skills;
/// anything missing falls back to the minimum.
pub fn combat_skills(env: &CombatEnv<'_>, combatant: &Combatant) -> CombatSkills {
    let Some(character) = combatant.character_id() else {
        let level = combatant.level();
        return CombatSkills {
            family: mob_family_skill(level),
            category: mob_category_skill(level),
        };
    };
    let Some(family) = env.equipment().main_hand(character) else {
        return CombatSkills::UNTRAINED;
    };

    let skill_proportion = |key: &str| {
        env.skills()
            .definition_by_key(key)
            .and_then(|definition| env.skills().proficiency(character, definition.id))
            .map(|proficiency| (f64::from(proficiency) / 100.0).max(CombatConfig::MIN_SKILL))
            .unwrap_or(CombatConfig::MIN_SKILL)
    };

    CombatSkills {
        family: skill_proportion(family.skill_key()),
        category: skill_proportion(family.category().skill_key()),
    }
}

/// Level bonus for an attack made at `level_penalty` below the attacker's
/// level. The effective level never drops below 1.
pub fn full_attack_bonus(attacker: &Combatant, defender: &Combatant, level_penalty: i32) -> i32 {
    let attacker_level = (attacker.level() - level_penalty).max(1);
    level_attack_bonus(attacker_level, defender.level())
}

pub fn full_damage_multiplier(
    env: &CombatEnv<'_>,
    attacker: &Combatant,
    defender: &Combatant,
) -> f64 {
    let attack = combat_skills(env, attacker);
    let defense = combat_skills(env, defender);
    damage_multiplier(attack.family, defense.family, attack.category, defense.category)
}

/// Probability in `[0, 1]` that an opposed check succeeds.
///
/// Each level of advantage moves a 50% baseline by 12.5 points, saturating
/// four levels out. Proficiency then scales the chance linearly from 0.5x at
/// 0% to 1.5x at 100%.
pub fn opposed_check_chance(attacker_level: i32, defender_level: i32, proficiency: u8) -> f64 {
    let gap = f64::from(attacker_level - defender_level);
    let base = (0.5 + 0.125 * gap).clamp(0.0, 1.0);
    let factor = 0.5 + f64::from(proficiency) / 100.0;
    (base * factor).clamp(0.0, 1.0)
}

/// Rolls a d100 against [`opposed_check_chance`].
pub fn opposed_check(
    env: &CombatEnv<'_>,
    dice: &mut Dice,
    roller: CombatantId,
    attacker_level: i32,
    defender_level: i32,
    proficiency: u8,
) -> bool {
    let chance = opposed_check_chance(attacker_level, defender_level, proficiency);
    let roll = dice.d100(env.rng(), roller);
    f64::from(roll) <= chance * 100.0
}
