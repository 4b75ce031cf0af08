//! Use-based skill growth.
//!
//! A skill improves by one point when a d100 roll lands at or under the
//! curve's gain chance. Failing at something teaches more than succeeding:
//! failed uses get two chances to improve.

use crate::env::{CombatEnv, Dice, increase_proficiency};
use crate::types::{CharacterId, CombatantId, SkillId};

/// A proficiency point gained through use.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillGrowth {
    pub character: CharacterId,
    pub skill: SkillId,
    pub skill_name: String,
    pub old_proficiency: u8,
    pub new_proficiency: u8,
}

impl SkillGrowth {
    /// Player-facing announcement, e.g. `Your Kick has improved! (50% -> 51%)`.
    pub fn message(&self) -> String {
        format!(
            "Your {} has improved! ({}% -> {}%)",
            self.skill_name, self.old_proficiency, self.new_proficiency
        )
    }
}

/// Rolls the growth check for one use of `skill`.
///
/// Returns `None` when the character lacks the skill, the skill cannot grow,
/// or the rolls fail.
pub fn check_growth(
    env: &CombatEnv<'_>,
    dice: &mut Dice,
    roller: CombatantId,
    character: CharacterId,
    skill: SkillId,
    succeeded: bool,
) -> Option<SkillGrowth> {
    let attempts = if succeeded { 1 } else { 2 };
    roll_growth(env, dice, roller, character, skill, attempts)
}

/// Single-roll improvement attempt, used for reactive skills.
pub fn try_improve(
    env: &CombatEnv<'_>,
    dice: &mut Dice,
    roller: CombatantId,
    character: CharacterId,
    skill: SkillId,
) -> Option<SkillGrowth> {
    roll_growth(env, dice, roller, character, skill, 1)
}

fn roll_growth(
    env: &CombatEnv<'_>,
    dice: &mut Dice,
    roller: CombatantId,
    character: CharacterId,
    skill: SkillId,
    attempts: u32,
) -> Option<SkillGrowth> {
    let skills = env.skills();
    let definition = skills.definition(skill)?;
    let current = skills.proficiency(character, skill)?;

    let chance = definition.progression.gain_chance(current);
    if chance == 0 {
        return None;
    }

    let passed = (0..attempts).all(|_| dice.d100(env.rng(), roller) <= chance);
    if !passed {
        return None;
    }

    let new_proficiency = increase_proficiency(skills, character, skill, 1)?;
    Some(SkillGrowth {
        character,
        skill,
        skill_name: definition.name,
        old_proficiency: current,
        new_proficiency,
    })
}
