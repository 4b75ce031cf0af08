//! Extra attacks beyond the guaranteed first one.
//!
//! A turn can chain up to three more attacks (2nd, 3rd, 4th). Each tier is
//! made at a growing level penalty and is only rolled if the tier before it
//! triggered. Players unlock tiers through skills; NPCs through level.

use arrayvec::ArrayVec;

use crate::combatant::Combatant;
use crate::config::CombatConfig;
use crate::env::{CombatEnv, Dice};
use crate::progression::{SkillGrowth, check_growth};
use crate::types::{CharacterId, CombatantId, SkillId};

pub const SECOND_ATTACK_SKILL: SkillId = SkillId(15);
pub const THIRD_ATTACK_SKILL: SkillId = SkillId(16);
pub const FOURTH_ATTACK_SKILL: SkillId = SkillId(17);

pub const SECOND_ATTACK_PENALTY: i32 = 2;
pub const THIRD_ATTACK_PENALTY: i32 = 4;
pub const FOURTH_ATTACK_PENALTY: i32 = 6;

const NPC_THIRD_ATTACK_LEVEL: i32 = 10;
const NPC_FOURTH_ATTACK_LEVEL: i32 = 25;

/// One potential extra attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackOpportunity {
    /// 2, 3 or 4.
    pub ordinal: u8,
    pub level_penalty: i32,
    pub skill: SkillId,
    pub triggered: bool,
}

impl AttackOpportunity {
    const fn second(triggered: bool) -> Self {
        Self {
            ordinal: 2,
            level_penalty: SECOND_ATTACK_PENALTY,
            skill: SECOND_ATTACK_SKILL,
            triggered,
        }
    }

    const fn third(triggered: bool) -> Self {
        Self {
            ordinal: 3,
            level_penalty: THIRD_ATTACK_PENALTY,
            skill: THIRD_ATTACK_SKILL,
            triggered,
        }
    }

    const fn fourth(triggered: bool) -> Self {
        Self {
            ordinal: 4,
            level_penalty: FOURTH_ATTACK_PENALTY,
            skill: FOURTH_ATTACK_SKILL,
            triggered,
        }
    }
}

pub type AttackOpportunities =
    ArrayVec<AttackOpportunity, { CombatConfig::MAX_ADDITIONAL_ATTACKS }>;

/// Opportunities rolled for one turn, plus any skill growth the rolls caused.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiAttackRoll {
    pub opportunities: AttackOpportunities,
    pub growth: Vec<SkillGrowth>,
}

impl MultiAttackRoll {
    pub fn triggered(&self) -> impl Iterator<Item = &AttackOpportunity> {
        triggered_attacks(&self.opportunities)
    }
}

/// Rolls every extra-attack tier the combatant qualifies for.
///
/// Slowed combatants get nothing and nothing is rolled.
pub fn additional_attacks(
    env: &CombatEnv<'_>,
    dice: &mut Dice,
    combatant: &Combatant,
) -> MultiAttackRoll {
    if combatant.is_slowed() {
        return MultiAttackRoll::default();
    }
    match combatant.character_id() {
        Some(character) => player_attacks(env, dice, combatant.id(), character),
        None => npc_attacks(env, dice, combatant),
    }
}

fn player_attacks(
    env: &CombatEnv<'_>,
    dice: &mut Dice,
    roller: CombatantId,
    character: CharacterId,
) -> MultiAttackRoll {
    let mut roll = MultiAttackRoll::default();
    let skills = env.skills();

    let Some(second) = skills.proficiency(character, SECOND_ATTACK_SKILL) else {
        return roll;
    };
    let second_hit = roll_for_attack(env, dice, roller, i32::from(second));
    roll.opportunities.push(AttackOpportunity::second(second_hit));
    roll.growth.extend(check_growth(
        env,
        dice,
        roller,
        character,
        SECOND_ATTACK_SKILL,
        second_hit,
    ));

    let Some(third) = skills.proficiency(character, THIRD_ATTACK_SKILL) else {
        return roll;
    };
    let third_hit = second_hit && roll_for_attack(env, dice, roller, i32::from(third));
    roll.opportunities.push(AttackOpportunity::third(third_hit));
    if second_hit {
        roll.growth.extend(check_growth(
            env,
            dice,
            roller,
            character,
            THIRD_ATTACK_SKILL,
            third_hit,
        ));
    }

    let Some(fourth) = skills.proficiency(character, FOURTH_ATTACK_SKILL) else {
        return roll;
    };
    let fourth_hit = third_hit && roll_for_attack(env, dice, roller, i32::from(fourth));
    roll.opportunities.push(AttackOpportunity::fourth(fourth_hit));
    if third_hit {
        roll.growth.extend(check_growth(
            env,
            dice,
            roller,
            character,
            FOURTH_ATTACK_SKILL,
            fourth_hit,
        ));
    }

    roll
}

fn npc_attacks(env: &CombatEnv<'_>, dice: &mut Dice, combatant: &Combatant) -> MultiAttackRoll {
    let mut roll = MultiAttackRoll::default();
    let roller = combatant.id();
    let level = combatant.level();
    let base = (level * 2).min(100);
    if base <= 0 {
        return roll;
    }

    let second_hit = roll_for_attack(env, dice, roller, base);
    roll.opportunities.push(AttackOpportunity::second(second_hit));
    if level < NPC_THIRD_ATTACK_LEVEL || !second_hit {
        return roll;
    }

    let third_chance = (base - 20).clamp(0, 80);
    let third_hit = roll_for_attack(env, dice, roller, third_chance);
    roll.opportunities.push(AttackOpportunity::third(third_hit));
    if level < NPC_FOURTH_ATTACK_LEVEL || !third_hit {
        return roll;
    }

    let fourth_chance = (base - 50).clamp(0, 50);
    let fourth_hit = roll_for_attack(env, dice, roller, fourth_chance);
    roll.opportunities.push(AttackOpportunity::fourth(fourth_hit));
    roll
}

/// `percent <= 0` never triggers, `percent >= 100` always does; otherwise a
/// d100 roll must land at or under it.
pub fn roll_for_attack(
    env: &CombatEnv<'_>,
    dice: &mut Dice,
    roller: CombatantId,
    percent: i32,
) -> bool {
    if percent <= 0 {
        return false;
    }
    if percent >= 100 {
        return true;
    }
    dice.d100(env.rng(), roller) as i32 <= percent
}

pub fn triggered_attacks(
    opportunities: &[AttackOpportunity],
) -> impl Iterator<Item = &AttackOpportunity> {
    opportunities.iter().filter(|opportunity| opportunity.triggered)
}

/// Guaranteed first attack plus every triggered extra.
pub fn count_total_attacks(opportunities: &[AttackOpportunity]) -> usize {
    1 + triggered_attacks(opportunities).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ProgressionCurve, SequenceRng};
    use crate::status::StatusFlags;
    use crate::test_support::{TestEquipment, TestSkills, npc, player};
    use crate::types::{Alliance, Timestamp};

    const HERO: CharacterId = CharacterId(1);

    fn hero() -> Combatant {
        Combatant::new(
            CombatantId(1),
            player(1, "Ayla", 10, 40),
            Alliance::PLAYERS,
            Timestamp::ZERO,
        )
    }

    fn mob(level: i32) -> Combatant {
        Combatant::new(
            CombatantId(2),
            npc(2, "troll", level, 40),
            Alliance(1),
            Timestamp::ZERO,
        )
    }

    fn multi_skills() -> TestSkills {
        TestSkills::default()
            .with_skill(15, "second_attack", ProgressionCurve::Instant)
            .with_skill(16, "third_attack", ProgressionCurve::Instant)
            .with_skill(17, "fourth_attack", ProgressionCurve::Instant)
    }

    #[test]
    fn player_without_skills_gets_nothing() {
        let skills = multi_skills();
        let equipment = TestEquipment::default();
        let rng = SequenceRng::new(vec![0]);
        let env = CombatEnv::new(&skills, &equipment, &rng);
        let roll = additional_attacks(&env, &mut Dice::new(0), &hero());
        assert!(roll.opportunities.is_empty());
        assert_eq!(count_total_attacks(&roll.opportunities), 1);
    }

    #[test]
    fn player_chain_stops_after_failed_tier() {
        let skills = multi_skills()
            .teach(HERO, 15, 100)
            .teach(HERO, 16, 50)
            .teach(HERO, 17, 100);
        let equipment = TestEquipment::default();
        // Third attack rolls 100 against 50%.
        let rng = SequenceRng::new(vec![99]);
        let env = CombatEnv::new(&skills, &equipment, &rng);
        let roll = additional_attacks(&env, &mut Dice::new(0), &hero());

        let triggered: Vec<bool> = roll.opportunities.iter().map(|o| o.triggered).collect();
        assert_eq!(triggered, vec![true, false, false]);
        assert_eq!(roll.opportunities[2].level_penalty, FOURTH_ATTACK_PENALTY);
        assert_eq!(count_total_attacks(&roll.opportunities), 2);
        assert_eq!(rng.consumed(), 1);
    }

    #[test]
    fn slowed_combatants_roll_nothing() {
        let skills = multi_skills().teach(HERO, 15, 100);
        let equipment = TestEquipment::default();
        let rng = SequenceRng::new(vec![0]);
        let env = CombatEnv::new(&skills, &equipment, &rng);

        let mut slowed = hero();
        slowed.add_status(StatusFlags::SLOWED);
        slowed.reset_for_new_round();
        assert!(additional_attacks(&env, &mut Dice::new(0), &slowed).opportunities.is_empty());

        let mut troll = mob(30);
        troll.add_status(StatusFlags::SLOWED);
        assert!(additional_attacks(&env, &mut Dice::new(0), &troll).opportunities.is_empty());
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn npc_tiers_follow_level() {
        let skills = TestSkills::default();
        let equipment = TestEquipment::default();
        // Every roll is a 1 on d100.
        let rng = SequenceRng::new(vec![0]);
        let env = CombatEnv::new(&skills, &equipment, &rng);

        assert!(additional_attacks(&env, &mut Dice::new(0), &mob(0)).opportunities.is_empty());
        assert_eq!(additional_attacks(&env, &mut Dice::new(0), &mob(5)).opportunities.len(), 1);
        // Level 10 lists the third tier but its chance is zero.
        let at_ten = additional_attacks(&env, &mut Dice::new(0), &mob(10));
        assert_eq!(at_ten.opportunities.len(), 2);
        assert!(!at_ten.opportunities[1].triggered);
        assert_eq!(additional_attacks(&env, &mut Dice::new(0), &mob(11)).opportunities.len(), 2);
        assert_eq!(additional_attacks(&env, &mut Dice::new(0), &mob(26)).opportunities.len(), 3);
    }

    #[test]
    fn roll_for_attack_bounds() {
        let skills = TestSkills::default();
        let equipment = TestEquipment::default();
        let rng = SequenceRng::new(vec![99]);
        let env = CombatEnv::new(&skills, &equipment, &rng);
        let mut dice = Dice::new(0);
        assert!(!roll_for_attack(&env, &mut dice, CombatantId(1), 0));
        assert!(roll_for_attack(&env, &mut dice, CombatantId(1), 100));
        assert_eq!(rng.consumed(), 0);
        assert!(!roll_for_attack(&env, &mut dice, CombatantId(1), 99));
    }
}
