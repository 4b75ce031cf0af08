//! The default weapon attack and its resolution pipeline.

use crate::actor::Actor;
use crate::calculator::{
    full_attack_bonus, full_damage_multiplier, is_using_ranged_weapon, opposed_check,
};
use crate::combat::Combat;
use crate::combatant::Combatant;
use crate::config::CombatConfig;
use crate::env::CombatEnv;
use crate::events::CombatEvent;
use crate::progression::try_improve;
use crate::result::CombatResult;
use crate::types::{CombatantId, SkillId, Timestamp};

use super::CombatCommand;

/// Melee or ranged swing with whatever is in the main hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BasicAttackCommand {
    cooldown_ms: u64,
    parry_cooldown_ms: u64,
    unarmed_die: u32,
    crit_threshold: i32,
    crit_multiplier: f64,
}

/// Numbers fixed before the attack roll.
struct Swing {
    ranged: bool,
    stat_bonus: i32,
    attack_bonus: i32,
    crit_threshold: i32,
    target_armor: i32,
}

impl BasicAttackCommand {
    pub const NAME: &'static str = "attack";
    pub const PARRY_SKILL: SkillId = SkillId(13);
    pub const RIPOSTE_SKILL: SkillId = SkillId(14);

    pub fn new() -> Self {
        Self::from_config(&CombatConfig::default())
    }

    pub fn from_config(config: &CombatConfig) -> Self {
        Self {
            cooldown_ms: config.attack_cooldown_ms,
            parry_cooldown_ms: config.parry_cooldown_ms,
            unarmed_die: config.unarmed_die,
            crit_threshold: config.crit_threshold,
            crit_multiplier: config.crit_multiplier,
        }
    }

    /// Resolves one attack made `level_penalty` levels below the attacker's
    /// own level. Extra attacks in a chain pass their tier penalty here.
    pub fn execute_with_penalty(
        &self,
        combat: &mut Combat,
        env: &CombatEnv<'_>,
        user: CombatantId,
        target: CombatantId,
        level_penalty: i32,
    ) -> CombatResult {
        let now = combat.now();

        let Some(attacker) = combat.combatant_mut(user) else {
            return CombatResult::error("Invalid attacker");
        };
        if attacker.consume_interrupted() {
            self.apply_cooldown(attacker, now);
            return CombatResult::interrupted(attacker);
        }

        let swing = match self.prepare(combat, env, user, target, level_penalty) {
            Ok(swing) => swing,
            Err(result) => return result,
        };

        let roll = combat.dice_mut().d20(env.rng(), user) as i32;
        let total = roll + swing.attack_bonus;
        let critical = roll >= swing.crit_threshold;

        if roll == 1 || (!critical && total < swing.target_armor) {
            return self.finish_without_damage(combat, user, target, roll, now, CombatResult::miss);
        }

        if self.attempt_parry(combat, env, user, target, now) {
            return self.finish_without_damage(
                combat,
                user,
                target,
                roll,
                now,
                CombatResult::parried,
            );
        }

        let (base_damage, damage) = self.roll_damage(combat, env, user, target, &swing, critical);

        let (Some(attacker), Some(defender)) = (combat.combatant(user), combat.combatant(target))
        else {
            return CombatResult::error("Invalid target");
        };
        let killed = defender.hp() - damage <= 0;
        let mut result = match (killed, critical) {
            (true, _) => CombatResult::death(attacker, defender, damage),
            (false, true) => CombatResult::critical_hit(attacker, defender, damage),
            (false, false) => CombatResult::hit(attacker, defender, damage),
        };
        result.set_attack_roll(roll);
        result.set_damage_roll(base_damage);
        if swing.ranged {
            result.add_effect("ranged");
        }

        if let Some(defender) = combat.combatant_mut(target) {
            defender.apply_damage(damage);
        }
        if let Some(attacker) = combat.combatant_mut(user) {
            self.apply_cooldown(attacker, now);
        }
        result
    }

    /// Steps 2-6: target validation and the attack-roll bonus.
    fn prepare(
        &self,
        combat: &Combat,
        env: &CombatEnv<'_>,
        user: CombatantId,
        target: CombatantId,
        level_penalty: i32,
    ) -> Result<Swing, CombatResult> {
        let (Some(attacker), Some(defender)) = (combat.combatant(user), combat.combatant(target))
        else {
            return Err(CombatResult::error("Invalid target"));
        };
        if !defender.is_alive() || !defender.is_active() {
            return Err(CombatResult::error("Invalid target"));
        }
        if !attacker.is_hostile_to(defender) {
            return Err(CombatResult::error("Cannot attack an ally"));
        }

        let ranged = is_using_ranged_weapon(env, attacker);
        let stats = attacker.actor().stats();
        let stat_bonus = if ranged { stats.dex_mod() } else { stats.str_mod() };

        let prone_modifier = match (defender.is_prone(), ranged) {
            (false, _) => 0,
            (true, false) => 1,
            (true, true) => -1,
        };
        let effective_penalty = level_penalty - attacker.attack_level_modifier() - prone_modifier;

        let attack_bonus = stat_bonus
            + full_attack_bonus(attacker, defender, effective_penalty)
            + attacker.actor().sheet().attack_hit_bonus;
        let crit_threshold = (self.crit_threshold + attacker.crit_threshold_bonus())
            .max(CombatConfig::MIN_CRIT_THRESHOLD);

        Ok(Swing {
            ranged,
            stat_bonus,
            attack_bonus,
            crit_threshold,
            target_armor: defender.armor(),
        })
    }

    /// Steps 10-12. Returns the base die roll and the final damage.
    fn roll_damage(
        &self,
        combat: &mut Combat,
        env: &CombatEnv<'_>,
        user: CombatantId,
        target: CombatantId,
        swing: &Swing,
        critical: bool,
    ) -> (i32, i32) {
        let (Some(attacker), Some(defender)) = (combat.combatant(user), combat.combatant(target))
        else {
            return (0, 1);
        };
        let multiplier = full_damage_multiplier(env, attacker, defender);
        let flat_bonus = swing.stat_bonus + attacker.actor().sheet().attack_damage_bonus;
        let reduction = defender.actor().sheet().attack_damage_reduction;
        let (die, die_bonus) = match attacker.actor() {
            Actor::Npc(npc) if npc.base_damage_die > 0 => (npc.base_damage_die, npc.damage_bonus),
            _ => (self.unarmed_die, 0),
        };

        let base = combat.dice_mut().roll(env.rng(), user, die) as i32 + die_bonus;
        let multiplied = (f64::from(flat_bonus) * multiplier).round() as i32;
        let mut total = (base + multiplied).max(1);

        if critical {
            total = (f64::from(total) * self.crit_multiplier) as i32;
        }
        if reduction > 0 {
            total = (total - reduction).max(0);
        }
        (base, total.max(1))
    }

    /// Parry and, if it lands, the riposte check. Returns true on a parry.
    fn attempt_parry(
        &self,
        combat: &mut Combat,
        env: &CombatEnv<'_>,
        user: CombatantId,
        target: CombatantId,
        now: Timestamp,
    ) -> bool {
        let (Some(attacker), Some(defender)) = (combat.combatant(user), combat.combatant(target))
        else {
            return false;
        };
        let Some(character) = defender.character_id() else {
            return false;
        };
        if defender.is_parry_on_cooldown(now) {
            return false;
        }
        let Some(parry) = env.skills().proficiency(character, Self::PARRY_SKILL) else {
            return false;
        };
        let (defender_level, attacker_level) = (defender.level(), attacker.level());

        if !opposed_check(
            env,
            combat.dice_mut(),
            target,
            defender_level,
            attacker_level,
            parry,
        ) {
            return false;
        }
        if let Some(defender) = combat.combatant_mut(target) {
            defender.set_parry_cooldown_until(now + self.parry_cooldown_ms);
        }

        let Some(riposte) = env.skills().proficiency(character, Self::RIPOSTE_SKILL) else {
            return true;
        };
        if opposed_check(
            env,
            combat.dice_mut(),
            target,
            defender_level,
            attacker_level,
            riposte,
        ) {
            if let Some(defender) = combat.combatant_mut(target) {
                defender.add_riposte_attack();
            }
            if let Some(growth) =
                try_improve(env, combat.dice_mut(), target, character, Self::RIPOSTE_SKILL)
            {
                combat.push_event(CombatEvent::SkillImproved {
                    combatant: target,
                    growth,
                });
            }
        }
        true
    }

    fn finish_without_damage(
        &self,
        combat: &mut Combat,
        user: CombatantId,
        target: CombatantId,
        roll: i32,
        now: Timestamp,
        make: fn(&Combatant, &Combatant) -> CombatResult,
    ) -> CombatResult {
        if let Some(attacker) = combat.combatant_mut(user) {
            self.apply_cooldown(attacker, now);
        }
        let (Some(attacker), Some(defender)) = (combat.combatant(user), combat.combatant(target))
        else {
            return CombatResult::error("Invalid target");
        };
        let mut result = make(attacker, defender);
        result.set_attack_roll(roll);
        result
    }

    /// Stamps both the ability cooldown and the shared global cooldown.
    fn apply_cooldown(&self, attacker: &mut Combatant, now: Timestamp) {
        let until = now + self.cooldown_ms;
        attacker.set_ability_cooldown(Self::NAME, until);
        attacker.set_global_cooldown_until(until);
    }
}

impl Default for BasicAttackCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatCommand for BasicAttackCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Attack"
    }

    fn description(&self) -> &str {
        "A basic attack with your equipped weapon."
    }

    fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    fn can_use(&self, combat: &Combat, user: CombatantId) -> bool {
        let Some(combatant) = combat.combatant(user) else {
            return false;
        };
        combatant.ability_cooldown(Self::NAME) <= combat.now()
            && combatant.is_alive()
            && combatant.is_active()
            && combat.has_valid_target(user)
    }

    fn execute(
        &self,
        combat: &mut Combat,
        env: &CombatEnv<'_>,
        user: CombatantId,
        target: CombatantId,
    ) -> CombatResult {
        self.execute_with_penalty(combat, env, user, target, 0)
    }

    fn ai_priority(&self, _combat: &Combat, _user: CombatantId) -> i32 {
        10
    }

    fn grants_multi_attack(&self) -> bool {
        true
    }
}
