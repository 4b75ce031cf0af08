//! Turn engine.
//!
//! [`process_combat_tick`] advances one encounter as far as the clock allows:
//! it opens a new round once the previous one is complete and its duration has
//! elapsed, then resolves every pending turn in initiative order.
mod targeting;

use std::cmp::Reverse;
use std::sync::Arc;

pub use targeting::{RandomTarget, TargetSelector, TargetingPolicy, WeakestTarget};

use crate::combat::Combat;
use crate::command::{BasicAttackCommand, CombatCommand};
use crate::env::CombatEnv;
use crate::events::CombatEvent;
use crate::multi_attack::additional_attacks;
use crate::narration::{describe_result, slain_message};
use crate::result::CombatResult;
use crate::types::{CombatantId, Timestamp};

/// Advances `combat` to `now`. Returns the number of turns resolved.
///
/// Stops early once a single alliance is left standing; ending the encounter
/// is left to the caller.
pub fn process_combat_tick(
    combat: &mut Combat,
    env: &CombatEnv<'_>,
    policy: &TargetingPolicy,
    now: Timestamp,
) -> usize {
    if !combat.is_active() {
        return 0;
    }
    combat.observe(now);

    if combat.is_round_complete() && combat.is_time_for_next_round(now) {
        combat.start_new_round(env.rng(), now);
    }

    let mut turns = 0;
    while !combat.is_round_complete() {
        let Some(actor) = combat.current_turn() else {
            break;
        };
        let ready = combat
            .combatant(actor)
            .is_some_and(|c| !c.has_acted_this_round() && c.is_alive() && c.is_active());

        if ready {
            process_turn(combat, env, policy, actor);
            if let Some(combatant) = combat.combatant_mut(actor) {
                combatant.set_acted_this_round(true);
            }
            turns += 1;
            if combat.should_end() {
                break;
            }
        }

        if !combat.advance_turn() {
            break;
        }
    }
    turns
}

/// Resolves one combatant's turn. Returns the primary result, or `None` if
/// the combatant had nothing to do.
pub fn process_turn(
    combat: &mut Combat,
    env: &CombatEnv<'_>,
    policy: &TargetingPolicy,
    actor: CombatantId,
) -> Option<CombatResult> {
    if !combat.combatant(actor)?.is_alive() || !combat.has_valid_target(actor) {
        return None;
    }
    let basic = BasicAttackCommand::from_config(combat.config());

    let command: Arc<dyn CombatCommand> = if combat.combatant(actor)?.is_player() {
        combat
            .combatant_mut(actor)?
            .poll_next_command()
            .unwrap_or_else(|| Arc::new(basic) as Arc<dyn CombatCommand>)
    } else {
        choose_npc_command(combat, actor, basic)
    };
    combat
        .combatant_mut(actor)?
        .set_current_command(Some(Arc::clone(&command)));

    let target = if command.requires_target() {
        let selector = policy.selector_for(combat.combatant(actor)?);
        selector
            .select(combat, env, actor, command.as_ref())
            .or_else(|| combat.random_command_target(env.rng(), actor, command.as_ref()))?
    } else {
        actor
    };

    let result = command.execute(combat, env, actor, target);
    record(combat, actor, target, result.clone());

    let attacker_standing = combat.combatant(actor).is_some_and(|c| c.is_alive());
    if command.grants_multi_attack() && attacker_standing && !combat.should_end() {
        process_extra_attacks(combat, env, &basic, actor, target);
    }

    Some(result)
}

/// The usable queued command with the highest AI priority, or the basic
/// attack if nothing queued outranks it. Ties go to the earlier queued
/// command.
fn choose_npc_command(
    combat: &mut Combat,
    actor: CombatantId,
    basic: BasicAttackCommand,
) -> Arc<dyn CombatCommand> {
    let fallback: Arc<dyn CombatCommand> = Arc::new(basic);
    let view: &Combat = combat;
    let floor = fallback.ai_priority(view, actor);
    let best = view.combatant(actor).and_then(|npc| {
        npc.queued_commands()
            .enumerate()
            .filter(|(_, command)| command.can_use(view, actor))
            .map(|(index, command)| (command.ai_priority(view, actor), Reverse(index)))
            .max()
    });
    match best {
        Some((priority, Reverse(index))) if priority >= floor => combat
            .combatant_mut(actor)
            .and_then(|npc| npc.remove_queued_command(index))
            .unwrap_or(fallback),
        _ => fallback,
    }
}

/// Chained attacks first, then any ripostes earned since the last turn.
fn process_extra_attacks(
    combat: &mut Combat,
    env: &CombatEnv<'_>,
    basic: &BasicAttackCommand,
    actor: CombatantId,
    first_target: CombatantId,
) {
    let Some(roll) = combat.with_combatant_dice(actor, |c, dice| additional_attacks(env, dice, c))
    else {
        return;
    };
    for growth in roll.growth.iter().cloned() {
        combat.push_event(CombatEvent::SkillImproved {
            combatant: actor,
            growth,
        });
    }

    for opportunity in roll.triggered() {
        let Some(target) = next_target(combat, env, actor, Some(first_target)) else {
            return;
        };
        let result =
            basic.execute_with_penalty(combat, env, actor, target, opportunity.level_penalty);
        record(combat, actor, target, result);
    }

    // Ripostes earned during a slowed round are lost, not deferred.
    let ripostes = combat.combatant_mut(actor).map_or(0, |c| {
        let earned = c.take_riposte_attacks();
        if c.is_slowed() { 0 } else { earned }
    });
    for _ in 0..ripostes {
        let Some(target) = next_target(combat, env, actor, None) else {
            return;
        };
        let result = basic.execute_with_penalty(combat, env, actor, target, 0);
        record(combat, actor, target, result);
    }
}

/// `preferred` if it is still standing, otherwise a random hostile. `None`
/// once the attacker is down or the fight is decided.
fn next_target(
    combat: &mut Combat,
    env: &CombatEnv<'_>,
    actor: CombatantId,
    preferred: Option<CombatantId>,
) -> Option<CombatantId> {
    let attacker_standing = combat.combatant(actor).is_some_and(|c| c.is_alive());
    if !attacker_standing || combat.should_end() {
        return None;
    }
    let preferred = preferred.filter(|id| {
        combat
            .combatant(*id)
            .is_some_and(|c| c.is_alive() && c.is_active())
    });
    preferred.or_else(|| combat.random_target(env.rng(), actor))
}

/// Stores, narrates and publishes a result, then handles a resulting death.
fn record(combat: &mut Combat, actor: CombatantId, target: CombatantId, result: CombatResult) {
    if let Some(attacker) = combat.combatant_mut(actor) {
        attacker.decrement_attacks_remaining();
    }
    if let Some(line) = describe_result(&result) {
        combat.log(line);
    }
    let lethal = result.is_death();
    combat.add_round_result(result.clone());
    combat.push_event(CombatEvent::Resolved(result));

    let target_down = combat
        .combatant(target)
        .is_some_and(|c| c.is_active() && !c.is_alive());
    if lethal || target_down {
        handle_death(combat, target, actor);
    }
}

fn handle_death(combat: &mut Combat, victim: CombatantId, killer: CombatantId) {
    let Some(killer_name) = combat.combatant(killer).map(|c| c.name().to_owned()) else {
        return;
    };
    let Some(victim) = combat.combatant_mut(victim) else {
        return;
    };
    if !victim.is_active() {
        return;
    }
    victim.set_active(false);
    let line = slain_message(victim.name(), &killer_name);
    let victim = victim.id();
    combat.log(line);
    combat.push_event(CombatEvent::Slain { victim, killer });
}
