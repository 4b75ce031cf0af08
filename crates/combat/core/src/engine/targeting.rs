//! Target selection strategies.

use std::fmt;

use crate::combat::Combat;
use crate::combatant::Combatant;
use crate::command::CombatCommand;
use crate::env::CombatEnv;
use crate::types::CombatantId;

/// Picks the target of a command about to be executed.
pub trait TargetSelector: Send + Sync + fmt::Debug {
    fn select(
        &self,
        combat: &mut Combat,
        env: &CombatEnv<'_>,
        actor: CombatantId,
        command: &dyn CombatCommand,
    ) -> Option<CombatantId>;
}

/// Uniformly random target among those the command may be aimed at.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomTarget;

impl TargetSelector for RandomTarget {
    fn select(
        &self,
        combat: &mut Combat,
        env: &CombatEnv<'_>,
        actor: CombatantId,
        command: &dyn CombatCommand,
    ) -> Option<CombatantId> {
        combat.random_command_target(env.rng(), actor, command)
    }
}

/// Eligible target with the fewest hit points; ties go to the lower id.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeakestTarget;

impl TargetSelector for WeakestTarget {
    fn select(
        &self,
        combat: &mut Combat,
        _env: &CombatEnv<'_>,
        actor: CombatantId,
        command: &dyn CombatCommand,
    ) -> Option<CombatantId> {
        combat
            .command_targets(actor, command)
            .into_iter()
            .filter_map(|id| combat.combatant(id))
            .min_by_key(|c| (c.hp(), c.id()))
            .map(Combatant::id)
    }
}

/// Target selection per actor kind.
#[derive(Debug)]
pub struct TargetingPolicy {
    players: Box<dyn TargetSelector>,
    npcs: Box<dyn TargetSelector>,
}

impl TargetingPolicy {
    pub fn new(players: Box<dyn TargetSelector>, npcs: Box<dyn TargetSelector>) -> Self {
        Self { players, npcs }
    }

    pub fn selector_for(&self, combatant: &Combatant) -> &dyn TargetSelector {
        if combatant.is_player() {
            self.players.as_ref()
        } else {
            self.npcs.as_ref()
        }
    }
}

impl Default for TargetingPolicy {
    fn default() -> Self {
        Self::new(Box::new(RandomTarget), Box::new(RandomTarget))
    }
}
