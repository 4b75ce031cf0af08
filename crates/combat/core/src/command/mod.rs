//! Actions a combatant can take on its turn.
//!
//! Commands are queued on a [`crate::Combatant`] as `Arc<dyn CombatCommand>`
//! and executed by the turn engine against the owning [`Combat`].
mod basic_attack;

use std::fmt;

pub use basic_attack::BasicAttackCommand;

use crate::combat::Combat;
use crate::env::CombatEnv;
use crate::result::CombatResult;
use crate::types::{CombatantId, Timestamp};

/// A combat action.
///
/// Commands hold no per-use state. Everything they change lives on the
/// encounter, so one instance can be shared between combatants.
pub trait CombatCommand: Send + Sync + fmt::Debug {
    /// Stable key, also used to track the ability cooldown.
    fn name(&self) -> &'static str;

    fn display_name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn cooldown_ms(&self) -> u64;

    /// Whether `user` may run this command right now.
    fn can_use(&self, combat: &Combat, user: CombatantId) -> bool;

    /// Resolves the command. Invalid targets produce an error result and
    /// leave the encounter untouched.
    fn execute(
        &self,
        combat: &mut Combat,
        env: &CombatEnv<'_>,
        user: CombatantId,
        target: CombatantId,
    ) -> CombatResult;

    /// When the command comes off cooldown for `user`.
    fn cooldown_end(&self, combat: &Combat, user: CombatantId) -> Timestamp {
        combat
            .combatant(user)
            .map(|c| c.ability_cooldown(self.name()))
            .unwrap_or(Timestamp::ZERO)
    }

    fn requires_target(&self) -> bool {
        true
    }

    fn can_target_ally(&self) -> bool {
        false
    }

    fn can_target_enemy(&self) -> bool {
        true
    }

    fn can_target_self(&self) -> bool {
        false
    }

    /// Weight used by NPC command selection; higher wins.
    fn ai_priority(&self, _combat: &Combat, _user: CombatantId) -> i32 {
        0
    }

    /// Whether a turn spent on this command may chain extra attacks.
    fn grants_multi_attack(&self) -> bool {
        false
    }
}
