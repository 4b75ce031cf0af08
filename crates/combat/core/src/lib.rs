//! Deterministic combat rules for a round-based text game.
//!
//! `combat-core` owns the encounter model ([`Combat`], [`Combatant`]), the
//! attack pipeline ([`BasicAttackCommand`]), the accuracy and damage formulas
//! and the turn engine. It performs no I/O: skills, equipment and dice come in
//! through the oracles bundled in [`CombatEnv`], and everything that happened
//! during a tick is queued as [`CombatEvent`]s for the caller to drain.
pub mod actor;
pub mod calculator;
pub mod combat;
pub mod combatant;
pub mod command;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
pub mod multi_attack;
pub mod narration;
pub mod progression;
pub mod result;
pub mod status;
pub mod types;

#[cfg(test)]
mod test_support;

pub use actor::{Actor, ActorSheet, CoreStats, Npc, PlayerCharacter};
pub use combat::{Combat, CombatState, LogEntry};
pub use combatant::Combatant;
pub use command::{BasicAttackCommand, CombatCommand};
pub use config::CombatConfig;
pub use engine::{
    RandomTarget, TargetSelector, TargetingPolicy, WeakestTarget, process_combat_tick,
    process_turn,
};
pub use env::{
    ActorOracle, ArmorCategory, CombatEnv, Dice, EquipmentOracle, PcgRng, ProgressionCurve,
    RngOracle, SequenceRng, SkillDefinition, SkillOracle, WeaponCategory, WeaponFamily,
    compute_seed, increase_proficiency,
};
pub use error::{CombatError, ErrorSeverity};
pub use events::CombatEvent;
pub use multi_attack::{AttackOpportunities, AttackOpportunity, MultiAttackRoll};
pub use progression::SkillGrowth;
pub use result::{CombatResult, ResultKind, ResultParty};
pub use status::StatusFlags;
pub use types::{
    Alliance, CharacterId, CombatId, CombatantId, LocationId, NpcId, Participant, SkillId,
    Timestamp,
};
