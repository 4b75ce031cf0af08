//! Traits describing external combat data.
//!
//! Oracles expose skills, equipment, persistent character data and dice.
//! The [`CombatEnv`] aggregate bundles the ones the turn engine needs so the
//! rules can run without coupling to a concrete storage layer.
mod actors;
mod equipment;
mod rng;
mod skills;

pub use actors::ActorOracle;
pub use equipment::{ArmorCategory, EquipmentOracle, WeaponCategory, WeaponFamily};
pub use rng::{Dice, PcgRng, RngOracle, SequenceRng, compute_seed};
pub use skills::{ProgressionCurve, SkillDefinition, SkillOracle, increase_proficiency};

/// Aggregates the oracles required by the attack pipeline and turn engine.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    skills: &'a dyn SkillOracle,
    equipment: &'a dyn EquipmentOracle,
    rng: &'a dyn RngOracle,
}

impl<'a> CombatEnv<'a> {
    pub fn new(
        skills: &'a dyn SkillOracle,
        equipment: &'a dyn EquipmentOracle,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self {
            skills,
            equipment,
            rng,
        }
    }

    pub fn skills(&self) -> &'a dyn SkillOracle {
        self.skills
    }

    pub fn equipment(&self) -> &'a dyn EquipmentOracle {
        self.equipment
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }
}

impl std::fmt::Debug for CombatEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatEnv").finish_non_exhaustive()
    }
}
