//! Runtime implementations of the combat oracles.
//!
//! The in-memory stores stand in for the server's database; an embedding
//! server passes its own implementations to [`OracleManager::new`]. The
//! manager bundles them so the runtime can build a [`CombatEnv`] on demand.
mod actors;
mod equipment;
mod skills;

use std::fmt;
use std::sync::Arc;

use combat_core::{ActorOracle, CombatEnv, EquipmentOracle, PcgRng, RngOracle, SkillOracle};

pub use actors::{CharacterRecord, InMemoryActors};
pub use equipment::{InMemoryEquipment, Loadout};
pub use skills::InMemorySkills;

/// Manages all oracle implementations and provides unified access
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) skills: Arc<dyn SkillOracle>,
    pub(crate) equipment: Arc<dyn EquipmentOracle>,
    pub(crate) actors: Arc<dyn ActorOracle>,
    pub(crate) rng: Arc<dyn RngOracle>,
}

impl OracleManager {
    /// Creates a new oracle manager rolling with [`PcgRng`]
    pub fn new(
        skills: Arc<dyn SkillOracle>,
        equipment: Arc<dyn EquipmentOracle>,
        actors: Arc<dyn ActorOracle>,
    ) -> Self {
        Self {
            skills,
            equipment,
            actors,
            rng: Arc::new(PcgRng),
        }
    }

    /// Replaces the dice source, e.g. with a scripted one in tests.
    #[must_use]
    pub fn with_rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = rng;
        self
    }

    /// Borrows the oracles the turn engine needs
    pub fn as_env(&self) -> CombatEnv<'_> {
        CombatEnv::new(
            self.skills.as_ref(),
            self.equipment.as_ref(),
            self.rng.as_ref(),
        )
    }

    pub fn skills(&self) -> &dyn SkillOracle {
        self.skills.as_ref()
    }

    pub fn equipment(&self) -> &dyn EquipmentOracle {
        self.equipment.as_ref()
    }

    pub fn actors(&self) -> &dyn ActorOracle {
        self.actors.as_ref()
    }

    pub fn rng(&self) -> &dyn RngOracle {
        self.rng.as_ref()
    }
}

impl Default for OracleManager {
    /// In-memory stores with the standard skill catalog.
    fn default() -> Self {
        Self::new(
            Arc::new(InMemorySkills::standard()),
            Arc::new(InMemoryEquipment::new()),
            Arc::new(InMemoryActors::new()),
        )
    }
}

impl fmt::Debug for OracleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleManager").finish_non_exhaustive()
    }
}
