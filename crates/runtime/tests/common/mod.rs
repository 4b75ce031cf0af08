//! Shared fixtures for the runtime integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use combat_core::{
    ActorSheet, CharacterId, CombatConfig, LocationId, Npc, NpcId, Participant, PlayerCharacter,
    SequenceRng, Timestamp,
};
use combat_runtime::{
    CombatManager, FleeHandler, InMemoryActors, InMemoryEquipment, InMemorySkills, ManualClock,
    OracleManager, RecordingSink,
};

pub const TAVERN: LocationId = LocationId(100);
pub const ALLEY: LocationId = LocationId(101);

pub const HERO: CharacterId = CharacterId(1);
pub const SIDEKICK: CharacterId = CharacterId(2);

/// Manager wired to in-memory stores, scripted dice and a manual clock.
pub struct Arena {
    pub manager: CombatManager,
    pub sink: Arc<RecordingSink>,
    pub skills: Arc<InMemorySkills>,
    pub equipment: Arc<InMemoryEquipment>,
    pub actors: Arc<InMemoryActors>,
    pub clock: Arc<ManualClock>,
    pub rng: Arc<SequenceRng>,
}

impl Arena {
    /// `rolls` feeds every die; `[19]` makes every roll its maximum face.
    pub fn new(rolls: &[u32]) -> Self {
        Self::with_flee(rolls, None)
    }

    pub fn with_flee(rolls: &[u32], flee: Option<Arc<dyn FleeHandler>>) -> Self {
        let skills = Arc::new(InMemorySkills::standard());
        let equipment = Arc::new(InMemoryEquipment::new());
        let actors = Arc::new(InMemoryActors::new());
        let clock = Arc::new(ManualClock::new(Timestamp::ZERO));
        let rng = Arc::new(SequenceRng::new(rolls.to_vec()));
        let sink = Arc::new(RecordingSink::new());

        let oracles = OracleManager::new(skills.clone(), equipment.clone(), actors.clone())
            .with_rng(rng.clone());
        let mut manager = CombatManager::new(CombatConfig::default(), oracles, sink.clone())
            .with_clock(clock.clone())
            .with_seed(Some(7));
        if let Some(flee) = flee {
            manager = manager.with_flee_handler(flee);
        }

        Self {
            manager,
            sink,
            skills,
            equipment,
            actors,
            clock,
            rng,
        }
    }

    /// Registers a level-5 character with the actor store and returns it.
    pub fn hero(&self, id: CharacterId, name: &str, hp_max: i32) -> PlayerCharacter {
        self.actors.register(id, 5);
        PlayerCharacter::new(id, ActorSheet::new(name, 5, hp_max))
    }
}

pub fn goblin(id: u64, hp_max: i32) -> Npc {
    Npc::new(NpcId(id), ActorSheet::new("a goblin", 5, hp_max))
}

pub fn npc(id: u64, name: &str, hp_max: i32) -> Npc {
    Npc::new(NpcId(id), ActorSheet::new(name, 5, hp_max))
}

pub fn player(id: CharacterId) -> Participant {
    Participant::Player(id)
}

/// Flee handler whose exits are always open. Counts attempts.
#[derive(Debug, Default)]
pub struct OpenDoor {
    pub attempts: AtomicUsize,
}

impl FleeHandler for OpenDoor {
    fn attempt_flee(&self, _participant: Participant, _location: LocationId) -> bool {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        true
    }
}
