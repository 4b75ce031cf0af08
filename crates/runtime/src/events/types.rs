//! Event types for different topics.

use serde::{Deserialize, Serialize};

use combat_core::{CombatId, CombatResult, LocationId, Participant, SkillGrowth};

/// Encounter lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EncounterEvent {
    /// A new encounter was created and started.
    Started {
        combat: CombatId,
        location: LocationId,
        participants: Vec<Participant>,
    },

    /// A participant entered an encounter that was already running.
    Joined {
        combat: CombatId,
        participant: Participant,
    },

    Ended {
        combat: CombatId,
        location: LocationId,
        rounds: u32,
        survivors: Vec<Participant>,
    },
}

/// Per-turn outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnEvent {
    Resolved {
        combat: CombatId,
        result: CombatResult,
    },

    Slain {
        combat: CombatId,
        victim: Participant,
        killer: Participant,
    },

    Fled {
        combat: CombatId,
        participant: Participant,
    },

    SkillImproved {
        combat: CombatId,
        growth: SkillGrowth,
    },
}
