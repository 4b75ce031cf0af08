//! Engine events produced while an encounter advances.
//!
//! The core never performs I/O. Everything that happened during a tick is
//! queued on the [`crate::Combat`] as a [`CombatEvent`] and drained by the
//! caller, which narrates it and applies side effects that need persistence.

use crate::progression::SkillGrowth;
use crate::result::CombatResult;
use crate::types::CombatantId;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    RoundStarted {
        round: u32,
    },

    /// An action resolved. Emitted for every executed command, including
    /// extra attacks and ripostes.
    Resolved(CombatResult),

    /// `victim` dropped to zero HP. Emitted after the killing `Resolved`.
    Slain {
        victim: CombatantId,
        killer: CombatantId,
    },

    SkillImproved {
        combatant: CombatantId,
        growth: SkillGrowth,
    },
}

impl CombatEvent {
    pub fn result(&self) -> Option<&CombatResult> {
        match self {
            Self::Resolved(result) => Some(result),
            _ => None,
        }
    }
}
