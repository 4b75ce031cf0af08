//! Character progression and persistence hooks.

use crate::types::{CharacterId, Participant};

/// Access to the persistent side of a combat participant.
///
/// The turn engine never calls this oracle; the encounter manager uses it to
/// write HP back, award experience, and read per-character settings.
pub trait ActorOracle: Send + Sync {
    /// Level of the character's current class, if any.
    fn class_level(&self, character: CharacterId) -> Option<u32>;

    /// Persists current HP after it changed in combat.
    fn sync_hp(&self, participant: Participant, hp: i32);

    /// Autoflee threshold in percent of max HP (0 disables).
    fn autoflee(&self, character: CharacterId) -> u8;

    /// Adds experience to the character's current class. Returns the new
    /// level if the award caused a level-up.
    fn award_experience(&self, character: CharacterId, amount: u32) -> Option<u32>;
}
