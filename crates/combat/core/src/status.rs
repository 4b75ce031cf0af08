//! Combat status flags.
//!
//! Flags are independent boolean conditions kept in a bitset. Round-scoped
//! flags are consumed when they take effect: [`StatusFlags::consume`] removes
//! the flag and reports whether it was present.

use bitflags::bitflags;

bitflags! {
    /// Conditions currently affecting a combatant.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct StatusFlags: u16 {
        /// Next attack is skipped.
        const INTERRUPTED  = 1 << 0;
        const ROOTED       = 1 << 1;
        const STUNNED      = 1 << 2;
        /// Limited to a single attack for the next round.
        const SLOWED       = 1 << 3;
        const SILENCED     = 1 << 4;
        const DISARMED     = 1 << 5;
        const BLINDED      = 1 << 6;
        const CONFUSED     = 1 << 7;
        /// Attacks as if one level higher.
        const ADVANTAGE    = 1 << 8;
        /// Attacks as if one level lower.
        const DISADVANTAGE = 1 << 9;
        /// Easier to hit in melee, harder at range.
        const PRONE        = 1 << 10;
    }
}

impl StatusFlags {
    /// Removes `flag` and returns whether it was set.
    pub fn consume(&mut self, flag: StatusFlags) -> bool {
        let present = self.contains(flag);
        self.remove(flag);
        present
    }

    /// Net level shift from advantage/disadvantage: +1, -1, or 0 when
    /// neither or both are present.
    pub fn attack_level_modifier(&self) -> i32 {
        let advantage = i32::from(self.contains(Self::ADVANTAGE));
        let disadvantage = i32::from(self.contains(Self::DISADVANTAGE));
        advantage - disadvantage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_reports_and_clears() {
        let mut flags = StatusFlags::INTERRUPTED | StatusFlags::ROOTED;
        assert!(flags.consume(StatusFlags::INTERRUPTED));
        assert!(!flags.consume(StatusFlags::INTERRUPTED));
        assert_eq!(flags, StatusFlags::ROOTED);
    }

    #[test]
    fn advantage_and_disadvantage_cancel() {
        assert_eq!(StatusFlags::empty().attack_level_modifier(), 0);
        assert_eq!(StatusFlags::ADVANTAGE.attack_level_modifier(), 1);
        assert_eq!(StatusFlags::DISADVANTAGE.attack_level_modifier(), -1);
        let both = StatusFlags::ADVANTAGE | StatusFlags::DISADVANTAGE;
        assert_eq!(both.attack_level_modifier(), 0);
    }
}
