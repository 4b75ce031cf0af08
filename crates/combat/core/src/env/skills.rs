//! Skill catalog and per-character proficiency access.

use crate::config::CombatConfig;
use crate::types::{CharacterId, SkillId};

/// How quickly a skill improves with use.
///
/// Each curve pairs a base gain chance (percent) with a scaling factor that
/// shrinks the chance as proficiency rises.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProgressionCurve {
    /// Learned at full strength; never improves.
    Instant,
    Trivial,
    Easy,
    #[default]
    Normal,
    Hard,
    VeryHard,
    Legendary,
}

impl ProgressionCurve {
    /// Base gain chance in percent.
    pub const fn base_chance(self) -> u32 {
        match self {
            Self::Instant => 0,
            Self::Trivial => 50,
            Self::Easy => 35,
            Self::Normal => 25,
            Self::Hard => 15,
            Self::VeryHard => 10,
            Self::Legendary => 5,
        }
    }

    pub const fn scaling(self) -> f64 {
        match self {
            Self::Instant => 0.0,
            Self::Trivial => 0.3,
            Self::Easy => 0.25,
            Self::Normal => 0.2,
            Self::Hard => 0.15,
            Self::VeryHard => 0.1,
            Self::Legendary => 0.05,
        }
    }

    pub const fn is_instant(self) -> bool {
        matches!(self, Self::Instant)
    }

    /// Percent chance (0-100) that one use raises proficiency by a point.
    ///
    /// Zero for instant skills and mastered skills; otherwise at least 1.
    pub fn gain_chance(self, proficiency: u8) -> u32 {
        if self.is_instant() || proficiency >= CombatConfig::MAX_PROFICIENCY {
            return 0;
        }
        let progress = f64::from(proficiency) / 100.0;
        let factor = (1.0 - progress * self.scaling() * 10.0).max(0.1);
        let chance = (f64::from(self.base_chance()) * factor).round() as u32;
        chance.max(1)
    }
}

/// Static skill catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub id: SkillId,
    /// Lookup key, e.g. `skill_swords`.
    pub key: String,
    /// Display name used in narration.
    pub name: String,
    pub progression: ProgressionCurve,
}

/// Read/write access to character skills.
///
/// Implementations provide their own thread-safety; the combat core treats
/// every call as a synchronous single-row lookup or update.
pub trait SkillOracle: Send + Sync {
    fn definition(&self, skill: SkillId) -> Option<SkillDefinition>;

    fn definition_by_key(&self, key: &str) -> Option<SkillDefinition>;

    /// Proficiency percent, or `None` if the character never learned the skill.
    fn proficiency(&self, character: CharacterId, skill: SkillId) -> Option<u8>;

    /// Teaches a skill at its starting proficiency. Returns false if the
    /// skill could not be taught.
    fn learn(&self, character: CharacterId, skill: SkillId) -> bool;

    /// Overwrites proficiency. Returns false if the character lacks the skill.
    fn set_proficiency(&self, character: CharacterId, skill: SkillId, value: u8) -> bool;
}

/// Raises a learned skill by `amount`, capped at 100.
///
/// Returns the new proficiency, or `None` if the skill is unknown or the
/// write failed.
pub fn increase_proficiency(
    skills: &dyn SkillOracle,
    character: CharacterId,
    skill: SkillId,
    amount: u8,
) -> Option<u8> {
    let current = skills.proficiency(character, skill)?;
    let next = current
        .saturating_add(amount)
        .min(CombatConfig::MAX_PROFICIENCY);
    skills
        .set_proficiency(character, skill, next)
        .then_some(next)
}
