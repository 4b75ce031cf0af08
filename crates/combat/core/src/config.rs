/// Combat configuration constants and tunable parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Minimum wall time a round lasts before the next one may start.
    pub round_duration_ms: u64,
    /// Cooldown applied by a basic attack (also stamped as the global cooldown).
    pub attack_cooldown_ms: u64,
    /// Cooldown applied to a defender after a successful parry.
    pub parry_cooldown_ms: u64,
    /// Die rolled for unarmed damage.
    pub unarmed_die: u32,
    /// Natural d20 roll needed for a critical hit before bonuses.
    pub crit_threshold: i32,
    /// Damage multiplier for critical hits.
    pub crit_multiplier: f64,
    /// Maximum number of lines kept in an encounter's combat log.
    pub log_capacity: usize,
}

impl CombatConfig {
    // ===== compile-time constants =====
    /// Upper bound of additional attacks a single turn can grant (2nd..4th).
    pub const MAX_ADDITIONAL_ATTACKS: usize = 3;
    /// Proficiency is a percentage.
    pub const MAX_PROFICIENCY: u8 = 100;
    /// Lowest skill proportion used by the damage multiplier.
    pub const MIN_SKILL: f64 = 0.01;
    /// Lowest critical threshold; a natural 1 can never crit.
    pub const MIN_CRIT_THRESHOLD: i32 = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ROUND_DURATION_MS: u64 = 3_000;
    pub const DEFAULT_ATTACK_COOLDOWN_MS: u64 = 2_000;
    pub const DEFAULT_PARRY_COOLDOWN_MS: u64 = 15_000;
    pub const DEFAULT_UNARMED_DIE: u32 = 4;
    pub const DEFAULT_CRIT_THRESHOLD: i32 = 20;
    pub const DEFAULT_CRIT_MULTIPLIER: f64 = 2.0;
    pub const DEFAULT_LOG_CAPACITY: usize = 500;

    pub fn new() -> Self {
        Self {
            round_duration_ms: Self::DEFAULT_ROUND_DURATION_MS,
            attack_cooldown_ms: Self::DEFAULT_ATTACK_COOLDOWN_MS,
            parry_cooldown_ms: Self::DEFAULT_PARRY_COOLDOWN_MS,
            unarmed_die: Self::DEFAULT_UNARMED_DIE,
            crit_threshold: Self::DEFAULT_CRIT_THRESHOLD,
            crit_multiplier: Self::DEFAULT_CRIT_MULTIPLIER,
            log_capacity: Self::DEFAULT_LOG_CAPACITY,
        }
    }

    pub fn with_round_duration(round_duration_ms: u64) -> Self {
        Self {
            round_duration_ms,
            ..Self::new()
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
