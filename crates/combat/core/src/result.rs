//! Outcome of one combat action.

use crate::combatant::Combatant;
use crate::types::CombatantId;

/// Classification of a resolved action.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ResultKind {
    Hit,
    Miss,
    CriticalHit,
    GlancingBlow,
    Blocked,
    Parried,
    Dodged,
    Interrupted,
    Heal,
    Buff,
    Debuff,
    Death,
    Flee,
    Error,
}

/// Identity snapshot of a combatant named in a result.
///
/// Results outlive turns (they are kept in the round history and shipped over
/// the event bus), so they hold the id and name rather than the combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultParty {
    pub id: CombatantId,
    pub name: String,
}

impl From<&Combatant> for ResultParty {
    fn from(combatant: &Combatant) -> Self {
        Self {
            id: combatant.id(),
            name: combatant.name().to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatResult {
    kind: ResultKind,
    success: bool,
    damage: i32,
    healing: i32,
    attacker: Option<ResultParty>,
    target: Option<ResultParty>,
    attack_roll: i32,
    damage_roll: i32,
    attacker_message: Option<String>,
    target_message: Option<String>,
    room_message: Option<String>,
    effects: Vec<String>,
}

impl CombatResult {
    fn new(
        kind: ResultKind,
        success: bool,
        attacker: Option<&Combatant>,
        target: Option<&Combatant>,
    ) -> Self {
        Self {
            kind,
            success,
            damage: 0,
            healing: 0,
            attacker: attacker.map(ResultParty::from),
            target: target.map(ResultParty::from),
            attack_roll: 0,
            damage_roll: 0,
            attacker_message: None,
            target_message: None,
            room_message: None,
            effects: Vec::new(),
        }
    }

    // ========================================================================
    // Factories
    // ========================================================================

    pub fn hit(attacker: &Combatant, target: &Combatant, damage: i32) -> Self {
        Self {
            damage,
            ..Self::new(ResultKind::Hit, true, Some(attacker), Some(target))
        }
    }

    pub fn critical_hit(attacker: &Combatant, target: &Combatant, damage: i32) -> Self {
        Self {
            damage,
            ..Self::new(ResultKind::CriticalHit, true, Some(attacker), Some(target))
        }
    }

    pub fn miss(attacker: &Combatant, target: &Combatant) -> Self {
        Self::new(ResultKind::Miss, false, Some(attacker), Some(target))
    }

    pub fn blocked(attacker: &Combatant, target: &Combatant) -> Self {
        Self::new(ResultKind::Blocked, false, Some(attacker), Some(target))
    }

    pub fn dodged(attacker: &Combatant, target: &Combatant) -> Self {
        Self::new(ResultKind::Dodged, false, Some(attacker), Some(target))
    }

    pub fn parried(attacker: &Combatant, target: &Combatant) -> Self {
        Self::new(ResultKind::Parried, false, Some(attacker), Some(target))
    }

    pub fn heal(healer: &Combatant, target: &Combatant, amount: i32) -> Self {
        Self {
            healing: amount,
            ..Self::new(ResultKind::Heal, true, Some(healer), Some(target))
        }
    }

    /// Killing blow. `damage` is the final hit that dropped the target.
    pub fn death(killer: &Combatant, victim: &Combatant, damage: i32) -> Self {
        Self {
            damage,
            ..Self::new(ResultKind::Death, true, Some(killer), Some(victim))
        }
    }

    pub fn flee(fleer: &Combatant) -> Self {
        Self::new(ResultKind::Flee, true, Some(fleer), None)
    }

    pub fn interrupted(attacker: &Combatant) -> Self {
        let name = attacker.name();
        Self {
            attacker_message: Some(format!("{name} is interrupted and cannot attack!")),
            room_message: Some(format!("{name}'s attack is interrupted!")),
            ..Self::new(ResultKind::Interrupted, false, Some(attacker), None)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            attacker_message: Some(message.into()),
            ..Self::new(ResultKind::Error, false, None, None)
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }

    pub fn healing(&self) -> i32 {
        self.healing
    }

    pub fn attacker(&self) -> Option<&ResultParty> {
        self.attacker.as_ref()
    }

    pub fn target(&self) -> Option<&ResultParty> {
        self.target.as_ref()
    }

    pub fn attack_roll(&self) -> i32 {
        self.attack_roll
    }

    pub fn damage_roll(&self) -> i32 {
        self.damage_roll
    }

    pub fn attacker_message(&self) -> Option<&str> {
        self.attacker_message.as_deref()
    }

    pub fn target_message(&self) -> Option<&str> {
        self.target_message.as_deref()
    }

    pub fn room_message(&self) -> Option<&str> {
        self.room_message.as_deref()
    }

    pub fn effects(&self) -> &[String] {
        &self.effects
    }

    pub fn add_effect(&mut self, effect: impl Into<String>) {
        self.effects.push(effect.into());
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    pub fn is_hit(&self) -> bool {
        matches!(self.kind, ResultKind::Hit | ResultKind::CriticalHit)
    }

    pub fn is_miss(&self) -> bool {
        matches!(
            self.kind,
            ResultKind::Miss | ResultKind::Dodged | ResultKind::Blocked | ResultKind::Parried
        )
    }

    pub fn is_death(&self) -> bool {
        self.kind == ResultKind::Death
    }

    pub fn is_error(&self) -> bool {
        self.kind == ResultKind::Error
    }

    /// True for results that dealt damage (hits and killing blows).
    pub fn dealt_damage(&self) -> bool {
        self.is_hit() || self.is_death()
    }

    // ========================================================================
    // Setters
    // ========================================================================

    pub fn set_attack_roll(&mut self, roll: i32) {
        self.attack_roll = roll;
    }

    pub fn set_damage_roll(&mut self, roll: i32) {
        self.damage_roll = roll;
    }

    pub fn set_attacker_message(&mut self, message: impl Into<String>) {
        self.attacker_message = Some(message.into());
    }

    pub fn set_target_message(&mut self, message: impl Into<String>) {
        self.target_message = Some(message.into());
    }

    pub fn set_room_message(&mut self, message: impl Into<String>) {
        self.room_message = Some(message.into());
    }
}
