//! Participants behind combatants.
//!
//! An [`Actor`] is either a player character or an NPC. Both carry an
//! [`ActorSheet`] with the numbers the rules read; the variant decides where
//! level, damage dice and identity come from.

use crate::types::{CharacterId, NpcId, Participant};

/// The six core ability scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoreStats {
    pub str: i32,
    pub dex: i32,
    pub con: i32,
    pub int: i32,
    pub wis: i32,
    pub cha: i32,
}

impl CoreStats {
    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self {
            str,
            dex,
            con,
            int,
            wis,
            cha,
        }
    }

    /// `(score - 10) / 2`, truncated toward zero.
    #[inline]
    pub const fn modifier(score: i32) -> i32 {
        (score - 10) / 2
    }

    pub const fn str_mod(&self) -> i32 {
        Self::modifier(self.str)
    }

    pub const fn dex_mod(&self) -> i32 {
        Self::modifier(self.dex)
    }
}

impl Default for CoreStats {
    /// All scores at 10 (no modifier).
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

/// Combat-relevant numbers shared by players and NPCs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorSheet {
    pub name: String,
    pub level: i32,
    pub stats: CoreStats,
    pub hp: i32,
    pub hp_max: i32,
    pub armor: i32,
    /// Flat bonus added to attack rolls.
    pub attack_hit_bonus: i32,
    /// Flat bonus added to damage before the skill multiplier.
    pub attack_damage_bonus: i32,
    /// Flat reduction applied to incoming hits.
    pub attack_damage_reduction: i32,
    /// Added to the critical threshold; negative values crit more often.
    pub crit_threshold_bonus: i32,
    /// Flee below this percentage of max HP (0 disables).
    pub autoflee: u8,
}

impl ActorSheet {
    pub fn new(name: impl Into<String>, level: i32, hp_max: i32) -> Self {
        Self {
            name: name.into(),
            level,
            stats: CoreStats::default(),
            hp: hp_max,
            hp_max,
            armor: 10,
            attack_hit_bonus: 0,
            attack_damage_bonus: 0,
            attack_damage_reduction: 0,
            crit_threshold_bonus: 0,
            autoflee: 0,
        }
    }

    #[must_use]
    pub fn with_stats(mut self, stats: CoreStats) -> Self {
        self.stats = stats;
        self
    }

    #[must_use]
    pub fn with_armor(mut self, armor: i32) -> Self {
        self.armor = armor;
        self
    }

    #[must_use]
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp;
        self
    }

    #[must_use]
    pub fn with_autoflee(mut self, autoflee: u8) -> Self {
        self.autoflee = autoflee;
        self
    }
}

/// A player character taking part in combat.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerCharacter {
    pub id: CharacterId,
    /// `level` holds the current class level.
    pub sheet: ActorSheet,
}

impl PlayerCharacter {
    pub fn new(id: CharacterId, sheet: ActorSheet) -> Self {
        Self { id, sheet }
    }
}

/// A spawned NPC instance.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Npc {
    pub id: NpcId,
    pub sheet: ActorSheet,
    /// Sides of the template's damage die; 0 falls back to unarmed.
    pub base_damage_die: u32,
    /// Flat bonus added to the template die roll.
    pub damage_bonus: i32,
}

impl Npc {
    pub fn new(id: NpcId, sheet: ActorSheet) -> Self {
        Self {
            id,
            sheet,
            base_damage_die: 0,
            damage_bonus: 0,
        }
    }

    #[must_use]
    pub fn with_damage(mut self, die: u32, bonus: i32) -> Self {
        self.base_damage_die = die;
        self.damage_bonus = bonus;
        self
    }
}

/// Player-or-NPC variant with a uniform capability view.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Actor {
    Player(PlayerCharacter),
    Npc(Npc),
}

impl Actor {
    pub fn sheet(&self) -> &ActorSheet {
        match self {
            Self::Player(player) => &player.sheet,
            Self::Npc(npc) => &npc.sheet,
        }
    }

    pub fn sheet_mut(&mut self) -> &mut ActorSheet {
        match self {
            Self::Player(player) => &mut player.sheet,
            Self::Npc(npc) => &mut npc.sheet,
        }
    }

    pub fn participant(&self) -> Participant {
        match self {
            Self::Player(player) => Participant::Player(player.id),
            Self::Npc(npc) => Participant::Npc(npc.id),
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Self::Player(_))
    }

    pub fn is_npc(&self) -> bool {
        matches!(self, Self::Npc(_))
    }

    pub fn character_id(&self) -> Option<CharacterId> {
        match self {
            Self::Player(player) => Some(player.id),
            Self::Npc(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.sheet().name
    }

    /// Level used by the combat formulas. Players never drop below 1.
    pub fn combat_level(&self) -> i32 {
        match self {
            Self::Player(player) => player.sheet.level.max(1),
            Self::Npc(npc) => npc.sheet.level,
        }
    }

    pub fn stats(&self) -> &CoreStats {
        &self.sheet().stats
    }

    pub fn hp(&self) -> i32 {
        self.sheet().hp
    }

    pub fn hp_max(&self) -> i32 {
        self.sheet().hp_max
    }

    pub fn is_alive(&self) -> bool {
        self.sheet().hp > 0
    }

    pub fn apply_damage(&mut self, amount: i32) {
        let sheet = self.sheet_mut();
        sheet.hp -= amount;
    }

    pub fn heal(&mut self, amount: i32) {
        let sheet = self.sheet_mut();
        sheet.hp += amount;
    }
}
