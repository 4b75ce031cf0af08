//! Equipment oracle implementing [`combat_core::EquipmentOracle`].

use std::collections::HashMap;

use parking_lot::RwLock;

use combat_core::{ArmorCategory, CharacterId, EquipmentOracle, WeaponFamily};

/// What one character has equipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Loadout {
    pub main_hand: Option<WeaponFamily>,
    pub armor: Vec<ArmorCategory>,
}

#[derive(Debug, Default)]
pub struct InMemoryEquipment {
    loadouts: RwLock<HashMap<CharacterId, Loadout>>,
}

impl InMemoryEquipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wield(&self, character: CharacterId, family: WeaponFamily) {
        self.loadouts.write().entry(character).or_default().main_hand = Some(family);
    }

    pub fn unwield(&self, character: CharacterId) {
        if let Some(loadout) = self.loadouts.write().get_mut(&character) {
            loadout.main_hand = None;
        }
    }

    /// Adds an armor category; wearing the same category twice is a no-op.
    pub fn wear(&self, character: CharacterId, category: ArmorCategory) {
        let mut loadouts = self.loadouts.write();
        let armor = &mut loadouts.entry(character).or_default().armor;
        if !armor.contains(&category) {
            armor.push(category);
            armor.sort();
        }
    }

    pub fn loadout(&self, character: CharacterId) -> Loadout {
        self.loadouts
            .read()
            .get(&character)
            .cloned()
            .unwrap_or_default()
    }
}

impl EquipmentOracle for InMemoryEquipment {
    fn main_hand(&self, character: CharacterId) -> Option<WeaponFamily> {
        self.loadouts
            .read()
            .get(&character)
            .and_then(|loadout| loadout.main_hand)
    }

    fn worn_armor(&self, character: CharacterId) -> Vec<ArmorCategory> {
        self.loadout(character).armor
    }
}
