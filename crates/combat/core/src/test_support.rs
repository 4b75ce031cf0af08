//! Oracles and fixtures shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::actor::{Actor, ActorSheet, Npc, PlayerCharacter};
use crate::env::{
    ArmorCategory, EquipmentOracle, ProgressionCurve, SkillDefinition, SkillOracle, WeaponFamily,
};
use crate::types::{CharacterId, NpcId, SkillId};

/// Minimal skill store.
#[derive(Default)]
pub(crate) struct TestSkills {
    pub definitions: Vec<SkillDefinition>,
    pub known: Mutex<HashMap<(CharacterId, SkillId), u8>>,
}

impl TestSkills {
    pub(crate) fn with_skill(mut self, id: u32, key: &str, curve: ProgressionCurve) -> Self {
        self.definitions.push(SkillDefinition {
            id: SkillId(id),
            key: key.to_owned(),
            name: key.replace('_', " "),
            progression: curve,
        });
        self
    }

    pub(crate) fn teach(self, character: CharacterId, skill: u32, value: u8) -> Self {
        self.known
            .lock()
            .unwrap()
            .insert((character, SkillId(skill)), value);
        self
    }

    pub(crate) fn value(&self, character: CharacterId, skill: u32) -> Option<u8> {
        self.proficiency(character, SkillId(skill))
    }
}

impl SkillOracle for TestSkills {
    fn definition(&self, skill: SkillId) -> Option<SkillDefinition> {
        self.definitions.iter().find(|d| d.id == skill).cloned()
    }

    fn definition_by_key(&self, key: &str) -> Option<SkillDefinition> {
        self.definitions.iter().find(|d| d.key == key).cloned()
    }

    fn proficiency(&self, character: CharacterId, skill: SkillId) -> Option<u8> {
        self.known.lock().unwrap().get(&(character, skill)).copied()
    }

    fn learn(&self, character: CharacterId, skill: SkillId) -> bool {
        self.known
            .lock()
            .unwrap()
            .entry((character, skill))
            .or_insert(1);
        true
    }

    fn set_proficiency(&self, character: CharacterId, skill: SkillId, value: u8) -> bool {
        match self.known.lock().unwrap().get_mut(&(character, skill)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

/// Everyone fights unarmed and unarmored unless configured otherwise.
#[derive(Default)]
pub(crate) struct TestEquipment {
    pub main_hand: HashMap<CharacterId, WeaponFamily>,
}

impl TestEquipment {
    pub(crate) fn wielding(mut self, character: CharacterId, family: WeaponFamily) -> Self {
        self.main_hand.insert(character, family);
        self
    }
}

impl EquipmentOracle for TestEquipment {
    fn main_hand(&self, character: CharacterId) -> Option<WeaponFamily> {
        self.main_hand.get(&character).copied()
    }

    fn worn_armor(&self, _character: CharacterId) -> Vec<ArmorCategory> {
        Vec::new()
    }
}

pub(crate) fn player(id: u32, name: &str, level: i32, hp: i32) -> Actor {
    Actor::Player(PlayerCharacter::new(
        CharacterId(id),
        ActorSheet::new(name, level, hp),
    ))
}

pub(crate) fn npc(id: u64, name: &str, level: i32, hp: i32) -> Actor {
    Actor::Npc(Npc::new(NpcId(id), ActorSheet::new(name, level, hp)))
}
