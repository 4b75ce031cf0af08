//! Side effects of combat that reach outside the encounter: experience and
//! weapon training on kills, armor training, HP write-back and autoflee.
use combat_core::{
    CharacterId, Combat, CombatConfig, CombatResult, CombatantId, Participant, increase_proficiency,
};

use crate::api::{FleeHandler, NarrationSink};
use crate::oracle::OracleManager;

/// Experience for a kill: 100 halved for every level the killer's
/// effective level exceeds the victim's, doubled for every level below.
pub fn experience_for_kill(killer_level: u32, victim_level: i32) -> u32 {
    let level = i64::from(killer_level);
    let effective = level + level / 10;
    let difference = (effective - i64::from(victim_level)).clamp(-10, 10) as i32;
    let xp = (100.0 / 2f64.powi(difference)).round() as u32;
    xp.max(1)
}

/// Percent chance that a survived fight trains an armor skill.
///
/// The first `2 * class_level` points are guaranteed; every point past that
/// halves the chance.
pub fn armor_training_chance(proficiency: u8, class_level: u32) -> u32 {
    let exponent = (i64::from(proficiency) - i64::from(class_level) * 2).clamp(0, 63) as i32;
    (100.0 / 2f64.powi(exponent)).round() as u32
}

/// Borrowed collaborators for one upkeep pass.
pub(super) struct Upkeep<'a> {
    pub oracles: &'a OracleManager,
    pub sink: &'a dyn NarrationSink,
}

impl Upkeep<'_> {
    fn tell(&self, character: CharacterId, message: &str) {
        self.sink
            .send_to_participant(Participant::Player(character), message);
    }

    fn class_level(&self, character: CharacterId) -> u32 {
        self.oracles
            .actors()
            .class_level(character)
            .unwrap_or(1)
            .max(1)
    }

    /// Damage landed on `target`: charge worn armor and persist HP.
    pub fn on_damage(&self, combat: &mut Combat, target: CombatantId, damage: i32) {
        let Some(combatant) = combat.combatant_mut(target) else {
            return;
        };
        let Some(character) = combatant.character_id() else {
            return;
        };
        for category in self.oracles.equipment().worn_armor(character) {
            combatant.record_armor_damage(category, damage);
        }
        self.oracles
            .actors()
            .sync_hp(combatant.participant(), combatant.hp());
    }

    /// A player killed an NPC: award experience, then weapon practice.
    pub fn on_kill(&self, combat: &Combat, killer: CombatantId, victim: CombatantId) {
        let (Some(killer), Some(victim)) = (combat.combatant(killer), combat.combatant(victim))
        else {
            return;
        };
        let Some(character) = killer.character_id() else {
            return;
        };
        if !victim.is_npc() {
            return;
        }

        let actors = self.oracles.actors();
        if let Some(level) = actors.class_level(character) {
            let xp = experience_for_kill(level, victim.level());
            let promoted = actors.award_experience(character, xp);
            self.tell(character, &format!("You gain {xp} experience."));
            if let Some(level) = promoted {
                self.tell(character, &format!("You have reached level {level}!"));
            }
        }

        self.train_weapon(character);
    }

    fn train_weapon(&self, character: CharacterId) {
        let skills = self.oracles.skills();
        let Some(family) = self.oracles.equipment().main_hand(character) else {
            return;
        };
        let Some(skill) = skills.definition_by_key(family.skill_key()) else {
            tracing::warn!(key = family.skill_key(), "weapon skill missing from catalog");
            return;
        };

        if skills.proficiency(character, skill.id).is_none() {
            if !skills.learn(character, skill.id) {
                return;
            }
            self.tell(character, &format!("You have learned {}!", skill.name));
        }
        let Some(current) = skills.proficiency(character, skill.id) else {
            return;
        };

        let cap = (self.class_level(character).saturating_mul(10))
            .min(u32::from(CombatConfig::MAX_PROFICIENCY));
        if u32::from(current) >= cap {
            return;
        }
        if let Some(value) = increase_proficiency(skills, character, skill.id, 1) {
            self.tell(
                character,
                &format!("Your {} skill improves! ({value}%)", skill.name),
            );
        }
    }

    /// End-of-fight armor training for every player, then counter reset.
    pub fn train_armor(&self, combat: &mut Combat) {
        let skills = self.oracles.skills();
        let rng = self.oracles.rng();
        let players: Vec<CombatantId> = combat
            .combatants()
            .filter(|c| c.is_player())
            .map(|c| c.id())
            .collect();

        for id in players {
            let Some((character, hp_max, counters)) = combat.combatant(id).and_then(|c| {
                Some((c.character_id()?, c.hp_max(), c.armor_damage_counters().clone()))
            }) else {
                continue;
            };
            let level = self.class_level(character);

            for (category, taken) in counters {
                if hp_max <= 0 || taken < hp_max {
                    continue;
                }
                let Some(skill) = skills.definition_by_key(category.skill_key()) else {
                    continue;
                };
                let Some(current) = skills.proficiency(character, skill.id) else {
                    continue;
                };
                if current >= CombatConfig::MAX_PROFICIENCY {
                    continue;
                }
                let roll = combat.dice_mut().d100(rng, id);
                if roll > armor_training_chance(current, level) {
                    continue;
                }
                if let Some(value) = increase_proficiency(skills, character, skill.id, 1) {
                    self.tell(
                        character,
                        &format!("Your {} skill improves! ({value}%)", skill.name),
                    );
                }
            }

            if let Some(combatant) = combat.combatant_mut(id) {
                combatant.reset_armor_damage();
            }
        }
    }

    pub fn sync_player_hp(&self, combat: &Combat) {
        let actors = self.oracles.actors();
        for combatant in combat.combatants().filter(|c| c.is_player()) {
            actors.sync_hp(combatant.participant(), combatant.hp());
        }
    }

    /// Round-end panic check. Returns everyone who left the fight.
    pub fn autoflee(&self, combat: &mut Combat, flee: &dyn FleeHandler) -> Vec<Participant> {
        let location = combat.location();
        let actors = self.oracles.actors();
        let panicking: Vec<(CombatantId, Participant, String)> = combat
            .active_combatants()
            .filter_map(|c| {
                let threshold = match c.character_id() {
                    Some(character) => actors.autoflee(character),
                    None => c.actor().sheet().autoflee,
                };
                c.should_autoflee(threshold)
                    .then(|| (c.id(), c.participant(), c.name().to_owned()))
            })
            .collect();

        let mut fled = Vec::new();
        for (id, participant, name) in panicking {
            if !flee.attempt_flee(participant, location) {
                if !participant.is_player() {
                    self.sink.broadcast_to_location(
                        location,
                        &format!("{name} panics but has nowhere to run!"),
                    );
                }
                continue;
            }

            match participant {
                Participant::Player(_) => self
                    .sink
                    .send_to_participant(participant, "Panic overwhelms you and you flee!"),
                Participant::Npc(_) => self
                    .sink
                    .broadcast_to_location(location, &format!("{name} flees in terror!")),
            }
            if let Some(combatant) = combat.combatant(id) {
                if combatant.is_player() {
                    actors.sync_hp(participant, combatant.hp());
                }
                let result = CombatResult::flee(combatant);
                combat.add_round_result(result);
            }
            if combat.remove_combatant(id).is_ok() {
                fled.push(participant);
            }
        }
        fled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_halves_per_level_of_advantage() {
        assert_eq!(experience_for_kill(5, 5), 100);
        assert_eq!(experience_for_kill(5, 4), 50);
        assert_eq!(experience_for_kill(5, 7), 400);
        // Level 10 counts as 11 against a level 5 foe: 100 / 64 rounds to 2.
        assert_eq!(experience_for_kill(10, 5), 2);
        assert_eq!(experience_for_kill(40, 1), 1);
        assert_eq!(experience_for_kill(1, 30), 102_400);
    }

    #[test]
    fn armor_training_chance_decays_past_the_free_points() {
        assert_eq!(armor_training_chance(7, 4), 100);
        assert_eq!(armor_training_chance(8, 4), 100);
        assert_eq!(armor_training_chance(9, 4), 50);
        assert_eq!(armor_training_chance(10, 4), 25);
        assert_eq!(armor_training_chance(99, 1), 0);
    }
}
