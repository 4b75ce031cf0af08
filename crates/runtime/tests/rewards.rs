//! Side effects that outlive an encounter: experience, training, HP and
//! autoflee. Every scenario rolls maximum faces so the combatant with the
//! lower id acts first and every swing crits.
mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use combat_core::{
    ActorOracle, ArmorCategory, NpcId, Participant, SkillOracle, Timestamp, WeaponFamily,
};
use combat_runtime::{COMBAT_ENDED, Event, FleeHandler, Topic, TurnEvent};

use common::{Arena, HERO, OpenDoor, TAVERN, goblin, player};

const MAX_FACES: &[u32] = &[19];

// ============================================================================
// Kills
// ============================================================================

#[test]
fn kill_awards_experience_and_weapon_practice() {
    let arena = Arena::new(MAX_FACES);
    arena.equipment.wield(HERO, WeaponFamily::Swords);
    let hero = arena.hero(HERO, "Aldric", 40);
    arena.manager.initiate_combat(hero, goblin(7, 1), TAVERN);

    arena.manager.tick_at(Timestamp::ZERO);

    assert_eq!(
        arena.sink.messages_for(player(HERO)),
        vec![
            "You gain 100 experience.".to_owned(),
            "You have learned Swords!".to_owned(),
            "Your Swords skill improves! (2%)".to_owned(),
        ]
    );
    let record = arena.actors.record(HERO).expect("registered");
    assert_eq!(record.experience, 4_100);
    assert_eq!(record.class_level, Some(5));

    let swords = arena
        .skills
        .definition_by_key("skill_swords")
        .expect("standard catalog");
    assert_eq!(arena.skills.proficiency(HERO, swords.id), Some(2));
}

#[test]
fn outleveled_kill_can_promote() {
    let arena = Arena::new(MAX_FACES);
    let hero = arena.hero(HERO, "Aldric", 40);
    // Class level 1 against a level 5 goblin: 100 * 2^4.
    arena.actors.register(HERO, 1);
    arena.manager.initiate_combat(hero, goblin(7, 1), TAVERN);

    arena.manager.tick_at(Timestamp::ZERO);

    let messages = arena.sink.messages_for(player(HERO));
    assert_eq!(messages[0], "You gain 1600 experience.");
    assert_eq!(messages[1], "You have reached level 2!");
    assert_eq!(arena.actors.class_level(HERO), Some(2));
}

#[test]
fn weapon_practice_stops_at_the_level_cap() {
    let arena = Arena::new(MAX_FACES);
    arena.equipment.wield(HERO, WeaponFamily::Swords);
    let swords = arena.skills.definition_by_key("skill_swords").unwrap();
    arena.skills.teach(HERO, swords.id, 50);

    let hero = arena.hero(HERO, "Aldric", 40);
    arena.manager.initiate_combat(hero, goblin(7, 1), TAVERN);
    arena.manager.tick_at(Timestamp::ZERO);

    assert_eq!(arena.skills.proficiency(HERO, swords.id), Some(50));
    assert_eq!(
        arena.sink.messages_for(player(HERO)),
        vec!["You gain 100 experience.".to_owned()]
    );
}

#[test]
fn unarmed_kill_trains_nothing() {
    let arena = Arena::new(MAX_FACES);
    let hero = arena.hero(HERO, "Aldric", 40);
    arena.manager.initiate_combat(hero, goblin(7, 1), TAVERN);
    arena.manager.tick_at(Timestamp::ZERO);

    assert_eq!(arena.sink.messages_for(player(HERO)).len(), 1);
}

// ============================================================================
// Armor & HP
// ============================================================================

#[test]
fn heavy_damage_trains_worn_armor_when_the_fight_ends() {
    let arena = Arena::new(MAX_FACES);
    arena.equipment.wear(HERO, ArmorCategory::Plate);
    let plate = arena.skills.definition_by_key("skill_plate_armor").unwrap();
    arena.skills.teach(HERO, plate.id, 5);

    // The goblin opens and crits for 20, which is the hero's whole pool.
    let hero = arena.hero(HERO, "Aldric", 20);
    let shared = arena
        .manager
        .mobile_initiate_combat(goblin(7, 30).with_damage(10, 0), hero, TAVERN);
    arena.manager.tick_at(Timestamp::ZERO);

    assert!(shared.lock().has_ended());
    assert_eq!(arena.skills.proficiency(HERO, plate.id), Some(6));
    assert!(
        arena
            .sink
            .messages_for(player(HERO))
            .contains(&"Your Plate Armor skill improves! (6%)".to_owned())
    );
    assert_eq!(arena.actors.hp(player(HERO)), Some(0));

    let combat = shared.lock();
    let hero = combat.find_participant(player(HERO)).unwrap();
    assert_eq!(hero.armor_damage(ArmorCategory::Plate), 0);
}

#[test]
fn light_damage_leaves_armor_untrained() {
    let arena = Arena::new(MAX_FACES);
    arena.equipment.wear(HERO, ArmorCategory::Plate);
    let plate = arena.skills.definition_by_key("skill_plate_armor").unwrap();
    arena.skills.teach(HERO, plate.id, 5);

    let hero = arena.hero(HERO, "Aldric", 100);
    arena
        .manager
        .mobile_initiate_combat(goblin(7, 1).with_damage(10, 0), hero, TAVERN);
    arena.manager.tick_at(Timestamp::ZERO);

    assert_eq!(arena.skills.proficiency(HERO, plate.id), Some(5));
    assert_eq!(arena.actors.hp(player(HERO)), Some(80));
}

// ============================================================================
// Autoflee
// ============================================================================

#[test]
fn panicking_player_flees_and_leaves_the_encounter() {
    let door = Arc::new(OpenDoor::default());
    let arena = Arena::with_flee(MAX_FACES, Some(door.clone() as Arc<dyn FleeHandler>));
    let mut turns = arena.manager.events().subscribe(Topic::Turn);
    arena.actors.register(HERO, 5);
    arena.actors.set_autoflee(HERO, 20);

    // Aldric hits first for 8; the goblin answers with a 20-point crit,
    // leaving 10 of 100 HP.
    let hero = combat_core::PlayerCharacter::new(
        HERO,
        combat_core::ActorSheet::new("Aldric", 5, 100).with_hp(30),
    );
    let shared = arena
        .manager
        .initiate_combat(hero, goblin(7, 100).with_damage(10, 0), TAVERN);
    arena.manager.tick_at(Timestamp::ZERO);

    assert_eq!(door.attempts.load(Ordering::Relaxed), 1);
    assert!(!arena.manager.is_in_combat(player(HERO)));
    assert!(
        arena
            .sink
            .messages_for(player(HERO))
            .contains(&"Panic overwhelms you and you flee!".to_owned())
    );
    assert_eq!(arena.actors.hp(player(HERO)), Some(10));

    // Only the goblin is left, so the fight is over.
    assert!(shared.lock().has_ended());
    assert!(arena.sink.room_lines(TAVERN).contains(&COMBAT_ENDED.to_owned()));

    let fled = std::iter::from_fn(|| turns.try_recv().ok()).any(|event| {
        matches!(
            event,
            Event::Turn(TurnEvent::Fled { participant, .. }) if participant == player(HERO)
        )
    });
    assert!(fled);
}

#[test]
fn cornered_npc_panics_in_place() {
    let arena = Arena::new(MAX_FACES);
    let hero = arena.hero(HERO, "Aldric", 1_000);
    let coward = combat_core::Npc::new(
        NpcId(7),
        combat_core::ActorSheet::new("a goblin", 5, 100)
            .with_hp(10)
            .with_autoflee(50),
    );
    let shared = arena.manager.initiate_combat(hero, coward, TAVERN);
    arena.manager.tick_at(Timestamp::ZERO);

    assert!(
        arena
            .sink
            .room_lines(TAVERN)
            .contains(&"a goblin panics but has nowhere to run!".to_owned())
    );
    assert!(shared.lock().is_active());
    assert!(arena.manager.is_in_combat(Participant::Npc(NpcId(7))));
}

#[test]
fn fleeing_npc_is_announced_to_the_room() {
    let arena = Arena::with_flee(MAX_FACES, Some(Arc::new(OpenDoor::default())));
    let hero = arena.hero(HERO, "Aldric", 1_000);
    let coward = combat_core::Npc::new(
        NpcId(7),
        combat_core::ActorSheet::new("a goblin", 5, 100)
            .with_hp(10)
            .with_autoflee(50),
    );
    arena.manager.initiate_combat(hero, coward, TAVERN);
    arena.manager.tick_at(Timestamp::ZERO);

    let room = arena.sink.room_lines(TAVERN);
    assert!(room.contains(&"a goblin flees in terror!".to_owned()));
    assert!(room.contains(&COMBAT_ENDED.to_owned()));
    assert!(!arena.manager.is_in_combat(Participant::Npc(NpcId(7))));
    // Fleeing is not a kill.
    assert_eq!(arena.actors.record(HERO).unwrap().experience, 4_000);
}
