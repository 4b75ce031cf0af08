use std::sync::Arc;
use std::time::Duration;

use combat_core::{ActorSheet, CharacterId, LocationId, Npc, NpcId, PlayerCharacter, SequenceRng};
use combat_runtime::{
    EncounterEvent, Event, InMemoryActors, InMemoryEquipment, InMemorySkills, OracleManager,
    RecordingSink, Runtime, RuntimeConfig, Topic,
};

const PIT: LocationId = LocationId(42);
const HERO: CharacterId = CharacterId(1);

fn runtime(rolls: &[u32]) -> (Runtime, Arc<RecordingSink>) {
    let actors = Arc::new(InMemoryActors::new());
    actors.register(HERO, 5);
    let oracles = OracleManager::new(
        Arc::new(InMemorySkills::standard()),
        Arc::new(InMemoryEquipment::new()),
        actors,
    )
    .with_rng(Arc::new(SequenceRng::new(rolls.to_vec())));
    let sink = Arc::new(RecordingSink::new());

    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            seed: Some(1),
            ..RuntimeConfig::default()
        })
        .oracles(oracles)
        .sink(sink.clone())
        .build()
        .expect("default config is valid");
    (runtime, sink)
}

fn duel(runtime: &Runtime, goblin_hp: i32) {
    let hero = PlayerCharacter::new(HERO, ActorSheet::new("Aldric", 5, 1_000));
    let goblin = Npc::new(NpcId(7), ActorSheet::new("a goblin", 5, goblin_hp));
    runtime.manager().initiate_combat(hero, goblin, PIT);
}

async fn next_ended(events: &mut tokio::sync::broadcast::Receiver<Event>) -> EncounterEvent {
    loop {
        match events.recv().await.expect("event bus open") {
            Event::Encounter(event @ EncounterEvent::Ended { .. }) => return event,
            _ => continue,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn ticker_resolves_a_duel_in_the_background() {
    let (mut runtime, sink) = runtime(&[19]);
    let mut events = runtime.subscribe(Topic::Encounter);
    duel(&runtime, 1);

    runtime.start();
    assert!(runtime.is_running());

    let ended = tokio::time::timeout(Duration::from_secs(10), next_ended(&mut events))
        .await
        .expect("duel finishes");
    match ended {
        EncounterEvent::Ended { location, .. } => assert_eq!(location, PIT),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(
        sink.room_lines(PIT)
            .contains(&"a goblin has been slain by Aldric!".to_owned())
    );

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn rounds_follow_wall_time() {
    let (mut runtime, _sink) = runtime(&[10]);
    duel(&runtime, 1_000);
    let manager = runtime.manager();
    runtime.start();

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    let shared = manager
        .combat_at(PIT)
        .expect("fight still running");
    assert_eq!(shared.lock().round(), 1);

    tokio::time::sleep(Duration::from_millis(2_600)).await;
    assert_eq!(shared.lock().round(), 2);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_ticking_and_ends_open_fights() {
    let (mut runtime, sink) = runtime(&[10]);
    let mut events = runtime.subscribe(Topic::Encounter);
    duel(&runtime, 1_000);
    let manager = runtime.manager();
    runtime.start();
    tokio::time::sleep(Duration::from_millis(600)).await;

    runtime.shutdown().await.expect("clean shutdown");

    assert_eq!(manager.registered_count(), 0);
    assert!(!manager.is_in_combat(combat_core::Participant::Player(HERO)));
    assert!(matches!(
        next_ended(&mut events).await,
        EncounterEvent::Ended { location, .. } if location == PIT
    ));
    assert!(
        sink.room_lines(PIT)
            .contains(&combat_runtime::COMBAT_ENDED.to_owned())
    );
}
