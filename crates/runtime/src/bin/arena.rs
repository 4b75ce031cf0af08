//! Runs one scripted duel against the in-memory stores and prints the room's
//! view of it.
//!
//! Usage: `arena [config.json]`. Set `RUST_LOG=debug` for engine traces.
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use combat_core::{
    ActorSheet, ArmorCategory, CharacterId, CoreStats, LocationId, Npc, NpcId, PlayerCharacter,
    WeaponFamily,
};
use combat_runtime::{
    EncounterEvent, Event, InMemoryActors, InMemoryEquipment, InMemorySkills, OracleManager,
    Runtime, RuntimeConfig, Topic, TracingSink, telemetry,
};

const ARENA: LocationId = LocationId(3001);

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init("info");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config from {path}"))?;
            RuntimeConfig::from_json(&json).context("parsing arena config")?
        }
        None => RuntimeConfig {
            seed: Some(0x00C0_FFEE),
            ..RuntimeConfig::default()
        },
    };

    let hero_id = CharacterId(1);
    let skills = Arc::new(InMemorySkills::standard());
    let equipment = Arc::new(InMemoryEquipment::new());
    let actors = Arc::new(InMemoryActors::new());
    actors.register(hero_id, 5);
    actors.set_autoflee(hero_id, 20);
    equipment.wield(hero_id, WeaponFamily::Swords);
    equipment.wear(hero_id, ArmorCategory::Mail);

    let oracles = OracleManager::new(skills, equipment, actors.clone());
    let mut runtime = Runtime::builder()
        .config(config)
        .oracles(oracles)
        .sink(Arc::new(TracingSink))
        .build()
        .context("building combat runtime")?;

    let mut encounters = runtime.subscribe(Topic::Encounter);
    runtime.start();

    let hero = PlayerCharacter::new(
        hero_id,
        ActorSheet::new("Aldric", 5, 60)
            .with_stats(CoreStats::new(16, 14, 14, 10, 10, 10))
            .with_armor(4),
    );
    let goblin = Npc::new(
        NpcId(7),
        ActorSheet::new("a goblin warrior", 4, 45).with_armor(2),
    )
    .with_damage(6, 1);

    let manager = runtime.manager();
    manager.initiate_combat(hero, goblin, ARENA);

    let outcome = tokio::time::timeout(Duration::from_secs(300), async {
        while let Ok(event) = encounters.recv().await {
            if let Event::Encounter(EncounterEvent::Ended {
                rounds, survivors, ..
            }) = event
            {
                return Some((rounds, survivors));
            }
        }
        None
    })
    .await
    .context("duel did not finish in time")?;

    match outcome {
        Some((rounds, survivors)) => {
            println!("duel over after {rounds} rounds");
            for survivor in survivors {
                println!("  still standing: {survivor}");
            }
        }
        None => println!("event stream closed before the duel ended"),
    }
    if let Some(record) = actors.record(hero_id) {
        println!(
            "Aldric: level {:?}, {} xp",
            record.class_level, record.experience
        );
    }

    runtime.shutdown().await?;
    Ok(())
}
