//! Runtime orchestration for the combat engine.
//!
//! This crate wires the pure rules in `combat_core` to a running server: a
//! registry of live encounters, a fixed-interval tick task, narration and
//! flee collaborators, in-memory oracle stores, and a topic-based event bus.
//! Servers embed [`Runtime`] and feed it fights through
//! [`CombatManager::initiate_combat`] and friends.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder and configuration
//! - [`manager`] owns the encounter registry and tick processing
//! - [`api`] exposes the error type and collaborator traits
//! - [`events`] provides the topic-based event bus
//! - [`oracle`] provides in-memory stores for skills, equipment and characters
pub mod api;
pub mod clock;
pub mod events;
pub mod manager;
pub mod oracle;
pub mod runtime;
pub mod scheduler;
pub mod telemetry;

pub use api::{
    Delivery, FleeHandler, NarrationSink, NoEscape, RecordingSink, Result, RuntimeError,
    TracingSink,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{EncounterEvent, Event, EventBus, Topic, TurnEvent};
pub use manager::{COMBAT_ENDED, CombatManager, SharedCombat};
pub use oracle::{
    CharacterRecord, InMemoryActors, InMemoryEquipment, InMemorySkills, Loadout, OracleManager,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use scheduler::TickScheduler;
