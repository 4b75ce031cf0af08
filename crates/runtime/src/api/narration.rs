//! Outbound text and the flee collaborator.
//!
//! The manager never talks to connections directly. Everything players read
//! goes through a [`NarrationSink`] supplied by the embedding server.
use parking_lot::Mutex;

use combat_core::{CharacterId, LocationId, Participant};

/// Delivers combat text to players and rooms.
///
/// Called while an encounter is locked, so implementations must not block.
pub trait NarrationSink: Send + Sync {
    fn send_to_participant(&self, participant: Participant, message: &str);

    fn broadcast_to_location(&self, location: LocationId, message: &str);

    /// Asks the connection layer to redraw the player's prompt.
    fn send_prompt(&self, _character: CharacterId) {}
}

/// Moves a panicking combatant out of the room.
pub trait FleeHandler: Send + Sync {
    /// Returns true if the participant left `location`.
    fn attempt_flee(&self, participant: Participant, location: LocationId) -> bool;
}

/// Flee handler for rooms without exits: every attempt fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEscape;

impl FleeHandler for NoEscape {
    fn attempt_flee(&self, _participant: Participant, _location: LocationId) -> bool {
        false
    }
}

/// Writes narration to the `narration` tracing target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl NarrationSink for TracingSink {
    fn send_to_participant(&self, participant: Participant, message: &str) {
        tracing::info!(target: "narration", %participant, "{message}");
    }

    fn broadcast_to_location(&self, location: LocationId, message: &str) {
        if !message.is_empty() {
            tracing::info!(target: "narration", location = location.0, "{message}");
        }
    }
}

/// One message captured by [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    Participant(Participant, String),
    Location(LocationId, String),
    Prompt(CharacterId),
}

/// Keeps every delivery in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    pub fn take(&self) -> Vec<Delivery> {
        std::mem::take(&mut *self.deliveries.lock())
    }

    /// Lines broadcast to `location`, skipping blank round separators.
    pub fn room_lines(&self, location: LocationId) -> Vec<String> {
        self.deliveries
            .lock()
            .iter()
            .filter_map(|delivery| match delivery {
                Delivery::Location(at, line) if *at == location && !line.is_empty() => {
                    Some(line.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn messages_for(&self, participant: Participant) -> Vec<String> {
        self.deliveries
            .lock()
            .iter()
            .filter_map(|delivery| match delivery {
                Delivery::Participant(to, line) if *to == participant => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn prompts_for(&self, character: CharacterId) -> usize {
        self.deliveries
            .lock()
            .iter()
            .filter(|delivery| matches!(delivery, Delivery::Prompt(to) if *to == character))
            .count()
    }
}

impl NarrationSink for RecordingSink {
    fn send_to_participant(&self, participant: Participant, message: &str) {
        self.deliveries
            .lock()
            .push(Delivery::Participant(participant, message.to_owned()));
    }

    fn broadcast_to_location(&self, location: LocationId, message: &str) {
        self.deliveries
            .lock()
            .push(Delivery::Location(location, message.to_owned()));
    }

    fn send_prompt(&self, character: CharacterId) {
        self.deliveries.lock().push(Delivery::Prompt(character));
    }
}
