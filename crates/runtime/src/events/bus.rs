//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;

use super::types::{EncounterEvent, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Encounter lifecycle (start, join, end)
    Encounter,
    /// Resolved actions, deaths, flights and skill growth
    Turn,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Encounter(EncounterEvent),
    Turn(TurnEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Encounter(_) => Topic::Encounter,
            Event::Turn(_) => Topic::Turn,
        }
    }
}

impl From<EncounterEvent> for Event {
    fn from(event: EncounterEvent) -> Self {
        Event::Encounter(event)
    }
}

impl From<TurnEvent> for Event {
    fn from(event: TurnEvent) -> Self {
        Event::Turn(event)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels are created up front, one per topic.
#[derive(Clone)]
pub struct EventBus {
    encounter: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            encounter: broadcast::channel(capacity).0,
            turn: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Encounter => &self.encounter,
            Topic::Turn => &self.turn,
        }
    }

    /// Publish an event to its corresponding topic
    ///
    /// Best effort: with no subscribers the event is dropped.
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("encounter_subscribers", &self.encounter.receiver_count())
            .field("turn_subscribers", &self.turn.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{CharacterId, CombatId, LocationId, Participant};

    #[tokio::test]
    async fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut topics = bus.subscribe_multiple(&[Topic::Encounter, Topic::Turn]);

        bus.publish(EncounterEvent::Started {
            combat: CombatId(1),
            location: LocationId(3),
            participants: vec![Participant::Player(CharacterId(1))],
        });

        let encounter = topics.get_mut(&Topic::Encounter).unwrap();
        let event = encounter.recv().await.unwrap();
        assert_eq!(event.topic(), Topic::Encounter);

        let turn = topics.get_mut(&Topic::Turn).unwrap();
        assert!(turn.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(TurnEvent::Fled {
            combat: CombatId(1),
            participant: Participant::Player(CharacterId(2)),
        });
    }
}
