//! Topic-based event bus.
//!
//! Each topic has its own broadcast channel so subscribers only receive the
//! events they asked for. Slow subscribers lag instead of blocking the worker.

use serde::Serialize;
use tokio::sync::broadcast;

use battle_core::BattleEvent;

/// Event topics for subscription filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Movement, shots, explosions, casualties, panic.
    Battle,
    /// Turn changes and the battle outcome.
    Turn,
}

/// An engine event stamped with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    pub tick: u64,
    pub event: BattleEvent,
}

impl Event {
    pub fn topic(&self) -> Topic {
        if self.event.is_turn_event() {
            Topic::Turn
        } else {
            Topic::Battle
        }
    }
}

#[derive(Clone)]
pub struct EventBus {
    battle: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (battle, _) = broadcast::channel(capacity);
        let (turn, _) = broadcast::channel(capacity);
        Self { battle, turn }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Battle => &self.battle,
            Topic::Turn => &self.turn,
        }
    }

    /// Publishes on the event's topic. Events nobody listens to are dropped.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            tracing::trace!(target: "runtime::worker", ?topic, "no subscribers");
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.sender(topic).receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BattleOutcome, Faction, Position, UnitId};

    #[tokio::test]
    async fn routes_events_by_topic() {
        let bus = EventBus::with_capacity(8);
        let mut battle = bus.subscribe(Topic::Battle);
        let mut turn = bus.subscribe(Topic::Turn);

        bus.publish(Event {
            tick: 3,
            event: BattleEvent::UnitMoved {
                unit: UnitId(1),
                to: Position::new(1, 0, 0),
            },
        });
        bus.publish(Event {
            tick: 4,
            event: BattleEvent::TurnEnded {
                side: Faction::Player,
                turn: 1,
            },
        });
        bus.publish(Event {
            tick: 5,
            event: BattleEvent::BattleFinished {
                outcome: BattleOutcome::Victory,
            },
        });

        assert_eq!(battle.recv().await.unwrap().tick, 3);
        assert!(battle.try_recv().is_err());
        assert_eq!(turn.recv().await.unwrap().tick, 4);
        assert_eq!(turn.recv().await.unwrap().tick, 5);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::default();
        bus.publish(Event {
            tick: 0,
            event: BattleEvent::UnitRevived { unit: UnitId(2) },
        });
        assert_eq!(bus.subscriber_count(Topic::Battle), 0);
    }
}
