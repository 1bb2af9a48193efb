use serde::Serialize;
use tw_core::{Cell, EntityId, EntityKind};

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEventKind {
    // Lifecycle
    /// An occupant was placed and given its first turn.
    Spawned {
        /// The new occupant.
        entity: EntityId,
        /// Its kind.
        kind: EntityKind,
        /// Where it was placed.
        at: Cell,
    },
    /// An occupant took one step.
    Moved {
        /// The occupant that moved.
        entity: EntityId,
        /// The cell it left.
        from: Cell,
        /// The cell it entered.
        to: Cell,
    },

    // Mining
    /// A miner picked up a unit of ore.
    Gathered {
        /// The miner.
        entity: EntityId,
        /// The ore that was consumed.
        ore: EntityId,
        /// The miner's load afterwards.
        carried: u32,
    },
    /// A miner emptied its load into a blacksmith.
    Deposited {
        /// The miner.
        entity: EntityId,
        /// The receiving blacksmith.
        smith: EntityId,
        /// Units handed over.
        amount: u32,
    },
    /// An occupant changed kind in place.
    Transformed {
        /// The occupant; the identifier survives the change.
        entity: EntityId,
        /// Kind before.
        from: EntityKind,
        /// Kind after.
        to: EntityKind,
    },

    // Combat
    /// A fighter hit its target.
    Attacked {
        /// The attacker.
        attacker: EntityId,
        /// The target.
        target: EntityId,
        /// Damage dealt.
        damage: u32,
        /// Target health afterwards.
        remaining: u32,
    },
    /// An occupant was killed.
    EntityDied {
        /// The occupant that died.
        entity: EntityId,
        /// Who landed the final hit.
        killer: EntityId,
    },
    /// An occupant left the world.
    Removed {
        /// The removed occupant.
        entity: EntityId,
        /// The cell it vacated.
        at: Cell,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::Spawned { entity, .. }
            | Self::Moved { entity, .. }
            | Self::Transformed { entity, .. }
            | Self::Removed { entity, .. } => *entity == id,
            Self::Gathered { entity, ore, .. } => *entity == id || *ore == id,
            Self::Deposited { entity, smith, .. } => *entity == id || *smith == id,
            Self::Attacked {
                attacker, target, ..
            } => *attacker == id || *target == id,
            Self::EntityDied { entity, killer } => *entity == id || *killer == id,
        }
    }

    /// Whether the event is worth surfacing in a run summary.
    pub fn is_notable(&self) -> bool {
        !matches!(self, Self::Moved { .. } | Self::Spawned { .. })
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(entity: EntityId, tick: u64) -> SimEvent {
        SimEvent::new(
            tick,
            SimEventKind::Moved {
                entity,
                from: Cell::new(0, 0),
                to: Cell::new(1, 0),
            },
            "step",
        )
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        let id = EntityId::new();
        log.push(moved(id, 1));
        assert_eq!(log.len(), 1);
        assert_eq!(log.events_for_entity(id).len(), 1);
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        let id = EntityId::new();
        for i in 0..5 {
            log.push(moved(id, i));
        }
        assert_eq!(log.len(), 2);
        // Oldest events were dropped, newest remain
        assert_eq!(log.events()[0].tick, 3);
        assert_eq!(log.events()[1].tick, 4);
    }

    #[test]
    fn event_kind_involves_entity() {
        let e1 = EntityId::new();
        let e2 = EntityId::new();
        let e3 = EntityId::new();

        let kind = SimEventKind::Transformed {
            entity: e1,
            from: EntityKind::MinerNotFull,
            to: EntityKind::MinerFull,
        };
        assert!(kind.involves(e1));
        assert!(!kind.involves(e2));

        // Both sides of an exchange are involved
        let kind = SimEventKind::Deposited {
            entity: e1,
            smith: e2,
            amount: 2,
        };
        assert!(kind.involves(e1));
        assert!(kind.involves(e2));
        assert!(!kind.involves(e3));

        let kind = SimEventKind::Attacked {
            attacker: e1,
            target: e2,
            damage: 1,
            remaining: 2,
        };
        assert!(kind.involves(e1));
        assert!(kind.involves(e2));
        assert!(!kind.involves(e3));
    }

    #[test]
    fn movement_is_not_notable() {
        let id = EntityId::new();
        assert!(!moved(id, 0).kind.is_notable());
        let died = SimEventKind::EntityDied {
            entity: id,
            killer: EntityId::new(),
        };
        assert!(died.is_notable());
    }

    #[test]
    fn event_log_filters_by_entity() {
        let mut log = EventLog::new(0);
        let e1 = EntityId::new();
        let e2 = EntityId::new();
        log.push(moved(e1, 1));
        log.push(moved(e2, 1));
        log.push(SimEvent::new(
            2,
            SimEventKind::Removed {
                entity: e1,
                at: Cell::new(1, 0),
            },
            "e1 removed",
        ));

        assert_eq!(log.events_for_entity(e1).len(), 2);
        assert_eq!(log.events_for_entity(e2).len(), 1);
    }

    #[test]
    fn events_serialize_with_a_tag() {
        let json = serde_json::to_value(moved(EntityId::new(), 3)).unwrap();
        assert_eq!(json["tick"], 3);
        assert_eq!(json["kind"]["event"], "moved");
        assert_eq!(json["kind"]["to"]["x"], 1);
    }
}
