use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cell::Cell;

/// Unique identifier for every occupant in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Handle to an entry in the action queue.
///
/// Occupants keep the handles of their own pending actions so the queue
/// entries can be withdrawn when the occupant is removed or transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of an occupant. Determines mobility, goal type, and behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A miner looking for ore.
    MinerNotFull,
    /// A miner carrying a full load to the blacksmith.
    MinerFull,
    /// A soldier hunting goblins.
    Soldier,
    /// A goblin hunting soldiers.
    Goblin,
    /// A gatherable resource.
    Ore,
    /// A structure that collects deposited ore.
    Blacksmith,
    /// Impassable scenery.
    Obstacle,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 7] = [
        Self::MinerNotFull,
        Self::MinerFull,
        Self::Soldier,
        Self::Goblin,
        Self::Ore,
        Self::Blacksmith,
        Self::Obstacle,
    ];

    /// The kind this occupant seeks, or `None` for stationary kinds.
    pub fn goal_type(self) -> Option<EntityKind> {
        match self {
            Self::MinerNotFull => Some(Self::Ore),
            Self::MinerFull => Some(Self::Blacksmith),
            Self::Soldier => Some(Self::Goblin),
            Self::Goblin => Some(Self::Soldier),
            Self::Ore | Self::Blacksmith | Self::Obstacle => None,
        }
    }

    /// Whether occupants of this kind move around and may start a path search.
    pub fn is_mobile(self) -> bool {
        self.goal_type().is_some()
    }

    /// Ticks between two turns for a freshly created occupant.
    pub fn default_rate(self) -> u64 {
        match self {
            Self::MinerNotFull | Self::MinerFull => 5,
            Self::Soldier => 4,
            Self::Goblin => 6,
            Self::Ore | Self::Blacksmith | Self::Obstacle => 0,
        }
    }

    /// Carrying capacity for a freshly created occupant.
    pub fn default_resource_limit(self) -> Option<u32> {
        match self {
            Self::MinerNotFull | Self::MinerFull => Some(2),
            _ => None,
        }
    }

    /// Starting health for a freshly created occupant.
    pub fn default_health(self) -> u32 {
        match self {
            Self::Soldier => 5,
            Self::Goblin => 3,
            _ => 1,
        }
    }

    /// Damage dealt per hit for a freshly created occupant.
    pub fn default_attack(self) -> u32 {
        match self {
            Self::Soldier | Self::Goblin => 1,
            _ => 0,
        }
    }

    /// Single-character glyph used by text renderers.
    pub fn glyph(self) -> char {
        match self {
            Self::MinerNotFull => 'm',
            Self::MinerFull => 'M',
            Self::Soldier => 'S',
            Self::Goblin => 'g',
            Self::Ore => 'o',
            Self::Blacksmith => 'B',
            Self::Obstacle => '#',
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MinerNotFull => "miner_not_full",
            Self::MinerFull => "miner_full",
            Self::Soldier => "soldier",
            Self::Goblin => "goblin",
            Self::Ore => "ore",
            Self::Blacksmith => "blacksmith",
            Self::Obstacle => "obstacle",
        };
        write!(f, "{name}")
    }
}

/// Terrain marker for the background layer. Has no behavior.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Background {
    /// Terrain name, e.g. "grass" or "rock".
    pub name: String,
}

impl Background {
    /// Create a background with the given terrain name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::new("grass")
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Anything with a location on the grid.
pub trait Positioned {
    /// The cell currently occupied.
    fn cell(&self) -> Cell;
}

/// Anything that accumulates a countable resource.
pub trait ResourceBearing {
    /// Units currently held.
    fn resource_count(&self) -> u32;

    /// Overwrite the units currently held.
    fn set_resource_count(&mut self, count: u32);

    /// Capacity, if bounded.
    fn resource_limit(&self) -> Option<u32>;

    /// True once the held amount reaches the capacity.
    fn is_full(&self) -> bool {
        self.resource_limit()
            .is_some_and(|limit| self.resource_count() >= limit)
    }
}

/// An entity placed on the world grid.
///
/// The cell is only writable by [`crate::World`], which keeps it in sync with
/// the occupant grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupant {
    id: EntityId,
    kind: EntityKind,
    pub(crate) cell: Cell,
    /// Ticks between two turns.
    pub rate: u64,
    /// Units of resource currently held.
    pub resource_count: u32,
    /// Carrying capacity, if bounded.
    pub resource_limit: Option<u32>,
    /// Remaining health; zero means the occupant has been killed.
    pub health: u32,
    /// Damage dealt per hit.
    pub attack: u32,
    dead: bool,
    pending_actions: Vec<ActionId>,
}

impl Occupant {
    /// Create an occupant with a random ID and the kind's default stats.
    pub fn new(kind: EntityKind, cell: Cell) -> Self {
        Self::with_id(EntityId::new(), kind, cell)
    }

    /// Create an occupant with a pre-assigned ID and the kind's default stats.
    pub fn with_id(id: EntityId, kind: EntityKind, cell: Cell) -> Self {
        Self {
            id,
            kind,
            cell,
            rate: kind.default_rate(),
            resource_count: 0,
            resource_limit: kind.default_resource_limit(),
            health: kind.default_health(),
            attack: kind.default_attack(),
            dead: false,
            pending_actions: Vec::new(),
        }
    }

    /// Set the ticks between turns.
    pub fn with_rate(mut self, rate: u64) -> Self {
        self.rate = rate;
        self
    }

    /// Set the carrying capacity.
    pub fn with_resource_limit(mut self, limit: u32) -> Self {
        self.resource_limit = Some(limit);
        self
    }

    /// Set the units held at creation.
    pub fn with_resource_count(mut self, count: u32) -> Self {
        self.resource_count = count;
        self
    }

    /// Set the starting health.
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health;
        self
    }

    /// Set the damage dealt per hit.
    pub fn with_attack(mut self, attack: u32) -> Self {
        self.attack = attack;
        self
    }

    /// Build the replacement occupant for a transform.
    ///
    /// Identity, cell, rate, and resource state carry over; the pending set
    /// starts empty and the new occupant is alive.
    pub fn into_kind(self, kind: EntityKind) -> Self {
        Self {
            kind,
            dead: false,
            pending_actions: Vec::new(),
            ..self
        }
    }

    /// The occupant's identifier.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The occupant's kind.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The kind this occupant seeks, if it is mobile.
    pub fn goal_type(&self) -> Option<EntityKind> {
        self.kind.goal_type()
    }

    /// Whether this occupant can start a path search.
    pub fn is_mobile(&self) -> bool {
        self.kind.is_mobile()
    }

    /// Whether the occupant has taken a terminal hit.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Mark the occupant dead. Dead occupants stay on the grid until removed
    /// but are no longer found by nearest-of-type searches.
    pub fn mark_dead(&mut self) {
        self.dead = true;
        self.health = 0;
    }

    /// Handles of the actions currently scheduled on this occupant's behalf.
    pub fn pending_actions(&self) -> &[ActionId] {
        &self.pending_actions
    }

    /// Record a newly scheduled action.
    pub fn track_action(&mut self, id: ActionId) {
        self.pending_actions.push(id);
    }

    /// Forget an action, typically because it just fired.
    pub fn forget_action(&mut self, id: ActionId) {
        self.pending_actions.retain(|a| *a != id);
    }

    /// Drain the pending set, returning the handles to cancel.
    pub fn take_pending_actions(&mut self) -> Vec<ActionId> {
        std::mem::take(&mut self.pending_actions)
    }

    /// Structured export for persistence and debugging.
    pub fn snapshot(&self) -> OccupantSnapshot {
        OccupantSnapshot {
            kind: self.kind,
            id: self.id,
            cell: self.cell,
            rate: self.rate,
            resource_count: self.resource_count,
            resource_limit: self.resource_limit,
            health: self.health,
            dead: self.dead,
        }
    }
}

impl Positioned for Occupant {
    fn cell(&self) -> Cell {
        self.cell
    }
}

impl ResourceBearing for Occupant {
    fn resource_count(&self) -> u32 {
        self.resource_count
    }

    fn set_resource_count(&mut self, count: u32) {
        self.resource_count = count;
    }

    fn resource_limit(&self) -> Option<u32> {
        self.resource_limit
    }
}

/// Serializable view of an occupant, produced by [`Occupant::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantSnapshot {
    /// Type tag.
    pub kind: EntityKind,
    /// Identifier.
    pub id: EntityId,
    /// Current cell.
    pub cell: Cell,
    /// Ticks between turns.
    pub rate: u64,
    /// Units held.
    pub resource_count: u32,
    /// Carrying capacity.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resource_limit: Option<u32>,
    /// Remaining health.
    pub health: u32,
    /// Whether the occupant has been killed.
    pub dead: bool,
}
