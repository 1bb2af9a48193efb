//! The entity behavior protocol.
//!
//! Every mobile kind runs the same turn: find the nearest live occupant of
//! its goal type, step toward it, and interact once adjacent. What the
//! interaction does and whether the occupant changes kind afterwards is up
//! to the kind's [`Behavior`].

mod combat;
mod miner;

use std::fmt;

use tracing::{debug, trace, warn};
use tw_core::{ActionId, Cell, EntityId, EntityKind, Occupant, Positioned, World};

pub use combat::Fighter;
pub use miner::{Gatherer, Hauler};

use crate::action::{Action, ActionKind};
use crate::context::SimContext;
use crate::event::SimEventKind;
use crate::pathfinding::find_path;
use crate::schedule::Scheduled;

/// Result of an adjacent interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interaction {
    /// Cells whose contents changed.
    pub changed: Vec<Cell>,
    /// Whether the interaction ran to completion, which allows a transform.
    pub completed: bool,
}

/// Per-family behavior of a mobile occupant.
pub trait Behavior {
    /// The kind this family seeks.
    fn goal_type(&self) -> EntityKind;

    /// Act on an adjacent `target`.
    fn interact(&self, ctx: &mut SimContext<'_>, actor: EntityId, target: EntityId)
    -> Interaction;

    /// The occupant this one turns into, or `None` to stay as it is.
    ///
    /// Must not touch the world; [`SimContext::replace`] applies the result.
    fn transform(&self, occupant: &Occupant) -> Option<Occupant>;
}

/// The behavior driving `kind`, if it acts at all.
pub fn behavior_for(kind: EntityKind) -> Option<&'static dyn Behavior> {
    match kind {
        EntityKind::MinerNotFull => Some(&Gatherer),
        EntityKind::MinerFull => Some(&Hauler),
        EntityKind::Soldier => Some(&Fighter::SOLDIER),
        EntityKind::Goblin => Some(&Fighter::GOBLIN),
        EntityKind::Ore | EntityKind::Blacksmith | EntityKind::Obstacle => None,
    }
}

/// Where an occupant is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorState {
    /// A miner looking for ore.
    Gathering,
    /// A miner carrying a full load to a blacksmith.
    Full,
    /// A fighter hunting its enemy.
    Fighting,
    /// Killed and waiting to be removed.
    Dead,
    /// Never acts.
    Inert,
}

impl BehaviorState {
    /// Derive the state from an occupant's kind and flags.
    pub fn of(occupant: &Occupant) -> Self {
        if occupant.is_dead() {
            return Self::Dead;
        }
        match occupant.kind() {
            EntityKind::MinerNotFull => Self::Gathering,
            EntityKind::MinerFull => Self::Full,
            EntityKind::Soldier | EntityKind::Goblin => Self::Fighting,
            EntityKind::Ore | EntityKind::Blacksmith | EntityKind::Obstacle => Self::Inert,
        }
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Gathering => "gathering",
            Self::Full => "full",
            Self::Fighting => "fighting",
            Self::Dead => "dead",
            Self::Inert => "inert",
        };
        write!(f, "{s}")
    }
}

/// Run one fired action against the context. Returns the changed cells.
pub fn execute(ctx: &mut SimContext<'_>, entry: Scheduled<Action>) -> Vec<Cell> {
    let Scheduled { id, action, .. } = entry;
    trace!(%id, %action, tick = ctx.tick, "firing");
    let Some(occupant) = ctx.world.occupant_mut(action.owner) else {
        warn!(%id, %action, "action fired for an occupant that is gone");
        return Vec::new();
    };
    occupant.forget_action(id);

    match action.kind {
        ActionKind::Behave => behave(ctx, action.owner),
        ActionKind::Expire => expire(ctx, id, action.owner),
    }
}

fn behave(ctx: &mut SimContext<'_>, owner: EntityId) -> Vec<Cell> {
    let Some(actor) = ctx.world.occupant(owner) else {
        return Vec::new();
    };
    if actor.is_dead() {
        return Vec::new();
    }
    let (kind, origin, rate) = (actor.kind(), actor.cell(), actor.rate);
    let Some(behavior) = behavior_for(kind) else {
        debug!(%owner, %kind, "inert occupant has nothing to do");
        return Vec::new();
    };

    let target = ctx
        .world
        .find_nearest_of_type(origin, behavior.goal_type())
        .map(|o| (o.id(), o.cell()));

    let changed = match target {
        None => vec![origin],
        Some((_, at)) if !origin.adjacent(at) => step_toward(ctx, owner, origin, at),
        Some((target, _)) => {
            let outcome = behavior.interact(ctx, owner, target);
            let successor = if outcome.completed {
                ctx.world
                    .occupant(owner)
                    .and_then(|o| behavior.transform(o))
            } else {
                None
            };
            if let Some(successor) = successor {
                let mut changed = outcome.changed;
                changed.extend(ctx.replace(successor));
                return changed;
            }
            outcome.changed
        }
    };

    if ctx.world.occupant(owner).is_some_and(|o| !o.is_dead()) {
        ctx.schedule_for(Action::behave(owner), ctx.tick.saturating_add(rate));
    }
    changed
}

fn expire(ctx: &mut SimContext<'_>, id: ActionId, owner: EntityId) -> Vec<Cell> {
    match ctx.remove(owner) {
        Some(corpse) => vec![corpse.cell()],
        None => {
            warn!(%id, %owner, "expiry found nothing to remove");
            Vec::new()
        }
    }
}

fn step_toward(ctx: &mut SimContext<'_>, owner: EntityId, from: Cell, goal: Cell) -> Vec<Cell> {
    let to = next_position(ctx.world, from, goal);
    if to == from {
        return vec![from];
    }
    let changed = ctx.world.move_occupant(owner, to);
    ctx.emit(
        SimEventKind::Moved {
            entity: owner,
            from,
            to,
        },
        format!("{owner} moved {from} -> {to}"),
    );
    changed
}

/// The cell an occupant at `origin` should step onto to approach `goal`.
///
/// Prefers the first cell of a fresh A* path. When there is no path, or its
/// first cell is taken, falls back to a greedy horizontal step and then a
/// vertical one; returns `origin` when every option is blocked.
pub fn next_position(world: &World, origin: Cell, goal: Cell) -> Cell {
    let free = |cell: Cell| cell != origin && world.within_bounds(cell) && !world.is_occupied(cell);

    if let Some(step) = find_path(world, origin, goal).and_then(|p| p.next_step())
        && free(step)
    {
        return step;
    }
    let horizontal = origin.offset((goal.x - origin.x).signum(), 0);
    if free(horizontal) {
        return horizontal;
    }
    let vertical = origin.offset(0, (goal.y - origin.y).signum());
    if free(vertical) {
        return vertical;
    }
    origin
}

#[cfg(test)]
mod tests {
    use tw_core::Background;

    use super::*;

    #[test]
    fn behavior_table_covers_the_mobile_kinds() {
        for kind in EntityKind::ALL {
            let behavior = behavior_for(kind);
            assert_eq!(behavior.is_some(), kind.is_mobile(), "{kind}");
            if let Some(behavior) = behavior {
                assert_eq!(Some(behavior.goal_type()), kind.goal_type());
            }
        }
    }

    #[test]
    fn state_follows_kind_and_death() {
        let mut miner = Occupant::new(EntityKind::MinerNotFull, Cell::new(0, 0));
        assert_eq!(BehaviorState::of(&miner), BehaviorState::Gathering);
        let full = miner.clone().into_kind(EntityKind::MinerFull);
        assert_eq!(BehaviorState::of(&full), BehaviorState::Full);
        miner.mark_dead();
        assert_eq!(BehaviorState::of(&miner), BehaviorState::Dead);
        let ore = Occupant::new(EntityKind::Ore, Cell::new(0, 0));
        assert_eq!(BehaviorState::of(&ore).to_string(), "inert");
    }

    #[test]
    fn next_position_follows_the_path() {
        let mut world = World::new(5, 5, Background::default());
        let origin = Cell::new(0, 0);
        world.add_occupant(Occupant::new(EntityKind::Soldier, origin));
        world.add_occupant(Occupant::new(EntityKind::Obstacle, Cell::new(1, 0)));
        assert_eq!(next_position(&world, origin, Cell::new(3, 0)), Cell::new(0, 1));
    }

    #[test]
    fn next_position_falls_back_to_greedy_steps() {
        // No path to (4, 0): the goal is boxed in by obstacles, so the mover
        // takes the greedy horizontal step.
        let mut world = World::new(5, 3, Background::default());
        let origin = Cell::new(0, 0);
        world.add_occupant(Occupant::new(EntityKind::Soldier, origin));
        world.add_occupant(Occupant::new(EntityKind::Obstacle, Cell::new(3, 0)));
        world.add_occupant(Occupant::new(EntityKind::Obstacle, Cell::new(4, 1)));
        assert_eq!(next_position(&world, origin, Cell::new(4, 0)), Cell::new(1, 0));

        // Box in (4, 2) too and block the horizontal step: vertical step.
        world.add_occupant(Occupant::new(EntityKind::Obstacle, Cell::new(3, 2)));
        world.add_occupant(Occupant::new(EntityKind::Obstacle, Cell::new(1, 0)));
        assert_eq!(next_position(&world, origin, Cell::new(4, 2)), Cell::new(0, 1));
    }

    #[test]
    fn next_position_stays_when_boxed_in() {
        let mut world = World::new(3, 3, Background::default());
        let origin = Cell::new(0, 0);
        world.add_occupant(Occupant::new(EntityKind::Soldier, origin));
        world.add_occupant(Occupant::new(EntityKind::Obstacle, Cell::new(1, 0)));
        world.add_occupant(Occupant::new(EntityKind::Obstacle, Cell::new(0, 1)));
        assert_eq!(next_position(&world, origin, Cell::new(2, 2)), origin);
    }
}
