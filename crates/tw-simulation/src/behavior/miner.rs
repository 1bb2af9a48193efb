use tw_core::{EntityId, EntityKind, Occupant, Positioned, ResourceBearing};

use super::{Behavior, Interaction};
use crate::context::SimContext;
use crate::event::SimEventKind;

/// A miner with room left: consumes adjacent ore one unit at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gatherer;

impl Behavior for Gatherer {
    fn goal_type(&self) -> EntityKind {
        EntityKind::Ore
    }

    fn interact(&self, ctx: &mut SimContext<'_>, actor: EntityId, target: EntityId) -> Interaction {
        if !ctx.world.contains(actor) {
            return Interaction::default();
        }
        let Some(ore) = ctx.remove(target) else {
            return Interaction::default();
        };
        let Some(miner) = ctx.world.occupant_mut(actor) else {
            return Interaction::default();
        };
        let carried = miner.resource_count() + 1;
        miner.set_resource_count(carried);
        ctx.emit(
            SimEventKind::Gathered {
                entity: actor,
                ore: target,
                carried,
            },
            format!("{actor} mined ore at {}", ore.cell()),
        );
        Interaction {
            changed: vec![ore.cell()],
            completed: true,
        }
    }

    fn transform(&self, occupant: &Occupant) -> Option<Occupant> {
        occupant
            .is_full()
            .then(|| occupant.clone().into_kind(EntityKind::MinerFull))
    }
}

/// A miner with a full load: empties it into an adjacent blacksmith.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hauler;

impl Behavior for Hauler {
    fn goal_type(&self) -> EntityKind {
        EntityKind::Blacksmith
    }

    fn interact(&self, ctx: &mut SimContext<'_>, actor: EntityId, target: EntityId) -> Interaction {
        if !ctx.world.contains(target) {
            return Interaction::default();
        }
        let Some(miner) = ctx.world.occupant_mut(actor) else {
            return Interaction::default();
        };
        let amount = miner.resource_count();
        miner.set_resource_count(0);

        let Some(smith) = ctx.world.occupant_mut(target) else {
            return Interaction::default();
        };
        let stock = smith.resource_count() + amount;
        smith.set_resource_count(stock);
        ctx.emit(
            SimEventKind::Deposited {
                entity: actor,
                smith: target,
                amount,
            },
            format!("{actor} delivered {amount} ore to {target} (stock {stock})"),
        );
        Interaction {
            changed: Vec::new(),
            completed: true,
        }
    }

    fn transform(&self, occupant: &Occupant) -> Option<Occupant> {
        (occupant.resource_count() == 0)
            .then(|| occupant.clone().into_kind(EntityKind::MinerNotFull))
    }
}
