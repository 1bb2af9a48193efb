use tracing::debug;
use tw_core::{ActionId, Cell, EntityId, Occupant, Positioned, World};

use crate::action::Action;
use crate::config::SimConfig;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::schedule::Scheduler;

/// Mutable context handed to an action while it fires.
///
/// Bundles everything the step function may touch so that entities never
/// hold references into the world or the queue.
pub struct SimContext<'a> {
    /// The world being simulated.
    pub world: &'a mut World,
    /// The action queue, mid-drain.
    pub scheduler: &'a mut Scheduler<Action>,
    /// Event sink.
    pub events: &'a mut EventLog,
    /// Run configuration.
    pub config: &'a SimConfig,
    /// The tick being advanced to.
    pub tick: u64,
}

impl SimContext<'_> {
    /// Emit a simulation event at the current tick.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events.push(SimEvent::new(self.tick, kind, description));
    }

    /// Queue `action` for its owner at `tick` and record the handle in the
    /// owner's pending set. Nothing is queued when the owner is gone.
    pub fn schedule_for(&mut self, action: Action, tick: u64) -> Option<ActionId> {
        let owner = self.world.occupant_mut(action.owner)?;
        let id = self.scheduler.schedule_at(action, tick);
        owner.track_action(id);
        Some(id)
    }

    /// Cancel every action still pending for `id`.
    pub fn cancel_pending(&mut self, id: EntityId) -> usize {
        let pending = match self.world.occupant_mut(id) {
            Some(occupant) => occupant.take_pending_actions(),
            None => return 0,
        };
        self.scheduler.cancel(&pending)
    }

    /// Remove an occupant together with its pending actions.
    pub fn remove(&mut self, id: EntityId) -> Option<Occupant> {
        self.cancel_pending(id);
        let removed = self.world.remove_occupant(id)?;
        let at = removed.cell();
        self.emit(
            SimEventKind::Removed { entity: id, at },
            format!("{} {id} removed at {at}", removed.kind()),
        );
        Some(removed)
    }

    /// Kill `target`: it stops acting at once and is removed after the
    /// configured corpse time.
    pub fn kill(&mut self, target: EntityId, killer: EntityId) {
        let Some(victim) = self.world.occupant_mut(target) else {
            return;
        };
        if victim.is_dead() {
            return;
        }
        victim.mark_dead();
        let kind = victim.kind();
        self.cancel_pending(target);
        self.emit(
            SimEventKind::EntityDied {
                entity: target,
                killer,
            },
            format!("{kind} {target} killed by {killer}"),
        );
        let expiry = self.tick.saturating_add(self.config.corpse_ticks);
        self.schedule_for(Action::expire(target), expiry);
    }

    /// Replace an occupant with its transformed successor in place.
    ///
    /// Old pending actions are cancelled before anything else happens, and
    /// the successor's first turn is queued at `tick + rate`. Returns the
    /// cell to redraw.
    pub fn replace(&mut self, successor: Occupant) -> Vec<Cell> {
        let id = successor.id();
        let at = successor.cell();
        let rate = successor.rate;
        let to = successor.kind();

        self.cancel_pending(id);
        let from = match self.world.remove_occupant(id) {
            Some(old) => old.kind(),
            None => return Vec::new(),
        };
        for evicted in self.world.add_occupant(successor) {
            self.scheduler.cancel(evicted.pending_actions());
        }
        debug!(%id, %from, %to, %at, "transformed");
        self.emit(
            SimEventKind::Transformed { entity: id, from, to },
            format!("{id} became {to} at {at}"),
        );
        self.schedule_for(Action::behave(id), self.tick.saturating_add(rate));
        vec![at]
    }
}
