use std::collections::HashSet;

use tracing::debug;
use tw_core::{
    ActionId, Background, Cell, EntityId, Occupant, OccupantSnapshot, Positioned,
    RemovalListener, TwResult, World,
};

use crate::action::Action;
use crate::behavior::{self, BehaviorState};
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::scenario::Scenario;
use crate::schedule::Scheduler;

/// The top-level simulation orchestrator.
///
/// Owns the world, the action queue, and the event log, and keeps them
/// consistent: every path that takes an occupant off the grid also cancels
/// the actions it still has queued.
pub struct Simulation {
    world: World,
    scheduler: Scheduler<Action>,
    events: EventLog,
    config: SimConfig,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.scheduler.current_tick())
            .field("occupants", &self.world.len())
            .field("queued", &self.scheduler.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Simulation {
    /// Create a simulation over an empty world.
    pub fn new(width: u32, height: u32, background: Background, config: SimConfig) -> Self {
        let events = EventLog::new(config.max_events);
        Self {
            world: World::new(width, height, background),
            scheduler: Scheduler::new(),
            events,
            config,
        }
    }

    /// Build a simulation from a scenario. See [`Scenario::build`].
    pub fn from_scenario(scenario: &Scenario, config: SimConfig) -> SimResult<Self> {
        scenario.build(config)
    }

    /// Build a simulation over a world generated from `config.seed`.
    pub fn generated(width: u32, height: u32, config: SimConfig) -> SimResult<Self> {
        Scenario::generate(width, height, config.seed).build(config)
    }

    // -----------------------------------------------------------------------
    // World operations
    // -----------------------------------------------------------------------

    /// Place an occupant without scheduling it. Occupants it displaces lose
    /// their pending actions and are returned.
    pub fn add_occupant(&mut self, occupant: Occupant) -> Vec<Occupant> {
        let evicted = self.world.add_occupant(occupant);
        for gone in &evicted {
            self.scheduler.cancel(gone.pending_actions());
        }
        evicted
    }

    /// Place an occupant and queue its first turn at `current + rate`.
    ///
    /// Returns the handle of that turn; inert occupants and occupants dropped
    /// for being out of bounds get none.
    pub fn spawn(&mut self, occupant: Occupant) -> Option<ActionId> {
        let id = occupant.id();
        self.add_occupant(occupant);
        self.start(id)
    }

    /// Strict variant of [`Simulation::spawn`] used while building worlds.
    pub fn try_spawn(&mut self, occupant: Occupant) -> TwResult<Option<ActionId>> {
        let id = occupant.id();
        self.world.try_add_occupant(occupant)?;
        Ok(self.start(id))
    }

    fn start(&mut self, id: EntityId) -> Option<ActionId> {
        let occupant = self.world.occupant(id)?;
        let (kind, at, rate) = (occupant.kind(), occupant.cell(), occupant.rate);
        self.events.push(SimEvent::new(
            self.current_tick(),
            SimEventKind::Spawned {
                entity: id,
                kind,
                at,
            },
            format!("{kind} {id} placed at {at}"),
        ));
        if !kind.is_mobile() {
            return None;
        }
        let due = self.current_tick().saturating_add(rate);
        Some(self.schedule_at(Action::behave(id), due))
    }

    /// Remove whatever occupies `cell`, cancelling its pending actions.
    pub fn remove_at(&mut self, cell: Cell) -> Option<Occupant> {
        let id = self.world.occupant_at(cell)?.id();
        self.remove_occupant(id)
    }

    /// Remove an occupant by identifier, cancelling its pending actions.
    pub fn remove_occupant(&mut self, id: EntityId) -> Option<Occupant> {
        self.cancel_pending(id);
        self.world.remove_occupant(id)
    }

    /// Move an occupant. Anything already at `dest` is dropped along with its
    /// pending actions. Returns the changed cells.
    pub fn move_occupant(&mut self, id: EntityId, dest: Cell) -> Vec<Cell> {
        if let Some(other) = self.world.occupant_at(dest).map(|o| o.id())
            && other != id
            && self.world.contains(id)
        {
            self.cancel_pending(other);
        }
        self.world.move_occupant(id, dest)
    }

    /// Set the terrain at `cell`. Returns false when out of bounds.
    pub fn set_background(&mut self, cell: Cell, background: Background) -> bool {
        self.world.set_background(cell, background)
    }

    /// Register an observer for mobile occupants leaving the world.
    pub fn add_removal_listener(&mut self, listener: Box<dyn RemovalListener>) {
        self.world.add_removal_listener(listener);
    }

    fn cancel_pending(&mut self, id: EntityId) -> usize {
        match self.world.occupant_mut(id) {
            Some(occupant) => {
                let pending = occupant.take_pending_actions();
                self.scheduler.cancel(&pending)
            }
            None => 0,
        }
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// Queue `action` at `tick`, tracking it in the owner's pending set.
    pub fn schedule_at(&mut self, action: Action, tick: u64) -> ActionId {
        let id = self.scheduler.schedule_at(action, tick);
        if let Some(owner) = self.world.occupant_mut(action.owner) {
            owner.track_action(id);
        }
        id
    }

    /// Queue `action` at `current + delay`.
    pub fn schedule_after(&mut self, action: Action, delay: u64) -> ActionId {
        self.schedule_at(action, self.current_tick().saturating_add(delay))
    }

    /// Withdraw queued actions. Returns how many were still queued.
    pub fn cancel(&mut self, ids: &[ActionId]) -> usize {
        self.scheduler.cancel(ids)
    }

    /// Run every action due at or before `tick`.
    ///
    /// Returns the cells whose contents changed, each once, in the order
    /// they were first touched.
    pub fn advance_to(&mut self, tick: u64) -> Vec<Cell> {
        let Self {
            world,
            scheduler,
            events,
            config,
        } = self;
        let mut changed = Vec::new();
        let mut seen = HashSet::new();

        let fired = scheduler.advance_to(tick, |scheduler, entry, now| {
            let mut ctx = SimContext {
                world: &mut *world,
                scheduler,
                events: &mut *events,
                config: &*config,
                tick: now,
            };
            for cell in behavior::execute(&mut ctx, entry) {
                if seen.insert(cell) {
                    changed.push(cell);
                }
            }
        });
        debug!(tick, fired, changed = changed.len(), "advanced");
        changed
    }

    /// Advance by `delta` ticks in one drain.
    pub fn advance_by(&mut self, delta: u64) -> Vec<Cell> {
        self.advance_to(self.current_tick().saturating_add(delta))
    }

    /// Advance `n` times by a single tick.
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            self.advance_by(1);
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The world being simulated.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The action queue.
    pub fn scheduler(&self) -> &Scheduler<Action> {
        &self.scheduler
    }

    /// Events recorded so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The configuration the simulation was built with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The tick most recently advanced to.
    pub fn current_tick(&self) -> u64 {
        self.scheduler.current_tick()
    }

    /// Lifecycle state of an occupant.
    pub fn state_of(&self, id: EntityId) -> Option<BehaviorState> {
        self.world.occupant(id).map(BehaviorState::of)
    }

    /// Serializable view of every occupant, in insertion order.
    pub fn snapshot(&self) -> Vec<OccupantSnapshot> {
        self.world.occupants().map(Occupant::snapshot).collect()
    }
}
