//! Tick-driven simulation kernel for Tickworld.
//!
//! Drives a [`tw_core::World`] through an [`Action`] queue: every mobile
//! occupant has one turn pending at a time, and each turn looks for the
//! nearest target, steps toward it with A*, and interacts once adjacent.
//! Removing or transforming an occupant always cancels its queued actions,
//! so stale turns never fire.

/// Actions stored in the queue.
pub mod action;
/// Per-kind behavior and the step function that runs fired actions.
pub mod behavior;
/// Configuration types for simulation runs.
pub mod config;
/// Mutable context passed to actions as they fire.
pub mod context;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// A* search over the occupant grid.
pub mod pathfinding;
/// Serializable starting worlds.
pub mod scenario;
/// Time-ordered action queue.
pub mod schedule;
/// Top-level simulation orchestrator.
pub mod simulation;

/// Re-exports of [`action::Action`] and [`action::ActionKind`].
pub use action::{Action, ActionKind};
/// Re-exports of the behavior protocol.
pub use behavior::{Behavior, BehaviorState, Interaction, behavior_for, next_position};
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-export of [`context::SimContext`].
pub use context::SimContext;
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, SimEvent, SimEventKind};
/// Re-exports of [`pathfinding::find_path`] and [`pathfinding::PathResult`].
pub use pathfinding::{PathResult, find_path};
/// Re-exports of the scenario types.
pub use scenario::{OccupantSpec, Scenario, TerrainSpec};
/// Re-exports of [`schedule::Scheduler`] and [`schedule::Scheduled`].
pub use schedule::{Scheduled, Scheduler};
/// Re-export of [`simulation::Simulation`].
pub use simulation::Simulation;
