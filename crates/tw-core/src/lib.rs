//! Core types for Tickworld: cells, grids, occupants, and the spatial world.
//!
//! This crate owns the data model the simulation kernel mutates. It knows
//! nothing about time or scheduling: the [`World`] only keeps the occupant
//! grid, the background grid, and the identity registry consistent with each
//! other. Pending actions are tracked on occupants as opaque [`ActionId`]
//! handles so the scheduler crate can cancel them.

/// Integer grid coordinates and adjacency helpers.
pub mod cell;
/// Occupant identity, kinds, and capability traits.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Fixed-size 2D storage addressed by [`Cell`].
pub mod grid;
/// The spatial world state: grids plus identity registry.
pub mod world;

/// Re-export cell coordinates.
pub use cell::Cell;
/// Re-export entity types.
pub use entity::{
    ActionId, Background, EntityId, EntityKind, Occupant, OccupantSnapshot, Positioned,
    ResourceBearing,
};
/// Re-export error types.
pub use error::{TwError, TwResult};
/// Re-export the grid container.
pub use grid::Grid;
/// Re-export world model types.
pub use world::{RemovalListener, World};
