use crate::cell::Cell;
use crate::entity::EntityId;

/// Alias for `Result<T, TwError>`.
pub type TwResult<T> = Result<T, TwError>;

/// Errors reported by the strict world-setup paths.
///
/// The kernel operations themselves are permissive and never return these;
/// they exist for callers that want to catch placement mistakes early.
#[derive(Debug, thiserror::Error)]
pub enum TwError {
    /// The cell lies outside the world.
    #[error("cell {cell} is outside the {width}x{height} world")]
    OutOfBounds {
        /// The offending cell.
        cell: Cell,
        /// World width.
        width: u32,
        /// World height.
        height: u32,
    },

    /// Another occupant already holds the cell.
    #[error("cell {cell} is already occupied by {occupant}")]
    CellOccupied {
        /// The contested cell.
        cell: Cell,
        /// The current holder.
        occupant: EntityId,
    },

    /// An occupant with the same identifier is already registered.
    #[error("entity {0} is already in the world")]
    DuplicateId(EntityId),

    /// The requested entity ID does not exist in the world.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
