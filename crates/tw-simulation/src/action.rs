use std::fmt;

use tw_core::EntityId;

/// What an action does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// The owner's recurring turn: seek, step, interact, reschedule.
    Behave,
    /// Remove a dead owner from the world.
    Expire,
}

/// A scheduled unit of behavior, stored as data.
///
/// The step function in [`crate::behavior`] interprets it against the
/// simulation context when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    /// The occupant the action runs for.
    pub owner: EntityId,
    /// What the action does.
    pub kind: ActionKind,
}

impl Action {
    /// The owner's recurring turn.
    pub fn behave(owner: EntityId) -> Self {
        Self {
            owner,
            kind: ActionKind::Behave,
        }
    }

    /// Removal of a dead owner.
    pub fn expire(owner: EntityId) -> Self {
        Self {
            owner,
            kind: ActionKind::Expire,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ActionKind::Behave => write!(f, "behave({})", self.owner),
            ActionKind::Expire => write!(f, "expire({})", self.owner),
        }
    }
}
