use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, warn};

use crate::cell::Cell;
use crate::entity::{Background, EntityId, EntityKind, Occupant, Positioned};
use crate::error::{TwError, TwResult};
use crate::grid::Grid;

/// Observer notified when a mobile occupant leaves the world through
/// [`World::remove_at`] or [`World::remove_occupant`].
///
/// Renderers use this to release per-entity resources such as animation
/// state.
pub trait RemovalListener: fmt::Debug {
    /// Called after the occupant has been detached from the world.
    fn removed_from_world(&mut self, occupant: &Occupant);
}

/// The spatial world state.
///
/// Owns the background layer, the occupant layer, the identity registry, and
/// the insertion-ordered occupant list. The occupant grid stores handles
/// only; the registry owns the occupants.
#[derive(Debug)]
pub struct World {
    width: u32,
    height: u32,
    background: Grid<Background>,
    occupancy: Grid<Option<EntityId>>,
    occupants: HashMap<EntityId, Occupant>,
    order: Vec<EntityId>,
    listeners: Vec<Box<dyn RemovalListener>>,
}

impl World {
    /// Create an empty world filled with a uniform background.
    pub fn new(width: u32, height: u32, background: Background) -> Self {
        Self {
            width,
            height,
            background: Grid::new(width, height, background),
            occupancy: Grid::new(width, height, None),
            occupants: HashMap::new(),
            order: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when `cell` lies within `[0, width) x [0, height)`.
    pub fn within_bounds(&self, cell: Cell) -> bool {
        self.occupancy.contains(cell)
    }

    /// True when `cell` is in bounds and holds an occupant.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        matches!(self.occupancy.get(cell), Some(Some(_)))
    }

    /// Register an external removal observer.
    pub fn add_removal_listener(&mut self, listener: Box<dyn RemovalListener>) {
        self.listeners.push(listener);
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Place an occupant at its recorded cell.
    ///
    /// Any prior holder of the cell, and any stale registration under the
    /// same identifier, is detached and returned so the caller can cancel its
    /// pending actions. Out-of-bounds occupants are dropped silently; use
    /// [`World::try_add_occupant`] to catch that during setup.
    pub fn add_occupant(&mut self, occupant: Occupant) -> Vec<Occupant> {
        let cell = occupant.cell();
        if !self.within_bounds(cell) {
            debug!(id = %occupant.id(), %cell, "dropping out-of-bounds occupant");
            return Vec::new();
        }

        let id = occupant.id();
        let mut evicted = Vec::new();
        if let Some(stale) = self.detach(id) {
            evicted.push(stale);
        }
        if let Some(prior) = self.occupancy.get(cell).copied().flatten()
            && let Some(prior) = self.detach(prior)
        {
            debug!(evicted = %prior.id(), %cell, "evicting prior occupant");
            evicted.push(prior);
        }

        self.occupancy.set(cell, Some(id));
        self.order.push(id);
        self.occupants.insert(id, occupant);
        evicted
    }

    /// Strict placement: fails instead of dropping or evicting.
    pub fn try_add_occupant(&mut self, occupant: Occupant) -> TwResult<()> {
        let cell = occupant.cell();
        if !self.within_bounds(cell) {
            return Err(TwError::OutOfBounds {
                cell,
                width: self.width,
                height: self.height,
            });
        }
        if self.occupants.contains_key(&occupant.id()) {
            return Err(TwError::DuplicateId(occupant.id()));
        }
        if let Some(holder) = self.occupancy.get(cell).copied().flatten() {
            return Err(TwError::CellOccupied {
                cell,
                occupant: holder,
            });
        }
        let evicted = self.add_occupant(occupant);
        debug_assert!(evicted.is_empty());
        Ok(())
    }

    /// Remove whatever occupies `cell`.
    ///
    /// Mobile occupants trigger the removal listeners. No-op when the cell is
    /// empty or out of bounds.
    pub fn remove_at(&mut self, cell: Cell) -> Option<Occupant> {
        let id = self.occupancy.get(cell).copied().flatten()?;
        let occupant = self.detach(id)?;
        if occupant.is_mobile() {
            for listener in &mut self.listeners {
                listener.removed_from_world(&occupant);
            }
        }
        debug!(id = %occupant.id(), kind = %occupant.kind(), %cell, "occupant removed");
        Some(occupant)
    }

    /// Remove an occupant by identifier. See [`World::remove_at`].
    pub fn remove_occupant(&mut self, id: EntityId) -> Option<Occupant> {
        let cell = self.occupants.get(&id)?.cell();
        self.remove_at(cell)
    }

    /// Relocate an occupant to `dest`.
    ///
    /// Returns `[old, dest]` for redraw, or an empty list when `dest` is out
    /// of bounds or the occupant is unknown. The destination is overwritten
    /// without eviction hooks; callers make sure it is free.
    pub fn move_occupant(&mut self, id: EntityId, dest: Cell) -> Vec<Cell> {
        if !self.within_bounds(dest) {
            return Vec::new();
        }
        let Some(old) = self.occupants.get(&id).map(|o| o.cell()) else {
            return Vec::new();
        };

        if let Some(other) = self.occupancy.get(dest).copied().flatten()
            && other != id
        {
            warn!(mover = %id, overwritten = %other, %dest, "move overwrote an occupant");
            self.detach(other);
        }
        if self.occupancy.get(old).copied().flatten() == Some(id) {
            self.occupancy.set(old, None);
        }
        self.occupancy.set(dest, Some(id));
        if let Some(occupant) = self.occupants.get_mut(&id) {
            occupant.cell = dest;
        }
        vec![old, dest]
    }

    /// Drop an occupant from registry, list, and grid without notifying
    /// listeners.
    fn detach(&mut self, id: EntityId) -> Option<Occupant> {
        let occupant = self.occupants.remove(&id)?;
        self.order.retain(|o| *o != id);
        if self.occupancy.get(occupant.cell()).copied().flatten() == Some(id) {
            self.occupancy.set(occupant.cell(), None);
        }
        Some(occupant)
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Occupant at `cell`. Out-of-bounds cells yield `None`.
    pub fn occupant_at(&self, cell: Cell) -> Option<&Occupant> {
        let id = self.occupancy.get(cell).copied().flatten()?;
        self.occupants.get(&id)
    }

    /// Registry lookup by identifier.
    pub fn occupant(&self, id: EntityId) -> Option<&Occupant> {
        self.occupants.get(&id)
    }

    /// Mutable registry lookup. The occupant's cell cannot be changed through
    /// this reference; use [`World::move_occupant`].
    pub fn occupant_mut(&mut self, id: EntityId) -> Option<&mut Occupant> {
        self.occupants.get_mut(&id)
    }

    /// True when `id` is registered.
    pub fn contains(&self, id: EntityId) -> bool {
        self.occupants.contains_key(&id)
    }

    /// All occupants in insertion order.
    pub fn occupants(&self) -> impl Iterator<Item = &Occupant> {
        self.order.iter().filter_map(|id| self.occupants.get(id))
    }

    /// Number of occupants.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the world holds no occupants.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Count occupants by kind.
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.occupants().filter(|o| o.kind() == kind).count()
    }

    /// The occupant layer, for renderers.
    pub fn occupancy(&self) -> &Grid<Option<EntityId>> {
        &self.occupancy
    }

    /// Nearest live occupant of `kind`, by squared Euclidean distance.
    ///
    /// Ties go to the occupant added first.
    pub fn find_nearest_of_type(&self, origin: Cell, kind: EntityKind) -> Option<&Occupant> {
        nearest(
            origin,
            self.occupants()
                .filter(|o| o.kind() == kind && !o.is_dead()),
        )
    }

    // -----------------------------------------------------------------------
    // Background layer
    // -----------------------------------------------------------------------

    /// Set the terrain at `cell`. Returns false when out of bounds.
    pub fn set_background(&mut self, cell: Cell, background: Background) -> bool {
        self.background.set(cell, background).is_some()
    }

    /// Terrain at `cell`.
    pub fn background_at(&self, cell: Cell) -> Option<&Background> {
        self.background.get(cell)
    }

    // -----------------------------------------------------------------------
    // Consistency
    // -----------------------------------------------------------------------

    /// Check that grid, registry, and occupant list agree.
    pub fn validate(&self) -> TwResult<()> {
        let mut seen = HashSet::new();
        for id in &self.order {
            if !seen.insert(*id) {
                return Err(TwError::Validation(format!("{id} listed twice")));
            }
            let occupant = self
                .occupants
                .get(id)
                .ok_or(TwError::EntityNotFound(*id))?;
            if self.occupancy.get(occupant.cell()).copied().flatten() != Some(*id) {
                return Err(TwError::Validation(format!(
                    "{id} records {} but the grid disagrees",
                    occupant.cell()
                )));
            }
        }
        if seen.len() != self.occupants.len() {
            return Err(TwError::Validation(
                "registry and occupant list differ in size".into(),
            ));
        }

        let mut on_grid = 0;
        for (cell, slot) in self.occupancy.iter() {
            let Some(id) = slot else { continue };
            on_grid += 1;
            match self.occupants.get(id) {
                Some(o) if o.cell() == cell => {}
                Some(o) => {
                    return Err(TwError::Validation(format!(
                        "grid holds {id} at {cell} but it records {}",
                        o.cell()
                    )));
                }
                None => return Err(TwError::EntityNotFound(*id)),
            }
        }
        if on_grid != self.occupants.len() {
            return Err(TwError::Validation(format!(
                "{on_grid} cells occupied for {} occupants",
                self.occupants.len()
            )));
        }
        Ok(())
    }
}

/// The item closest to `origin` by squared distance; the first wins ties.
pub fn nearest<'a, P: Positioned>(
    origin: Cell,
    items: impl IntoIterator<Item = &'a P>,
) -> Option<&'a P> {
    let mut best: Option<(&'a P, i64)> = None;
    for item in items {
        let d = origin.distance_sq(item.cell());
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((item, d));
        }
    }
    best.map(|(item, _)| item)
}
