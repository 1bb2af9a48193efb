use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tw_core::{Cell, EntityKind, World};

/// Outcome of a successful search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    /// Cells expanded before the goal was reached, in expansion order.
    pub visited: Vec<Cell>,
    /// The route from start to goal, both inclusive.
    pub path: Vec<Cell>,
}

impl PathResult {
    /// The first cell to step onto, if the path leaves the start.
    pub fn next_step(&self) -> Option<Cell> {
        self.path.get(1).copied()
    }
}

/// A* search from `start` to `goal` over the occupant grid.
///
/// The occupant at `start` must be mobile; otherwise no search happens and
/// `None` is returned. Cells are passable when in bounds and either empty or
/// held by an occupant of the mover's goal type. Equal `f` scores expand in
/// insertion order. Returns `None` when the goal is unreachable.
pub fn find_path(world: &World, start: Cell, goal: Cell) -> Option<PathResult> {
    let goal_type = world.occupant_at(start)?.goal_type()?;

    let mut frontier: BinaryHeap<Reverse<(u32, u64, Cell)>> = BinaryHeap::new();
    let mut inserted: u64 = 0;
    let mut closed: HashSet<Cell> = HashSet::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut g_score: HashMap<Cell, u32> = HashMap::new();
    let mut visited = Vec::new();

    g_score.insert(start, 0);
    frontier.push(Reverse((start.manhattan(goal), inserted, start)));

    while let Some(Reverse((_, _, current))) = frontier.pop() {
        if current == goal {
            return Some(PathResult {
                visited,
                path: reconstruct_path(&came_from, goal),
            });
        }
        // Stale heap entries for cells improved after being pushed.
        if !closed.insert(current) {
            continue;
        }
        visited.push(current);

        let g_current = g_score.get(&current).copied().unwrap_or(0);
        for neighbor in passable_neighbors(world, current, goal_type) {
            if closed.contains(&neighbor) {
                continue;
            }
            let tentative = g_current + 1;
            if g_score.get(&neighbor).is_none_or(|g| tentative < *g) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative);
                inserted += 1;
                frontier.push(Reverse((
                    tentative + neighbor.manhattan(goal),
                    inserted,
                    neighbor,
                )));
            }
        }
    }
    None
}

/// In-bounds neighbors, north first then clockwise, that the mover may enter.
fn passable_neighbors(
    world: &World,
    cell: Cell,
    goal_type: EntityKind,
) -> impl Iterator<Item = Cell> + '_ {
    cell.neighbors().into_iter().filter(move |n| {
        world.within_bounds(*n)
            && world
                .occupant_at(*n)
                .is_none_or(|o| o.kind() == goal_type)
    })
}

fn reconstruct_path(came_from: &HashMap<Cell, Cell>, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(prev) = came_from.get(&current) {
        path.push(*prev);
        current = *prev;
    }
    path.reverse();
    path
}
