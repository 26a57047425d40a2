#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Flood-fill reachability analysis seeded from the player spawn.

use std::collections::{BTreeSet, HashSet, VecDeque};

use cave_audit_core::{CellCoord, CellKind, Grid, LevelError, ORTHOGONAL_OFFSETS};
use log::debug;
use serde::Serialize;

/// Outcome of a breadth-first traversal from the spawn cell.
///
/// The traversal only expands into walkable cells, so `visited` is exactly the
/// region the player can stand on without removing anything other than dirt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReachabilityResult {
    spawn: CellCoord,
    reachable_diamonds: BTreeSet<CellCoord>,
    total_diamonds: usize,
    #[serde(skip)]
    visited: HashSet<CellCoord>,
}

impl ReachabilityResult {
    /// Spawn cell the traversal started from.
    #[must_use]
    pub const fn spawn(&self) -> CellCoord {
        self.spawn
    }

    /// Diamonds touched by the traversal.
    #[must_use]
    pub fn reachable_diamonds(&self) -> &BTreeSet<CellCoord> {
        &self.reachable_diamonds
    }

    /// Number of diamonds touched by the traversal.
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.reachable_diamonds.len()
    }

    /// Number of diamond cells present in the grid.
    #[must_use]
    pub const fn total_diamonds(&self) -> usize {
        self.total_diamonds
    }

    /// Diamonds present in the grid that the traversal never reached.
    #[must_use]
    pub fn unreachable_count(&self) -> usize {
        self.total_diamonds - self.reachable_diamonds.len()
    }

    /// Every cell visited by the traversal, spawn included.
    #[must_use]
    pub fn visited(&self) -> &HashSet<CellCoord> {
        &self.visited
    }

    /// Reports whether the traversal reached the provided cell.
    #[must_use]
    pub fn is_reachable(&self, cell: CellCoord) -> bool {
        self.visited.contains(&cell)
    }
}

/// Runs a breadth-first flood fill over walkable cells starting at the spawn.
///
/// Fails with [`LevelError`] when the grid has no spawn or more than one, so
/// callers can tell a broken level apart from one with nothing reachable.
pub fn reachable_from_spawn(grid: &Grid) -> Result<ReachabilityResult, LevelError> {
    let spawn = grid.spawn()?;

    let mut visited = HashSet::new();
    let mut reachable_diamonds = BTreeSet::new();
    let mut queue = VecDeque::new();

    let _ = visited.insert(spawn);
    queue.push_back(spawn);

    while let Some(cell) = queue.pop_front() {
        if grid.get(cell) == Some(CellKind::Diamond) {
            let _ = reachable_diamonds.insert(cell);
        }

        for neighbor in neighbors(cell) {
            if !grid.get(neighbor).is_some_and(CellKind::is_walkable) {
                continue;
            }

            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    let total_diamonds = grid.diamond_count();
    debug!(
        "flood fill from {spawn} visited {} cells and reached {}/{} diamonds",
        visited.len(),
        reachable_diamonds.len(),
        total_diamonds
    );

    Ok(ReachabilityResult {
        spawn,
        reachable_diamonds,
        total_diamonds,
        visited,
    })
}

fn neighbors(cell: CellCoord) -> impl Iterator<Item = CellCoord> {
    ORTHOGONAL_OFFSETS
        .into_iter()
        .filter_map(move |(dx, dy)| cell.offset(dx, dy))
}
