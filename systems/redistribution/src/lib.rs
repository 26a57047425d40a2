#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic diamond redistribution over a cave's open ground.
//!
//! Redistribution never mutates the caller's grid. Existing diamonds are
//! cleared on a copy, open-ground cells are enumerated in row-major order, and
//! an evenly spaced subset of that candidate list receives the new diamonds.
//! Selection is purely positional, so the same grid and count always produce
//! the same layout.

use cave_audit_core::{CellCoord, CellKind, Grid, LevelError};
use cave_audit_system_reachability::reachable_from_spawn;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

/// Failures that prevent a level from being redistributed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RedistributionError {
    /// Fewer candidate cells exist than diamonds are required.
    #[error("only {available} positions available for {required} diamonds")]
    InsufficientSpace {
        /// Candidate cells found in the grid.
        available: usize,
        /// Diamonds requested.
        required: usize,
    },
    /// The level cannot be analysed for reachability.
    #[error(transparent)]
    InvalidLevel(#[from] LevelError),
}

/// Cells eligible to receive a diamond.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateScope {
    /// Every empty or dirt cell.
    #[default]
    All,
    /// Only empty or dirt cells the flood fill reaches from the spawn.
    ReachableFromSpawn,
}

/// Kind written into cells whose diamonds are cleared before selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearedCell {
    /// Open space.
    #[default]
    Empty,
    /// Diggable dirt.
    Dirt,
}

impl ClearedCell {
    const fn kind(self) -> CellKind {
        match self {
            Self::Empty => CellKind::Empty,
            Self::Dirt => CellKind::Dirt,
        }
    }
}

/// Tuning knobs for a redistribution pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedistributionOptions {
    /// Which cells may receive diamonds.
    pub scope: CandidateScope,
    /// What cleared diamonds turn into.
    pub cleared_cell: ClearedCell,
}

/// Ordered diamond targets selected over a cleared copy of a grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedistributionPlan {
    base: Grid,
    candidate_count: usize,
    targets: Vec<CellCoord>,
}

impl RedistributionPlan {
    /// Selects `required` evenly spaced targets from the grid's candidates.
    pub fn new(
        grid: &Grid,
        required: usize,
        options: RedistributionOptions,
    ) -> Result<Self, RedistributionError> {
        let base = clear_diamonds(grid, options.cleared_cell);
        let candidates = candidates(&base, options.scope)?;
        let targets = select_evenly(&candidates, required)?;

        Ok(Self {
            base,
            candidate_count: candidates.len(),
            targets,
        })
    }

    /// Number of candidate cells the targets were selected from.
    #[must_use]
    pub const fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    /// Selected coordinates in candidate order.
    #[must_use]
    pub fn targets(&self) -> &[CellCoord] {
        &self.targets
    }

    /// Stamps a diamond on every target of the cleared grid.
    #[must_use]
    pub fn apply(&self) -> Grid {
        let mut grid = self.base.clone();
        for &target in &self.targets {
            let _ = grid.set(target, CellKind::Diamond);
        }
        grid
    }
}

/// Result of a redistribution that passed the reachability post-check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redistribution {
    /// Rewritten grid.
    pub grid: Grid,
    /// Candidate scope that produced the accepted layout.
    pub scope: CandidateScope,
    /// Candidates available in that scope.
    pub candidate_count: usize,
}

/// Rewrites the grid so it holds exactly `required` evenly spaced diamonds.
pub fn redistribute(grid: &Grid, required: usize) -> Result<Grid, RedistributionError> {
    RedistributionPlan::new(grid, required, RedistributionOptions::default())
        .map(|plan| plan.apply())
}

/// Redistributes and then verifies every diamond is reachable from the spawn.
///
/// When the initial layout strands diamonds, the plan is rebuilt over the
/// reachable candidates only, which cannot strand any.
pub fn redistribute_solvable(
    grid: &Grid,
    required: usize,
    options: RedistributionOptions,
) -> Result<Redistribution, RedistributionError> {
    let plan = RedistributionPlan::new(grid, required, options)?;
    let candidate = plan.apply();
    let reachability = reachable_from_spawn(&candidate)?;

    if reachability.unreachable_count() == 0 {
        return Ok(Redistribution {
            grid: candidate,
            scope: options.scope,
            candidate_count: plan.candidate_count(),
        });
    }

    warn!(
        "{} of {required} redistributed diamonds are unreachable; re-planning over reachable cells",
        reachability.unreachable_count()
    );

    let restricted = RedistributionOptions {
        scope: CandidateScope::ReachableFromSpawn,
        ..options
    };
    let plan = RedistributionPlan::new(grid, required, restricted)?;
    Ok(Redistribution {
        grid: plan.apply(),
        scope: CandidateScope::ReachableFromSpawn,
        candidate_count: plan.candidate_count(),
    })
}

/// Returns a copy of the grid with every diamond replaced by `cleared`.
#[must_use]
pub fn clear_diamonds(grid: &Grid, cleared: ClearedCell) -> Grid {
    let rows = (0..grid.row_count())
        .map(|row| {
            grid.row(row)
                .unwrap_or_default()
                .iter()
                .map(|&cell| {
                    if cell == CellKind::Diamond {
                        cleared.kind()
                    } else {
                        cell
                    }
                })
                .collect()
        })
        .collect();

    Grid::from_rows(rows)
}

/// Enumerates open-ground cells in row-major order, restricted to `scope`.
pub fn candidates(
    grid: &Grid,
    scope: CandidateScope,
) -> Result<Vec<CellCoord>, RedistributionError> {
    let open_ground = grid
        .cells()
        .filter(|&(_, cell)| cell.is_open_ground())
        .map(|(coord, _)| coord);

    match scope {
        CandidateScope::All => Ok(open_ground.collect()),
        CandidateScope::ReachableFromSpawn => {
            let reachability = reachable_from_spawn(grid)?;
            Ok(open_ground
                .filter(|&coord| reachability.is_reachable(coord))
                .collect())
        }
    }
}

/// Picks candidate indices `floor(i * n / required)` for `i` in `0..required`.
pub fn select_evenly(
    candidates: &[CellCoord],
    required: usize,
) -> Result<Vec<CellCoord>, RedistributionError> {
    let available = candidates.len();
    if available < required {
        return Err(RedistributionError::InsufficientSpace {
            available,
            required,
        });
    }

    let selected: Vec<CellCoord> = (0..required)
        .map(|i| candidates[i * available / required])
        .collect();
    debug!("selected {required} of {available} candidate cells");

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::parse(&rows.join("\n"))
    }

    #[test]
    fn selects_floor_of_fractional_steps() {
        let candidates: Vec<CellCoord> = (0..10).map(|column| CellCoord::new(column, 0)).collect();

        let selected = select_evenly(&candidates, 3).expect("enough candidates");

        assert_eq!(
            selected,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(3, 0),
                CellCoord::new(6, 0),
            ]
        );
    }

    #[test]
    fn selecting_zero_yields_nothing() {
        let candidates = [CellCoord::new(0, 0)];
        assert!(select_evenly(&candidates, 0).expect("zero fits").is_empty());
        assert!(select_evenly(&[], 0).expect("zero fits").is_empty());
    }

    #[test]
    fn selecting_all_candidates_uses_each_once() {
        let candidates: Vec<CellCoord> = (0..4).map(|row| CellCoord::new(0, row)).collect();
        assert_eq!(select_evenly(&candidates, 4), Ok(candidates));
    }

    #[test]
    fn insufficient_candidates_are_rejected() {
        let candidates = [CellCoord::new(0, 0), CellCoord::new(1, 0)];
        assert_eq!(
            select_evenly(&candidates, 3),
            Err(RedistributionError::InsufficientSpace {
                available: 2,
                required: 3,
            })
        );
    }

    #[test]
    fn clear_diamonds_honours_cleared_cell() {
        let cave = grid(&["*P*"]);
        assert_eq!(clear_diamonds(&cave, ClearedCell::Empty).render(), " P ");
        assert_eq!(clear_diamonds(&cave, ClearedCell::Dirt).render(), ".P.");
    }

    #[test]
    fn candidates_skip_entities_and_walls() {
        let cave = grid(&["WP.E", "F M#", "O.A*"]);
        assert_eq!(
            candidates(&cave, CandidateScope::All),
            Ok(vec![
                CellCoord::new(2, 0),
                CellCoord::new(1, 1),
                CellCoord::new(1, 2),
            ])
        );
    }

    #[test]
    fn reachable_scope_requires_a_spawn() {
        let cave = grid(&["W..W"]);
        assert_eq!(
            candidates(&cave, CandidateScope::ReachableFromSpawn),
            Err(RedistributionError::InvalidLevel(LevelError::MissingSpawn))
        );
    }
}
