#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Local wall-density checks that flag diamonds which look boxed in.
//!
//! Findings are advisory. A flagged diamond may still be reachable through a
//! longer route, so callers pair these checks with the flood fill before
//! drawing conclusions about solvability.

use cave_audit_core::{CellCoord, CellKind, Grid, ORTHOGONAL_OFFSETS, SURROUNDING_OFFSETS};
use log::debug;
use serde::Serialize;

/// Minimum wall count among the surrounding cells that marks a diamond as heavily walled.
pub const DEFAULT_HEAVILY_WALLED_THRESHOLD: usize = 7;

/// Reason attached to a sealed-diamond finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SealReason {
    /// All four orthogonal neighbours are walls.
    FullySealed,
    /// At least the threshold number of in-bounds surrounding cells are walls.
    HeavilyWalled {
        /// Walls counted among the surrounding cells.
        walls: usize,
    },
}

/// Diamond flagged by the detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SealedDiamond {
    /// Location of the diamond.
    pub coord: CellCoord,
    /// Why the diamond was flagged.
    pub reason: SealReason,
}

impl std::fmt::Display for SealedDiamond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            SealReason::FullySealed => {
                write!(f, "Diamond at {} completely sealed by walls", self.coord)
            }
            SealReason::HeavilyWalled { walls } => write!(
                f,
                "Diamond at {} in heavily walled area ({walls} walls)",
                self.coord
            ),
        }
    }
}

/// Sealed-diamond detector with a configurable density threshold.
#[derive(Clone, Copy, Debug)]
pub struct SealedDetector {
    heavily_walled_threshold: usize,
}

impl Default for SealedDetector {
    fn default() -> Self {
        Self::new(DEFAULT_HEAVILY_WALLED_THRESHOLD)
    }
}

impl SealedDetector {
    /// Creates a detector that flags diamonds with at least `heavily_walled_threshold` walls around them.
    #[must_use]
    pub const fn new(heavily_walled_threshold: usize) -> Self {
        Self {
            heavily_walled_threshold,
        }
    }

    /// Inspects every diamond strictly between the first and last rows.
    ///
    /// Findings are returned in row-major order. A diamond can appear twice,
    /// once per reason, with the fully sealed finding first.
    #[must_use]
    pub fn inspect(&self, grid: &Grid) -> Vec<SealedDiamond> {
        let last_row = grid.row_count().saturating_sub(1);
        let mut findings = Vec::new();

        for (coord, cell) in grid.cells() {
            if cell != CellKind::Diamond {
                continue;
            }

            let row = coord.row() as usize;
            if row == 0 || row >= last_row {
                continue;
            }

            let column = i64::from(coord.column());
            let row = i64::from(coord.row());

            let fully_sealed = ORTHOGONAL_OFFSETS
                .iter()
                .all(|&(dx, dy)| grid.cell_at(column + dx, row + dy).is_wall_like());
            if fully_sealed {
                findings.push(SealedDiamond {
                    coord,
                    reason: SealReason::FullySealed,
                });
            }

            let walls = SURROUNDING_OFFSETS
                .iter()
                .filter_map(|&(dx, dy)| coord.offset(dx, dy))
                .filter_map(|neighbor| grid.get(neighbor))
                .filter(|cell| cell.is_wall_like())
                .count();
            if walls >= self.heavily_walled_threshold {
                findings.push(SealedDiamond {
                    coord,
                    reason: SealReason::HeavilyWalled { walls },
                });
            }
        }

        if !findings.is_empty() {
            debug!("{} potential sealed diamond finding(s)", findings.len());
        }

        findings
    }
}

/// Runs the detector with the default threshold.
#[must_use]
pub fn sealed_diamonds(grid: &Grid) -> Vec<SealedDiamond> {
    SealedDetector::default().inspect(grid)
}
