#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Row-density heuristic that flags caves whose diamonds crowd into few rows.

use cave_audit_core::{CellKind, Grid};
use log::debug;
use serde::Serialize;

/// Share of all diamonds the two densest rows may hold before flagging.
pub const DEFAULT_THRESHOLD_PERCENT: u32 = 60;

/// Number of densest rows inspected by the heuristic.
const INSPECTED_ROWS: usize = 2;

/// Diamond count observed on a single grid row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RowDensity {
    /// Zero-based row index.
    pub row: usize,
    /// Diamonds located on the row.
    pub diamonds: usize,
}

/// Classification produced by the clustering heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    /// The grid holds no diamonds, which is distinct from being well distributed.
    NoDiamonds,
    /// The densest rows stay within the configured share.
    WellDistributed,
    /// The densest rows hold more than the configured share.
    Clustered,
}

/// Advisory report describing how diamonds spread across rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusteringReport {
    distribution: Distribution,
    total_diamonds: usize,
    densest_rows: Vec<RowDensity>,
    percentage: f64,
}

impl ClusteringReport {
    /// Classification of the grid.
    #[must_use]
    pub const fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// Returns `true` only when diamonds exist and are not clustered.
    #[must_use]
    pub fn well_distributed(&self) -> bool {
        self.distribution == Distribution::WellDistributed
    }

    /// Total diamonds counted across the grid.
    #[must_use]
    pub const fn total_diamonds(&self) -> usize {
        self.total_diamonds
    }

    /// Up to two densest rows, highest count first.
    #[must_use]
    pub fn densest_rows(&self) -> &[RowDensity] {
        &self.densest_rows
    }

    /// Share of all diamonds held by the densest rows, from 0 to 100.
    #[must_use]
    pub const fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Human-readable one-line summary.
    #[must_use]
    pub fn detail(&self) -> String {
        match self.distribution {
            Distribution::NoDiamonds => "no diamonds".to_owned(),
            Distribution::WellDistributed => "well distributed".to_owned(),
            Distribution::Clustered => format!(
                "{:.0}% in {} line(s)",
                self.percentage,
                self.densest_rows.len()
            ),
        }
    }
}

/// Row clustering heuristic with a configurable threshold.
#[derive(Clone, Copy, Debug)]
pub struct Clustering {
    threshold_percent: u32,
}

impl Default for Clustering {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_PERCENT)
    }
}

impl Clustering {
    /// Creates a heuristic that flags grids above `threshold_percent`.
    #[must_use]
    pub const fn new(threshold_percent: u32) -> Self {
        Self { threshold_percent }
    }

    /// Threshold applied to the densest rows' combined share.
    #[must_use]
    pub const fn threshold_percent(&self) -> u32 {
        self.threshold_percent
    }

    /// Counts diamonds per row and compares the two densest rows to the total.
    #[must_use]
    pub fn report(&self, grid: &Grid) -> ClusteringReport {
        let mut rows: Vec<RowDensity> = (0..grid.row_count())
            .filter_map(|row| {
                let diamonds = grid
                    .row(row)?
                    .iter()
                    .filter(|&&cell| cell == CellKind::Diamond)
                    .count();
                (diamonds > 0).then_some(RowDensity { row, diamonds })
            })
            .collect();

        let total_diamonds: usize = rows.iter().map(|density| density.diamonds).sum();
        if total_diamonds == 0 {
            return ClusteringReport {
                distribution: Distribution::NoDiamonds,
                total_diamonds,
                densest_rows: Vec::new(),
                percentage: 0.0,
            };
        }

        // Stable sort keeps the upper row first among equal counts.
        rows.sort_by(|a, b| b.diamonds.cmp(&a.diamonds));
        rows.truncate(INSPECTED_ROWS);

        let densest: usize = rows.iter().map(|density| density.diamonds).sum();
        let percentage = densest as f64 * 100.0 / total_diamonds as f64;
        let clustered = densest * 100 > total_diamonds * self.threshold_percent as usize;
        if clustered {
            debug!(
                "{densest} of {total_diamonds} diamonds sit on {} row(s), above {}%",
                rows.len(),
                self.threshold_percent
            );
        }

        ClusteringReport {
            distribution: if clustered {
                Distribution::Clustered
            } else {
                Distribution::WellDistributed
            },
            total_diamonds,
            densest_rows: rows,
            percentage,
        }
    }
}

/// Runs the heuristic with the default threshold.
#[must_use]
pub fn row_clustering_report(grid: &Grid) -> ClusteringReport {
    Clustering::default().report(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::parse(&rows.join("\n"))
    }

    #[test]
    fn single_row_of_diamonds_is_fully_clustered() {
        let report = row_clustering_report(&grid(&["W***W", "W.P.W", "W...W"]));

        assert!(!report.well_distributed());
        assert_eq!(report.distribution(), Distribution::Clustered);
        assert!((report.percentage() - 100.0).abs() < f64::EPSILON);
        assert_eq!(report.densest_rows(), &[RowDensity { row: 0, diamonds: 3 }]);
        assert_eq!(report.detail(), "100% in 1 line(s)");
    }

    #[test]
    fn no_diamonds_is_reported_distinctly() {
        let report = row_clustering_report(&grid(&["WWW", "WPW"]));

        assert_eq!(report.distribution(), Distribution::NoDiamonds);
        assert!(!report.well_distributed());
        assert_eq!(report.detail(), "no diamonds");
    }

    #[test]
    fn spread_diamonds_are_well_distributed() {
        let report = row_clustering_report(&grid(&["*..", ".*.", "..*", "*P.", ".*."]));

        assert!(report.well_distributed());
        assert_eq!(report.total_diamonds(), 5);
        assert!((report.percentage() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn exactly_at_threshold_is_not_clustered() {
        // Two densest rows hold 3 of 5 diamonds: exactly 60%.
        let report = row_clustering_report(&grid(&["**.", "*..", "P*.", "..*"]));

        assert_eq!(report.distribution(), Distribution::WellDistributed);
        assert_eq!(
            report.densest_rows(),
            &[
                RowDensity { row: 0, diamonds: 2 },
                RowDensity { row: 1, diamonds: 1 },
            ]
        );
    }

    #[test]
    fn custom_threshold_changes_verdict() {
        let cave = grid(&["**.", "*..", "P*.", "..*"]);

        assert_eq!(
            Clustering::new(50).report(&cave).distribution(),
            Distribution::Clustered
        );
    }
}
