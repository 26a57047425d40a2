#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Batch audit that runs every read-only check over a level set.
//!
//! Each level is analysed independently. Integrity failures are captured on
//! the affected level and never stop the batch; heuristic findings are
//! attached as advisory data and never influence the pass/fail verdict.

use cave_audit_core::{LevelError, LevelRecord};
use cave_audit_system_clustering::{Clustering, ClusteringReport, Distribution};
use cave_audit_system_reachability::reachable_from_spawn;
use cave_audit_system_sealed::{SealedDetector, SealedDiamond};
use log::{debug, warn};
use serde::Serialize;

/// Accessibility verdict for a level whose spawn could be analysed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum AccessStatus {
    /// Every diamond is reachable and enough of them exist.
    Ok,
    /// Some diamonds cannot be reached from the spawn.
    Unreachable {
        /// Diamonds the flood fill never reached.
        count: usize,
    },
    /// Every diamond is reachable but fewer than required exist.
    NeedMore {
        /// Diamonds still missing to satisfy the requirement.
        missing: usize,
    },
}

impl std::fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Unreachable { count } => write!(f, "{count} UNREACHABLE"),
            Self::NeedMore { missing } => write!(f, "NEED {missing} MORE"),
        }
    }
}

/// Outcome of the hard checks performed on a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum LevelOutcome {
    /// The level failed an integrity assertion and was not analysed further.
    Invalid {
        /// Integrity failure encountered.
        error: LevelError,
    },
    /// The flood fill ran to completion.
    Checked {
        /// Diamonds reachable from the spawn.
        reachable: usize,
        /// Diamonds the flood fill never reached.
        unreachable: usize,
        /// Resulting verdict.
        access: AccessStatus,
    },
}

/// Audit findings for a single level.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelAudit {
    /// One-based position of the level within the set.
    pub index: usize,
    /// Level identifier.
    pub name: String,
    /// Diamonds the level requires.
    pub required: u32,
    /// Diamond cells present in the grid.
    pub available: usize,
    /// Result of the hard checks.
    pub outcome: LevelOutcome,
    /// Row clustering heuristic.
    pub clustering: ClusteringReport,
    /// Sealed-diamond heuristic findings.
    pub sealed: Vec<SealedDiamond>,
    /// Symbols outside the known cell table.
    pub unknown_symbols: Vec<char>,
}

impl LevelAudit {
    /// Reports whether the level passed every hard check.
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(
            self.outcome,
            LevelOutcome::Checked {
                access: AccessStatus::Ok,
                ..
            }
        )
    }

    /// Reports whether the level failed an integrity assertion.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self.outcome, LevelOutcome::Invalid { .. })
    }

    /// Number of advisory heuristic flags raised for the level.
    #[must_use]
    pub fn advisory_count(&self) -> usize {
        let clustered = usize::from(self.clustering.distribution() == Distribution::Clustered);
        let unknown = usize::from(!self.unknown_symbols.is_empty());
        clustered + unknown + self.sealed.len()
    }
}

/// Audit findings for a whole level set.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AuditReport {
    levels: Vec<LevelAudit>,
    passed: bool,
}

impl AuditReport {
    /// Per-level findings in source order.
    #[must_use]
    pub fn levels(&self) -> &[LevelAudit] {
        &self.levels
    }

    /// Reports whether every level passed its hard checks.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// Number of levels that failed an integrity assertion.
    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.levels.iter().filter(|level| level.is_invalid()).count()
    }
}

/// Runs the read-only checks with configurable heuristics.
#[derive(Clone, Copy, Debug, Default)]
pub struct Auditor {
    clustering: Clustering,
    sealed: SealedDetector,
}

impl Auditor {
    /// Creates an auditor using the provided heuristics.
    #[must_use]
    pub const fn new(clustering: Clustering, sealed: SealedDetector) -> Self {
        Self { clustering, sealed }
    }

    /// Audits every record in order.
    #[must_use]
    pub fn audit(&self, records: &[LevelRecord]) -> AuditReport {
        let levels: Vec<LevelAudit> = records
            .iter()
            .enumerate()
            .map(|(offset, record)| self.audit_level(offset + 1, record))
            .collect();
        let passed = levels.iter().all(LevelAudit::passed);

        AuditReport { levels, passed }
    }

    /// Audits a single record found at the provided one-based index.
    #[must_use]
    pub fn audit_level(&self, index: usize, record: &LevelRecord) -> LevelAudit {
        let grid = record.grid();
        let required = record.diamonds_required();

        let outcome = match reachable_from_spawn(grid) {
            Ok(reachability) => {
                let reachable = reachability.reachable_count();
                let unreachable = reachability.unreachable_count();
                let access = if unreachable > 0 {
                    AccessStatus::Unreachable { count: unreachable }
                } else if reachable < required as usize {
                    AccessStatus::NeedMore {
                        missing: required as usize - reachable,
                    }
                } else {
                    AccessStatus::Ok
                };
                LevelOutcome::Checked {
                    reachable,
                    unreachable,
                    access,
                }
            }
            Err(error) => {
                warn!("level {} ({}) is invalid: {error}", index, record.name());
                LevelOutcome::Invalid { error }
            }
        };

        let audit = LevelAudit {
            index,
            name: record.name().to_owned(),
            required,
            available: grid.diamond_count(),
            outcome,
            clustering: self.clustering.report(grid),
            sealed: self.sealed.inspect(grid),
            unknown_symbols: grid.unknown_symbols().into_iter().collect(),
        };
        debug!(
            "level {} ({}) audited with {} advisory flag(s)",
            index,
            audit.name,
            audit.advisory_count()
        );

        audit
    }
}

/// Audits every record with the default heuristics.
#[must_use]
pub fn audit(records: &[LevelRecord]) -> AuditReport {
    Auditor::default().audit(records)
}
