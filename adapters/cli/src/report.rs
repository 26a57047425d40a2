//! Text and JSON rendering of audit reports and redistribution runs.

use std::{
    io::{self, Write},
    path::Path,
};

use cave_audit_system_audit::{AuditReport, LevelAudit, LevelOutcome};
use cave_audit_system_clustering::Distribution;
use serde::Serialize;

/// Findings printed per level by the sealed-room table.
const SEALED_PREVIEW: usize = 2;
const RULE_WIDTH: usize = 80;

/// Outcome of a `redistribute` run across the requested levels.
#[derive(Debug, Serialize)]
pub(crate) struct RewriteSummary {
    pub(crate) levels: Vec<LevelRewrite>,
    pub(crate) dry_run: bool,
    pub(crate) written: bool,
}

impl RewriteSummary {
    /// Requested levels that could not be rewritten.
    pub(crate) fn failures(&self) -> usize {
        self.levels
            .iter()
            .filter(|level| matches!(level.outcome, RewriteOutcome::Failed { .. }))
            .count()
    }
}

/// Rewrite result for one requested level.
#[derive(Debug, Serialize)]
pub(crate) struct LevelRewrite {
    pub(crate) name: String,
    pub(crate) outcome: RewriteOutcome,
}

/// Either the rewritten pattern or the reason the level was skipped.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub(crate) enum RewriteOutcome {
    Fixed {
        diamonds: u32,
        replanned: bool,
        pattern: String,
    },
    Failed {
        error: String,
    },
}

/// Prints the row clustering table.
pub(crate) fn write_quality(out: &mut impl Write, report: &AuditReport) -> io::Result<()> {
    writeln!(out, "Cave Quality Check:\n")?;
    writeln!(
        out,
        "{:<3} {:<20} {:<5} {:<5} Line Clustering Check",
        "Cave", "Name", "Req", "Avail"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

    for level in report.levels() {
        let clustering = match level.clustering.distribution() {
            Distribution::NoDiamonds => "✗ NO DIAMONDS".to_owned(),
            Distribution::WellDistributed => "✓ Well distributed".to_owned(),
            Distribution::Clustered => format!("⚠ {}", level.clustering.detail()),
        };
        writeln!(
            out,
            "{:<3} {:<20} {:<5} {:<5} {clustering}",
            level.index, level.name, level.required, level.available
        )?;
    }

    let flagged = report
        .levels()
        .iter()
        .filter(|level| level.clustering.distribution() != Distribution::WellDistributed)
        .count();
    if flagged == 0 {
        writeln!(
            out,
            "\n✓ All {} cave(s) have well distributed diamonds.",
            report.levels().len()
        )?;
    } else {
        writeln!(
            out,
            "\n⚠ {flagged} of {} cave(s) have clustered or missing diamonds.",
            report.levels().len()
        )?;
    }
    write_integrity(out, report)
}

/// Prints the sealed-room table with a preview of each level's findings.
pub(crate) fn write_sealed(out: &mut impl Write, report: &AuditReport) -> io::Result<()> {
    writeln!(out, "Checking for sealed rooms with diamonds:\n")?;
    writeln!(out, "{:<3} {:<20} Status", "Cave", "Name")?;
    writeln!(out, "{}", "-".repeat(60))?;

    for level in report.levels() {
        if level.sealed.is_empty() {
            writeln!(out, "{:<3} {:<20} ✓ OK", level.index, level.name)?;
            continue;
        }

        writeln!(
            out,
            "{:<3} {:<20} ⚠ {} potential sealed diamond(s)",
            level.index,
            level.name,
            level.sealed.len()
        )?;
        for finding in level.sealed.iter().take(SEALED_PREVIEW) {
            writeln!(out, "     {finding}")?;
        }
    }

    let flagged = report
        .levels()
        .iter()
        .filter(|level| !level.sealed.is_empty())
        .count();
    if flagged == 0 {
        writeln!(
            out,
            "\n✓ No sealed diamonds in {} cave(s).",
            report.levels().len()
        )?;
    } else {
        writeln!(
            out,
            "\n⚠ {flagged} of {} cave(s) have potentially sealed diamonds.",
            report.levels().len()
        )?;
    }
    write_integrity(out, report)?;

    writeln!(
        out,
        "\nNote: Some \"sealed\" diamonds might be accessible through other paths."
    )?;
    writeln!(out, "Manual verification recommended for flagged caves.")
}

/// Prints the accessibility table and the overall verdict.
pub(crate) fn write_verify(out: &mut impl Write, report: &AuditReport) -> io::Result<()> {
    writeln!(out, "Thorough Diamond Accessibility Check:\n")?;
    writeln!(
        out,
        "{:<3} {:<20} {:<8} {:<10} {:<12} Status",
        "Cave", "Name", "Required", "Reachable", "Unreachable"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

    for level in report.levels() {
        let (reachable, unreachable) = counts(level);
        writeln!(
            out,
            "{:<3} {:<20} {:<8} {:<10} {:<12} {}",
            level.index,
            level.name,
            level.required,
            reachable,
            unreachable,
            status(level)
        )?;
    }

    if report.passed() {
        writeln!(
            out,
            "\n✓ All caves have all required diamonds accessible!"
        )
    } else {
        writeln!(out, "\n⚠ Some caves have accessibility issues!")
    }
}

/// Prints every check in one table followed by a pass/fail summary.
pub(crate) fn write_audit(out: &mut impl Write, report: &AuditReport) -> io::Result<()> {
    writeln!(
        out,
        "{:<3} {:<20} {:<5} {:<5} {:<5} {:<26} Advisories",
        "Cave", "Name", "Req", "Avail", "Reach", "Status"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

    for level in report.levels() {
        let (reachable, _) = counts(level);
        writeln!(
            out,
            "{:<3} {:<20} {:<5} {:<5} {:<5} {:<26} {}",
            level.index,
            level.name,
            level.required,
            level.available,
            reachable,
            status(level),
            advisories(level)
        )?;
    }

    let failed = report
        .levels()
        .iter()
        .filter(|level| !level.passed())
        .count();
    if report.passed() {
        writeln!(out, "\nPASS: all {} cave(s) passed", report.levels().len())
    } else {
        writeln!(
            out,
            "\nFAIL: {failed} of {} cave(s) failed ({} invalid)",
            report.levels().len(),
            report.invalid_count()
        )
    }
}

/// Prints one line per requested level and what happened to the file.
pub(crate) fn write_redistribution(
    out: &mut impl Write,
    summary: &RewriteSummary,
    path: &Path,
) -> io::Result<()> {
    for level in &summary.levels {
        match &level.outcome {
            RewriteOutcome::Fixed {
                diamonds,
                replanned,
                pattern,
            } => {
                let note = if *replanned {
                    " (re-planned over reachable cells)"
                } else {
                    ""
                };
                writeln!(out, "Fixed {} ({diamonds} diamonds){note}", level.name)?;
                if summary.dry_run {
                    writeln!(out, "{pattern}\n")?;
                }
            }
            RewriteOutcome::Failed { error } => writeln!(out, "✗ {}: {error}", level.name)?,
        }
    }

    if summary.dry_run {
        writeln!(out, "\nDry run: {} left untouched.", path.display())
    } else if summary.written {
        writeln!(out, "\n✓ Wrote {}", path.display())
    } else {
        writeln!(out, "\nNothing to write.")
    }
}

/// Integrity failures are listed after advisory summaries.
fn write_integrity(out: &mut impl Write, report: &AuditReport) -> io::Result<()> {
    match report.invalid_count() {
        0 => Ok(()),
        invalid => writeln!(out, "✗ {invalid} cave(s) failed integrity checks."),
    }
}

fn counts(level: &LevelAudit) -> (String, String) {
    match level.outcome {
        LevelOutcome::Checked {
            reachable,
            unreachable,
            ..
        } => (reachable.to_string(), unreachable.to_string()),
        LevelOutcome::Invalid { .. } => ("-".to_owned(), "-".to_owned()),
    }
}

fn status(level: &LevelAudit) -> String {
    match level.outcome {
        LevelOutcome::Invalid { error } => format!("✗ INVALID: {error}"),
        LevelOutcome::Checked { access, .. } if level.passed() => format!("✓ {access}"),
        LevelOutcome::Checked { access, .. } => format!("✗ {access}"),
    }
}

fn advisories(level: &LevelAudit) -> String {
    let mut notes = Vec::new();
    if level.clustering.distribution() == Distribution::Clustered {
        notes.push(format!("clustered ({})", level.clustering.detail()));
    }
    if !level.sealed.is_empty() {
        notes.push(format!("{} sealed", level.sealed.len()));
    }
    if !level.unknown_symbols.is_empty() {
        let symbols: String = level.unknown_symbols.iter().collect();
        notes.push(format!("unknown symbols {symbols:?}"));
    }

    if notes.is_empty() {
        "-".to_owned()
    } else {
        notes.join(", ")
    }
}
