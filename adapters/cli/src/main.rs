#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that audits and repairs cave definitions.

mod config;
mod logging;
mod report;

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use cave_audit_level_source::LevelSource;
use cave_audit_system_audit::{AuditReport, Auditor};
use cave_audit_system_redistribution::{redistribute_solvable, CandidateScope};
use clap::{Args, Parser, Subcommand};
use log::{info, warn, LevelFilter};

use crate::{
    config::Config,
    report::{LevelRewrite, RewriteOutcome, RewriteSummary},
};

/// Audits diamond placement in hand-authored caves and repairs it on request.
#[derive(Debug, Parser)]
#[command(name = "cave-audit", version, about)]
struct Cli {
    /// Level definition file to read.
    #[arg(long, global = true)]
    source: Option<PathBuf>,
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Minimum severity of log records written to stderr.
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,
    /// Emit the report or redistribution summary as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Flags caves whose diamonds crowd into one or two rows.
    Quality,
    /// Flags diamonds boxed in by walls.
    Sealed,
    /// Checks that every diamond is reachable from the spawn.
    Verify,
    /// Runs every check and prints a combined verdict.
    Audit,
    /// Spreads diamonds evenly across the named caves and writes them back.
    Redistribute(RedistributeArgs),
}

#[derive(Debug, Args)]
struct RedistributeArgs {
    /// Names of the caves to rewrite.
    #[arg(required = true)]
    levels: Vec<String>,
    /// Diamonds to place, defaulting to each cave's requirement.
    #[arg(long)]
    count: Option<u32>,
    /// Only place diamonds on cells reachable from the spawn.
    #[arg(long)]
    reachable_only: bool,
    /// Turn cleared diamonds into dirt instead of empty space.
    #[arg(long)]
    dirt: bool,
    /// Print the rewritten patterns without touching the file.
    #[arg(long)]
    dry_run: bool,
}

/// Entry point for the cave audit command-line interface.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    logging::init(config.log_level(cli.log_level)?)?;

    let path = config.source(cli.source.as_deref());
    let source = LevelSource::load(&path)
        .with_context(|| format!("failed to load levels from {}", path.display()))?;
    info!(
        "auditing {} level(s) from {}",
        source.records().len(),
        path.display()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Redistribute(args) => {
            redistribute(source, &path, &config, &args, cli.json, &mut out)
        }
        command => {
            let report = Auditor::new(config.clustering(), config.sealed()).audit(source.records());
            if cli.json {
                serde_json::to_writer_pretty(&mut out, &report)
                    .context("failed to serialize report")?;
                writeln!(out)?;
            } else {
                match command {
                    Command::Quality => report::write_quality(&mut out, &report)?,
                    Command::Sealed => report::write_sealed(&mut out, &report)?,
                    Command::Verify => report::write_verify(&mut out, &report)?,
                    _ => report::write_audit(&mut out, &report)?,
                }
            }
            Ok(report_exit_code(&report))
        }
    }
}

/// Advisory findings never fail a report; integrity failures do.
fn report_exit_code(report: &AuditReport) -> ExitCode {
    if report.invalid_count() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn redistribute(
    mut source: LevelSource,
    path: &Path,
    config: &Config,
    args: &RedistributeArgs,
    json: bool,
    out: &mut impl Write,
) -> Result<ExitCode> {
    let options = config.redistribution(args.reachable_only, args.dirt);
    let mut levels = Vec::with_capacity(args.levels.len());

    for name in &args.levels {
        let outcome = match source.record(name) {
            None => {
                warn!("no level named {name}");
                RewriteOutcome::Failed {
                    error: "no such level".to_owned(),
                }
            }
            Some(record) => {
                let required = args.count.unwrap_or(record.diamonds_required());
                match redistribute_solvable(record.grid(), required as usize, options) {
                    Ok(result) => {
                        let pattern = result.grid.render();
                        source
                            .replace_grid(name, result.grid)
                            .with_context(|| format!("failed to replace pattern of {name}"))?;
                        RewriteOutcome::Fixed {
                            diamonds: required,
                            replanned: options.scope == CandidateScope::All
                                && result.scope == CandidateScope::ReachableFromSpawn,
                            pattern,
                        }
                    }
                    Err(error) => {
                        warn!("could not redistribute {name}: {error}");
                        RewriteOutcome::Failed {
                            error: error.to_string(),
                        }
                    }
                }
            }
        };
        levels.push(LevelRewrite {
            name: name.clone(),
            outcome,
        });
    }

    let written = !args.dry_run && source.is_modified();
    if written {
        source.write(path)?;
    }

    let summary = RewriteSummary {
        levels,
        dry_run: args.dry_run,
        written,
    };
    if json {
        serde_json::to_writer_pretty(&mut *out, &summary)
            .context("failed to serialize redistribution summary")?;
        writeln!(out)?;
    } else {
        report::write_redistribution(out, &summary, path)?;
    }

    Ok(if summary.failures() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
