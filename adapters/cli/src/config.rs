//! Optional TOML configuration for the audit tool.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use cave_audit_system_clustering::{Clustering, DEFAULT_THRESHOLD_PERCENT};
use cave_audit_system_redistribution::{CandidateScope, ClearedCell, RedistributionOptions};
use cave_audit_system_sealed::{SealedDetector, DEFAULT_HEAVILY_WALLED_THRESHOLD};
use log::LevelFilter;
use serde::Deserialize;

/// Configuration file picked up from the working directory when present.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "cave-audit.toml";
/// Level definition file used when neither flag nor config names one.
pub(crate) const DEFAULT_SOURCE_PATH: &str = "src/classic-levels.js";

/// Settings loaded from `cave-audit.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    source: Option<PathBuf>,
    log_level: Option<String>,
    clustering: ClusteringConfig,
    sealed: SealedConfig,
    redistribution: RedistributionConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ClusteringConfig {
    threshold_percent: u32,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SealedConfig {
    heavily_walled_threshold: usize,
}

impl Default for SealedConfig {
    fn default() -> Self {
        Self {
            heavily_walled_threshold: DEFAULT_HEAVILY_WALLED_THRESHOLD,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RedistributionConfig {
    cleared_cell: ClearedCell,
    reachable_only: bool,
}

impl Config {
    /// Loads the explicit config file, or the default one if it exists.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config at {}", path.display()))
    }

    /// Parses and validates TOML configuration contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config toml")?;
        if config.clustering.threshold_percent > 100 {
            bail!(
                "clustering.threshold_percent must be at most 100, got {}",
                config.clustering.threshold_percent
            );
        }
        if config.sealed.heavily_walled_threshold == 0 {
            bail!("sealed.heavily_walled_threshold must be at least 1");
        }
        if let Some(level) = &config.log_level {
            let _ = parse_level(level)?;
        }
        Ok(config)
    }

    /// Level file to operate on, preferring the command-line override.
    pub(crate) fn source(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.source.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_PATH))
    }

    /// Log level, preferring the command-line override.
    pub(crate) fn log_level(&self, cli: Option<LevelFilter>) -> Result<LevelFilter> {
        match (cli, &self.log_level) {
            (Some(level), _) => Ok(level),
            (None, Some(level)) => parse_level(level),
            (None, None) => Ok(LevelFilter::Warn),
        }
    }

    /// Clustering heuristic configured by the file.
    pub(crate) fn clustering(&self) -> Clustering {
        Clustering::new(self.clustering.threshold_percent)
    }

    /// Sealed-diamond detector configured by the file.
    pub(crate) fn sealed(&self) -> SealedDetector {
        SealedDetector::new(self.sealed.heavily_walled_threshold)
    }

    /// Redistribution options, with command-line switches taking precedence.
    pub(crate) fn redistribution(&self, reachable_only: bool, dirt: bool) -> RedistributionOptions {
        let scope = if reachable_only || self.redistribution.reachable_only {
            CandidateScope::ReachableFromSpawn
        } else {
            CandidateScope::All
        };
        let cleared_cell = if dirt {
            ClearedCell::Dirt
        } else {
            self.redistribution.cleared_cell
        };
        RedistributionOptions {
            scope,
            cleared_cell,
        }
    }
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    level
        .parse()
        .with_context(|| format!("unknown log level `{level}`"))
}
