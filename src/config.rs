use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{DemandItem, StockItem, deserialize_u32_from_number};

/// How demand constraints bound production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DemandMode {
    /// Produce exactly the requested quantity of every length.
    #[default]
    Exact,
    /// Produce at least the requested quantity; overproduction is allowed.
    LowerBound,
}

impl std::fmt::Display for DemandMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemandMode::Exact => write!(f, "exact"),
            DemandMode::LowerBound => write!(f, "lower-bound"),
        }
    }
}

impl std::str::FromStr for DemandMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "exact" => Ok(DemandMode::Exact),
            "lower-bound" => Ok(DemandMode::LowerBound),
            _ => Err(format!(
                "invalid demand mode '{}', expected: exact or lower-bound",
                s
            )),
        }
    }
}

fn default_kerf_width() -> u32 {
    5
}

fn default_time_limit_secs() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Blade kerf in mm, lost at every cut between two pieces.
    #[serde(
        default = "default_kerf_width",
        deserialize_with = "deserialize_u32_from_number"
    )]
    pub kerf_width: u32,

    /// Wall-clock budget for the solver; 0 disables the limit.
    #[serde(
        default = "default_time_limit_secs",
        deserialize_with = "deserialize_u32_from_number"
    )]
    pub time_limit_secs: u32,

    #[serde(default)]
    pub demand_mode: DemandMode,

    /// Whether a best-found plan from a time-limited solve is returned.
    #[serde(default = "default_true")]
    pub accept_time_limit: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            kerf_width: default_kerf_width(),
            time_limit_secs: default_time_limit_secs(),
            demand_mode: DemandMode::default(),
            accept_time_limit: true,
        }
    }
}

impl OptimizerConfig {
    pub fn with_kerf_width(mut self, kerf_width: u32) -> Self {
        self.kerf_width = kerf_width;
        self
    }

    pub fn with_time_limit_secs(mut self, secs: u32) -> Self {
        self.time_limit_secs = secs;
        self
    }

    pub fn with_demand_mode(mut self, mode: DemandMode) -> Self {
        self.demand_mode = mode;
        self
    }

    pub fn with_accept_time_limit(mut self, accept: bool) -> Self {
        self.accept_time_limit = accept;
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_secs > 0).then(|| Duration::from_secs(self.time_limit_secs as u64))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemFile {
    pub stock: Vec<StockItem>,
    pub demands: Vec<DemandItem>,
    #[serde(flatten)]
    pub config: OptimizerConfig,
}

impl ProblemFile {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
