use std::time::Duration;

use serde::Serialize;

use crate::error::Result;
use crate::model::CuttingModel;

#[cfg(feature = "highs")]
mod highs;

#[cfg(feature = "highs")]
pub use highs::HighsSolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    /// The time limit expired. Values, if any, are the best found.
    TimeLimit,
    Error,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "optimal"),
            Self::Feasible => write!(f, "feasible"),
            Self::Infeasible => write!(f, "infeasible"),
            Self::TimeLimit => write!(f, "time limit"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What a solver returned: a status and, when one exists, an integer value
/// per model variable in model order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub status: SolveStatus,
    pub values: Option<Vec<u32>>,
}

impl Solution {
    pub fn new(status: SolveStatus, values: Vec<u32>) -> Self {
        Self {
            status,
            values: Some(values),
        }
    }

    pub fn without_values(status: SolveStatus) -> Self {
        Self {
            status,
            values: None,
        }
    }
}

/// Converts a raw solver value to a bar count.
pub fn to_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// A MILP backend. Implementations submit the model as given and report the
/// status they observed; they never retry or relax the model.
pub trait MilpSolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Solves `model`, stopping after `time_limit` when one is given.
    ///
    /// Infeasibility and time limits are statuses, not errors. `Err` is
    /// reserved for backend faults.
    fn solve(&self, model: &CuttingModel, time_limit: Option<Duration>) -> Result<Solution>;
}

impl<S: MilpSolver + ?Sized> MilpSolver for std::sync::Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, model: &CuttingModel, time_limit: Option<Duration>) -> Result<Solution> {
        (**self).solve(model, time_limit)
    }
}
