//! One-dimensional cutting-stock optimizer.
//!
//! Given stock bar lengths with quantities, required piece lengths with
//! quantities, and a saw kerf, finds how many bars of each stock length to cut
//! with which pattern so demand is met using as few bars as possible.
//!
//! The run is a straight pipeline: [`patterns`] enumerates every feasible
//! pattern per stock length, [`model`] turns them into an integer program,
//! a [`solver::MilpSolver`] solves it, and [`plan`] decodes the result.
//! [`optimizer::Optimizer`] drives all four.

pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod optimizer;
pub mod patterns;
pub mod plan;
pub mod progress;
pub mod render;
pub mod solver;
pub mod types;

pub use config::{DemandMode, OptimizerConfig, ProblemFile};
pub use error::{Error, Result};
pub use optimizer::{OptimizationJob, Optimizer, Outcome};
pub use types::{CuttingPlan, DemandItem, StockItem};
