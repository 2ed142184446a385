use std::sync::Arc;
use std::sync::atomic::AtomicU8;
use std::thread::JoinHandle;
use std::time::Instant;

use serde::Serialize;

use crate::config::OptimizerConfig;
use crate::error::{Error, Result};
use crate::input;
use crate::model::{CuttingModel, StockPatterns, merge_stock};
use crate::patterns::{generate_patterns_until, grid_size};
use crate::plan::{Decoded, PlanDecoder};
use crate::progress::{CancelToken, ProgressCallback, ProgressReporter, checkpoint};
use crate::solver::{MilpSolver, SolveStatus};
use crate::types::{CuttingPlan, DemandItem, StockItem};

/// How a run ended, short of an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Planned(CuttingPlan),
    /// No assignment satisfies inventory and demand.
    Infeasible,
    /// The solver ran out of time. `best_bars` is the bar count of the
    /// incumbent it had, when it had one and it was not accepted.
    TimeLimitExceeded { best_bars: Option<u64> },
    Cancelled,
}

impl Outcome {
    pub fn plan(&self) -> Option<&CuttingPlan> {
        match self {
            Outcome::Planned(plan) => Some(plan),
            _ => None,
        }
    }
}

pub struct Optimizer<S> {
    solver: S,
    config: OptimizerConfig,
    cancel: CancelToken,
    progress: ProgressReporter,
}

impl<S: MilpSolver> Optimizer<S> {
    pub fn new(solver: S, config: OptimizerConfig) -> Self {
        Self {
            solver,
            config,
            cancel: CancelToken::new(),
            progress: ProgressReporter::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = self.progress.with_callback(callback);
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn run(&self, stock: &[StockItem], demands: &[DemandItem]) -> Result<Outcome> {
        input::validate(stock, demands)?;
        let started = Instant::now();
        let stock = merge_stock(stock);
        tracing::info!(
            stock_lengths = stock.len(),
            demand_slots = demands.len(),
            kerf = self.config.kerf_width,
            mode = %self.config.demand_mode,
            "optimization started"
        );

        let Some(stock_patterns) = self.generate(&stock, demands) else {
            return Ok(self.cancelled());
        };

        let model = CuttingModel::build(&stock_patterns, demands, self.config.demand_mode);
        tracing::debug!(
            variables = model.variables().len(),
            constraints = model.constraints().len(),
            "model built"
        );
        self.progress.report(checkpoint::MODEL_BUILT);
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled());
        }

        self.progress.report(checkpoint::SOLVER_STARTED);
        let solution = self.solver.solve(&model, self.config.time_limit())?;
        self.progress.report(checkpoint::SOLVER_FINISHED);
        tracing::info!(
            solver = self.solver.name(),
            status = %solution.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solver finished"
        );
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled());
        }

        if let Some(values) = &solution.values
            && values.len() != model.variables().len()
        {
            return Err(Error::Solver {
                solver: self.solver.name(),
                reason: format!(
                    "returned {} values for {} variables",
                    values.len(),
                    model.variables().len()
                ),
            });
        }

        let decoded = PlanDecoder::new(&stock_patterns, demands)
            .accept_time_limit(self.config.accept_time_limit)
            .with_cancel_token(self.cancel.clone())
            .decode(&solution);
        self.progress.report(checkpoint::DECODED);

        let outcome = match decoded {
            Decoded::Plan(plan) => {
                tracing::info!(
                    bars = plan.statistics.bars_used,
                    utilization = plan.statistics.overall_utilization,
                    "plan ready"
                );
                Outcome::Planned(plan)
            }
            Decoded::Cancelled => return Ok(self.cancelled()),
            Decoded::Rejected(SolveStatus::Infeasible) => {
                tracing::warn!("no feasible plan found");
                Outcome::Infeasible
            }
            Decoded::Rejected(SolveStatus::TimeLimit) => {
                let best_bars = solution.values.as_deref().map(|v| model.objective_value(v));
                tracing::warn!(?best_bars, "time limit reached without an accepted plan");
                Outcome::TimeLimitExceeded { best_bars }
            }
            Decoded::Rejected(status) => {
                return Err(Error::Solver {
                    solver: self.solver.name(),
                    reason: format!("unusable solver status: {status}"),
                });
            }
        };
        self.progress.report(checkpoint::DONE);
        Ok(outcome)
    }

    fn generate(&self, stock: &[StockItem], demands: &[DemandItem]) -> Option<Vec<StockPatterns>> {
        let lengths: Vec<u32> = demands.iter().map(|d| d.length).collect();
        let mut out = Vec::with_capacity(stock.len());
        for (i, item) in stock.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return None;
            }
            let patterns =
                generate_patterns_until(item.length, &lengths, self.config.kerf_width, &self.cancel)?;
            tracing::debug!(
                stock_length = item.length,
                grid = %grid_size(item.length, &lengths),
                patterns = patterns.len(),
                "patterns generated"
            );
            out.push(StockPatterns {
                stock_length: item.length,
                quantity: item.quantity,
                patterns,
            });
            self.progress
                .report_fraction(i + 1, stock.len(), checkpoint::GENERATED);
        }
        Some(out)
    }

    fn cancelled(&self) -> Outcome {
        tracing::info!("optimization cancelled");
        Outcome::Cancelled
    }
}

/// An optimization running on a background thread.
pub struct OptimizationJob {
    handle: JoinHandle<Result<Outcome>>,
    cancel: CancelToken,
    progress: Arc<AtomicU8>,
}

impl OptimizationJob {
    /// Moves the inputs onto a new thread and starts the run there.
    pub fn spawn<S>(
        solver: S,
        config: OptimizerConfig,
        stock: Vec<StockItem>,
        demands: Vec<DemandItem>,
    ) -> Self
    where
        S: MilpSolver + 'static,
    {
        let cancel = CancelToken::new();
        let progress = Arc::new(AtomicU8::new(0));
        let optimizer = Optimizer::new(solver, config)
            .with_cancel_token(cancel.clone())
            .with_progress(ProgressReporter::new().with_counter(Arc::clone(&progress)));
        let handle = std::thread::spawn(move || optimizer.run(&stock, &demands));
        Self {
            handle,
            cancel,
            progress,
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress.load(std::sync::atomic::Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> Result<Outcome> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(Error::Solver {
                solver: "job",
                reason: "optimization thread panicked".to_string(),
            }),
        }
    }
}
