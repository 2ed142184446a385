use std::time::Duration;

use good_lp::solvers::highs::highs;
use good_lp::{
    Expression, ResolutionError, Solution as _, SolutionStatus as LpStatus, SolverModel,
    Variable, constraint, variable, variables,
};

use super::{MilpSolver, Solution, SolveStatus, to_count};
use crate::error::{Error, Result};
use crate::model::{CuttingModel, Sense};

const NAME: &str = "highs";

/// HiGHS stops a MIP once the relative gap is below `mip_rel_gap` and calls
/// that optimal. Bar counts are integral, so it is reported as optimal here too.
fn status_of(status: LpStatus) -> SolveStatus {
    #[allow(unreachable_patterns)]
    match status {
        LpStatus::Optimal | LpStatus::GapLimit => SolveStatus::Optimal,
        LpStatus::TimeLimit => SolveStatus::TimeLimit,
        _ => SolveStatus::Feasible,
    }
}

#[derive(Debug, Default, Clone)]
pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl MilpSolver for HighsSolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn solve(&self, model: &CuttingModel, time_limit: Option<Duration>) -> Result<Solution> {
        // HiGHS rejects an empty model, and there is nothing to decide anyway.
        if model.variables().is_empty() {
            return Ok(if model.is_satisfied_by(&[]) {
                Solution::new(SolveStatus::Optimal, vec![])
            } else {
                Solution::without_values(SolveStatus::Infeasible)
            });
        }

        let mut vars = variables!();
        let handles: Vec<Variable> = model
            .variables()
            .iter()
            .map(|v| vars.add(variable().integer().min(0).max(v.upper_bound)))
            .collect();

        let objective: Expression = handles
            .iter()
            .zip(model.objective_coefficients())
            .map(|(v, c)| c as f64 * *v)
            .sum();

        let mut problem = vars.minimise(&objective).using(highs);
        if let Some(limit) = time_limit {
            problem = problem.set_time_limit(limit.as_secs_f64());
        }

        for c in model.constraints() {
            let lhs: Expression = c
                .terms
                .iter()
                .map(|&(var, coef)| coef as f64 * handles[var])
                .sum();
            let rhs = c.rhs as f64;
            problem = match c.sense {
                Sense::LessEqual => problem.with(constraint!(lhs <= rhs)),
                Sense::GreaterEqual => problem.with(constraint!(lhs >= rhs)),
                Sense::Equal => problem.with(constraint!(lhs == rhs)),
            };
        }

        match problem.solve() {
            Ok(solution) => {
                let status = status_of(solution.status());
                let values: Vec<u32> = handles
                    .iter()
                    .map(|&v| to_count(solution.value(v)))
                    .collect();

                if model.is_satisfied_by(&values) {
                    Ok(Solution::new(status, values))
                } else if status == SolveStatus::TimeLimit {
                    // Stopped before any incumbent was found.
                    Ok(Solution::without_values(status))
                } else {
                    Err(Error::Solver {
                        solver: NAME,
                        reason: format!("{status} solution violates the model"),
                    })
                }
            }
            Err(ResolutionError::Infeasible) => {
                Ok(Solution::without_values(SolveStatus::Infeasible))
            }
            Err(e) => Err(Error::Solver {
                solver: NAME,
                reason: e.to_string(),
            }),
        }
    }
}
