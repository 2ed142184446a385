//! Turns a solved model back into a cutting plan.
//!
//! Values are read in model order: stock by stock, then pattern by pattern.
//! Serial numbers follow the same order.

use crate::model::StockPatterns;
use crate::progress::CancelToken;
use crate::solver::{Solution, SolveStatus};
use crate::types::{
    CutRecord, CuttingPlan, DemandCompletionRow, DemandItem, PlanStatistics, PlanSummaryRow,
    describe_pieces, round2,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Plan(CuttingPlan),
    /// The status is not in the accepted set, or there are no values.
    Rejected(SolveStatus),
    Cancelled,
}

pub struct PlanDecoder<'a> {
    stock: &'a [StockPatterns],
    demands: &'a [DemandItem],
    accept_time_limit: bool,
    cancel: CancelToken,
}

impl<'a> PlanDecoder<'a> {
    pub fn new(stock: &'a [StockPatterns], demands: &'a [DemandItem]) -> Self {
        Self {
            stock,
            demands,
            accept_time_limit: true,
            cancel: CancelToken::new(),
        }
    }

    pub fn accept_time_limit(mut self, accept: bool) -> Self {
        self.accept_time_limit = accept;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn accepts(&self, status: SolveStatus) -> bool {
        match status {
            SolveStatus::Optimal | SolveStatus::Feasible => true,
            SolveStatus::TimeLimit => self.accept_time_limit,
            SolveStatus::Infeasible | SolveStatus::Error => false,
        }
    }

    pub fn decode(&self, solution: &Solution) -> Decoded {
        let values = match &solution.values {
            Some(values) if self.accepts(solution.status) => values,
            _ => return Decoded::Rejected(solution.status),
        };

        let lengths: Vec<u32> = self.demands.iter().map(|d| d.length).collect();
        let mut produced = vec![0u64; self.demands.len()];
        let mut cuts = Vec::new();
        let mut summary = Vec::new();
        let mut stats = PlanStatistics::default();
        let mut serial = 1u32;
        let mut var = 0usize;

        for sp in self.stock {
            if self.cancel.is_cancelled() {
                return Decoded::Cancelled;
            }
            let stock_length = sp.stock_length as u64;
            for pattern in &sp.patterns {
                let used = values.get(var).copied().unwrap_or(0);
                var += 1;
                if used == 0 {
                    continue;
                }
                if self.cancel.is_cancelled() {
                    return Decoded::Cancelled;
                }

                let pieces = pattern.pieces(&lengths);
                let composition = describe_pieces(&pieces);
                let bars = used as u64;
                let total_waste = pattern.waste * bars;
                let bars_length = stock_length * bars;

                summary.push(PlanSummaryRow {
                    stock_length: sp.stock_length,
                    times_used: used,
                    pattern: composition.clone(),
                    total_waste,
                    total_kerf_loss: pattern.kerf_loss * bars,
                    average_utilization: pattern.utilization,
                    overall_utilization: round2(
                        (bars_length - total_waste) as f64 / bars_length as f64 * 100.0,
                    ),
                });

                for _ in 0..used {
                    cuts.push(CutRecord {
                        serial,
                        stock_length: sp.stock_length,
                        pieces: pieces.clone(),
                        composition: composition.clone(),
                        total_consumed: pattern.consumption(),
                        kerf_loss: pattern.kerf_loss,
                        waste: pattern.waste,
                        utilization: pattern.utilization,
                    });
                    serial += 1;
                }

                for (slot, &count) in pattern.combo.iter().enumerate() {
                    if let Some(total) = produced.get_mut(slot) {
                        *total += count as u64 * bars;
                    }
                }
                stats.bars_used += bars;
                stats.total_stock_length += bars_length;
                stats.total_pieces += pattern.piece_count() as u64 * bars;
                stats.total_finished_length += pattern.pieces_length * bars;
                stats.max_waste = stats.max_waste.max(pattern.waste);
            }
        }

        stats.overall_utilization = if stats.total_stock_length == 0 {
            0.0
        } else {
            round2(stats.total_finished_length as f64 / stats.total_stock_length as f64 * 100.0)
        };

        let demand_completion = self
            .demands
            .iter()
            .zip(&produced)
            .map(|(d, &made)| completion_row(d, made))
            .collect();

        Decoded::Plan(CuttingPlan {
            status: solution.status,
            cuts,
            summary,
            demand_completion,
            statistics: stats,
        })
    }
}

/// Completion is reported capped at the requested quantity. A demand of zero
/// counts as complete.
pub fn completion_row(demand: &DemandItem, produced: u64) -> DemandCompletionRow {
    let completed = produced.min(demand.quantity as u64) as u32;
    let completion_rate = if demand.quantity == 0 {
        100.0
    } else {
        round2(100.0 * completed as f64 / demand.quantity as f64).min(100.0)
    };
    DemandCompletionRow {
        length: demand.length,
        requested: demand.quantity,
        produced,
        completed,
        completion_rate,
    }
}
