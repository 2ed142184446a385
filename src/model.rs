//! Integer program over the generated patterns.
//!
//! One integer variable per (stock length, pattern) counts the bars cut with
//! that pattern. Variables are laid out stock by stock, patterns in generation
//! order, and that layout is the index space of every solution vector.

use crate::config::DemandMode;
use crate::types::{DemandItem, Pattern, StockItem};

#[derive(Debug, Clone, PartialEq)]
pub struct StockPatterns {
    pub stock_length: u32,
    pub quantity: u32,
    pub patterns: Vec<Pattern>,
}

/// Collapses repeated stock lengths into one entry, summing quantities and
/// keeping first-appearance order.
pub fn merge_stock(stock: &[StockItem]) -> Vec<StockItem> {
    let mut merged: Vec<StockItem> = Vec::with_capacity(stock.len());
    for item in stock {
        match merged.iter_mut().find(|m| m.length == item.length) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity)
            }
            None => merged.push(*item),
        }
    }
    merged
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternVar {
    /// Index into the `StockPatterns` slice the model was built from.
    pub stock: usize,
    /// Index into that stock length's patterns.
    pub pattern: usize,
    pub upper_bound: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    LessEqual,
    GreaterEqual,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Inventory { stock_length: u32 },
    Demand { slot: usize, length: u32 },
}

/// `sum(coefficient * x[var]) <sense> rhs`. Zero coefficients are omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub kind: ConstraintKind,
    pub terms: Vec<(usize, u32)>,
    pub sense: Sense,
    pub rhs: u32,
}

impl LinearConstraint {
    pub fn lhs(&self, values: &[u32]) -> u64 {
        self.terms
            .iter()
            .map(|&(var, coef)| coef as u64 * values.get(var).copied().unwrap_or(0) as u64)
            .sum()
    }

    pub fn is_satisfied_by(&self, values: &[u32]) -> bool {
        let lhs = self.lhs(values);
        let rhs = self.rhs as u64;
        match self.sense {
            Sense::LessEqual => lhs <= rhs,
            Sense::GreaterEqual => lhs >= rhs,
            Sense::Equal => lhs == rhs,
        }
    }
}

/// Minimize the number of bars: every variable has objective coefficient 1.
#[derive(Debug, Clone, PartialEq)]
pub struct CuttingModel {
    variables: Vec<PatternVar>,
    constraints: Vec<LinearConstraint>,
    demand_mode: DemandMode,
}

impl CuttingModel {
    pub fn build(stock: &[StockPatterns], demands: &[DemandItem], demand_mode: DemandMode) -> Self {
        let mut variables = Vec::new();
        let mut constraints = Vec::with_capacity(stock.len() + demands.len());

        for (si, sp) in stock.iter().enumerate() {
            let first = variables.len();
            variables.extend((0..sp.patterns.len()).map(|pi| PatternVar {
                stock: si,
                pattern: pi,
                upper_bound: sp.quantity,
            }));
            constraints.push(LinearConstraint {
                kind: ConstraintKind::Inventory {
                    stock_length: sp.stock_length,
                },
                terms: (first..variables.len()).map(|v| (v, 1)).collect(),
                sense: Sense::LessEqual,
                rhs: sp.quantity,
            });
        }

        let sense = match demand_mode {
            DemandMode::Exact => Sense::Equal,
            DemandMode::LowerBound => Sense::GreaterEqual,
        };
        for (slot, demand) in demands.iter().enumerate() {
            let terms = variables
                .iter()
                .enumerate()
                .filter_map(|(v, var)| {
                    let coef = stock[var.stock].patterns[var.pattern]
                        .combo
                        .get(slot)
                        .copied()
                        .unwrap_or(0);
                    (coef > 0).then_some((v, coef))
                })
                .collect();
            constraints.push(LinearConstraint {
                kind: ConstraintKind::Demand {
                    slot,
                    length: demand.length,
                },
                terms,
                sense,
                rhs: demand.quantity,
            });
        }

        Self {
            variables,
            constraints,
            demand_mode,
        }
    }

    pub fn variables(&self) -> &[PatternVar] {
        &self.variables
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn demand_mode(&self) -> DemandMode {
        self.demand_mode
    }

    pub fn objective_coefficients(&self) -> impl Iterator<Item = u32> + '_ {
        self.variables.iter().map(|_| 1)
    }

    pub fn objective_value(&self, values: &[u32]) -> u64 {
        values.iter().map(|&v| v as u64).sum()
    }

    pub fn is_satisfied_by(&self, values: &[u32]) -> bool {
        values.len() == self.variables.len()
            && values
                .iter()
                .zip(&self.variables)
                .all(|(&v, var)| v <= var.upper_bound)
            && self.constraints.iter().all(|c| c.is_satisfied_by(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::generate_patterns;

    fn reference_stock() -> Vec<StockPatterns> {
        let lengths = [2465, 2015];
        vec![
            StockPatterns {
                stock_length: 6000,
                quantity: 2,
                patterns: generate_patterns(6000, &lengths, 5),
            },
            StockPatterns {
                stock_length: 2000,
                quantity: 7,
                patterns: generate_patterns(2000, &lengths, 5),
            },
        ]
    }

    fn demands() -> Vec<DemandItem> {
        vec![DemandItem::new(2465, 2), DemandItem::new(2015, 1)]
    }

    #[test]
    fn test_variable_layout_and_bounds() {
        let stock = reference_stock();
        let model = CuttingModel::build(&stock, &demands(), DemandMode::Exact);
        assert_eq!(model.variables().len(), 5);
        for (i, var) in model.variables().iter().enumerate() {
            assert_eq!(var.stock, 0);
            assert_eq!(var.pattern, i);
            assert_eq!(var.upper_bound, 2);
        }
        assert_eq!(model.objective_coefficients().collect::<Vec<_>>(), vec![1; 5]);
    }

    #[test]
    fn test_unusable_stock_gets_empty_inventory_constraint() {
        let stock = reference_stock();
        let model = CuttingModel::build(&stock, &demands(), DemandMode::Exact);
        let inventory = &model.constraints()[1];
        assert_eq!(inventory.kind, ConstraintKind::Inventory { stock_length: 2000 });
        assert!(inventory.terms.is_empty());
        assert!(inventory.is_satisfied_by(&[]));
    }

    #[test]
    fn test_demand_constraints_follow_mode() {
        let stock = reference_stock();
        let exact = CuttingModel::build(&stock, &demands(), DemandMode::Exact);
        let lower = CuttingModel::build(&stock, &demands(), DemandMode::LowerBound);
        assert_eq!(exact.demand_mode(), DemandMode::Exact);

        let exact_demand = &exact.constraints()[2];
        assert_eq!(exact_demand.sense, Sense::Equal);
        assert_eq!(exact_demand.rhs, 2);
        // combos (0,1) (0,2) (1,0) (1,1) (2,0): slot 0 appears in vars 2, 3, 4
        assert_eq!(exact_demand.terms, vec![(2, 1), (3, 1), (4, 2)]);

        assert_eq!(lower.constraints()[2].sense, Sense::GreaterEqual);
        assert_eq!(lower.constraints()[3].terms, vec![(0, 1), (1, 2), (3, 1)]);
    }

    #[test]
    fn test_is_satisfied_by() {
        let stock = reference_stock();
        let exact = CuttingModel::build(&stock, &demands(), DemandMode::Exact);
        let lower = CuttingModel::build(&stock, &demands(), DemandMode::LowerBound);

        // (2,0) + (0,1)
        let plan = [1, 0, 0, 0, 1];
        assert!(exact.is_satisfied_by(&plan));
        assert_eq!(exact.objective_value(&plan), 2);

        // (2,0) + (1,1) overproduces slot 0
        let over = [0, 0, 0, 1, 1];
        assert!(!exact.is_satisfied_by(&over));
        assert!(lower.is_satisfied_by(&over));

        // three bars exceed inventory of two
        assert!(!lower.is_satisfied_by(&[1, 0, 0, 1, 1]));
        // wrong vector length
        assert!(!exact.is_satisfied_by(&[1, 0]));
    }

    #[test]
    fn test_merge_stock() {
        let merged = merge_stock(&[
            StockItem::new(6000, 3),
            StockItem::new(5400, 1),
            StockItem::new(6000, 2),
        ]);
        assert_eq!(merged, vec![StockItem::new(6000, 5), StockItem::new(5400, 1)]);
    }
}
