//! One-at-a-time sensitivity of a portfolio's risk reduction.
//!
//! Each selected strategy is bumped by 20% on one attribute in a perturbed
//! copy of the catalog, and the risk objective is re-solved against the
//! portfolio's own total cost. The caller's catalog is never touched.

use std::collections::BTreeMap;

use riskadvisor_core::{Portfolio, StrategyAttribute, StrategyId};

use crate::optimizer::PortfolioOptimizer;
use crate::types::Objective;

const BUMP: f64 = 1.2;

pub fn analyze(
    optimizer: &PortfolioOptimizer<'_>,
    portfolio: &Portfolio,
    attribute: StrategyAttribute,
    timeline_limit: u32,
) -> BTreeMap<StrategyId, f64> {
    let budget = portfolio.total_cost;
    let baseline = portfolio.total_risk_reduction;

    portfolio
        .strategies
        .iter()
        .map(|strategy| {
            let perturbed = optimizer
                .catalog()
                .with_replaced(&strategy.scaled(attribute, BUMP));
            let rerun = PortfolioOptimizer::new(&perturbed, optimizer.config())
                .optimize_single_objective(Objective::RiskReduction, budget, timeline_limit);

            let delta = relative_change(baseline, rerun.total_risk_reduction);
            tracing::debug!(
                strategy = %strategy.id(),
                ?attribute,
                delta,
                "Sensitivity computed"
            );
            (strategy.id().clone(), delta)
        })
        .collect()
}

fn relative_change(baseline: f64, value: f64) -> f64 {
    if baseline > 0.0 {
        (value - baseline) / baseline
    } else {
        0.0
    }
}
