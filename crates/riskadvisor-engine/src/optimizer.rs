//! Portfolio optimizer: single-objective solves, the budget-sweep Pareto
//! frontier, and tolerance-driven selection of one recommended point.

use std::collections::BTreeMap;

use riskadvisor_core::{Portfolio, StrategyAttribute, StrategyCatalog, StrategyId};

use crate::config::OptimizerConfig;
use crate::montecarlo;
use crate::sensitivity;
use crate::solver::{self, Item};
use crate::types::{Objective, RiskTolerance};

/// Lowest sweep point as a share of the budget limit.
const SWEEP_FLOOR: f64 = 0.3;

/// Optimizer over one read-only catalog snapshot.
pub struct PortfolioOptimizer<'a> {
    catalog: &'a StrategyCatalog,
    config: &'a OptimizerConfig,
}

impl<'a> PortfolioOptimizer<'a> {
    pub fn new(catalog: &'a StrategyCatalog, config: &'a OptimizerConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &StrategyCatalog {
        self.catalog
    }

    pub fn config(&self) -> &OptimizerConfig {
        self.config
    }

    /// Solve the 0/1 selection program for one objective with
    /// `total cost <= budget_limit` as the only hard constraint.
    ///
    /// Cost and timeline objectives minimize a non-negative sum, so with
    /// nothing forcing a selection they return the empty portfolio.
    /// An empty catalog or an unaffordable one also yields the empty
    /// portfolio.
    pub fn optimize_single_objective(
        &self,
        objective: Objective,
        budget_limit: f64,
        timeline_limit: u32,
    ) -> Portfolio {
        let items: Vec<Item> = self
            .catalog
            .iter()
            .map(|s| Item {
                value: match objective {
                    Objective::RiskReduction => s.risk_reduction_pct(),
                    Objective::Cost => -s.cost_estimate(),
                    Objective::Timeline => -(s.time_estimate() as f64),
                },
                cost: s.cost_estimate(),
            })
            .collect();

        let selection = solver::solve(&items, budget_limit);
        let chosen = selection
            .chosen
            .iter()
            .map(|&i| self.catalog.strategies()[i].clone())
            .collect();

        Portfolio::from_selection(chosen).with_limits(budget_limit, timeline_limit)
    }

    /// Approximate the frontier by sweeping the budget from 30% to 100% of
    /// `budget_limit` in `n_solutions` even steps and keeping every sweep
    /// result no other result dominates, ranked in sweep order.
    ///
    /// The empty portfolio is never dominated, so a sweep point that
    /// affords nothing stays on the frontier. Repeated selections are kept:
    /// equal points do not dominate each other.
    pub fn optimize_pareto(
        &self,
        budget_limit: f64,
        timeline_limit: u32,
        n_solutions: usize,
    ) -> Vec<Portfolio> {
        let candidates: Vec<Portfolio> = sweep(budget_limit, n_solutions)
            .into_iter()
            .map(|budget| {
                let solution = self.optimize_single_objective(
                    Objective::RiskReduction,
                    budget,
                    timeline_limit,
                );
                tracing::debug!(
                    budget,
                    selected = solution.len(),
                    risk_reduction = solution.total_risk_reduction,
                    "Pareto sweep point solved"
                );
                solution.with_limits(budget_limit, timeline_limit)
            })
            .collect();

        let frontier: Vec<Portfolio> = candidates
            .iter()
            .filter(|p| !candidates.iter().any(|other| other.dominates(p)))
            .cloned()
            .enumerate()
            .map(|(i, p)| p.with_rank(i as u32 + 1))
            .collect();

        tracing::debug!(
            sweep_points = n_solutions,
            frontier = frontier.len(),
            "Pareto frontier built"
        );
        frontier
    }

    /// Fill in 5th/95th percentile bounds with `n_simulations` draws.
    ///
    /// The generator is local to this call, seeded from the configuration
    /// when a seed is set.
    pub fn monte_carlo_analysis(&self, portfolio: &Portfolio, n_simulations: usize) -> Portfolio {
        let mut rng = montecarlo::rng_for(self.config.seed);
        let bounds = montecarlo::simulate(portfolio, n_simulations, &mut rng);
        portfolio.clone().with_uncertainty(bounds)
    }

    /// Relative change in total risk reduction when each selected strategy's
    /// `attribute` rises by 20%.
    pub fn sensitivity_analysis(
        &self,
        portfolio: &Portfolio,
        attribute: StrategyAttribute,
        timeline_limit: u32,
    ) -> BTreeMap<StrategyId, f64> {
        sensitivity::analyze(self, portfolio, attribute, timeline_limit)
    }

    /// One recommended portfolio for a risk tolerance, with uncertainty bounds.
    pub fn get_optimal_portfolio(
        &self,
        budget_limit: f64,
        timeline_limit: u32,
        risk_tolerance: RiskTolerance,
    ) -> Portfolio {
        let frontier =
            self.optimize_pareto(budget_limit, timeline_limit, self.config.pareto_solutions);
        let Some(selected) = select_point(&frontier, risk_tolerance) else {
            tracing::info!(budget_limit, "No affordable strategy; returning empty portfolio");
            return Portfolio::empty().with_limits(budget_limit, timeline_limit);
        };

        let result = self.monte_carlo_analysis(selected, self.config.monte_carlo_simulations);
        tracing::info!(
            ?risk_tolerance,
            pareto_rank = result.pareto_rank,
            total_cost = result.total_cost,
            risk_reduction = result.total_risk_reduction,
            strategies = result.len(),
            "Optimal portfolio selected"
        );
        result
    }
}

/// `n` evenly spaced budgets from 30% to 100% of `budget_limit`.
///
/// A single point sits at the low end of the range.
pub fn sweep(budget_limit: f64, n: usize) -> Vec<f64> {
    let start = budget_limit * SWEEP_FLOOR;
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (budget_limit - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { budget_limit } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Pick one frontier point. Ties go to the earliest point.
pub fn select_point(frontier: &[Portfolio], tolerance: RiskTolerance) -> Option<&Portfolio> {
    let key = |p: &Portfolio| match tolerance {
        RiskTolerance::Aggressive => p.total_risk_reduction,
        RiskTolerance::Conservative => -p.total_cost,
        RiskTolerance::Balanced => p.cost_effectiveness(),
    };

    let mut best: Option<&Portfolio> = None;
    for candidate in frontier {
        match best {
            Some(current) if key(candidate) <= key(current) => {}
            _ => best = Some(candidate),
        }
    }
    best
}
