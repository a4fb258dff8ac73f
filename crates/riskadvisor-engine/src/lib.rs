//! riskadvisor-engine: Optimization and robustness engines for mitigation
//! strategy portfolios.
//!
//! Three engines share one read-only strategy catalog per call:
//! the portfolio optimizer (0/1 selection, budget-sweep Pareto frontier,
//! Monte Carlo bounds, sensitivity), the Red/Blue/Purple adversarial
//! validator, and the multi-horizon scheduler. [`AdvisorEngine`] validates
//! caller input and wires the configured settings into each of them.

pub mod attacks;
pub mod config;
pub mod error;
pub mod horizons;
pub mod montecarlo;
pub mod optimizer;
pub mod package;
pub mod sensitivity;
pub mod solver;
pub mod trail;
pub mod types;
pub mod wargame;

pub use config::{EngineConfig, HorizonAllocation, OptimizerConfig, WargameConfig};
pub use error::EngineError;
pub use horizons::{Horizon, MultiHorizonPlan};
pub use package::DecisionPackage;
pub use types::{
    HorizonRequest, Objective, OptimizeRequest, PackageRequest, ParetoRequest, RiskTolerance,
    SensitivityReport, SensitivityRequest, WargameRequest,
};
pub use wargame::{Grade, RobustnessAssessment};

use riskadvisor_core::{Portfolio, Strategy, StrategyCatalog};

use crate::error::{check_budget, check_count, check_risk_score, Result};
use crate::horizons::MultiHorizonScheduler;
use crate::optimizer::PortfolioOptimizer;
use crate::wargame::PurpleTeam;

/// Entry point for every engine operation.
///
/// Holds only configuration; each call takes its own catalog snapshot, so
/// one engine can serve independent runs side by side.
#[derive(Debug, Clone)]
pub struct AdvisorEngine {
    config: EngineConfig,
}

impl AdvisorEngine {
    /// Build an engine, rejecting settings the engines cannot honor.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let opt = &config.optimizer;
        check_count("optimizer.pareto_solutions", opt.pareto_solutions, opt.max_pareto_solutions)?;
        check_count(
            "optimizer.monte_carlo_simulations",
            opt.monte_carlo_simulations,
            opt.max_monte_carlo_simulations,
        )?;

        let fraction = config.wargame.backup_budget_fraction;
        if !(fraction.is_finite() && fraction > 0.0 && fraction <= 1.0) {
            return Err(EngineError::InvalidInput {
                parameter: "wargame.backup_budget_fraction",
                reason: format!("expected a value in (0, 1], got {fraction}"),
            });
        }

        horizons::validate_allocation(&config.horizons)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn timeline_or_default(&self, timeline_limit: Option<u32>) -> u32 {
        timeline_limit.unwrap_or(self.config.optimizer.default_timeline_days)
    }

    /// One recommended portfolio for the request's risk tolerance.
    pub fn optimize(&self, request: &OptimizeRequest) -> Result<Portfolio> {
        check_budget("budget_limit", request.budget_limit)?;
        let timeline = self.timeline_or_default(request.timeline_limit);

        let optimizer = PortfolioOptimizer::new(&request.strategies, &self.config.optimizer);
        Ok(optimizer.get_optimal_portfolio(request.budget_limit, timeline, request.risk_tolerance))
    }

    /// Non-dominated portfolios from an `n_solutions`-point budget sweep.
    pub fn pareto_frontier(&self, request: &ParetoRequest) -> Result<Vec<Portfolio>> {
        check_budget("budget_limit", request.budget_limit)?;
        let n = request.n_solutions.unwrap_or(self.config.optimizer.pareto_solutions);
        check_count("n_solutions", n, self.config.optimizer.max_pareto_solutions)?;
        let timeline = self.timeline_or_default(request.timeline_limit);

        let optimizer = PortfolioOptimizer::new(&request.strategies, &self.config.optimizer);
        Ok(optimizer.optimize_pareto(request.budget_limit, timeline, n))
    }

    /// Attach 5th/95th percentile bounds from `n_simulations` draws.
    pub fn monte_carlo(&self, portfolio: &Portfolio, n_simulations: usize) -> Result<Portfolio> {
        check_count(
            "n_simulations",
            n_simulations,
            self.config.optimizer.max_monte_carlo_simulations,
        )?;
        let mut rng = montecarlo::rng_for(self.config.optimizer.seed);
        let bounds = montecarlo::simulate(portfolio, n_simulations, &mut rng);
        Ok(portfolio.clone().with_uncertainty(bounds))
    }

    /// Run every applicable attack against `portfolio` and synthesize a
    /// backup plan from `strategies`.
    pub fn assess_robustness(
        &self,
        portfolio: &Portfolio,
        strategies: &StrategyCatalog,
        available_budget: f64,
    ) -> Result<RobustnessAssessment> {
        check_budget("available_budget", available_budget)?;
        let purple = PurpleTeam::new(strategies, &self.config.optimizer, &self.config.wargame);
        Ok(purple.assess_robustness(portfolio, available_budget))
    }

    /// Assess either the caller's selection or the optimizer's pick.
    pub fn wargame(&self, request: &WargameRequest) -> Result<RobustnessAssessment> {
        check_budget("available_budget", request.available_budget)?;
        let timeline = self.config.optimizer.default_timeline_days;

        let portfolio = match &request.selected {
            Some(ids) => {
                let mut chosen: Vec<Strategy> = Vec::with_capacity(ids.len());
                for id in ids {
                    let strategy = request.strategies.get(id).ok_or_else(|| {
                        EngineError::invalid("selected", format!("unknown strategy id '{id}'"))
                    })?;
                    if chosen.iter().any(|s| s.id() == id) {
                        return Err(EngineError::invalid(
                            "selected",
                            format!("strategy id '{id}' listed twice"),
                        ));
                    }
                    chosen.push(strategy.clone());
                }
                Portfolio::from_selection(chosen).with_limits(request.available_budget, timeline)
            }
            None => {
                let optimizer =
                    PortfolioOptimizer::new(&request.strategies, &self.config.optimizer);
                optimizer.get_optimal_portfolio(
                    request.available_budget,
                    timeline,
                    request.risk_tolerance,
                )
            }
        };

        self.assess_robustness(&portfolio, &request.strategies, request.available_budget)
    }

    /// Three-horizon plan using the configured budget split.
    pub fn plan_horizons(
        &self,
        strategies: &StrategyCatalog,
        total_budget: f64,
        risk_score: f64,
    ) -> Result<MultiHorizonPlan> {
        self.plan_horizons_with_allocation(
            strategies,
            total_budget,
            risk_score,
            &self.config.horizons,
        )
    }

    /// Three-horizon plan with caller-supplied budget fractions.
    pub fn plan_horizons_with_allocation(
        &self,
        strategies: &StrategyCatalog,
        total_budget: f64,
        risk_score: f64,
        allocation: &HorizonAllocation,
    ) -> Result<MultiHorizonPlan> {
        check_budget("total_budget", total_budget)?;
        check_risk_score(risk_score)?;
        horizons::validate_allocation(allocation)?;

        let scheduler = MultiHorizonScheduler::new(strategies, total_budget, risk_score);
        Ok(scheduler.optimize_all_horizons(allocation))
    }

    pub fn horizons(&self, request: &HorizonRequest) -> Result<MultiHorizonPlan> {
        let allocation = request.allocation.unwrap_or(self.config.horizons);
        self.plan_horizons_with_allocation(
            &request.strategies,
            request.total_budget,
            request.risk_score,
            &allocation,
        )
    }

    /// Scheduler, balanced optimizer and robustness assessment in one package.
    pub fn decision_package(&self, request: &PackageRequest) -> Result<DecisionPackage> {
        check_budget("budget", request.budget)?;
        check_risk_score(request.risk_score)?;
        Ok(package::build_decision_package(
            &request.strategies,
            request.budget,
            request.risk_score,
            &self.config,
        ))
    }

    /// Sensitivity of the recommended portfolio to a 20% rise in one
    /// attribute of each selected strategy.
    pub fn sensitivity(&self, request: &SensitivityRequest) -> Result<SensitivityReport> {
        check_budget("budget_limit", request.budget_limit)?;
        let timeline = self.timeline_or_default(request.timeline_limit);

        let optimizer = PortfolioOptimizer::new(&request.strategies, &self.config.optimizer);
        let portfolio =
            optimizer.get_optimal_portfolio(request.budget_limit, timeline, request.risk_tolerance);
        let sensitivities = optimizer.sensitivity_analysis(&portfolio, request.attribute, timeline);

        Ok(SensitivityReport {
            portfolio,
            attribute: request.attribute,
            sensitivities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskadvisor_core::{StrategyCategory, StrategyId, StrategyInput};

    fn engine() -> AdvisorEngine {
        let mut config = EngineConfig::default();
        config.optimizer.seed = Some(42);
        config.optimizer.monte_carlo_simulations = 200;
        AdvisorEngine::new(config).unwrap()
    }

    fn catalog() -> StrategyCatalog {
        StrategyCatalog::from_inputs(vec![
            StrategyInput::new("A", "Alpha", StrategyCategory::Process, 20.0, 100.0, 10),
            StrategyInput::new("B", "Bravo", StrategyCategory::Training, 30.0, 200.0, 40),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_bad_config() {
        let mut config = EngineConfig::default();
        config.optimizer.pareto_solutions = 0;
        assert!(AdvisorEngine::new(config).is_err());

        let mut config = EngineConfig::default();
        config.wargame.backup_budget_fraction = 1.5;
        assert!(AdvisorEngine::new(config).is_err());

        let mut config = EngineConfig::default();
        config.horizons.immediate = 0.9;
        assert!(matches!(
            AdvisorEngine::new(config),
            Err(EngineError::AllocationOutOfBounds { .. })
        ));
    }

    #[test]
    fn optimize_rejects_negative_budget() {
        let request = OptimizeRequest {
            strategies: catalog(),
            budget_limit: -5.0,
            timeline_limit: None,
            risk_tolerance: RiskTolerance::Balanced,
        };
        assert!(matches!(
            engine().optimize(&request),
            Err(EngineError::InvalidInput { parameter: "budget_limit", .. })
        ));
    }

    #[test]
    fn pareto_bounds_sweep_count() {
        let mut request = ParetoRequest {
            strategies: catalog(),
            budget_limit: 300.0,
            timeline_limit: None,
            n_solutions: Some(0),
        };
        assert!(engine().pareto_frontier(&request).is_err());
        request.n_solutions = Some(101);
        assert!(engine().pareto_frontier(&request).is_err());
        request.n_solutions = Some(5);
        assert!(!engine().pareto_frontier(&request).unwrap().is_empty());
    }

    #[test]
    fn wargame_uses_explicit_selection() {
        let request = WargameRequest {
            strategies: catalog(),
            available_budget: 300.0,
            risk_tolerance: RiskTolerance::Balanced,
            selected: Some(vec![StrategyId::new("B")]),
        };
        let assessment = engine().wargame(&request).unwrap();
        assert_eq!(assessment.portfolio.strategy_ids(), vec![&StrategyId::new("B")]);
    }

    #[test]
    fn wargame_rejects_unknown_selection() {
        let request = WargameRequest {
            strategies: catalog(),
            available_budget: 300.0,
            risk_tolerance: RiskTolerance::Balanced,
            selected: Some(vec![StrategyId::new("Z")]),
        };
        let err = engine().wargame(&request).unwrap_err();
        assert!(err.to_string().contains("unknown strategy id 'Z'"));
    }

    #[test]
    fn wargame_rejects_repeated_selection() {
        let request = WargameRequest {
            strategies: catalog(),
            available_budget: 300.0,
            risk_tolerance: RiskTolerance::Balanced,
            selected: Some(vec![StrategyId::new("B"), StrategyId::new("B")]),
        };
        assert!(matches!(
            engine().wargame(&request),
            Err(EngineError::InvalidInput { parameter: "selected", .. })
        ));
    }

    #[test]
    fn horizons_validate_inputs() {
        let eng = engine();
        assert!(eng.plan_horizons(&catalog(), 1000.0, 101.0).is_err());
        assert!(eng.plan_horizons(&catalog(), f64::NAN, 50.0).is_err());

        let lopsided = HorizonAllocation {
            immediate: 0.4,
            tactical: 0.5,
            strategic: 0.5,
        };
        assert!(matches!(
            eng.plan_horizons_with_allocation(&catalog(), 1000.0, 50.0, &lopsided),
            Err(EngineError::AllocationExceedsBudget { .. })
        ));

        let plan = eng.plan_horizons(&catalog(), 1000.0, 50.0).unwrap();
        assert!(plan.total_cost <= 1000.0);
    }

    #[test]
    fn monte_carlo_bounds_count() {
        let eng = engine();
        let portfolio = Portfolio::from_selection(catalog().strategies().to_vec());
        assert!(eng.monte_carlo(&portfolio, 0).is_err());
        assert!(eng.monte_carlo(&portfolio, 100_001).is_err());
        let with_bounds = eng.monte_carlo(&portfolio, 500).unwrap();
        assert_eq!(with_bounds.uncertainty.map(|u| u.simulations), Some(500));
    }

    #[test]
    fn sensitivity_covers_each_selected_strategy() {
        let request = SensitivityRequest {
            strategies: catalog(),
            budget_limit: 300.0,
            timeline_limit: None,
            risk_tolerance: RiskTolerance::Aggressive,
            attribute: riskadvisor_core::StrategyAttribute::Cost,
        };
        let report = engine().sensitivity(&request).unwrap();
        assert_eq!(report.sensitivities.len(), report.portfolio.len());
    }
}
