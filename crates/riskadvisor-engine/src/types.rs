//! Request and response records for the engine's call surfaces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use riskadvisor_core::{Portfolio, StrategyAttribute, StrategyCatalog, StrategyId};

use crate::config::HorizonAllocation;

/// What a single-objective solve optimizes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Maximize summed risk reduction.
    #[default]
    RiskReduction,
    /// Minimize summed cost.
    Cost,
    /// Minimize summed implementation days.
    Timeline,
}

/// Policy for picking one point off the Pareto frontier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    /// Maximum risk reduction.
    Aggressive,
    /// Maximum risk reduction per unit cost.
    #[default]
    Balanced,
    /// Minimum cost.
    Conservative,
}

/// Request for a single recommended portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub strategies: StrategyCatalog,
    pub budget_limit: f64,
    /// Advisory limit; defaults to the configured timeline.
    #[serde(default)]
    pub timeline_limit: Option<u32>,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
}

/// Request for the approximate Pareto frontier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParetoRequest {
    pub strategies: StrategyCatalog,
    pub budget_limit: f64,
    #[serde(default)]
    pub timeline_limit: Option<u32>,
    /// Budget sweep points; defaults to the configured count.
    #[serde(default)]
    pub n_solutions: Option<usize>,
}

/// Request for a robustness assessment.
///
/// When `selected` is absent the portfolio under test is the optimizer's
/// recommendation for `risk_tolerance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WargameRequest {
    pub strategies: StrategyCatalog,
    pub available_budget: f64,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
    #[serde(default)]
    pub selected: Option<Vec<StrategyId>>,
}

/// Request for a three-horizon plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonRequest {
    pub strategies: StrategyCatalog,
    pub total_budget: f64,
    /// Current aggregate risk score in [0, 100].
    pub risk_score: f64,
    /// Custom per-horizon budget fractions.
    #[serde(default)]
    pub allocation: Option<HorizonAllocation>,
}

/// Request for a complete executive decision package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRequest {
    pub strategies: StrategyCatalog,
    pub budget: f64,
    pub risk_score: f64,
}

/// Request for per-strategy sensitivity of the recommended portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityRequest {
    pub strategies: StrategyCatalog,
    pub budget_limit: f64,
    #[serde(default)]
    pub timeline_limit: Option<u32>,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
    #[serde(default)]
    pub attribute: StrategyAttribute,
}

/// Relative change in total risk reduction when one selected strategy's
/// attribute is raised by 20%.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub portfolio: Portfolio,
    pub attribute: StrategyAttribute,
    pub sensitivities: BTreeMap<StrategyId, f64>,
}
