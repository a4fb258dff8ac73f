//! Core domain types shared by every RiskAdvisor engine.
//!
//! A [`Strategy`] is an immutable candidate mitigation produced by the
//! catalog collaborator; a [`StrategyCatalog`] is the read-only universe the
//! engines select from; a [`Portfolio`] is a budget-feasible selection and
//! its aggregate outcome.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Portfolio-level risk reduction never exceeds this percentage.
pub const PORTFOLIO_RISK_CAP: f64 = 95.0;

/// Default confidence in a strategy's risk-reduction estimate.
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

// ── Identifiers ───────────────────────────────────────────────────

/// Unique key of a strategy within a catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct StrategyId(pub String);

impl StrategyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StrategyId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ── Enums ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum StrategyCategory {
    Maintenance,
    Training,
    Process,
    Technology,
    Policy,
}

impl fmt::Display for StrategyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Maintenance => "maintenance",
            Self::Training => "training",
            Self::Process => "process",
            Self::Technology => "technology",
            Self::Policy => "policy",
        };
        f.write_str(s)
    }
}

/// How much operational disruption implementing a strategy causes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DisruptionLevel {
    None,
    #[default]
    Low,
    Medium,
    High,
}

/// Who has to sign off on a strategy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalLevel {
    Team,
    #[default]
    Manager,
    Director,
    Vp,
    Ceo,
}

/// A strategy attribute that can be perturbed during sensitivity analysis.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrategyAttribute {
    #[default]
    Cost,
    Time,
    RiskReduction,
}

// ── Estimates ─────────────────────────────────────────────────────

/// A three-point (min, most likely, max) estimate.
///
/// Invariant once validated: `min <= most_likely <= max`. When
/// `min == max` the distribution collapses to a point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Estimate<T> {
    pub min: T,
    pub most_likely: T,
    pub max: T,
}

impl<T: Copy + PartialOrd> Estimate<T> {
    pub fn new(min: T, most_likely: T, max: T) -> Self {
        Self {
            min,
            most_likely,
            max,
        }
    }

    /// A zero-variance estimate.
    pub fn point(value: T) -> Self {
        Self::new(value, value, value)
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.most_likely && self.most_likely <= self.max
    }
}

impl Estimate<f64> {
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.min * factor, self.most_likely * factor, self.max * factor)
    }
}

impl Estimate<u32> {
    /// Scale each point and round to whole days.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |days: u32| (days as f64 * factor).round().max(0.0) as u32;
        Self::new(scale(self.min), scale(self.most_likely), scale(self.max))
    }
}

// ── Strategy ──────────────────────────────────────────────────────

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

fn default_time_estimate() -> u32 {
    30
}

/// The external record a catalog collaborator supplies for one strategy.
///
/// Range ends may be omitted: cost defaults to 0.8x/1.2x of the most
/// likely value, time to `most_likely - 14` (at least 1 day, never above
/// the estimate) and `most_likely + 30`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyInput {
    pub id: String,
    pub name: String,
    pub category: StrategyCategory,
    pub risk_reduction_pct: f64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    pub cost_estimate: f64,
    #[serde(default)]
    pub cost_min: Option<f64>,
    #[serde(default)]
    pub cost_max: Option<f64>,
    #[serde(default = "default_time_estimate")]
    pub time_estimate: u32,
    #[serde(default)]
    pub time_min: Option<u32>,
    #[serde(default)]
    pub time_max: Option<u32>,
    #[serde(default)]
    pub disruption_level: DisruptionLevel,
    #[serde(default)]
    pub approval_level: ApprovalLevel,
    #[serde(default)]
    pub applicable_risk_types: Vec<String>,
}

impl StrategyInput {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: StrategyCategory,
        risk_reduction_pct: f64,
        cost_estimate: f64,
        time_estimate: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            risk_reduction_pct,
            confidence: DEFAULT_CONFIDENCE,
            cost_estimate,
            cost_min: None,
            cost_max: None,
            time_estimate,
            time_min: None,
            time_max: None,
            disruption_level: DisruptionLevel::default(),
            approval_level: ApprovalLevel::default(),
            applicable_risk_types: Vec::new(),
        }
    }

    pub fn with_cost_range(mut self, min: f64, max: f64) -> Self {
        self.cost_min = Some(min);
        self.cost_max = Some(max);
        self
    }

    pub fn with_time_range(mut self, min: u32, max: u32) -> Self {
        self.time_min = Some(min);
        self.time_max = Some(max);
        self
    }

    /// Collapse both cost and time to their most likely values.
    pub fn point_estimates(self) -> Self {
        let (cost, time) = (self.cost_estimate, self.time_estimate);
        self.with_cost_range(cost, cost).with_time_range(time, time)
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_disruption(mut self, level: DisruptionLevel) -> Self {
        self.disruption_level = level;
        self
    }

    pub fn with_approval(mut self, level: ApprovalLevel) -> Self {
        self.approval_level = level;
        self
    }

    pub fn with_risk_types(mut self, types: Vec<String>) -> Self {
        self.applicable_risk_types = types;
        self
    }

    /// Validate and build the immutable strategy.
    pub fn build(self) -> Result<Strategy, ValidationError> {
        Strategy::try_from(self)
    }
}

/// An immutable, validated candidate mitigation.
///
/// Fields are private so a `Strategy` can only exist after validation.
/// Perturbed variants are new values built with [`Strategy::scaled`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "StrategyInput", into = "StrategyInput")]
pub struct Strategy {
    id: StrategyId,
    name: String,
    category: StrategyCategory,
    risk_reduction_pct: f64,
    confidence: f64,
    cost: Estimate<f64>,
    time: Estimate<u32>,
    disruption: DisruptionLevel,
    approval: ApprovalLevel,
    risk_types: Vec<String>,
}

impl Strategy {
    pub fn id(&self) -> &StrategyId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> StrategyCategory {
        self.category
    }

    pub fn risk_reduction_pct(&self) -> f64 {
        self.risk_reduction_pct
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn cost(&self) -> &Estimate<f64> {
        &self.cost
    }

    pub fn time(&self) -> &Estimate<u32> {
        &self.time
    }

    /// Most likely cost.
    pub fn cost_estimate(&self) -> f64 {
        self.cost.most_likely
    }

    /// Most likely implementation time in days.
    pub fn time_estimate(&self) -> u32 {
        self.time.most_likely
    }

    pub fn disruption(&self) -> DisruptionLevel {
        self.disruption
    }

    pub fn approval(&self) -> ApprovalLevel {
        self.approval
    }

    pub fn risk_types(&self) -> &[String] {
        &self.risk_types
    }

    /// Risk reduction per unit of most likely cost; 0 for free strategies.
    pub fn reduction_per_cost(&self) -> f64 {
        if self.cost.most_likely > 0.0 {
            self.risk_reduction_pct / self.cost.most_likely
        } else {
            0.0
        }
    }

    /// A copy with one attribute multiplied by `factor`.
    ///
    /// Risk reduction saturates at 100.
    pub fn scaled(&self, attribute: StrategyAttribute, factor: f64) -> Self {
        let mut copy = self.clone();
        match attribute {
            StrategyAttribute::Cost => copy.cost = self.cost.scaled(factor),
            StrategyAttribute::Time => copy.time = self.time.scaled(factor),
            StrategyAttribute::RiskReduction => {
                copy.risk_reduction_pct = (self.risk_reduction_pct * factor).clamp(0.0, 100.0)
            }
        }
        copy
    }
}

fn check_amount(id: &str, field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NegativeOrNonFinite {
            id: id.to_string(),
            field,
            value,
        })
    }
}

impl TryFrom<StrategyInput> for Strategy {
    type Error = ValidationError;

    fn try_from(input: StrategyInput) -> Result<Self, Self::Error> {
        let id = input.id.trim().to_string();
        if id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if input.name.trim().is_empty() {
            return Err(ValidationError::EmptyName { id });
        }
        if !(0.0..=100.0).contains(&input.risk_reduction_pct) {
            return Err(ValidationError::RiskReductionOutOfRange {
                id,
                value: input.risk_reduction_pct,
            });
        }
        if !(0.0..=1.0).contains(&input.confidence) {
            return Err(ValidationError::ConfidenceOutOfRange {
                id,
                value: input.confidence,
            });
        }

        check_amount(&id, "cost_estimate", input.cost_estimate)?;
        let cost_min = input.cost_min.unwrap_or(input.cost_estimate * 0.8);
        let cost_max = input.cost_max.unwrap_or(input.cost_estimate * 1.2);
        check_amount(&id, "cost_min", cost_min)?;
        check_amount(&id, "cost_max", cost_max)?;
        let cost = Estimate::new(cost_min, input.cost_estimate, cost_max);
        if !cost.is_ordered() {
            return Err(ValidationError::UnorderedRange {
                id,
                field: "cost",
                min: cost.min,
                most_likely: cost.most_likely,
                max: cost.max,
            });
        }

        let estimate = input.time_estimate;
        let time_min = input
            .time_min
            .unwrap_or_else(|| estimate.saturating_sub(14).max(1).min(estimate));
        let time_max = input.time_max.unwrap_or(estimate.saturating_add(30));
        let time = Estimate::new(time_min, estimate, time_max);
        if !time.is_ordered() {
            return Err(ValidationError::UnorderedRange {
                id,
                field: "time",
                min: time.min as f64,
                most_likely: time.most_likely as f64,
                max: time.max as f64,
            });
        }

        Ok(Self {
            id: StrategyId(id),
            name: input.name,
            category: input.category,
            risk_reduction_pct: input.risk_reduction_pct,
            confidence: input.confidence,
            cost,
            time,
            disruption: input.disruption_level,
            approval: input.approval_level,
            risk_types: input.applicable_risk_types,
        })
    }
}

impl From<Strategy> for StrategyInput {
    fn from(s: Strategy) -> Self {
        Self {
            id: s.id.0,
            name: s.name,
            category: s.category,
            risk_reduction_pct: s.risk_reduction_pct,
            confidence: s.confidence,
            cost_estimate: s.cost.most_likely,
            cost_min: Some(s.cost.min),
            cost_max: Some(s.cost.max),
            time_estimate: s.time.most_likely,
            time_min: Some(s.time.min),
            time_max: Some(s.time.max),
            disruption_level: s.disruption,
            approval_level: s.approval,
            applicable_risk_types: s.risk_types,
        }
    }
}

// ── Catalog ───────────────────────────────────────────────────────

/// The read-only universe of candidate strategies, unique by id.
///
/// Engines never modify a catalog; derived views (`excluding`,
/// `with_replaced`) are new catalogs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<Strategy>", into = "Vec<Strategy>")]
pub struct StrategyCatalog {
    strategies: Vec<Strategy>,
}

impl StrategyCatalog {
    pub fn new(strategies: Vec<Strategy>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(strategies.len());
        for s in &strategies {
            if !seen.insert(s.id()) {
                return Err(ValidationError::DuplicateId {
                    id: s.id().to_string(),
                });
            }
        }
        Ok(Self { strategies })
    }

    pub fn from_inputs(inputs: Vec<StrategyInput>) -> Result<Self, ValidationError> {
        let strategies = inputs
            .into_iter()
            .map(Strategy::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(strategies)
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Strategy> {
        self.strategies.iter()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn get(&self, id: &StrategyId) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.id() == id)
    }

    /// A new catalog without the given ids.
    pub fn excluding(&self, ids: &BTreeSet<StrategyId>) -> Self {
        Self {
            strategies: self
                .strategies
                .iter()
                .filter(|s| !ids.contains(s.id()))
                .cloned()
                .collect(),
        }
    }

    /// A new catalog where the strategy sharing `replacement`'s id is swapped
    /// out. The receiver is left untouched.
    pub fn with_replaced(&self, replacement: &Strategy) -> Self {
        Self {
            strategies: self
                .strategies
                .iter()
                .map(|s| {
                    if s.id() == replacement.id() {
                        replacement.clone()
                    } else {
                        s.clone()
                    }
                })
                .collect(),
        }
    }

    /// Sum of most likely costs across the whole catalog.
    pub fn total_cost(&self) -> f64 {
        self.strategies.iter().map(Strategy::cost_estimate).sum()
    }
}

impl TryFrom<Vec<Strategy>> for StrategyCatalog {
    type Error = ValidationError;

    fn try_from(strategies: Vec<Strategy>) -> Result<Self, Self::Error> {
        Self::new(strategies)
    }
}

impl From<StrategyCatalog> for Vec<Strategy> {
    fn from(catalog: StrategyCatalog) -> Self {
        catalog.strategies
    }
}

impl<'a> IntoIterator for &'a StrategyCatalog {
    type Item = &'a Strategy;
    type IntoIter = std::slice::Iter<'a, Strategy>;

    fn into_iter(self) -> Self::IntoIter {
        self.strategies.iter()
    }
}

// ── Portfolio ─────────────────────────────────────────────────────

/// Which limits a portfolio respects.
///
/// The budget is the only hard constraint; the timeline limit is advisory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstraintStatus {
    pub within_budget: bool,
    pub within_timeline: bool,
}

impl Default for ConstraintStatus {
    fn default() -> Self {
        Self {
            within_budget: true,
            within_timeline: true,
        }
    }
}

/// 5th/95th percentile bounds from Monte Carlo sampling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UncertaintyBounds {
    pub simulations: usize,
    pub cost_p5: f64,
    pub cost_p95: f64,
    pub risk_reduction_p5: f64,
    pub risk_reduction_p95: f64,
}

/// A selected set of strategies and its aggregate outcome.
///
/// Timeline is the longest selected strategy: strategies in one portfolio
/// are implemented in parallel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Portfolio {
    pub strategies: Vec<Strategy>,
    pub total_cost: f64,
    /// Capped at [`PORTFOLIO_RISK_CAP`].
    pub total_risk_reduction: f64,
    pub total_timeline_days: u32,
    pub pareto_rank: u32,
    pub constraints: ConstraintStatus,
    pub uncertainty: Option<UncertaintyBounds>,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::empty()
    }
}

impl Portfolio {
    /// The "no affordable strategy" outcome.
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
            total_cost: 0.0,
            total_risk_reduction: 0.0,
            total_timeline_days: 0,
            pareto_rank: 1,
            constraints: ConstraintStatus::default(),
            uncertainty: None,
        }
    }

    /// Build a portfolio from a selection, dropping repeated ids (first wins).
    pub fn from_selection(selection: Vec<Strategy>) -> Self {
        let mut seen = HashSet::with_capacity(selection.len());
        let strategies: Vec<Strategy> = selection
            .into_iter()
            .filter(|s| seen.insert(s.id().clone()))
            .collect();

        let total_cost = strategies.iter().map(Strategy::cost_estimate).sum();
        let raw_reduction: f64 = strategies.iter().map(Strategy::risk_reduction_pct).sum();
        let total_timeline_days = strategies
            .iter()
            .map(Strategy::time_estimate)
            .max()
            .unwrap_or(0);

        Self {
            strategies,
            total_cost,
            total_risk_reduction: raw_reduction.min(PORTFOLIO_RISK_CAP),
            total_timeline_days,
            ..Self::empty()
        }
    }

    /// Record which limits this portfolio satisfies.
    pub fn with_limits(mut self, budget_limit: f64, timeline_limit: u32) -> Self {
        self.constraints = ConstraintStatus {
            within_budget: self.total_cost <= budget_limit,
            within_timeline: self.total_timeline_days <= timeline_limit,
        };
        self
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.pareto_rank = rank;
        self
    }

    pub fn with_uncertainty(mut self, bounds: UncertaintyBounds) -> Self {
        self.uncertainty = Some(bounds);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn contains(&self, id: &StrategyId) -> bool {
        self.strategies.iter().any(|s| s.id() == id)
    }

    pub fn strategy_ids(&self) -> Vec<&StrategyId> {
        self.strategies.iter().map(Strategy::id).collect()
    }

    /// Selected ids as an order-independent set.
    pub fn id_set(&self) -> BTreeSet<&StrategyId> {
        self.strategies.iter().map(Strategy::id).collect()
    }

    /// Risk reduction per unit cost; 0 when the portfolio is free.
    pub fn cost_effectiveness(&self) -> f64 {
        if self.total_cost > 0.0 {
            self.total_risk_reduction / self.total_cost
        } else {
            0.0
        }
    }

    /// `self` dominates `other` when it is at least as good on risk
    /// reduction, cost, and timeline, and strictly better on one of them.
    pub fn dominates(&self, other: &Portfolio) -> bool {
        let no_worse = self.total_risk_reduction >= other.total_risk_reduction
            && self.total_cost <= other.total_cost
            && self.total_timeline_days <= other.total_timeline_days;
        let strictly_better = self.total_risk_reduction > other.total_risk_reduction
            || self.total_cost < other.total_cost
            || self.total_timeline_days < other.total_timeline_days;
        no_worse && strictly_better
    }
}
