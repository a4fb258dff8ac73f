//! Multi-horizon scheduling.
//!
//! Splits one catalog across three fixed windows (Immediate 0-30 days,
//! Tactical 30-180, Strategic 180-730), filling each window's budget share
//! greedily by category-weighted efficiency. Windows are filled strictly in
//! order and run as sequential phases; strategies inside a window run in
//! parallel, so a window's timeline is its longest strategy.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use riskadvisor_core::{Strategy, StrategyCatalog, StrategyCategory, StrategyId, PORTFOLIO_RISK_CAP};

use crate::config::HorizonAllocation;
use crate::error::{EngineError, Result};

/// Risk reduction credited to any single horizon never exceeds this.
pub const HORIZON_RISK_CAP: f64 = 50.0;

const PREFERRED_BONUS: f64 = 1.5;
const ALLOCATION_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    Immediate,
    Tactical,
    Strategic,
}

impl Horizon {
    /// Processing order.
    pub const ALL: [Horizon; 3] = [Self::Immediate, Self::Tactical, Self::Strategic];

    pub fn spec(self) -> &'static HorizonSpec {
        match self {
            Self::Immediate => &IMMEDIATE,
            Self::Tactical => &TACTICAL,
            Self::Strategic => &STRATEGIC,
        }
    }

    fn fraction(self, allocation: &HorizonAllocation) -> f64 {
        match self {
            Self::Immediate => allocation.immediate,
            Self::Tactical => allocation.tactical,
            Self::Strategic => allocation.strategic,
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Immediate => "immediate",
            Self::Tactical => "tactical",
            Self::Strategic => "strategic",
        };
        f.write_str(s)
    }
}

/// Static configuration of one horizon.
#[derive(Debug)]
pub struct HorizonSpec {
    pub horizon: Horizon,
    pub label: &'static str,
    pub min_days: u32,
    pub max_days: u32,
    pub fraction_min: f64,
    pub fraction_max: f64,
    pub preferred: &'static [StrategyCategory],
    action_prefix: &'static str,
    decision_deadline: &'static str,
    phase_name: &'static str,
    /// Last day of the roadmap phase; the strategic phase is planned over one
    /// year even though strategies up to `max_days` qualify.
    phase_end_day: u32,
}

static IMMEDIATE: HorizonSpec = HorizonSpec {
    horizon: Horizon::Immediate,
    label: "Immediate Actions (0-30 days)",
    min_days: 0,
    max_days: 30,
    fraction_min: 0.1,
    fraction_max: 0.4,
    preferred: &[StrategyCategory::Process, StrategyCategory::Policy],
    action_prefix: "START NOW",
    decision_deadline: "Decision required: TODAY",
    phase_name: "Crisis Response / Quick Wins",
    phase_end_day: 30,
};

static TACTICAL: HorizonSpec = HorizonSpec {
    horizon: Horizon::Tactical,
    label: "Tactical Improvements (30-180 days)",
    min_days: 30,
    max_days: 180,
    fraction_min: 0.3,
    fraction_max: 0.5,
    preferred: &[StrategyCategory::Training, StrategyCategory::Maintenance],
    action_prefix: "PLAN Q1/Q2",
    decision_deadline: "Decision required: This week",
    phase_name: "Systematic Improvement",
    phase_end_day: 180,
};

static STRATEGIC: HorizonSpec = HorizonSpec {
    horizon: Horizon::Strategic,
    label: "Strategic Investments (180+ days)",
    min_days: 180,
    max_days: 730,
    fraction_min: 0.2,
    fraction_max: 0.5,
    preferred: &[StrategyCategory::Technology],
    action_prefix: "BUDGET FY",
    decision_deadline: "Decision required: This quarter",
    phase_name: "Transformational Investment",
    phase_end_day: 365,
};

/// Horizons a strategy may be scheduled in. Never empty.
pub fn classify(strategy: &Strategy) -> BTreeSet<Horizon> {
    let days = strategy.time_estimate();
    let cost = strategy.cost_estimate();
    let mut eligible = BTreeSet::new();

    if days <= 30 && cost < 50_000.0 {
        eligible.insert(Horizon::Immediate);
    }
    if (14..=180).contains(&days) {
        eligible.insert(Horizon::Tactical);
    }
    if days >= 60 || cost >= 200_000.0 || strategy.category() == StrategyCategory::Technology {
        eligible.insert(Horizon::Strategic);
    }
    if eligible.is_empty() {
        eligible.insert(Horizon::Tactical);
    }
    eligible
}

/// Check custom fractions against each horizon's bounds and the total.
pub fn validate_allocation(allocation: &HorizonAllocation) -> Result<()> {
    for horizon in Horizon::ALL {
        let spec = horizon.spec();
        let fraction = horizon.fraction(allocation);
        if !(fraction.is_finite()
            && fraction >= spec.fraction_min - ALLOCATION_TOLERANCE
            && fraction <= spec.fraction_max + ALLOCATION_TOLERANCE)
        {
            return Err(EngineError::AllocationOutOfBounds {
                horizon: horizon.to_string(),
                fraction,
                min: spec.fraction_min,
                max: spec.fraction_max,
            });
        }
    }
    let total = allocation.total();
    if total > 1.0 + ALLOCATION_TOLERANCE {
        return Err(EngineError::AllocationExceedsBudget { total });
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HorizonPlan {
    pub horizon: Horizon,
    pub strategies: Vec<Strategy>,
    pub budget: f64,
    pub total_cost: f64,
    /// Capped at [`HORIZON_RISK_CAP`].
    pub risk_reduction: f64,
    pub timeline_days: u32,
    pub action_items: Vec<String>,
    pub decision_deadline: String,
}

impl HorizonPlan {
    pub fn strategy_ids(&self) -> impl Iterator<Item = &StrategyId> {
        self.strategies.iter().map(Strategy::id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    RequiresTraining,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dependency {
    pub from: StrategyId,
    pub to: StrategyId,
    pub kind: DependencyKind,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TradeoffStance {
    Urgent,
    Balanced,
    StrategicFocus,
}

impl TradeoffStance {
    pub fn for_risk_score(risk_score: f64) -> Self {
        if risk_score >= 75.0 {
            Self::Urgent
        } else if risk_score >= 50.0 {
            Self::Balanced
        } else {
            Self::StrategicFocus
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Self::Urgent => {
                "URGENT: Prioritize immediate actions, then tactical. Risk is critical."
            }
            Self::Balanced => {
                "BALANCED: Execute immediate actions for quick wins, \
                 invest heavily in tactical for sustainability."
            }
            Self::StrategicFocus => {
                "STRATEGIC: Focus on long-term improvements. Immediate risk is manageable."
            }
        }
    }
}

/// Quick fixes (Immediate) against sustainable work (Tactical + Strategic).
/// Cost-effectiveness is risk reduction per 1000 of cost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeoffAnalysis {
    pub quick_fix_value: f64,
    pub quick_fix_cost: f64,
    pub sustainable_value: f64,
    pub sustainable_cost: f64,
    pub quick_fix_cost_effectiveness: f64,
    pub sustainable_cost_effectiveness: f64,
    pub stance: TradeoffStance,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    pub phase: u8,
    pub name: String,
    pub horizon: Horizon,
    pub start_day: u32,
    pub end_day: u32,
    pub strategies: Vec<String>,
    pub cost: f64,
    pub expected_risk_reduction: f64,
    pub milestone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultiHorizonPlan {
    pub immediate: HorizonPlan,
    pub tactical: HorizonPlan,
    pub strategic: HorizonPlan,
    pub total_cost: f64,
    /// Sum of horizon reductions, capped at the portfolio cap.
    pub total_risk_reduction: f64,
    pub tradeoff: TradeoffAnalysis,
    /// Non-empty horizons only, in execution order.
    pub phases: Vec<Phase>,
    pub dependencies: Vec<Dependency>,
}

impl MultiHorizonPlan {
    pub fn horizon_plans(&self) -> [&HorizonPlan; 3] {
        [&self.immediate, &self.tactical, &self.strategic]
    }
}

/// Scheduler over one catalog snapshot.
pub struct MultiHorizonScheduler<'a> {
    catalog: &'a StrategyCatalog,
    total_budget: f64,
    risk_score: f64,
}

impl<'a> MultiHorizonScheduler<'a> {
    pub fn new(catalog: &'a StrategyCatalog, total_budget: f64, risk_score: f64) -> Self {
        Self {
            catalog,
            total_budget,
            risk_score,
        }
    }

    /// Greedy first-fit fill of one horizon's `budget`.
    ///
    /// Candidates are eligible for the horizon, not in `excluded`, and no
    /// longer than the horizon's window. They are ranked by risk reduction
    /// per unit cost, boosted for preferred categories; equal priorities
    /// keep catalog order.
    pub fn optimize_horizon(
        &self,
        horizon: Horizon,
        budget: f64,
        excluded: &HashSet<StrategyId>,
    ) -> HorizonPlan {
        let spec = horizon.spec();
        let mut candidates: Vec<&Strategy> = self
            .catalog
            .iter()
            .filter(|s| !excluded.contains(s.id()))
            .filter(|s| classify(s).contains(&horizon))
            .filter(|s| s.time_estimate() <= spec.max_days)
            .collect();

        let priority = |s: &Strategy| {
            let bonus = if spec.preferred.contains(&s.category()) {
                PREFERRED_BONUS
            } else {
                1.0
            };
            s.reduction_per_cost() * bonus
        };
        candidates.sort_by(|a, b| priority(b).total_cmp(&priority(a)));

        let mut selected: Vec<Strategy> = Vec::new();
        let mut total_cost = 0.0;
        for strategy in candidates {
            if total_cost + strategy.cost_estimate() <= budget {
                total_cost += strategy.cost_estimate();
                selected.push(strategy.clone());
            }
        }

        let risk_reduction: f64 = selected.iter().map(Strategy::risk_reduction_pct).sum();
        let timeline_days = selected.iter().map(Strategy::time_estimate).max().unwrap_or(0);
        let action_items = selected
            .iter()
            .map(|s| format!("{}: {}", spec.action_prefix, s.name()))
            .collect();

        tracing::debug!(
            %horizon,
            budget,
            selected = selected.len(),
            total_cost,
            "Horizon filled"
        );

        HorizonPlan {
            horizon,
            strategies: selected,
            budget,
            total_cost,
            risk_reduction: risk_reduction.min(HORIZON_RISK_CAP),
            timeline_days,
            action_items,
            decision_deadline: spec.decision_deadline.to_string(),
        }
    }

    /// Fill all three horizons in order with the given budget fractions.
    ///
    /// The allocation is taken as-is; callers accepting custom fractions
    /// check them with [`validate_allocation`] first.
    pub fn optimize_all_horizons(&self, allocation: &HorizonAllocation) -> MultiHorizonPlan {
        let mut used: HashSet<StrategyId> = HashSet::new();
        let mut fill = |horizon: Horizon| {
            let budget = self.total_budget * horizon.fraction(allocation);
            let plan = self.optimize_horizon(horizon, budget, &used);
            used.extend(plan.strategy_ids().cloned());
            plan
        };
        let immediate = fill(Horizon::Immediate);
        let tactical = fill(Horizon::Tactical);
        let strategic = fill(Horizon::Strategic);

        let total_cost = immediate.total_cost + tactical.total_cost + strategic.total_cost;
        let total_risk_reduction = (immediate.risk_reduction
            + tactical.risk_reduction
            + strategic.risk_reduction)
            .min(PORTFOLIO_RISK_CAP);

        let tradeoff = self.analyze_tradeoffs(&immediate, &tactical, &strategic);
        let phases = phase_sequence(&immediate, &tactical, &strategic);
        let dependencies = identify_dependencies(&tactical, &strategic);

        tracing::info!(
            total_cost,
            risk_reduction = total_risk_reduction,
            phases = phases.len(),
            dependencies = dependencies.len(),
            "Multi-horizon plan complete"
        );

        MultiHorizonPlan {
            immediate,
            tactical,
            strategic,
            total_cost,
            total_risk_reduction,
            tradeoff,
            phases,
            dependencies,
        }
    }

    fn analyze_tradeoffs(
        &self,
        immediate: &HorizonPlan,
        tactical: &HorizonPlan,
        strategic: &HorizonPlan,
    ) -> TradeoffAnalysis {
        let sustainable_value = tactical.risk_reduction + strategic.risk_reduction;
        let sustainable_cost = tactical.total_cost + strategic.total_cost;
        let stance = TradeoffStance::for_risk_score(self.risk_score);

        TradeoffAnalysis {
            quick_fix_value: immediate.risk_reduction,
            quick_fix_cost: immediate.total_cost,
            sustainable_value,
            sustainable_cost,
            quick_fix_cost_effectiveness: per_thousand(
                immediate.risk_reduction,
                immediate.total_cost,
            ),
            sustainable_cost_effectiveness: per_thousand(sustainable_value, sustainable_cost),
            stance,
            recommendation: stance.recommendation().to_string(),
        }
    }
}

fn per_thousand(value: f64, cost: f64) -> f64 {
    if cost > 0.0 {
        value / cost * 1000.0
    } else {
        0.0
    }
}

fn phase_sequence(
    immediate: &HorizonPlan,
    tactical: &HorizonPlan,
    strategic: &HorizonPlan,
) -> Vec<Phase> {
    let mut cumulative = 0.0;
    let mut phases = Vec::new();

    for (number, plan) in (1u8..).zip([immediate, tactical, strategic]) {
        cumulative += plan.risk_reduction;
        if plan.strategies.is_empty() {
            continue;
        }
        let spec = plan.horizon.spec();
        let milestone = match plan.horizon {
            Horizon::Immediate => format!("Achieve {:.0}% risk reduction", plan.risk_reduction),
            Horizon::Tactical => format!("Cumulative {cumulative:.0}% reduction"),
            Horizon::Strategic => format!("Target {cumulative:.0}% total reduction"),
        };
        phases.push(Phase {
            phase: number,
            name: spec.phase_name.to_string(),
            horizon: plan.horizon,
            start_day: spec.min_days,
            end_day: spec.phase_end_day,
            strategies: plan.strategies.iter().map(|s| s.name().to_string()).collect(),
            cost: plan.total_cost,
            expected_risk_reduction: plan.risk_reduction,
            milestone,
        });
    }
    phases
}

/// Every selected Strategic technology strategy depends on every selected
/// Tactical training strategy.
fn identify_dependencies(tactical: &HorizonPlan, strategic: &HorizonPlan) -> Vec<Dependency> {
    let technology = strategic
        .strategies
        .iter()
        .filter(|s| s.category() == StrategyCategory::Technology);

    technology
        .flat_map(|tech| {
            tactical
                .strategies
                .iter()
                .filter(|t| t.category() == StrategyCategory::Training)
                .map(move |training| Dependency {
                    from: tech.id().clone(),
                    to: training.id().clone(),
                    kind: DependencyKind::RequiresTraining,
                    description: format!(
                        "{} requires {} to be completed first",
                        tech.name(),
                        training.name()
                    ),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskadvisor_core::StrategyCategory::{Maintenance, Policy, Process, Technology, Training};
    use riskadvisor_core::StrategyInput;

    fn strategy(
        id: &str,
        name: &str,
        category: StrategyCategory,
        risk: f64,
        cost: f64,
        days: u32,
    ) -> Strategy {
        StrategyInput::new(id, name, category, risk, cost, days).build().unwrap()
    }

    fn catalog() -> StrategyCatalog {
        StrategyCatalog::new(vec![
            strategy("PROC_001", "Emergency Inspection Protocol", Process, 8.0, 15_000.0, 7),
            strategy("POLICY_001", "Updated Weather Minimums", Policy, 5.0, 5_000.0, 3),
            strategy("TRAIN_001", "Crew Fatigue Training", Training, 12.0, 45_000.0, 45),
            strategy(
                "MAINT_001",
                "Enhanced Maintenance Protocol",
                Maintenance,
                18.0,
                120_000.0,
                60,
            ),
            strategy(
                "TECH_001",
                "Predictive Maintenance AI System",
                Technology,
                25.0,
                350_000.0,
                180,
            ),
            strategy("TECH_002", "Safety Management Platform", Technology, 15.0, 200_000.0, 120),
        ])
        .unwrap()
    }

    #[test]
    fn quick_cheap_process_is_immediate_only() {
        let s = strategy("P", "Quick", StrategyCategory::Process, 5.0, 10_000.0, 10);
        let eligible = classify(&s);
        assert!(eligible.contains(&Horizon::Immediate));
        // 10 days is below the 14-day tactical floor.
        assert!(!eligible.contains(&Horizon::Tactical));
        assert!(!eligible.contains(&Horizon::Strategic));
    }

    #[test]
    fn classification_rules() {
        let tech = strategy("T", "Tech", StrategyCategory::Technology, 5.0, 10_000.0, 20);
        assert_eq!(
            classify(&tech),
            BTreeSet::from([Horizon::Immediate, Horizon::Tactical, Horizon::Strategic])
        );

        let expensive = strategy("E", "Big", StrategyCategory::Process, 5.0, 250_000.0, 5);
        assert_eq!(classify(&expensive), BTreeSet::from([Horizon::Strategic]));

        let orphan = strategy("O", "Odd", StrategyCategory::Policy, 5.0, 60_000.0, 7);
        assert_eq!(classify(&orphan), BTreeSet::from([Horizon::Tactical]));
    }

    #[test]
    fn horizons_never_share_strategies() {
        let cat = catalog();
        let plan = MultiHorizonScheduler::new(&cat, 500_000.0, 72.0)
            .optimize_all_horizons(&HorizonAllocation::default());

        let mut seen = HashSet::new();
        for hp in plan.horizon_plans() {
            for id in hp.strategy_ids() {
                assert!(seen.insert(id.clone()), "{id} scheduled twice");
            }
            assert!(hp.total_cost <= hp.budget + 1e-9);
            assert!(hp.risk_reduction <= HORIZON_RISK_CAP);
        }
        assert!(plan.total_risk_reduction <= PORTFOLIO_RISK_CAP);
    }

    #[test]
    fn reference_catalog_plan() {
        let cat = catalog();
        let plan = MultiHorizonScheduler::new(&cat, 500_000.0, 72.0)
            .optimize_all_horizons(&HorizonAllocation::default());

        let ids = |hp: &HorizonPlan| {
            hp.strategy_ids()
                .map(|id| id.as_str().to_string())
                .collect::<Vec<_>>()
        };
        // Immediate (125k): policy 0.0015, process 0.00080 (both x1.5).
        assert_eq!(ids(&plan.immediate), vec!["POLICY_001", "PROC_001"]);
        // Tactical (225k): training 0.0004, maintenance 0.00022 (both x1.5).
        assert_eq!(ids(&plan.tactical), vec!["TRAIN_001", "MAINT_001"]);
        // Strategic (150k): neither remaining technology strategy fits.
        assert!(plan.strategic.strategies.is_empty());

        assert_eq!(plan.immediate.action_items[0], "START NOW: Updated Weather Minimums");
        assert_eq!(plan.tactical.decision_deadline, "Decision required: This week");
        assert!((plan.total_cost - 185_000.0).abs() < 1e-6);
        assert!((plan.total_risk_reduction - 43.0).abs() < 1e-9);

        assert_eq!(plan.phases.len(), 2);
        assert_eq!(plan.phases[0].milestone, "Achieve 13% risk reduction");
        assert_eq!(plan.phases[1].milestone, "Cumulative 43% reduction");
        assert_eq!(plan.phases[1].phase, 2);
        assert_eq!((plan.phases[0].start_day, plan.phases[0].end_day), (0, 30));
        assert_eq!((plan.phases[1].start_day, plan.phases[1].end_day), (30, 180));
        assert_eq!(plan.tradeoff.stance, TradeoffStance::Balanced);
        assert!((plan.tradeoff.quick_fix_cost_effectiveness - 13.0 / 20.0).abs() < 1e-9);
        assert!(plan.dependencies.is_empty());
    }

    #[test]
    fn technology_depends_on_training() {
        let cat = catalog();
        let allocation = HorizonAllocation {
            immediate: 0.1,
            tactical: 0.3,
            strategic: 0.5,
        };
        let plan =
            MultiHorizonScheduler::new(&cat, 1_000_000.0, 80.0).optimize_all_horizons(&allocation);

        assert!(plan.tactical.strategy_ids().any(|id| id.as_str() == "TRAIN_001"));
        let techs: Vec<&str> = plan
            .strategic
            .strategies
            .iter()
            .filter(|s| s.category() == StrategyCategory::Technology)
            .map(|s| s.id().as_str())
            .collect();
        assert!(!techs.is_empty());
        assert_eq!(plan.dependencies.len(), techs.len());
        assert!(plan
            .dependencies
            .iter()
            .all(|d| d.to.as_str() == "TRAIN_001" && d.kind == DependencyKind::RequiresTraining));
        assert_eq!(plan.tradeoff.stance, TradeoffStance::Urgent);
        let strategic = plan.phases.last().unwrap();
        assert_eq!(strategic.horizon, Horizon::Strategic);
        assert_eq!((strategic.start_day, strategic.end_day), (180, 365));
    }

    #[test]
    fn zero_budget_plan_is_empty() {
        let cat = catalog();
        let plan = MultiHorizonScheduler::new(&cat, 0.0, 30.0)
            .optimize_all_horizons(&HorizonAllocation::default());
        assert!(plan.phases.is_empty());
        assert_eq!(plan.total_cost, 0.0);
        assert_eq!(plan.tradeoff.quick_fix_cost_effectiveness, 0.0);
        assert_eq!(plan.tradeoff.stance, TradeoffStance::StrategicFocus);
    }

    #[test]
    fn allocation_bounds_are_enforced() {
        assert!(validate_allocation(&HorizonAllocation::default()).is_ok());

        let too_much_now = HorizonAllocation {
            immediate: 0.45,
            tactical: 0.3,
            strategic: 0.2,
        };
        assert!(matches!(
            validate_allocation(&too_much_now),
            Err(EngineError::AllocationOutOfBounds { .. })
        ));

        let over_budget = HorizonAllocation {
            immediate: 0.4,
            tactical: 0.5,
            strategic: 0.5,
        };
        assert!(matches!(
            validate_allocation(&over_budget),
            Err(EngineError::AllocationExceedsBudget { .. })
        ));
    }
}
