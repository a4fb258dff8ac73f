//! Adversarial validation: apply the red team's attacks to a portfolio,
//! score how well it holds up, and synthesize a backup plan.
//!
//! An assessment runs `GenerateAttacks → ApplyAttacks → Score →
//! SynthesizeBackup → Done` once, with no retries.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use riskadvisor_core::{Portfolio, StrategyCatalog, StrategyId};

use crate::attacks::{mitigation_for, AttackKind, AttackResult, OutcomeSnapshot, RedTeam};
use crate::config::{OptimizerConfig, WargameConfig};
use crate::optimizer::PortfolioOptimizer;
use crate::types::RiskTolerance;

/// Attacks degrading the portfolio by more than this percentage trigger
/// their mitigation recommendation.
const HIGH_DAMAGE_PCT: f64 = 20.0;

/// Below this score the generic diversification advice is added.
const DIVERSIFY_BELOW: f64 = 60.0;

const GENERIC_RECOMMENDATIONS: [&str; 2] = [
    "Consider diversifying portfolio across more strategies",
    "Prioritize strategies with higher confidence levels",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::A
        } else if score >= 70.0 {
            Self::B
        } else if score >= 55.0 {
            Self::C
        } else if score >= 40.0 {
            Self::D
        } else {
            Self::F
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentStage {
    GenerateAttacks,
    ApplyAttacks,
    Score,
    SynthesizeBackup,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RobustnessAssessment {
    pub portfolio: Portfolio,
    /// In [0, 100].
    pub robustness_score: f64,
    pub grade: Grade,
    pub attack_results: Vec<AttackResult>,
    /// The attack with the largest degradation, first on ties.
    pub worst_case: Option<AttackResult>,
    pub worst_case_description: String,
    pub worst_case_outcome: Option<OutcomeSnapshot>,
    pub backup_plan: Portfolio,
    /// Sorted, without duplicates.
    pub recommendations: Vec<String>,
}

/// Builds backup plans from the catalog minus failed strategies.
pub struct BlueTeam<'a> {
    catalog: &'a StrategyCatalog,
    config: &'a OptimizerConfig,
}

impl<'a> BlueTeam<'a> {
    pub fn new(catalog: &'a StrategyCatalog, config: &'a OptimizerConfig) -> Self {
        Self { catalog, config }
    }

    /// Conservative portfolio under `reduced_budget`, excluding every strategy
    /// a strategy-failure attack took down.
    pub fn generate_backup_plan(
        &self,
        attack_results: &[AttackResult],
        reduced_budget: f64,
    ) -> Portfolio {
        let failed: BTreeSet<StrategyId> = attack_results
            .iter()
            .filter(|r| r.attack.kind == AttackKind::StrategyFailure)
            .flat_map(|r| r.attack.affected_strategies.iter().cloned())
            .collect();

        let available = self.catalog.excluding(&failed);
        tracing::debug!(
            excluded = failed.len(),
            available = available.len(),
            reduced_budget,
            "Synthesizing backup plan"
        );

        PortfolioOptimizer::new(&available, self.config).get_optimal_portfolio(
            reduced_budget,
            self.config.default_timeline_days,
            RiskTolerance::Conservative,
        )
    }
}

/// Runs red and blue team and folds their output into one assessment.
pub struct PurpleTeam<'a> {
    red: RedTeam,
    blue: BlueTeam<'a>,
    config: &'a WargameConfig,
}

impl<'a> PurpleTeam<'a> {
    pub fn new(
        catalog: &'a StrategyCatalog,
        optimizer_config: &'a OptimizerConfig,
        config: &'a WargameConfig,
    ) -> Self {
        Self {
            red: RedTeam::new(config.min_severity),
            blue: BlueTeam::new(catalog, optimizer_config),
            config,
        }
    }

    pub fn assess_robustness(
        &self,
        portfolio: &Portfolio,
        available_budget: f64,
    ) -> RobustnessAssessment {
        let mut stage = AssessmentStage::GenerateAttacks;
        tracing::debug!(?stage, strategies = portfolio.len(), "Assessment stage");
        let attacks = self.red.generate_attacks(portfolio);

        stage = AssessmentStage::ApplyAttacks;
        tracing::debug!(?stage, attacks = attacks.len(), "Assessment stage");
        let attack_results: Vec<AttackResult> = attacks
            .iter()
            .map(|a| self.red.apply_attack(portfolio, a))
            .collect();

        stage = AssessmentStage::Score;
        tracing::debug!(?stage, "Assessment stage");
        let robustness_score = robustness_score(&attack_results);
        let grade = Grade::from_score(robustness_score);
        let worst_case = worst_case(&attack_results).cloned();

        stage = AssessmentStage::SynthesizeBackup;
        tracing::debug!(?stage, "Assessment stage");
        let backup_budget = available_budget * self.config.backup_budget_fraction;
        let backup_plan = self.blue.generate_backup_plan(&attack_results, backup_budget);
        let recommendations = recommendations(&attack_results, robustness_score);

        stage = AssessmentStage::Done;
        tracing::info!(
            ?stage,
            robustness_score,
            %grade,
            attacks = attack_results.len(),
            backup_cost = backup_plan.total_cost,
            "Robustness assessment complete"
        );

        RobustnessAssessment {
            portfolio: portfolio.clone(),
            robustness_score,
            grade,
            worst_case_description: worst_case
                .as_ref()
                .map(|r| r.attack.description.clone())
                .unwrap_or_default(),
            worst_case_outcome: worst_case.as_ref().map(|r| r.degraded),
            worst_case,
            attack_results,
            backup_plan,
            recommendations,
        }
    }
}

/// `clamp((100 - mean degradation) * viable fraction, 0, 100)`; 100 when no
/// attack applied.
pub fn robustness_score(results: &[AttackResult]) -> f64 {
    if results.is_empty() {
        return 100.0;
    }
    let n = results.len() as f64;
    let mean_degradation = results.iter().map(|r| r.degradation_pct).sum::<f64>() / n;
    let viable = results.iter().filter(|r| r.still_viable).count() as f64 / n;
    ((100.0 - mean_degradation) * viable).clamp(0.0, 100.0)
}

pub fn worst_case(results: &[AttackResult]) -> Option<&AttackResult> {
    results.iter().fold(None, |worst, r| match worst {
        Some(w) if r.degradation_pct <= w.degradation_pct => Some(w),
        _ => Some(r),
    })
}

pub fn recommendations(results: &[AttackResult], robustness_score: f64) -> Vec<String> {
    let mut recs: BTreeSet<String> = results
        .iter()
        .filter(|r| r.degradation_pct > HIGH_DAMAGE_PCT)
        .filter_map(|r| mitigation_for(r.attack.kind))
        .map(str::to_string)
        .collect();

    if robustness_score < DIVERSIFY_BELOW {
        recs.extend(GENERIC_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    }
    recs.into_iter().collect()
}
