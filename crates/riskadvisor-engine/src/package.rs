//! Executive decision package: one call that runs the scheduler, the
//! balanced optimizer and the robustness assessment over the same catalog
//! and lays the result out as comparable scenarios.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use riskadvisor_core::{DisruptionLevel, Portfolio, StrategyCatalog};

use crate::config::EngineConfig;
use crate::horizons::{MultiHorizonPlan, MultiHorizonScheduler};
use crate::optimizer::PortfolioOptimizer;
use crate::types::RiskTolerance;
use crate::wargame::{PurpleTeam, RobustnessAssessment};

const DECISION_OWNER: &str = "VP Safety / CEO";

/// How pressing the current risk level is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Situation {
    Critical,
    Elevated,
    Normal,
}

impl Situation {
    pub fn for_risk_score(risk_score: f64) -> Self {
        if risk_score >= 75.0 {
            Self::Critical
        } else if risk_score >= 50.0 {
            Self::Elevated
        } else {
            Self::Normal
        }
    }

    fn action(self) -> &'static str {
        match self {
            Self::Critical => "Immediate action required",
            Self::Elevated => "Prompt attention needed",
            Self::Normal => "Planned improvements recommended",
        }
    }

    fn deadline(self) -> &'static str {
        match self {
            Self::Critical => "Decision required: TODAY",
            Self::Elevated | Self::Normal => "Decision required: This week",
        }
    }
}

impl fmt::Display for Situation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Critical => "Critical",
            Self::Elevated => "Elevated",
            Self::Normal => "Normal",
        };
        f.write_str(s)
    }
}

/// One row of the scenario comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionScenario {
    pub scenario_id: String,
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub risk_reduction: f64,
    pub timeline_days: u32,
    pub disruption_level: DisruptionLevel,
    pub confidence: f64,
    pub recommended: bool,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionPackage {
    pub id: Uuid,
    pub title: String,
    pub situation: Situation,
    pub situation_summary: String,
    pub risk_score: f64,
    pub budget: f64,
    pub created_at: DateTime<Utc>,
    pub horizon_plan: MultiHorizonPlan,
    pub optimal_portfolio: Portfolio,
    pub robustness: RobustnessAssessment,
    pub scenarios: Vec<DecisionScenario>,
    pub decision_deadline: String,
    pub decision_owner: String,
}

impl DecisionPackage {
    pub fn recommended(&self) -> Option<&DecisionScenario> {
        self.scenarios.iter().find(|s| s.recommended)
    }
}

/// Inputs are assumed validated by the caller.
pub fn build_decision_package(
    catalog: &StrategyCatalog,
    budget: f64,
    risk_score: f64,
    config: &EngineConfig,
) -> DecisionPackage {
    let horizon_plan = MultiHorizonScheduler::new(catalog, budget, risk_score)
        .optimize_all_horizons(&config.horizons);

    let optimal = PortfolioOptimizer::new(catalog, &config.optimizer).get_optimal_portfolio(
        budget,
        config.optimizer.default_timeline_days,
        RiskTolerance::Balanced,
    );

    let robustness = PurpleTeam::new(catalog, &config.optimizer, &config.wargame)
        .assess_robustness(&optimal, budget);

    let situation = Situation::for_risk_score(risk_score);
    let scenarios = scenarios(&optimal, &robustness, budget);

    tracing::info!(
        %situation,
        risk_score,
        budget,
        recommended_cost = optimal.total_cost,
        robustness_score = robustness.robustness_score,
        "Decision package built"
    );

    DecisionPackage {
        id: Uuid::new_v4(),
        title: format!("Decision Brief - Risk Score {risk_score:.0}"),
        situation,
        situation_summary: format!(
            "Risk Score: {risk_score:.0}/100 ({situation}). {}. Budget available: {budget:.0}.",
            situation.action()
        ),
        risk_score,
        budget,
        created_at: Utc::now(),
        horizon_plan,
        optimal_portfolio: optimal,
        robustness,
        scenarios,
        decision_deadline: situation.deadline().to_string(),
        decision_owner: DECISION_OWNER.to_string(),
    }
}

/// Do nothing, quick fix, recommended, aggressive and conservative, all
/// scaled from the recommended portfolio.
pub fn scenarios(
    optimal: &Portfolio,
    robustness: &RobustnessAssessment,
    budget: f64,
) -> Vec<DecisionScenario> {
    let scenario = |id: &str,
                    name: &str,
                    description: &str,
                    (cost, risk_reduction, timeline_days): (f64, f64, u32),
                    disruption_level: DisruptionLevel,
                    confidence: f64,
                    rationale: &str| DecisionScenario {
        scenario_id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        cost,
        risk_reduction,
        timeline_days,
        disruption_level,
        confidence,
        recommended: false,
        rationale: rationale.to_string(),
    };

    let cost = optimal.total_cost;
    let reduction = optimal.total_risk_reduction;

    vec![
        scenario(
            "S0",
            "Do Nothing",
            "Maintain current state",
            (0.0, 0.0, 0),
            DisruptionLevel::None,
            1.0,
            "Risk continues to grow 10-15% annually",
        ),
        scenario(
            "S1",
            "Quick Fix",
            "Address immediate concerns only",
            (budget * 0.3, reduction * 0.4, 30),
            DisruptionLevel::Low,
            0.95,
            "Temporary relief, doesn't address root causes",
        ),
        DecisionScenario {
            recommended: true,
            ..scenario(
                "S2",
                "Recommended",
                "Balanced multi-horizon approach",
                (cost, reduction, optimal.total_timeline_days),
                DisruptionLevel::Medium,
                robustness.robustness_score / 100.0,
                "Optimal balance of cost, effectiveness, and sustainability",
            )
        },
        scenario(
            "S3",
            "Aggressive",
            "Maximum risk reduction, higher cost",
            (budget.min(cost * 1.3), (reduction * 1.2).min(75.0), 60),
            DisruptionLevel::High,
            0.75,
            "Faster but higher disruption risk",
        ),
        scenario(
            "S4",
            "Conservative",
            "Lower investment, longer timeline",
            (cost * 0.7, reduction * 0.8, 150),
            DisruptionLevel::Low,
            0.92,
            "Safer approach, acceptable for lower risk situations",
        ),
    ]
}
