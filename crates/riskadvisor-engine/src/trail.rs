//! Decision-trail helpers for engine runs.
//!
//! The CLI opens a session per command, records what the engine decided,
//! and stores the sealed trail when a trail directory is configured.

use riskadvisor_core::Portfolio;
use riskadvisor_trail::session::TrailSession;
use riskadvisor_trail::store::{FsTrailStore, TrailStore};
use riskadvisor_trail::Trail;

use crate::horizons::MultiHorizonPlan;
use crate::package::DecisionPackage;
use crate::types::SensitivityReport;
use crate::wargame::RobustnessAssessment;

/// Open a session for one command and record the request parameters.
pub fn start_session(command: &str, context: serde_json::Value) -> TrailSession {
    let mut session = TrailSession::new(command, &format!("RiskAdvisor {command} run"));
    session.set_context(context);
    session
}

/// Record the portfolio an engine settled on.
pub fn record_portfolio(
    session: &mut TrailSession,
    step: &str,
    rationale: &str,
    portfolio: &Portfolio,
) {
    let ids: Vec<&str> = portfolio.strategies.iter().map(|s| s.id().as_str()).collect();
    session.add_decision(
        &format!("Select {} strategies: {}", ids.len(), ids.join(", ")),
        rationale,
        1.0,
    );
    session.add_outcome(
        step,
        &format!(
            "Cost {:.0}, risk reduction {:.1}%, timeline {} days",
            portfolio.total_cost, portfolio.total_risk_reduction, portfolio.total_timeline_days
        ),
        serde_json::json!({
            "strategies": ids,
            "total_cost": portfolio.total_cost,
            "total_risk_reduction": portfolio.total_risk_reduction,
            "total_timeline_days": portfolio.total_timeline_days,
            "pareto_rank": portfolio.pareto_rank,
            "uncertainty": portfolio.uncertainty,
        }),
        true,
    );
}

/// Record every frontier point; all but `chosen_rank` are logged as
/// rejected alternatives.
pub fn record_frontier(
    session: &mut TrailSession,
    frontier: &[Portfolio],
    chosen_rank: Option<u32>,
) {
    for p in frontier.iter().filter(|p| Some(p.pareto_rank) != chosen_rank) {
        session.add_alternative(
            &format!("Pareto point {}", p.pareto_rank),
            &format!(
                "Not selected (cost {:.0}, risk reduction {:.1}%)",
                p.total_cost, p.total_risk_reduction
            ),
        );
    }
    session.add_outcome(
        "pareto",
        &format!("{} non-dominated portfolios", frontier.len()),
        serde_json::json!({ "frontier_size": frontier.len() }),
        true,
    );
}

pub fn record_assessment(session: &mut TrailSession, assessment: &RobustnessAssessment) {
    session.add_decision(
        &format!("Grade {}", assessment.grade),
        &format!("Robustness score {:.1}", assessment.robustness_score),
        1.0,
    );
    for result in assessment.attack_results.iter().filter(|r| !r.still_viable) {
        session.add_outcome(
            "attack",
            &format!("{} leaves the portfolio non-viable", result.attack.kind),
            serde_json::json!({ "degradation_pct": result.degradation_pct }),
            false,
        );
    }
    record_portfolio(
        session,
        "backup_plan",
        "Conservative fallback without failed strategies",
        &assessment.backup_plan,
    );
}

pub fn record_plan(session: &mut TrailSession, plan: &MultiHorizonPlan) {
    for hp in plan.horizon_plans() {
        session.add_decision(
            &format!("{} horizon: {} strategies", hp.horizon, hp.strategies.len()),
            &hp.decision_deadline,
            1.0,
        );
    }
    session.add_outcome(
        "horizons",
        &plan.tradeoff.recommendation,
        serde_json::json!({
            "total_cost": plan.total_cost,
            "total_risk_reduction": plan.total_risk_reduction,
            "phases": plan.phases.len(),
            "dependencies": plan.dependencies.len(),
        }),
        true,
    );
}

pub fn record_package(session: &mut TrailSession, package: &DecisionPackage) {
    record_plan(session, &package.horizon_plan);
    record_assessment(session, &package.robustness);
    for scenario in package.scenarios.iter().filter(|s| !s.recommended) {
        session.add_alternative(&scenario.name, &scenario.rationale);
    }
    session.add_outcome(
        "package",
        &format!("{} situation, {}", package.situation, package.decision_deadline),
        serde_json::json!({ "package_id": package.id }),
        true,
    );
}

pub fn record_sensitivity(session: &mut TrailSession, report: &SensitivityReport) {
    record_portfolio(session, "baseline", "Recommended portfolio", &report.portfolio);
    session.add_outcome(
        "sensitivity",
        &format!("{} strategies perturbed by 20%", report.sensitivities.len()),
        serde_json::to_value(&report.sensitivities).unwrap_or_default(),
        true,
    );
}

/// Seal the session and store it under `trail_dir` when one is set.
///
/// Store failures are logged, never fatal: the trail is returned either way.
pub fn finalize_and_store(session: TrailSession, trail_dir: Option<&str>) -> Trail {
    let trail = session.finalize();
    let Some(dir) = trail_dir else {
        return trail;
    };

    match FsTrailStore::new(dir) {
        Ok(store) => match store.save(&trail) {
            Ok(()) => tracing::info!(trail_id = %trail.id, "Decision trail recorded"),
            Err(e) => tracing::warn!(error = %e, "Failed to store decision trail"),
        },
        Err(e) => tracing::warn!(error = %e, "Failed to initialize trail store"),
    }
    trail
}
