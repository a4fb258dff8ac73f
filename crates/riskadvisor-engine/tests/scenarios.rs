//! End-to-end scenarios through the `AdvisorEngine` facade.

use riskadvisor_core::StrategyCategory::{Maintenance, Policy, Process, Technology, Training};
use riskadvisor_core::{Portfolio, StrategyCatalog, StrategyId, StrategyInput};
use riskadvisor_engine::attacks::{AttackKind, RedTeam, Severity, ATTACK_LIBRARY};
use riskadvisor_engine::horizons::{classify, Horizon};
use riskadvisor_engine::package::Situation;
use riskadvisor_engine::types::{
    OptimizeRequest, PackageRequest, ParetoRequest, RiskTolerance, WargameRequest,
};
use riskadvisor_engine::{AdvisorEngine, EngineConfig, Grade};

fn engine_with_seed(seed: u64) -> AdvisorEngine {
    let mut config = EngineConfig::default();
    config.optimizer.seed = Some(seed);
    config.optimizer.monte_carlo_simulations = 500;
    AdvisorEngine::new(config).unwrap()
}

fn two_strategy_catalog() -> StrategyCatalog {
    StrategyCatalog::from_inputs(vec![
        StrategyInput::new("A", "Alpha", Process, 20.0, 100.0, 10).point_estimates(),
        StrategyInput::new("B", "Bravo", Training, 30.0, 200.0, 40).point_estimates(),
    ])
    .unwrap()
}

fn aviation_catalog() -> StrategyCatalog {
    StrategyCatalog::from_inputs(vec![
        StrategyInput::new("PROC_001", "Emergency Inspection Protocol", Process, 8.0, 15_000.0, 7),
        StrategyInput::new("POLICY_001", "Updated Weather Minimums", Policy, 5.0, 5_000.0, 3),
        StrategyInput::new("TRAIN_001", "Crew Fatigue Training", Training, 12.0, 45_000.0, 45),
        StrategyInput::new(
            "MAINT_001",
            "Enhanced Maintenance Protocol",
            Maintenance,
            18.0,
            120_000.0,
            60,
        ),
        StrategyInput::new(
            "TECH_001",
            "Predictive Maintenance AI System",
            Technology,
            25.0,
            350_000.0,
            180,
        ),
        StrategyInput::new(
            "TECH_002",
            "Safety Management Platform",
            Technology,
            15.0,
            200_000.0,
            120,
        ),
    ])
    .unwrap()
}

fn optimize(
    engine: &AdvisorEngine,
    catalog: &StrategyCatalog,
    budget: f64,
    tolerance: RiskTolerance,
) -> Portfolio {
    engine
        .optimize(&OptimizeRequest {
            strategies: catalog.clone(),
            budget_limit: budget,
            timeline_limit: None,
            risk_tolerance: tolerance,
        })
        .unwrap()
}

fn ids(portfolio: &Portfolio) -> Vec<&str> {
    portfolio.strategy_ids().into_iter().map(StrategyId::as_str).collect()
}

#[test]
fn two_strategy_budget_250() {
    let engine = engine_with_seed(1);
    let catalog = two_strategy_catalog();

    // Sweep 75..250 finds {} (75 and 94.4 afford nothing), {A} (ratio 0.2)
    // and {B} (30% reduction); {A, B} costs 300 and never fits.
    let balanced = optimize(&engine, &catalog, 250.0, RiskTolerance::Balanced);
    assert_eq!(ids(&balanced), vec!["A"]);
    assert!((balanced.total_cost - 100.0).abs() < 1e-9);

    let aggressive = optimize(&engine, &catalog, 250.0, RiskTolerance::Aggressive);
    assert_eq!(ids(&aggressive), vec!["B"]);

    let conservative = optimize(&engine, &catalog, 250.0, RiskTolerance::Conservative);
    assert!(conservative.is_empty());
    assert_eq!(conservative.total_cost, 0.0);
}

#[test]
fn frontier_keeps_unaffordable_sweep_points() {
    let request = ParetoRequest {
        strategies: two_strategy_catalog(),
        budget_limit: 250.0,
        timeline_limit: None,
        n_solutions: Some(10),
    };
    let frontier = engine_with_seed(1).pareto_frontier(&request).unwrap();
    assert_eq!(frontier.len(), 10);
    assert!(frontier[0].is_empty());
    assert!(frontier[1].is_empty());
    assert_eq!(frontier.iter().filter(|p| ids(p) == vec!["A"]).count(), 5);
    assert_eq!(frontier.iter().filter(|p| ids(p) == vec!["B"]).count(), 3);
}

#[test]
fn unaffordable_catalog_gives_empty_portfolio() {
    let engine = engine_with_seed(1);
    let portfolio = optimize(&engine, &two_strategy_catalog(), 50.0, RiskTolerance::Balanced);
    assert!(portfolio.is_empty());
    assert_eq!(portfolio.total_cost, 0.0);
    assert!(portfolio.constraints.within_budget);
}

#[test]
fn sole_strategy_failure_is_fatal() {
    let catalog = two_strategy_catalog();
    let portfolio = Portfolio::from_selection(vec![catalog.strategies()[0].clone()]);

    let red = RedTeam::new(Severity::Low);
    let attack = red
        .generate_attacks(&portfolio)
        .into_iter()
        .find(|a| a.kind == AttackKind::StrategyFailure)
        .unwrap();
    assert_eq!(attack.affected_strategies, vec![StrategyId::new("A")]);

    let result = red.apply_attack(&portfolio, &attack);
    assert_eq!(result.degraded.risk_reduction, 0.0);
    assert!(!result.still_viable);
    assert!((result.degradation_pct - 100.0).abs() < 1e-9);
}

#[test]
fn wargame_on_explicit_selection() {
    let engine = engine_with_seed(5);
    let request = WargameRequest {
        strategies: aviation_catalog(),
        available_budget: 500_000.0,
        risk_tolerance: RiskTolerance::Balanced,
        selected: Some(vec![StrategyId::new("TECH_001"), StrategyId::new("TRAIN_001")]),
    };
    let assessment = engine.wargame(&request).unwrap();

    assert_eq!(assessment.attack_results.len(), ATTACK_LIBRARY.len());
    assert_eq!(assessment.grade, Grade::from_score(assessment.robustness_score));
    assert!(!assessment.backup_plan.contains(&StrategyId::new("TECH_001")));
    assert!(assessment.backup_plan.total_cost <= 300_000.0);
    assert_eq!(
        assessment.worst_case_description,
        assessment.worst_case.as_ref().unwrap().attack.description
    );
}

#[test]
fn assessment_is_idempotent_for_fixed_seed() {
    let engine = engine_with_seed(21);
    let catalog = aviation_catalog();
    let portfolio = optimize(&engine, &catalog, 400_000.0, RiskTolerance::Balanced);

    let first = engine.assess_robustness(&portfolio, &catalog, 400_000.0).unwrap();
    let second = engine.assess_robustness(&portfolio, &catalog, 400_000.0).unwrap();
    assert_eq!(first.robustness_score, second.robustness_score);
    assert_eq!(first.grade, second.grade);
    assert_eq!(first.backup_plan, second.backup_plan);
    assert_eq!(first.recommendations, second.recommendations);
}

#[test]
fn monte_carlo_brackets_point_estimate() {
    let engine = engine_with_seed(3);
    let catalog = aviation_catalog();
    let portfolio = Portfolio::from_selection(catalog.strategies()[..4].to_vec());

    let analyzed = engine.monte_carlo(&portfolio, 10_000).unwrap();
    let bounds = analyzed.uncertainty.unwrap();
    assert_eq!(bounds.simulations, 10_000);
    assert!(bounds.cost_p5 <= portfolio.total_cost);
    assert!(portfolio.total_cost <= bounds.cost_p95);
    assert!(bounds.risk_reduction_p5 <= portfolio.total_risk_reduction);
    assert!(portfolio.total_risk_reduction <= bounds.risk_reduction_p95);

    let again = engine.monte_carlo(&portfolio, 10_000).unwrap();
    assert_eq!(again.uncertainty, analyzed.uncertainty);
}

#[test]
fn short_cheap_process_is_immediate_only() {
    let strategy = StrategyInput::new("P", "Quick Check", Process, 5.0, 10_000.0, 10)
        .build()
        .unwrap();
    let eligible = classify(&strategy);
    assert!(eligible.contains(&Horizon::Immediate));
    assert!(!eligible.contains(&Horizon::Strategic));
}

#[test]
fn package_from_json_request() {
    let json = r#"{
        "budget": 500000,
        "risk_score": 80,
        "strategies": [
            {"id": "PROC_001", "name": "Emergency Inspection Protocol", "category": "process",
             "risk_reduction_pct": 8, "cost_estimate": 15000, "time_estimate": 7},
            {"id": "TRAIN_001", "name": "Crew Fatigue Training", "category": "training",
             "risk_reduction_pct": 12, "cost_estimate": 45000, "time_estimate": 45,
             "disruption_level": "medium", "approval_level": "director"},
            {"id": "TECH_001", "name": "Predictive Maintenance AI System", "category": "technology",
             "risk_reduction_pct": 25, "cost_estimate": 350000, "time_estimate": 180,
             "cost_min": 300000, "cost_max": 450000}
        ]
    }"#;
    let request: PackageRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.strategies.len(), 3);

    let package = engine_with_seed(9).decision_package(&request).unwrap();
    assert_eq!(package.situation, Situation::Critical);
    assert_eq!(package.decision_deadline, "Decision required: TODAY");
    assert_eq!(package.scenarios.len(), 5);
    assert_eq!(package.recommended().unwrap().scenario_id, "S2");

    let out = serde_json::to_value(&package).unwrap();
    assert_eq!(out["situation"], "critical");
    assert!(out["horizon_plan"]["phases"].is_array());
}

#[test]
fn duplicate_ids_rejected_at_parse() {
    let json = r#"{
        "budget_limit": 1000,
        "strategies": [
            {"id": "X", "name": "One", "category": "policy",
             "risk_reduction_pct": 5, "cost_estimate": 10},
            {"id": "X", "name": "Two", "category": "policy",
             "risk_reduction_pct": 6, "cost_estimate": 20}
        ]
    }"#;
    let err = serde_json::from_str::<OptimizeRequest>(json).unwrap_err();
    assert!(err.to_string().contains("X"));
}

#[test]
fn inverted_cost_range_rejected_at_parse() {
    let json = r#"{
        "budget_limit": 1000,
        "strategies": [
            {"id": "X", "name": "One", "category": "policy", "risk_reduction_pct": 5,
             "cost_estimate": 10, "cost_min": 20, "cost_max": 30}
        ]
    }"#;
    assert!(serde_json::from_str::<OptimizeRequest>(json).is_err());
}
