//! Red team: the attack library, per-portfolio attack generation, and the
//! rules that turn an attack into a degraded outcome.
//!
//! Every attack kind maps to one [`Playbook`] entry holding its apply rule,
//! its recovery options and the mitigation recommended when it hurts.

use std::fmt;

use serde::{Deserialize, Serialize};

use riskadvisor_core::{Portfolio, Strategy, StrategyId};

/// A scenario is still viable while it keeps at least this share of the
/// original risk reduction.
pub const VIABILITY_THRESHOLD: f64 = 0.5;

/// Timeline stretch when a key person leaves.
const KEY_PERSON_DELAY: f64 = 1.2;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    CostOverrun,
    TimelineDelay,
    StrategyFailure,
    BudgetCut,
    KeyPersonLeaves,
    NewRiskEmerges,
    VendorDelay,
    RegulatoryChange,
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CostOverrun => "cost_overrun",
            Self::TimelineDelay => "timeline_delay",
            Self::StrategyFailure => "strategy_failure",
            Self::BudgetCut => "budget_cut",
            Self::KeyPersonLeaves => "key_person_leaves",
            Self::NewRiskEmerges => "new_risk_emerges",
            Self::VendorDelay => "vendor_delay",
            Self::RegulatoryChange => "regulatory_change",
        };
        f.write_str(s)
    }
}

/// How an attack bites: scale an aggregate, or shift it by a fixed amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Impact {
    Multiplier(f64),
    Absolute(f64),
}

impl Impact {
    fn multiplier(self) -> f64 {
        match self {
            Self::Multiplier(m) => m,
            Self::Absolute(_) => 1.0,
        }
    }

    fn absolute(self) -> f64 {
        match self {
            Self::Absolute(a) => a,
            Self::Multiplier(_) => 0.0,
        }
    }
}

/// A library entry, specialized into an [`Attack`] per portfolio.
#[derive(Debug, Clone, Copy)]
pub struct AttackTemplate {
    pub kind: AttackKind,
    pub severity: Severity,
    pub probability: f64,
    pub impact: Impact,
    pub description: &'static str,
}

pub const ATTACK_LIBRARY: [AttackTemplate; 8] = [
    AttackTemplate {
        kind: AttackKind::CostOverrun,
        severity: Severity::High,
        probability: 0.25,
        impact: Impact::Multiplier(1.5),
        description: "Costs are 50% higher than estimated",
    },
    AttackTemplate {
        kind: AttackKind::TimelineDelay,
        severity: Severity::Medium,
        probability: 0.35,
        impact: Impact::Multiplier(2.0),
        description: "Implementation takes 2x longer",
    },
    AttackTemplate {
        kind: AttackKind::StrategyFailure,
        severity: Severity::High,
        probability: 0.15,
        impact: Impact::Multiplier(0.0),
        description: "Top strategy fails completely",
    },
    AttackTemplate {
        kind: AttackKind::BudgetCut,
        severity: Severity::High,
        probability: 0.20,
        impact: Impact::Absolute(-0.40),
        description: "Budget reduced by 40% mid-implementation",
    },
    AttackTemplate {
        kind: AttackKind::KeyPersonLeaves,
        severity: Severity::Medium,
        probability: 0.15,
        impact: Impact::Multiplier(1.3),
        description: "Project lead leaves mid-implementation",
    },
    AttackTemplate {
        kind: AttackKind::NewRiskEmerges,
        severity: Severity::Medium,
        probability: 0.20,
        impact: Impact::Absolute(0.15),
        description: "New critical risk discovered during implementation",
    },
    AttackTemplate {
        kind: AttackKind::VendorDelay,
        severity: Severity::Medium,
        probability: 0.30,
        impact: Impact::Absolute(60.0),
        description: "Key vendor delays equipment by 60 days",
    },
    AttackTemplate {
        kind: AttackKind::RegulatoryChange,
        severity: Severity::Low,
        probability: 0.10,
        impact: Impact::Absolute(50_000.0),
        description: "New regulatory requirement adds compliance work",
    },
];

/// A stress scenario specialized for one portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attack {
    pub kind: AttackKind,
    pub severity: Severity,
    pub probability: f64,
    pub impact: Impact,
    pub description: String,
    #[serde(default)]
    pub affected_strategies: Vec<StrategyId>,
}

impl Attack {
    /// An attack straight from its template.
    pub fn from_template(template: &AttackTemplate) -> Self {
        Self {
            kind: template.kind,
            severity: template.severity,
            probability: template.probability,
            impact: template.impact,
            description: template.description.to_string(),
            affected_strategies: Vec::new(),
        }
    }

    /// A strategy-failure attack aimed at `target`.
    pub fn strategy_failure(template: &AttackTemplate, target: &Strategy) -> Self {
        Self {
            description: format!("Strategy '{}' fails completely", target.name()),
            affected_strategies: vec![target.id().clone()],
            ..Self::from_template(template)
        }
    }
}

/// Aggregate outcome of a portfolio, before or after an attack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OutcomeSnapshot {
    pub cost: f64,
    pub risk_reduction: f64,
    pub timeline_days: u32,
    pub strategies: usize,
}

impl OutcomeSnapshot {
    pub fn of(portfolio: &Portfolio) -> Self {
        Self {
            cost: portfolio.total_cost,
            risk_reduction: portfolio.total_risk_reduction,
            timeline_days: portfolio.total_timeline_days,
            strategies: portfolio.len(),
        }
    }
}

/// What an attack took away. Only the fields the attack touches are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Damage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_increase: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_increase: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_reduction_lost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_cut: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_risk: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttackResult {
    pub attack: Attack,
    pub original: OutcomeSnapshot,
    pub degraded: OutcomeSnapshot,
    pub damage: Damage,
    /// Percentage of the original risk reduction lost; 0 when there was none.
    pub degradation_pct: f64,
    pub still_viable: bool,
    pub recovery_options: Vec<String>,
}

// ── Dispatch table ────────────────────────────────────────────────

/// Degraded outcome plus the damage that produced it.
type Applied = (OutcomeSnapshot, Damage);

type ApplyFn = fn(&Attack, &Portfolio, OutcomeSnapshot) -> Applied;

struct Playbook {
    apply: ApplyFn,
    recovery: &'static [&'static str],
    mitigation: Option<&'static str>,
}

fn playbook(kind: AttackKind) -> Playbook {
    match kind {
        AttackKind::CostOverrun => Playbook {
            apply: apply_cost_overrun,
            recovery: &[
                "Request emergency budget allocation",
                "Reduce scope to high-priority items",
            ],
            mitigation: Some("Include 20% contingency buffer in budget"),
        },
        AttackKind::TimelineDelay => Playbook {
            apply: apply_timeline_delay,
            recovery: &[
                "Add resources to accelerate",
                "Parallel execution where possible",
            ],
            mitigation: None,
        },
        AttackKind::StrategyFailure => Playbook {
            apply: apply_strategy_failure,
            recovery: &[
                "Activate backup strategy from same category",
                "Reallocate budget to remaining strategies",
            ],
            mitigation: Some("Identify backup strategies for critical items"),
        },
        AttackKind::BudgetCut => Playbook {
            apply: apply_budget_cut,
            recovery: &[
                "Prioritize must-have strategies",
                "Defer nice-to-have to next quarter",
            ],
            mitigation: Some("Pre-secure multi-quarter funding commitment"),
        },
        AttackKind::KeyPersonLeaves => Playbook {
            apply: apply_key_person_leaves,
            recovery: &[
                "Cross-train backup lead immediately",
                "Document critical knowledge",
            ],
            mitigation: Some("Document knowledge and cross-train team members"),
        },
        AttackKind::NewRiskEmerges => Playbook {
            apply: apply_new_risk,
            recovery: &[
                "Add emergency mitigation strategy",
                "Reallocate resources from lower-priority items",
            ],
            mitigation: None,
        },
        AttackKind::VendorDelay => Playbook {
            apply: apply_vendor_delay,
            recovery: &[
                "Qualify an alternate vendor for critical equipment",
                "Resequence work around delayed deliveries",
            ],
            mitigation: None,
        },
        AttackKind::RegulatoryChange => Playbook {
            apply: apply_regulatory_change,
            recovery: &[
                "Engage compliance team early",
                "Fund compliance work from contingency",
            ],
            mitigation: None,
        },
    }
}

/// The recommendation emitted when an attack of this kind degrades the
/// portfolio badly.
pub fn mitigation_for(kind: AttackKind) -> Option<&'static str> {
    playbook(kind).mitigation
}

fn apply_cost_overrun(attack: &Attack, _: &Portfolio, original: OutcomeSnapshot) -> Applied {
    let cost = original.cost * attack.impact.multiplier();
    let degraded = OutcomeSnapshot { cost, ..original };
    let damage = Damage {
        cost_increase: Some(cost - original.cost),
        ..Default::default()
    };
    (degraded, damage)
}

fn apply_timeline_delay(attack: &Attack, _: &Portfolio, original: OutcomeSnapshot) -> Applied {
    let timeline_days = stretch(original.timeline_days, attack.impact.multiplier());
    let degraded = OutcomeSnapshot {
        timeline_days,
        ..original
    };
    let damage = Damage {
        timeline_increase: Some(timeline_days.saturating_sub(original.timeline_days)),
        ..Default::default()
    };
    (degraded, damage)
}

fn apply_strategy_failure(
    attack: &Attack,
    portfolio: &Portfolio,
    original: OutcomeSnapshot,
) -> Applied {
    let failed: Vec<&Strategy> = portfolio
        .strategies
        .iter()
        .filter(|s| attack.affected_strategies.contains(s.id()))
        .collect();
    let lost: f64 = failed.iter().map(|s| s.risk_reduction_pct()).sum();

    let degraded = OutcomeSnapshot {
        risk_reduction: (original.risk_reduction - lost).max(0.0),
        strategies: original.strategies.saturating_sub(failed.len()),
        ..original
    };
    let damage = Damage {
        risk_reduction_lost: Some(lost),
        ..Default::default()
    };
    (degraded, damage)
}

fn apply_budget_cut(attack: &Attack, _: &Portfolio, original: OutcomeSnapshot) -> Applied {
    let fraction = attack.impact.absolute().abs();
    let cut = original.cost * fraction;
    let degraded = OutcomeSnapshot {
        cost: original.cost - cut,
        risk_reduction: original.risk_reduction * (1.0 - fraction),
        ..original
    };
    let damage = Damage {
        budget_cut: Some(cut),
        ..Default::default()
    };
    (degraded, damage)
}

fn apply_key_person_leaves(attack: &Attack, _: &Portfolio, original: OutcomeSnapshot) -> Applied {
    let cost = original.cost * attack.impact.multiplier();
    let timeline_days = stretch(original.timeline_days, KEY_PERSON_DELAY);
    let degraded = OutcomeSnapshot {
        cost,
        timeline_days,
        ..original
    };
    let damage = Damage {
        cost_increase: Some(cost - original.cost),
        timeline_increase: Some(timeline_days.saturating_sub(original.timeline_days)),
        ..Default::default()
    };
    (degraded, damage)
}

/// The new risk is subtracted from the achieved reduction; the result goes
/// negative when the new risk outweighs it.
fn apply_new_risk(attack: &Attack, _: &Portfolio, original: OutcomeSnapshot) -> Applied {
    let additional = attack.impact.absolute() * 100.0;
    let degraded = OutcomeSnapshot {
        risk_reduction: original.risk_reduction - additional,
        ..original
    };
    let damage = Damage {
        additional_risk: Some(additional),
        ..Default::default()
    };
    (degraded, damage)
}

fn apply_vendor_delay(attack: &Attack, _: &Portfolio, original: OutcomeSnapshot) -> Applied {
    let extra = attack.impact.absolute().max(0.0).round() as u32;
    let degraded = OutcomeSnapshot {
        timeline_days: original.timeline_days.saturating_add(extra),
        ..original
    };
    let damage = Damage {
        timeline_increase: Some(extra),
        ..Default::default()
    };
    (degraded, damage)
}

fn apply_regulatory_change(attack: &Attack, _: &Portfolio, original: OutcomeSnapshot) -> Applied {
    let extra = attack.impact.absolute();
    let degraded = OutcomeSnapshot {
        cost: original.cost + extra,
        ..original
    };
    let damage = Damage {
        cost_increase: Some(extra),
        ..Default::default()
    };
    (degraded, damage)
}

/// Scale whole days, truncating.
fn stretch(days: u32, factor: f64) -> u32 {
    (days as f64 * factor).max(0.0) as u32
}

// ── Red team ──────────────────────────────────────────────────────

/// Generates and applies attacks. Holds no state beyond its threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedTeam {
    min_severity: Severity,
}

impl RedTeam {
    pub fn new(min_severity: Severity) -> Self {
        Self { min_severity }
    }

    /// Library attacks at or above the severity threshold, in library order.
    ///
    /// Strategy failure targets the selected strategy with the largest risk
    /// reduction (first on ties); against an empty portfolio it targets
    /// nothing.
    pub fn generate_attacks(&self, portfolio: &Portfolio) -> Vec<Attack> {
        let target = top_strategy(portfolio);
        ATTACK_LIBRARY
            .iter()
            .filter(|t| t.severity >= self.min_severity)
            .map(|t| match (t.kind, target) {
                (AttackKind::StrategyFailure, Some(target)) => Attack::strategy_failure(t, target),
                _ => Attack::from_template(t),
            })
            .collect()
    }

    pub fn apply_attack(&self, portfolio: &Portfolio, attack: &Attack) -> AttackResult {
        let entry = playbook(attack.kind);
        let original = OutcomeSnapshot::of(portfolio);
        let (degraded, damage) = (entry.apply)(attack, portfolio, original);

        let degradation_pct = if original.risk_reduction > 0.0 {
            (original.risk_reduction - degraded.risk_reduction) / original.risk_reduction * 100.0
        } else {
            0.0
        };
        let still_viable = degraded.risk_reduction >= original.risk_reduction * VIABILITY_THRESHOLD;

        tracing::debug!(
            attack = %attack.kind,
            degradation_pct,
            still_viable,
            "Attack applied"
        );

        AttackResult {
            attack: attack.clone(),
            original,
            degraded,
            damage,
            degradation_pct,
            still_viable,
            recovery_options: entry.recovery.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn top_strategy(portfolio: &Portfolio) -> Option<&Strategy> {
    portfolio.strategies.iter().fold(None, |best, s| match best {
        Some(b) if s.risk_reduction_pct() <= b.risk_reduction_pct() => Some(b),
        _ => Some(s),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskadvisor_core::{StrategyCategory, StrategyInput};

    fn strategy(id: &str, risk: f64, cost: f64, days: u32) -> Strategy {
        let name = format!("Strategy {id}");
        StrategyInput::new(id, name, StrategyCategory::Process, risk, cost, days)
            .point_estimates()
            .build()
            .unwrap()
    }

    fn portfolio() -> Portfolio {
        Portfolio::from_selection(vec![
            strategy("A", 20.0, 100_000.0, 40),
            strategy("B", 30.0, 50_000.0, 90),
            strategy("C", 30.0, 10_000.0, 10),
        ])
    }

    fn attack(kind: AttackKind) -> Attack {
        let red = RedTeam::default();
        red.generate_attacks(&portfolio())
            .into_iter()
            .find(|a| a.kind == kind)
            .unwrap()
    }

    #[test]
    fn severity_threshold_filters_library() {
        let p = portfolio();
        assert_eq!(RedTeam::new(Severity::Low).generate_attacks(&p).len(), 8);
        assert_eq!(RedTeam::new(Severity::Medium).generate_attacks(&p).len(), 7);
        let high: Vec<AttackKind> = RedTeam::new(Severity::High)
            .generate_attacks(&p)
            .iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(
            high,
            vec![AttackKind::CostOverrun, AttackKind::StrategyFailure, AttackKind::BudgetCut]
        );
    }

    #[test]
    fn strategy_failure_targets_first_top_strategy() {
        let a = attack(AttackKind::StrategyFailure);
        assert_eq!(a.affected_strategies, vec![StrategyId::from("B")]);
        assert_eq!(a.description, "Strategy 'Strategy B' fails completely");
        // The library template is untouched.
        assert_eq!(ATTACK_LIBRARY[2].description, "Top strategy fails completely");
    }

    #[test]
    fn strategy_failure_on_empty_portfolio_targets_nothing() {
        let attacks = RedTeam::default().generate_attacks(&Portfolio::empty());
        let failure = attacks.iter().find(|a| a.kind == AttackKind::StrategyFailure).unwrap();
        assert!(failure.affected_strategies.is_empty());
    }

    #[test]
    fn cost_overrun_scales_cost_only() {
        let p = portfolio();
        let result = RedTeam::default().apply_attack(&p, &attack(AttackKind::CostOverrun));
        assert!((result.degraded.cost - 240_000.0).abs() < 1e-6);
        assert_eq!(result.damage.cost_increase, Some(80_000.0));
        assert_eq!(result.degradation_pct, 0.0);
        assert!(result.still_viable);
        assert_eq!(result.recovery_options.len(), 2);
    }

    #[test]
    fn strategy_failure_removes_contribution() {
        let p = portfolio();
        let result = RedTeam::default().apply_attack(&p, &attack(AttackKind::StrategyFailure));
        assert!((result.degraded.risk_reduction - 50.0).abs() < 1e-9);
        assert_eq!(result.degraded.strategies, 2);
        assert!((result.degradation_pct - 37.5).abs() < 1e-9);
        assert!(result.still_viable);
    }

    #[test]
    fn sole_strategy_failure_is_not_viable() {
        let p = Portfolio::from_selection(vec![strategy("S", 25.0, 1000.0, 10)]);
        let red = RedTeam::default();
        let failure = red
            .generate_attacks(&p)
            .into_iter()
            .find(|a| a.kind == AttackKind::StrategyFailure)
            .unwrap();
        let result = red.apply_attack(&p, &failure);
        assert_eq!(result.degraded.risk_reduction, 0.0);
        assert_eq!(result.degraded.strategies, 0);
        assert!((result.degradation_pct - 100.0).abs() < 1e-9);
        assert!(!result.still_viable);
    }

    #[test]
    fn budget_cut_scales_cost_and_reduction() {
        let p = portfolio();
        let result = RedTeam::default().apply_attack(&p, &attack(AttackKind::BudgetCut));
        assert!((result.degraded.cost - 96_000.0).abs() < 1e-6);
        assert!((result.degraded.risk_reduction - 48.0).abs() < 1e-9);
        assert!((result.degradation_pct - 40.0).abs() < 1e-9);
        assert!(result.still_viable);
    }

    #[test]
    fn delays_stretch_timeline() {
        let p = portfolio();
        let red = RedTeam::default();
        let delay = red.apply_attack(&p, &attack(AttackKind::TimelineDelay));
        assert_eq!(delay.degraded.timeline_days, 180);
        let key_person = red.apply_attack(&p, &attack(AttackKind::KeyPersonLeaves));
        assert_eq!(key_person.degraded.timeline_days, 108);
        assert!((key_person.degraded.cost - 208_000.0).abs() < 1e-6);
        let vendor = red.apply_attack(&p, &attack(AttackKind::VendorDelay));
        assert_eq!(vendor.degraded.timeline_days, 150);
    }

    #[test]
    fn regulatory_change_adds_fixed_cost() {
        let p = portfolio();
        let result = RedTeam::default().apply_attack(&p, &attack(AttackKind::RegulatoryChange));
        assert!((result.degraded.cost - 210_000.0).abs() < 1e-6);
        assert_eq!(result.degradation_pct, 0.0);
    }

    #[test]
    fn new_risk_larger_than_reduction_goes_negative() {
        let p = Portfolio::from_selection(vec![strategy("S", 10.0, 1000.0, 10)]);
        let red = RedTeam::default();
        let new_risk = red
            .generate_attacks(&p)
            .into_iter()
            .find(|a| a.kind == AttackKind::NewRiskEmerges)
            .unwrap();
        let result = red.apply_attack(&p, &new_risk);
        assert!((result.degraded.risk_reduction - -5.0).abs() < 1e-9);
        assert!((result.degradation_pct - 150.0).abs() < 1e-9);
        assert!((result.damage.additional_risk.unwrap() - 15.0).abs() < 1e-9);
        assert!(!result.still_viable);
    }

    #[test]
    fn empty_portfolio_degradation_is_zero() {
        let p = Portfolio::empty();
        let red = RedTeam::default();
        for a in red.generate_attacks(&p) {
            let result = red.apply_attack(&p, &a);
            assert_eq!(result.degradation_pct, 0.0);
            // A new risk leaves an empty portfolio below zero reduction.
            assert_eq!(result.still_viable, a.kind != AttackKind::NewRiskEmerges);
        }
    }

    #[test]
    fn mitigations_cover_damaging_kinds() {
        assert!(mitigation_for(AttackKind::CostOverrun).is_some());
        assert!(mitigation_for(AttackKind::StrategyFailure).is_some());
        assert!(mitigation_for(AttackKind::VendorDelay).is_none());
        assert!(mitigation_for(AttackKind::NewRiskEmerges).is_none());
    }
}
