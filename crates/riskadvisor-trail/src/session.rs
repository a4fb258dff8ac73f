//! Incremental trail recorder used while an engine runs.
//!
//! ```
//! # use riskadvisor_trail::session::TrailSession;
//! let mut session = TrailSession::new("optimizer", "Pick a balanced portfolio");
//! session.set_context(serde_json::json!({"budget_limit": 300000.0}));
//! session.add_decision("Pareto point 2", "Highest reduction per dollar", 0.9);
//! session.add_alternative("Pareto point 4", "Lower reduction per dollar");
//! session.add_outcome("monte_carlo", "1000 draws", serde_json::json!({"p95": 41.0}), true);
//! let trail = session.finalize();
//! assert!(trail.verify_integrity());
//! ```

use chrono::Utc;

use crate::{Alternative, Decision, Outcome, Trail, TrailId};

/// Builder that accumulates a trail until it is finalized.
pub struct TrailSession {
    trail: Trail,
}

impl TrailSession {
    pub fn new(engine: &str, intent: &str) -> Self {
        Self {
            trail: Trail {
                id: TrailId::new(),
                engine: engine.to_string(),
                intent: intent.to_string(),
                context: serde_json::Value::Null,
                decisions: Vec::new(),
                alternatives: Vec::new(),
                outcomes: Vec::new(),
                started_at: Utc::now(),
                completed_at: None,
                content_hash: None,
            },
        }
    }

    pub fn set_context(&mut self, context: serde_json::Value) {
        self.trail.context = context;
    }

    pub fn add_decision(&mut self, choice: &str, rationale: &str, confidence: f64) {
        self.trail.decisions.push(Decision {
            choice: choice.to_string(),
            rationale: rationale.to_string(),
            confidence,
            timestamp: Utc::now(),
        });
    }

    pub fn add_alternative(&mut self, option: &str, rejection_reason: &str) {
        self.trail.alternatives.push(Alternative {
            option: option.to_string(),
            rejection_reason: rejection_reason.to_string(),
        });
    }

    pub fn add_outcome(
        &mut self,
        step: &str,
        summary: &str,
        details: serde_json::Value,
        success: bool,
    ) {
        self.trail.outcomes.push(Outcome {
            step: step.to_string(),
            summary: summary.to_string(),
            details,
            success,
            timestamp: Utc::now(),
        });
    }

    /// Available before finalization.
    pub fn id(&self) -> TrailId {
        self.trail.id
    }

    /// Stamp completion time and seal the content hash.
    pub fn finalize(mut self) -> Trail {
        self.trail.completed_at = Some(Utc::now());
        let hash = self.trail.compute_hash();
        self.trail.content_hash = Some(hash);
        self.trail
    }
}
