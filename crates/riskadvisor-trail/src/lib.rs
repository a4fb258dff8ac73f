//! RiskAdvisor decision trails: tamper-evident records of engine runs.
//!
//! A trail captures what an engine was asked to do, the inputs it saw,
//! the choices it made (which Pareto point, which backup budget), the
//! alternatives it rejected, and the outcomes it produced. Each trail is
//! content-hashed with BLAKE3 when finalized so later edits are detectable.

pub mod hash;
pub mod session;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a decision trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TrailId(pub Uuid);

impl TrailId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrailId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TrailId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A choice an engine made during a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub choice: String,
    pub rationale: String,
    /// 0.0 – 1.0
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// An option that was evaluated and rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alternative {
    pub option: String,
    pub rejection_reason: String,
}

/// A computation step and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outcome {
    /// e.g. "pareto_sweep", "attack_applied", "horizon_filled".
    pub step: String,
    pub summary: String,
    pub details: serde_json::Value,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// The complete record of one engine run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trail {
    pub id: TrailId,
    /// Which engine produced the trail ("optimizer", "wargame", ...).
    pub engine: String,
    /// What the engine was asked to do.
    pub intent: String,
    /// Request parameters as seen by the engine.
    pub context: serde_json::Value,
    pub decisions: Vec<Decision>,
    pub alternatives: Vec<Alternative>,
    pub outcomes: Vec<Outcome>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// BLAKE3 content hash (hex), set on finalization.
    pub content_hash: Option<String>,
}

impl Trail {
    /// BLAKE3 hash over every field except `content_hash`.
    pub fn compute_hash(&self) -> String {
        hash::compute_trail_hash(self)
    }

    /// Whether the stored hash matches the current content.
    pub fn verify_integrity(&self) -> bool {
        match &self.content_hash {
            Some(stored) => stored == &self.compute_hash(),
            None => false,
        }
    }
}
