//! BLAKE3 content hashing for tamper evidence.

use serde::Serialize;

use crate::{Alternative, Decision, Outcome, Trail, TrailId};

/// Borrowed view of a trail without its hash field.
#[derive(Serialize)]
struct HashableTrail<'a> {
    id: &'a TrailId,
    engine: &'a str,
    intent: &'a str,
    context: &'a serde_json::Value,
    decisions: &'a [Decision],
    alternatives: &'a [Alternative],
    outcomes: &'a [Outcome],
    started_at: &'a chrono::DateTime<chrono::Utc>,
    completed_at: &'a Option<chrono::DateTime<chrono::Utc>>,
}

/// Hex-encoded BLAKE3 hash of the trail's canonical JSON.
///
/// Serializing plain data with string keys cannot fail; should it ever,
/// the hash covers an empty body and integrity checks will not match.
pub fn compute_trail_hash(trail: &Trail) -> String {
    let hashable = HashableTrail {
        id: &trail.id,
        engine: &trail.engine,
        intent: &trail.intent,
        context: &trail.context,
        decisions: &trail.decisions,
        alternatives: &trail.alternatives,
        outcomes: &trail.outcomes,
        started_at: &trail.started_at,
        completed_at: &trail.completed_at,
    };

    let json = serde_json::to_vec(&hashable).unwrap_or_default();
    blake3::hash(&json).to_hex().to_string()
}
