//! Error types for the riskadvisor-engine crate.
//!
//! Infeasible selections are not errors: they come back as empty
//! portfolios. Only malformed input reaches these variants.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid {parameter}: {reason}")]
    InvalidInput {
        parameter: &'static str,
        reason: String,
    },

    #[error("Invalid {horizon} budget allocation: fraction {fraction} outside [{min}, {max}]")]
    AllocationOutOfBounds {
        horizon: String,
        fraction: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid budget allocation: fractions sum to {total}, which exceeds 1.0")]
    AllocationExceedsBudget { total: f64 },
}

impl EngineError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Budgets must be finite and non-negative.
pub(crate) fn check_budget(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid(
            parameter,
            format!("expected a finite non-negative amount, got {value}"),
        ))
    }
}

/// Caller-supplied iteration counts must be in `1..=max`.
pub(crate) fn check_count(parameter: &'static str, value: usize, max: usize) -> Result<()> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::invalid(
            parameter,
            format!("expected 1..={max}, got {value}"),
        ))
    }
}

/// Risk scores live on the 0-100 scale.
pub(crate) fn check_risk_score(value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::invalid(
            "risk_score",
            format!("expected a value in [0, 100], got {value}"),
        ))
    }
}
