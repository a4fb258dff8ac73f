use thiserror::Error;

/// Top-level error type for the RiskAdvisor platform.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<config::ConfigError> for AdvisorError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// A strategy or catalog record rejected at construction time.
///
/// Malformed records are never clamped into range; the caller gets one of
/// these instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Strategy id must not be empty")]
    EmptyId,

    #[error("Strategy {id}: name must not be empty")]
    EmptyName { id: String },

    #[error("Strategy {id}: risk reduction {value} outside [0, 100]")]
    RiskReductionOutOfRange { id: String, value: f64 },

    #[error("Strategy {id}: confidence {value} outside [0, 1]")]
    ConfidenceOutOfRange { id: String, value: f64 },

    #[error("Strategy {id}: {field} must be a finite non-negative number, got {value}")]
    NegativeOrNonFinite {
        id: String,
        field: &'static str,
        value: f64,
    },

    #[error("Strategy {id}: {field} not ordered (min {min}, likely {most_likely}, max {max})")]
    UnorderedRange {
        id: String,
        field: &'static str,
        min: f64,
        most_likely: f64,
        max: f64,
    },

    #[error("Duplicate strategy id in catalog: {id}")]
    DuplicateId { id: String },
}
