//! riskadvisor-core: Shared types, configuration, and error handling for RiskAdvisor.
//!
//! This crate provides the foundational types used across all RiskAdvisor engines:
//! - Strategies and their three-point cost/time estimates
//! - The read-only strategy catalog
//! - Portfolios (selected strategy sets with aggregate outcomes)
//! - Layered configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use error::{AdvisorError, ValidationError};
pub use types::{
    ApprovalLevel, ConstraintStatus, DisruptionLevel, Estimate, Portfolio, Strategy,
    StrategyAttribute, StrategyCatalog, StrategyCategory, StrategyId, StrategyInput,
    UncertaintyBounds, PORTFOLIO_RISK_CAP,
};
