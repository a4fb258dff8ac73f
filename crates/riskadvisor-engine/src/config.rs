//! Engine configuration.
//!
//! Loaded from the `riskadvisor.toml` document (or `RISKADVISOR_*`
//! environment variables) by the composition root and passed into
//! [`crate::AdvisorEngine::new`].

use serde::{Deserialize, Serialize};

use crate::attacks::Severity;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    #[serde(default)]
    pub wargame: WargameConfig,

    #[serde(default)]
    pub horizons: HorizonAllocation,

    /// Directory for decision trails. Trails are not stored when unset.
    #[serde(default)]
    pub trail_dir: Option<String>,
}

impl EngineConfig {
    /// Load from `{file_prefix}.*` and the environment.
    pub fn load(file_prefix: &str) -> Result<Self, riskadvisor_core::AdvisorError> {
        riskadvisor_core::config::load(file_prefix)
    }
}

/// Portfolio optimizer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizerConfig {
    /// Budget sweep points used when a caller does not specify one.
    #[serde(default = "default_pareto_solutions")]
    pub pareto_solutions: usize,

    #[serde(default = "default_max_pareto_solutions")]
    pub max_pareto_solutions: usize,

    /// Monte Carlo draws used when a caller does not specify one.
    #[serde(default = "default_simulations")]
    pub monte_carlo_simulations: usize,

    #[serde(default = "default_max_simulations")]
    pub max_monte_carlo_simulations: usize,

    /// Fixed sampling seed. Each call draws fresh entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Advisory timeline limit when a caller does not give one.
    #[serde(default = "default_timeline_days")]
    pub default_timeline_days: u32,
}

/// Adversarial validation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WargameConfig {
    /// Attacks below this severity are not generated.
    #[serde(default)]
    pub min_severity: Severity,

    /// Share of the available budget the backup plan may spend.
    #[serde(default = "default_backup_fraction")]
    pub backup_budget_fraction: f64,
}

/// Default share of the total budget for each horizon.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HorizonAllocation {
    #[serde(default = "default_immediate_fraction")]
    pub immediate: f64,

    #[serde(default = "default_tactical_fraction")]
    pub tactical: f64,

    #[serde(default = "default_strategic_fraction")]
    pub strategic: f64,
}

impl HorizonAllocation {
    pub fn total(&self) -> f64 {
        self.immediate + self.tactical + self.strategic
    }
}

fn default_pareto_solutions() -> usize {
    10
}

fn default_max_pareto_solutions() -> usize {
    100
}

fn default_simulations() -> usize {
    1000
}

fn default_max_simulations() -> usize {
    100_000
}

fn default_timeline_days() -> u32 {
    365
}

fn default_backup_fraction() -> f64 {
    0.6
}

fn default_immediate_fraction() -> f64 {
    0.25
}

fn default_tactical_fraction() -> f64 {
    0.45
}

fn default_strategic_fraction() -> f64 {
    0.30
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            pareto_solutions: default_pareto_solutions(),
            max_pareto_solutions: default_max_pareto_solutions(),
            monte_carlo_simulations: default_simulations(),
            max_monte_carlo_simulations: default_max_simulations(),
            seed: None,
            default_timeline_days: default_timeline_days(),
        }
    }
}

impl Default for WargameConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::default(),
            backup_budget_fraction: default_backup_fraction(),
        }
    }
}

impl Default for HorizonAllocation {
    fn default() -> Self {
        Self {
            immediate: default_immediate_fraction(),
            tactical: default_tactical_fraction(),
            strategic: default_strategic_fraction(),
        }
    }
}
