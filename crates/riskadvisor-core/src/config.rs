//! Layered configuration loading for RiskAdvisor services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`RISKADVISOR_` prefix, `__` section separator)
//! 2. Config file (`riskadvisor.toml` or any format `config` understands)
//! 3. Serde defaults on the target type

use serde::de::DeserializeOwned;

use crate::error::AdvisorError;

/// Environment variable prefix for every RiskAdvisor setting.
pub const ENV_PREFIX: &str = "RISKADVISOR";

/// Default config file name (without extension).
pub const DEFAULT_FILE_PREFIX: &str = "riskadvisor";

fn build(file_prefix: &str) -> Result<config::Config, AdvisorError> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    Ok(cfg)
}

/// Load the whole configuration document into `T`.
///
/// Missing keys fall back to `T`'s serde defaults, so an absent file is not
/// an error.
pub fn load<T: DeserializeOwned>(file_prefix: &str) -> Result<T, AdvisorError> {
    let cfg = build(file_prefix)?;
    let value = cfg.try_deserialize::<T>()?;
    tracing::debug!(file_prefix, "Configuration loaded");
    Ok(value)
}
