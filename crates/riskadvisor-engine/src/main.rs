//! CLI entry point for the RiskAdvisor engines.
//!
//! Designed for subprocess invocation from the API layer:
//! reads a JSON request from stdin, writes a JSON result to stdout.

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use riskadvisor_core::config::DEFAULT_FILE_PREFIX;
use riskadvisor_engine::trail;
use riskadvisor_engine::types::{
    HorizonRequest, OptimizeRequest, PackageRequest, ParetoRequest, SensitivityRequest,
    WargameRequest,
};
use riskadvisor_engine::{AdvisorEngine, EngineConfig};

#[derive(Parser)]
#[command(name = "riskadvisor")]
#[command(
    about = "Portfolio optimization, wargaming, and horizon planning for risk mitigation strategies"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: riskadvisor).
    #[arg(short, long, default_value = DEFAULT_FILE_PREFIX, global = true)]
    config: String,

    /// Pretty-print the JSON result.
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend one portfolio for a risk tolerance (reads JSON from stdin).
    Optimize,
    /// Compute the approximate Pareto frontier (reads JSON from stdin).
    Pareto,
    /// Attack a portfolio and grade its robustness (reads JSON from stdin).
    Wargame,
    /// Split a budget across immediate, tactical and strategic horizons.
    Horizons,
    /// Build the executive decision package (reads JSON from stdin).
    Package,
    /// Per-strategy sensitivity of the recommended portfolio.
    Sensitivity,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let config = load_engine_config(&cli.config);
    let trail_dir = config.trail_dir.clone();
    let engine = AdvisorEngine::new(config)?;

    match cli.command {
        Command::Optimize => {
            let request: OptimizeRequest = read_request()?;
            let mut session = trail::start_session(
                "optimize",
                serde_json::json!({
                    "strategies": request.strategies.len(),
                    "budget_limit": request.budget_limit,
                    "timeline_limit": request.timeline_limit,
                    "risk_tolerance": request.risk_tolerance,
                }),
            );
            let portfolio = engine.optimize(&request)?;
            trail::record_portfolio(
                &mut session,
                "optimize",
                &format!("{:?} tolerance over the Pareto frontier", request.risk_tolerance),
                &portfolio,
            );
            trail::finalize_and_store(session, trail_dir.as_deref());
            write_result(&portfolio, cli.pretty)?;
        }
        Command::Pareto => {
            let request: ParetoRequest = read_request()?;
            let mut session = trail::start_session(
                "pareto",
                serde_json::json!({
                    "strategies": request.strategies.len(),
                    "budget_limit": request.budget_limit,
                    "timeline_limit": request.timeline_limit,
                    "n_solutions": request.n_solutions,
                }),
            );
            let frontier = engine.pareto_frontier(&request)?;
            trail::record_frontier(&mut session, &frontier, None);
            trail::finalize_and_store(session, trail_dir.as_deref());
            write_result(&frontier, cli.pretty)?;
        }
        Command::Wargame => {
            let request: WargameRequest = read_request()?;
            let mut session = trail::start_session(
                "wargame",
                serde_json::json!({
                    "strategies": request.strategies.len(),
                    "available_budget": request.available_budget,
                    "risk_tolerance": request.risk_tolerance,
                    "selected": request.selected,
                }),
            );
            let assessment = engine.wargame(&request)?;
            trail::record_assessment(&mut session, &assessment);
            trail::finalize_and_store(session, trail_dir.as_deref());
            write_result(&assessment, cli.pretty)?;
        }
        Command::Horizons => {
            let request: HorizonRequest = read_request()?;
            let mut session = trail::start_session(
                "horizons",
                serde_json::json!({
                    "strategies": request.strategies.len(),
                    "total_budget": request.total_budget,
                    "risk_score": request.risk_score,
                    "allocation": request.allocation,
                }),
            );
            let plan = engine.horizons(&request)?;
            trail::record_plan(&mut session, &plan);
            trail::finalize_and_store(session, trail_dir.as_deref());
            write_result(&plan, cli.pretty)?;
        }
        Command::Package => {
            let request: PackageRequest = read_request()?;
            let mut session = trail::start_session(
                "package",
                serde_json::json!({
                    "strategies": request.strategies.len(),
                    "budget": request.budget,
                    "risk_score": request.risk_score,
                }),
            );
            let package = engine.decision_package(&request)?;
            trail::record_package(&mut session, &package);
            trail::finalize_and_store(session, trail_dir.as_deref());
            write_result(&package, cli.pretty)?;
        }
        Command::Sensitivity => {
            let request: SensitivityRequest = read_request()?;
            let mut session = trail::start_session(
                "sensitivity",
                serde_json::json!({
                    "strategies": request.strategies.len(),
                    "budget_limit": request.budget_limit,
                    "attribute": request.attribute,
                }),
            );
            let report = engine.sensitivity(&request)?;
            trail::record_sensitivity(&mut session, &report);
            trail::finalize_and_store(session, trail_dir.as_deref());
            write_result(&report, cli.pretty)?;
        }
    }

    Ok(())
}

fn read_request<T: DeserializeOwned>() -> anyhow::Result<T> {
    let input = std::io::read_to_string(std::io::stdin())?;
    Ok(serde_json::from_str(&input)?)
}

fn write_result<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn load_engine_config(file_prefix: &str) -> EngineConfig {
    match EngineConfig::load(file_prefix) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                error = %e,
                file_prefix,
                "Failed to load configuration; using defaults"
            );
            EngineConfig::default()
        }
    }
}
