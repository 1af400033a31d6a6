//! Deploysim - narrated multi-cloud deployment simulator
//!
//! A CLI tool that narrates a fictitious Consciousness-AGI system being
//! assembled and deployed to Azure and Google Cloud, collecting every
//! stage into a structured run report.
//!
//! Exit codes:
//!   0 - Success (including a loop stopped with Ctrl+C)
//!   1 - Runtime error (config, report, I/O, or an interrupted deployment)

mod cli;
mod config;
mod models;
mod report;
mod sim;

use anyhow::{bail, Context, Result};
use cli::{Args, Pipeline};
use config::{Config, CONFIG_FILE};
use models::SummaryReport;
use sim::azure::AzureDeployment;
use sim::continuous::{ContinuousSimulation, LoopConfig, StopReason};
use sim::gcp::GcpDeployment;
use sim::orchestrator::Orchestrator;
use sim::{CancellationToken, Narrator, PacingConfig, RandomIds, SimContext};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so the file can raise verbosity
    let (config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&args, &config)?;

    info!("Deploysim v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match source {
        ConfigSource::File(path) => info!("Loaded config from: {}", path.display()),
        ConfigSource::Defaults => debug!("No config file found, using defaults"),
    }

    if let Err(e) = run(args, config).await {
        error!("Simulation failed: {:#}", e);
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Handle --init-config: generate a default .deploysim.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize pacing, seed, loop limits, and report format.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Run the selected pipeline and save its report.
async fn run(args: Args, config: Config) -> Result<()> {
    debug!("Effective config: {:?}", config);

    if let Some(ref path) = args.from_report {
        return handle_from_report(path, &config, args.quiet, &mut std::io::stdout());
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let narrator = Narrator::new(!args.quiet, PacingConfig::from(&config.pacing))
        .with_cancellation(cancel.clone());
    let ids = RandomIds::from_seed(config.simulation.seed);
    if let Some(seed) = config.simulation.seed {
        info!("Using seed {} for cosmetic identifiers", seed);
    }

    let mut ctx = SimContext::new(narrator, Box::new(ids));
    ctx.enforce_required = config.report.enforce_required_stages;

    let pipeline = args.pipeline;
    info!("Running '{}' pipeline", pipeline);
    let report = match pipeline {
        Pipeline::Unified => Some(until_cancelled(&cancel, pipeline, run_unified(&mut ctx)).await?),
        Pipeline::Azure => Some(until_cancelled(&cancel, pipeline, run_azure(&mut ctx)).await?),
        Pipeline::Gcp => Some(until_cancelled(&cancel, pipeline, run_gcp(&mut ctx)).await?),
        Pipeline::Loop => {
            let mut simulation =
                ContinuousSimulation::new(LoopConfig::from(&config.looping), cancel.clone());
            let outcome = simulation.run(&mut ctx).await?;
            if outcome.stop_reason == StopReason::Cancelled {
                warn!(
                    "Loop stopped: {}",
                    outcome.cancel_reason.as_deref().unwrap_or("cancelled")
                );
            }
            outcome.last_report
        }
    };

    let Some(report) = report else {
        if !args.quiet {
            println!("\n⚠️  No iteration completed, nothing to save.");
        }
        return Ok(());
    };

    save_report(&report, &config, args.quiet)
}

/// Run a one-shot pipeline, failing if it is interrupted.
async fn until_cancelled<F>(
    cancel: &CancellationToken,
    pipeline: Pipeline,
    run: F,
) -> Result<SummaryReport>
where
    F: Future<Output = Result<SummaryReport>>,
{
    tokio::select! {
        report = run => report,
        _ = cancel.cancelled() => bail!("{} pipeline interrupted before completion", pipeline),
    }
}

async fn run_unified(ctx: &mut SimContext) -> Result<SummaryReport> {
    ctx.narrator.header("UNIFIED CONSCIOUSNESS-AGI SIMULATION");
    let orchestrator = Orchestrator::new(ctx);
    Ok(orchestrator.execute_full_simulation(ctx).await?)
}

async fn run_azure(ctx: &mut SimContext) -> Result<SummaryReport> {
    let azure = AzureDeployment::new(ctx);
    info!("Azure subscription {}", azure.subscription_id());
    Ok(azure.full_deployment(ctx).await?.report)
}

async fn run_gcp(ctx: &mut SimContext) -> Result<SummaryReport> {
    let gcp = GcpDeployment::new(ctx);
    info!("GCP project {} ({})", gcp.project_id(), gcp.project_number());
    Ok(gcp.full_deployment(ctx).await?.report)
}

/// Cancel `token` on the first Ctrl+C.
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, stopping");
                token.cancel("Interrupted by user");
            }
            Err(e) => warn!("Could not listen for Ctrl+C: {}", e),
        }
    });
}

fn save_report(report: &SummaryReport, config: &Config, quiet: bool) -> Result<()> {
    if !config.general.save_output {
        debug!("Saving disabled, report not written");
        return Ok(());
    }

    let path = config.output_path();
    debug!(
        "Stages: {}",
        report.stages().names().collect::<Vec<_>>().join(", ")
    );
    report::write_report(report, config.report.format, &path)?;
    info!(
        "Wrote {} stages for run {}",
        report.metadata().stage_count,
        report.metadata().run_id
    );

    if !quiet {
        println!("\n[OUTPUT] Full simulation results saved to: {}", path.display());
    }
    Ok(())
}

/// Handle --from-report: re-render a saved JSON report.
///
/// Writes to the configured output when saving is on and it is not the
/// input file, otherwise renders to `out`.
fn handle_from_report(
    path: &Path,
    config: &Config,
    quiet: bool,
    out: &mut impl Write,
) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report: {}", path.display()))?;
    let report = report::parse_json_report(&content)
        .with_context(|| format!("Failed to parse report: {}", path.display()))?;

    let metadata = report.metadata();
    info!(
        "Loaded '{}' report {} ({} stages)",
        metadata.pipeline, metadata.run_id, metadata.stage_count
    );

    if config.general.save_output && config.output_path() != path {
        save_report(&report, config, quiet)
    } else {
        writeln!(out, "{}", report.render(config.report.format)?)
            .context("Failed to print report")
    }
}

/// Where the effective configuration came from.
#[derive(Debug)]
enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Load configuration from file or use defaults, then apply CLI overrides.
///
/// Runs before logging is installed, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    let (mut config, source) = if let Some(ref config_path) = args.config {
        // Explicit config path must load
        (Config::load(config_path)?, ConfigSource::File(config_path.clone()))
    } else {
        // Try default location
        match Config::load_default() {
            Ok(Some(config)) => (config, ConfigSource::File(PathBuf::from(CONFIG_FILE))),
            Ok(None) => (Config::default(), ConfigSource::Defaults),
            Err(e) => {
                eprintln!("⚠️  Failed to load config: {:#}. Using defaults.", e);
                (Config::default(), ConfigSource::Defaults)
            }
        }
    };

    config.merge_with_args(args);
    config.validate()?;
    Ok((config, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogCategory, StageResult};
    use crate::report::{AggregatorConfig, ReportAggregator, ReportFormat};
    use serde_json::json;

    fn saved_report(dir: &Path) -> PathBuf {
        let mut aggregator = ReportAggregator::new(AggregatorConfig::new("azure", "run-0000beef"));
        aggregator.log(LogCategory::Deployment, "Starting Azure Cloud deployment...");
        aggregator
            .record(
                "resource_group",
                StageResult::from_value(json!({"name": "consciousness-agi-rg"})).unwrap(),
            )
            .unwrap();
        let report = aggregator.finalize().unwrap();

        let path = dir.join("simulation_output.json");
        report::write_report(&report, ReportFormat::Json, &path).unwrap();
        path
    }

    fn text_config(output: &Path, save_output: bool) -> Config {
        let mut config = Config::default();
        config.general.output = output.display().to_string();
        config.general.save_output = save_output;
        config.report.format = ReportFormat::Text;
        config
    }

    #[test]
    fn test_from_report_writes_to_other_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = saved_report(dir.path());
        let output = dir.path().join("report.txt");

        let mut out = Vec::new();
        handle_from_report(&input, &text_config(&output, true), true, &mut out).unwrap();

        assert!(out.is_empty());
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("RESOURCE GROUP"));
    }

    #[test]
    fn test_from_report_prints_when_saving_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let input = saved_report(dir.path());
        let output = dir.path().join("report.txt");

        let mut out = Vec::new();
        handle_from_report(&input, &text_config(&output, false), true, &mut out).unwrap();

        assert!(!output.exists());
        assert!(String::from_utf8(out).unwrap().contains("RESOURCE GROUP"));
    }

    #[test]
    fn test_from_report_never_overwrites_its_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = saved_report(dir.path());
        let original = std::fs::read_to_string(&input).unwrap();

        let mut out = Vec::new();
        handle_from_report(&input, &text_config(&input, true), true, &mut out).unwrap();

        assert_eq!(std::fs::read_to_string(&input).unwrap(), original);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_from_report_rejects_corrupted_counts() {
        let dir = tempfile::tempdir().unwrap();
        let input = saved_report(dir.path());
        let tampered = std::fs::read_to_string(&input)
            .unwrap()
            .replace("\"stage_count\": 1", "\"stage_count\": 42");
        std::fs::write(&input, tampered).unwrap();

        let mut out = Vec::new();
        let err = handle_from_report(&input, &Config::default(), true, &mut out).unwrap_err();
        assert!(err.to_string().contains("Failed to parse report"));
    }
}
