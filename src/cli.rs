//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::report::ReportFormat;
use clap::Parser;
use std::fmt;
use std::path::PathBuf;

/// Deploysim - narrated multi-cloud deployment simulator
///
/// Simulates a Consciousness-AGI system being assembled and deployed to
/// Azure and Google Cloud, then writes a structured run report.
/// Nothing is provisioned; every resource is fictitious.
///
/// Examples:
///   deploysim
///   deploysim azure --fast
///   deploysim loop --iterations 0
///   deploysim gcp --seed 42 --format markdown --output gcp.md
///   deploysim --from-report simulation_output.json --format text
///   deploysim --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Pipeline to run
    #[arg(value_enum, default_value_t = Pipeline::Unified)]
    pub pipeline: Pipeline,

    /// Output file path for the report
    ///
    /// Defaults to simulation_output.json or the value in .deploysim.toml.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Do not write the report to disk
    #[arg(long)]
    pub no_save: bool,

    /// Report format (text, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .deploysim.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (no narration, errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Skip every narration pause
    #[arg(long, conflicts_with = "pace")]
    pub fast: bool,

    /// Multiply every narration pause by this factor
    #[arg(long, value_name = "FACTOR")]
    pub pace: Option<f64>,

    /// Seed for cosmetic identifiers (subscription ids, IPs, ...)
    #[arg(long, value_name = "SEED", env = "DEPLOYSIM_SEED")]
    pub seed: Option<u64>,

    /// Loop iterations to run (0 = until Ctrl+C)
    #[arg(long, value_name = "COUNT")]
    pub iterations: Option<u64>,

    /// Print loop progress every COUNT iterations
    #[arg(long, value_name = "COUNT")]
    pub progress_every: Option<u64>,

    /// Re-render a saved JSON report instead of running a pipeline
    #[arg(long, value_name = "FILE", conflicts_with = "init_config")]
    pub from_report: Option<PathBuf>,

    /// Generate a default .deploysim.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Which simulation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Pipeline {
    /// Full orchestration: both cores, enhancement, both clouds, scenarios
    #[default]
    Unified,
    /// Microsoft Azure deployment only
    Azure,
    /// Google Cloud Platform deployment only
    Gcp,
    /// Condensed iterations until a limit or Ctrl+C
    Loop,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pipeline::Unified => "unified",
            Pipeline::Azure => "azure",
            Pipeline::Gcp => "gcp",
            Pipeline::Loop => "loop",
        };
        write!(f, "{}", name)
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(pace) = self.pace {
            if !pace.is_finite() || pace < 0.0 {
                return Err("Pace must be a non-negative number".to_string());
            }
        }

        if self.progress_every == Some(0) {
            return Err("Progress interval must be at least 1".to_string());
        }

        if let Some(ref report) = self.from_report {
            if !report.is_file() {
                return Err(format!("Report file does not exist: {}", report.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `verbose_default` comes from the config file; `--quiet` overrides it.
    pub fn log_level(&self, verbose_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            pipeline: Pipeline::Unified,
            output: None,
            no_save: false,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            fast: false,
            pace: None,
            seed: None,
            iterations: None,
            progress_every: None,
            from_report: None,
            init_config: false,
        }
    }

    #[test]
    fn test_no_arguments_runs_unified() {
        let args = Args::try_parse_from(["deploysim"]).unwrap();
        assert_eq!(args.pipeline, Pipeline::Unified);
        assert!(args.output.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_pipeline_and_flags() {
        let args = Args::try_parse_from([
            "deploysim",
            "loop",
            "--iterations",
            "0",
            "--fast",
            "--format",
            "markdown",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(args.pipeline, Pipeline::Loop);
        assert_eq!(args.iterations, Some(0));
        assert!(args.fast);
        assert_eq!(args.format, Some(ReportFormat::Markdown));
        assert_eq!(args.seed, Some(9));
    }

    #[test]
    fn test_fast_conflicts_with_pace() {
        assert!(Args::try_parse_from(["deploysim", "--fast", "--pace", "2"]).is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_pace() {
        let mut args = make_args();
        args.pace = Some(-0.5);
        assert!(args.validate().is_err());

        args.pace = Some(f64::INFINITY);
        assert!(args.validate().is_err());

        args.pace = Some(0.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_progress_interval() {
        let mut args = make_args();
        args.progress_every = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_report_file() {
        let mut args = make_args();
        args.from_report = Some(PathBuf::from("no/such/report.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_merge_with_config() {
        use crate::config::Config;

        let mut args = make_args();
        args.output = Some(PathBuf::from("out.md"));
        args.format = Some(ReportFormat::Markdown);
        args.fast = true;
        args.iterations = Some(3);
        args.no_save = true;

        let mut config = Config::default();
        config.merge_with_args(&args);
        assert_eq!(config.general.output, "out.md");
        assert!(!config.general.save_output);
        assert_eq!(config.report.format, ReportFormat::Markdown);
        assert_eq!(config.pacing.scale, 0.0);
        assert_eq!(config.looping.max_iterations, 3);
        assert_eq!(config.looping.progress_every, 10);
    }
}
