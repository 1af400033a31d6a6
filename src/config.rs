//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.deploysim.toml` files.

use crate::report::ReportFormat;
use crate::sim::continuous::LoopConfig;
use crate::sim::PacingConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".deploysim.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Narration pacing.
    #[serde(default)]
    pub pacing: PacingSettings,

    /// Simulation settings.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Continuous loop settings.
    #[serde(default, rename = "loop")]
    pub looping: LoopSettings,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Where the report is written.
    #[serde(default = "default_output")]
    pub output: String,

    /// Write the report at all.
    #[serde(default = "default_true")]
    pub save_output: bool,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            save_output: true,
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "simulation_output.json".to_string()
}

fn default_true() -> bool {
    true
}

/// Pacing settings as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingSettings {
    /// Multiplier for every narration pause. `0.0` runs at full speed.
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Show a spinner while paused.
    #[serde(default = "default_true")]
    pub show_spinner: bool,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            show_spinner: true,
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

impl From<&PacingSettings> for PacingConfig {
    fn from(settings: &PacingSettings) -> Self {
        Self {
            scale: settings.scale,
            show_spinner: settings.show_spinner,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed for cosmetic identifiers. Unset means a fresh seed every run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Continuous loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopSettings {
    /// Iterations to run. `0` runs until interrupted.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,

    /// Print a progress banner every this many iterations.
    #[serde(default = "default_progress_every")]
    pub progress_every: u64,

    /// Pause between iterations in milliseconds.
    #[serde(default = "default_iteration_pause_ms")]
    pub iteration_pause_ms: u64,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            progress_every: default_progress_every(),
            iteration_pause_ms: default_iteration_pause_ms(),
        }
    }
}

fn default_max_iterations() -> u64 {
    10
}

fn default_progress_every() -> u64 {
    10
}

fn default_iteration_pause_ms() -> u64 {
    500
}

impl From<&LoopSettings> for LoopConfig {
    fn from(settings: &LoopSettings) -> Self {
        Self {
            max_iterations: settings.max_iterations,
            progress_every: settings.progress_every,
            iteration_pause: Duration::from_millis(settings.iteration_pause_ms),
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: ReportFormat,

    /// Refuse to finalize a report that lacks a pipeline stage.
    #[serde(default = "default_true")]
    pub enforce_required_stages: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            enforce_required_stages: true,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if args.no_save {
            self.general.save_output = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }

        // --fast wins over --pace
        if args.fast {
            self.pacing.scale = 0.0;
        } else if let Some(pace) = args.pace {
            self.pacing.scale = pace;
        }
        if args.quiet {
            self.pacing.show_spinner = false;
        }

        if let Some(seed) = args.seed {
            self.simulation.seed = Some(seed);
        }

        if let Some(iterations) = args.iterations {
            self.looping.max_iterations = iterations;
        }
        if let Some(every) = args.progress_every {
            self.looping.progress_every = every;
        }
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<()> {
        if !self.pacing.scale.is_finite() || self.pacing.scale < 0.0 {
            bail!(
                "Pacing scale must be a non-negative number, got {}",
                self.pacing.scale
            );
        }
        if self.looping.progress_every == 0 {
            bail!("Loop progress interval must be at least 1");
        }
        if self.general.save_output && self.general.output.trim().is_empty() {
            bail!("Output path must not be empty");
        }
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.general.output)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "simulation_output.json");
        assert!(config.general.save_output);
        assert_eq!(config.pacing.scale, 1.0);
        assert_eq!(config.looping.max_iterations, 10);
        assert_eq!(config.report.format, ReportFormat::Json);
        assert!(config.simulation.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "run.md"
verbose = true

[pacing]
scale = 0.25

[simulation]
seed = 42

[loop]
max_iterations = 0
iteration_pause_ms = 100

[report]
format = "markdown"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "run.md");
        assert!(config.general.verbose);
        assert!(config.general.save_output);
        assert_eq!(config.pacing.scale, 0.25);
        assert!(config.pacing.show_spinner);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.looping.max_iterations, 0);
        assert_eq!(config.looping.progress_every, 10);
        assert_eq!(config.report.format, ReportFormat::Markdown);

        let loop_config = LoopConfig::from(&config.looping);
        assert_eq!(loop_config.iteration_pause, Duration::from_millis(100));
    }

    #[test]
    fn test_load_fixture() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/deploysim.toml");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.pacing.scale, 0.0);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.report.format, ReportFormat::Text);
        assert!(!config.report.enforce_required_stages);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = Config::load(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.pacing.scale = -1.0;
        assert!(config.validate().is_err());

        config.pacing.scale = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.looping.progress_every = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[pacing]"));
        assert!(toml_str.contains("[loop]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.looping.iteration_pause_ms, 500);
    }
}
