//! Configuration file handling.
//!
//! This module handles loading, validating and merging configuration from
//! `.vocabaudit.toml` files.

use crate::cli::{Args, OutputFormat};
use crate::error::ConfigError;
use crate::issues::{all_issues, IssueSettings};
use crate::models::{ReportStyle, RunMode};
use crate::sampling::check_percent;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".vocabaudit.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// How the vocabulary is interpreted.
    #[serde(default)]
    pub vocabulary: VocabularyConfig,

    /// Sampling of expensive issues.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// External link checks.
    #[serde(default)]
    pub links: LinksConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Keep going after a failed issue, or stop at the first one.
    #[serde(default)]
    pub run_mode: RunMode,

    /// Issue codes to evaluate; empty means all.
    #[serde(default)]
    pub issues: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            run_mode: RunMode::default(),
            issues: Vec::new(),
        }
    }
}

fn default_output() -> String {
    "vocabaudit_report.txt".to_string()
}

/// Vocabulary interpretation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Prefix of authoritative concepts.
    #[serde(default)]
    pub base_uri: Option<String>,
}

/// Sampling settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Percentage in (0, 100]; absent means exhaustive.
    #[serde(default)]
    pub subset_percent: Option<f32>,

    #[serde(default)]
    pub seed: Option<u64>,
}

/// Link check settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Minimum spacing between request starts.
    #[serde(default = "default_delay_millis")]
    pub delay_millis: i64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Requests allowed in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            delay_millis: default_delay_millis(),
            timeout_seconds: default_timeout(),
            concurrency: default_concurrency(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_delay_millis() -> i64 {
    1500
}

fn default_timeout() -> u64 {
    10
}

fn default_concurrency() -> usize {
    4
}

fn default_user_agent() -> String {
    format!("vocabaudit/{}", env!("CARGO_PKG_VERSION"))
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Detail level of the text report.
    #[serde(default = "default_style")]
    pub style: ReportStyle,

    /// Write DOT files for graph results.
    #[serde(default)]
    pub write_graphs: bool,

    /// Directory for DOT files.
    #[serde(default = "default_graphs_dir")]
    pub graphs_dir: String,

    /// Include the aggregate summary in the text report.
    #[serde(default = "default_true")]
    pub include_summary: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            style: default_style(),
            write_graphs: false,
            graphs_dir: default_graphs_dir(),
            include_summary: true,
        }
    }
}

fn default_style() -> ReportStyle {
    ReportStyle::Extensive
}

fn default_graphs_dir() -> String {
    "graphs".to_string()
}

fn default_true() -> bool {
    true
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
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings; only values
    /// given on the command line override.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(ref issues) = args.issues {
            self.general.issues = issues.clone();
        }
        if args.fail_fast {
            self.general.run_mode = RunMode::FailFast;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(ref base_uri) = args.base_uri {
            self.vocabulary.base_uri = Some(base_uri.clone());
        }

        if args.subset.is_some() {
            self.sampling.subset_percent = args.subset;
        }
        if args.seed.is_some() {
            self.sampling.seed = args.seed;
        }

        if let Some(delay) = args.delay {
            self.links.delay_millis = delay;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref dir) = args.graphs {
            self.report.write_graphs = true;
            self.report.graphs_dir = dir.display().to_string();
        }
    }

    /// Check the settings that are fatal when wrong.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_percent(self.sampling.subset_percent)?;

        if self.links.delay_millis < 0 {
            return Err(ConfigError::NegativeDelay(self.links.delay_millis));
        }
        if self.links.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        let known = all_issues();
        if let Some(unknown) = self
            .general
            .issues
            .iter()
            .find(|code| !known.iter().any(|meta| meta.code == code.as_str()))
        {
            return Err(ConfigError::UnknownIssue(unknown.clone()));
        }

        Ok(())
    }

    /// Settings handed to the issue catalog.
    pub fn issue_settings(&self) -> IssueSettings {
        IssueSettings {
            base_uri: self.vocabulary.base_uri.clone(),
            subset_percent: self.sampling.subset_percent,
            seed: self.sampling.seed,
        }
    }

    /// Log level once the file and command line are merged.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    pub fn link_timeout(&self) -> Duration {
        Duration::from_secs(self.links.timeout_seconds)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String> {
        let config = Config::default();
        toml::to_string_pretty(&config).context("Failed to serialize default config")
    }
}
