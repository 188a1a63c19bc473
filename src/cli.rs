//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// vocabaudit - quality checker for SKOS vocabularies
///
/// Evaluates a catalog of quality issues (orphan concepts, hierarchical
/// cycles, disconnected clusters, broken links, ...) over an N-Triples
/// vocabulary and writes a text or JSON report.
///
/// Examples:
///   vocabaudit thesaurus.nt
///   vocabaudit thesaurus.nt --issues oc,hc,dcc --format json
///   vocabaudit thesaurus.nt --subset 10 --delay 500 --graphs graphs/
///   vocabaudit --list-issues
///   vocabaudit --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Vocabulary to audit (N-Triples)
    #[arg(
        value_name = "INPUT",
        required_unless_present_any = ["init_config", "list_issues"]
    )]
    pub input: Option<PathBuf>,

    /// Prefix identifying authoritative concepts
    ///
    /// When omitted, the most frequent namespace among concepts is used.
    #[arg(long, value_name = "URI", env = "VOCABAUDIT_BASE_URI")]
    pub base_uri: Option<String>,

    /// Percentage of resources to sample for extrapolating issues (0, 100]
    #[arg(long, value_name = "PERCENT")]
    pub subset: Option<f32>,

    /// Seed for reproducible sampling
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Minimum spacing between link checks in milliseconds
    #[arg(long, value_name = "MILLIS", allow_negative_numbers = true)]
    pub delay: Option<i64>,

    /// Issue codes to evaluate (comma-separated, default: all)
    ///
    /// Example: --issues oc,hc,dcc
    #[arg(long, value_name = "CODES", value_delimiter = ',')]
    pub issues: Option<Vec<String>>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write Graphviz files for graph results into this directory
    #[arg(long, value_name = "DIR")]
    pub graphs: Option<PathBuf>,

    /// Stop at the first issue that cannot be evaluated
    #[arg(long)]
    pub fail_fast: bool,

    /// List the available issues and exit
    #[arg(long)]
    pub list_issues: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .vocabaudit.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .vocabaudit.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Exit with code 2 when any issue reports potential problems
    ///
    /// Useful for CI pipelines.
    #[arg(long)]
    pub fail_on_problems: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config || self.list_issues {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        if let Some(ref base_uri) = self.base_uri {
            if base_uri.trim().is_empty() {
                return Err("Base URI must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
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
            input: None,
            base_uri: None,
            subset: None,
            seed: None,
            delay: None,
            issues: None,
            output: None,
            format: None,
            graphs: None,
            fail_fast: false,
            list_issues: false,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
            fail_on_problems: false,
        }
    }

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "vocabaudit",
            "voc.nt",
            "--issues",
            "oc,hc",
            "--subset",
            "12.5",
            "--delay",
            "-1",
            "--format",
            "json",
            "--fail-fast",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("voc.nt")));
        assert_eq!(args.issues, Some(vec!["oc".to_string(), "hc".to_string()]));
        assert_eq!(args.subset, Some(12.5));
        assert_eq!(args.delay, Some(-1));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert!(args.fail_fast);
    }

    #[test]
    fn test_input_required_unless_listing() {
        assert!(Args::try_parse_from(["vocabaudit"]).is_err());
        assert!(Args::try_parse_from(["vocabaudit", "--list-issues"]).is_ok());
        assert!(Args::try_parse_from(["vocabaudit", "--init-config"]).is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/nonexistent/vocabulary.nt"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_existing_input() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut args = make_args();
        args.input = Some(file.path().to_path_buf());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
