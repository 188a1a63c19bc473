//! Data models for the vocabulary auditor.
//!
//! This module contains the identity data of quality issues, the knobs that
//! steer rendering and evaluation, and the structures a finished report is
//! built from.

use crate::result::Outcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a quality issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Plain statistics about the vocabulary, never problematic on their own.
    Statistical,
    /// Checks that point at potential quality problems.
    Analytical,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Statistical => write!(f, "Statistical"),
            Category::Analytical => write!(f, "Analytical"),
        }
    }
}

/// Identity of a quality issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IssueMeta {
    /// Short stable code, e.g. `oc`.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-sentence description.
    pub description: &'static str,
    pub category: Category,
    /// Optional link to further documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weblink: Option<&'static str>,
}

/// Output format for a single result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    /// Graphviz DOT.
    Graph,
}

/// Level of detail of a textual result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    #[default]
    Short,
    Extensive,
}

/// What the engine does after an issue fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Keep evaluating independent issues and report failures per issue.
    #[default]
    BestEffort,
    /// Stop at the first failure.
    FailFast,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::BestEffort => write!(f, "best effort"),
            RunMode::FailFast => write!(f, "fail fast"),
        }
    }
}

/// Status of one issue in a finished report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IssueStatus {
    /// A statistic; never counted as a problem.
    Info {
        #[serde(skip_serializing_if = "Option::is_none")]
        occurrences: Option<u64>,
    },
    /// Nothing suspicious found.
    Ok,
    /// Potential problems found.
    Fail {
        #[serde(skip_serializing_if = "Option::is_none")]
        occurrences: Option<u64>,
    },
    /// The issue could not be evaluated.
    Error { message: String },
}

impl IssueStatus {
    pub fn is_problematic(&self) -> bool {
        matches!(self, IssueStatus::Fail { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, IssueStatus::Error { .. })
    }
}

/// Summary of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    /// Number of evaluated issues.
    pub total: usize,
    /// Issues that found potential problems.
    pub problematic: usize,
    /// Issues without findings.
    pub ok: usize,
    /// Issues that could not be evaluated.
    pub failed: usize,
    /// Statistical issues.
    pub informational: usize,
    /// Problematic issues per category.
    pub by_category: std::collections::BTreeMap<String, usize>,
}

impl IssueSummary {
    /// Creates a summary from the per-issue status list.
    pub fn from_statuses<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a IssueMeta, &'a IssueStatus)>,
    {
        let mut summary = Self::default();

        for (meta, status) in entries {
            summary.total += 1;
            match status {
                IssueStatus::Info { .. } => summary.informational += 1,
                IssueStatus::Ok => summary.ok += 1,
                IssueStatus::Fail { .. } => {
                    summary.problematic += 1;
                    *summary
                        .by_category
                        .entry(meta.category.to_string())
                        .or_insert(0) += 1;
                }
                IssueStatus::Error { .. } => summary.failed += 1,
            }
        }

        summary
    }
}

/// Metadata about the audit report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the audited vocabulary.
    pub input: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Number of triples in the dataset.
    pub triples: usize,
    /// Base URI authoritative concepts were classified by, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,
    /// Sampling percentage used for extrapolated issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subset_percent: Option<f32>,
    pub run_mode: RunMode,
    /// Duration of the evaluation in seconds.
    pub duration_seconds: f64,
}

/// One issue in a finished report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub meta: IssueMeta,
    pub result: IssueStatus,
    /// The computed payload; absent when the issue failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

/// The complete audit report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: IssueSummary,
    pub entries: Vec<ReportEntry>,
}
