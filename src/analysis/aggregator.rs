//! Aggregation and statistics over evaluated issues.

use crate::engine::{Evaluation, RunReport};
use crate::models::{Category, IssueStatus, IssueSummary};
use std::collections::BTreeMap;

/// Summarize a run.
pub fn summarize(report: &RunReport) -> IssueSummary {
    let statuses: Vec<IssueStatus> = report.evaluations.iter().map(Evaluation::status).collect();
    IssueSummary::from_statuses(
        report
            .evaluations
            .iter()
            .map(|e| &e.meta)
            .zip(statuses.iter()),
    )
}

/// Group evaluations by category, statistics first.
pub fn group_by_category(evaluations: &[Evaluation]) -> BTreeMap<Category, Vec<&Evaluation>> {
    let mut grouped: BTreeMap<Category, Vec<&Evaluation>> = BTreeMap::new();

    for evaluation in evaluations {
        grouped
            .entry(evaluation.meta.category)
            .or_default()
            .push(evaluation);
    }

    grouped
}

/// The `n` problematic issues with the most occurrences.
pub fn most_problematic(evaluations: &[Evaluation], n: usize) -> Vec<(&Evaluation, u64)> {
    let mut counted: Vec<_> = evaluations
        .iter()
        .filter(|e| e.is_problematic())
        .filter_map(|e| {
            let count = e.result.as_ref().ok()?.occurrence_count().ok()?;
            Some((e, count))
        })
        .collect();

    counted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.meta.code.cmp(b.0.meta.code)));
    counted.truncate(n);

    counted
}

/// Generate a text summary of issue statistics.
pub fn generate_summary_text(summary: &IssueSummary) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Issues evaluated: {}", summary.total));
    lines.push(format!("- Statistics: {}", summary.informational));
    lines.push(format!("- OK: {}", summary.ok));
    lines.push(format!("- Potential problems: {}", summary.problematic));
    if summary.failed > 0 {
        lines.push(format!("- Not evaluated: {}", summary.failed));
    }

    lines.join("\n")
}
