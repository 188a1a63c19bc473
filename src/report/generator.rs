//! Text, JSON and Graphviz report generation.
//!
//! The text report lists a one-line status per issue followed by a detailed
//! section for each issue with its rendered outcome. The JSON report is the
//! serialized [`Report`]. Graph-capable outcomes can additionally be written
//! as one DOT file per issue.

use crate::analysis::{generate_summary_text, group_by_category, most_problematic, summarize};
use crate::engine::RunReport;
use crate::error::RenderError;
use crate::models::{
    Category, IssueStatus, Report, ReportEntry, ReportFormat, ReportMetadata, ReportStyle,
};
use crate::result::Outcome;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options for the text report.
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    /// Detail level of the per-issue sections.
    pub style: ReportStyle,
    /// Include the aggregate summary block.
    pub include_summary: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            style: ReportStyle::Extensive,
            include_summary: true,
        }
    }
}

/// Assemble a report from a finished run.
pub fn build_report(metadata: ReportMetadata, run: &RunReport) -> Report {
    let entries = run
        .evaluations
        .iter()
        .map(|evaluation| ReportEntry {
            meta: evaluation.meta,
            result: evaluation.status(),
            outcome: evaluation.result.as_ref().ok().map(|o| Outcome::clone(o)),
        })
        .collect();

    Report {
        metadata,
        summary: summarize(run),
        entries,
    }
}

/// Generate the plain-text report.
pub fn generate_text_report(
    report: &Report,
    run: &RunReport,
    options: TextOptions,
) -> Result<String, RenderError> {
    let mut output = String::new();

    output.push_str(&generate_metadata_section(&report.metadata));

    output.push_str("* Summary of Quality Issue Occurrences:\n");
    for entry in &report.entries {
        output.push_str(&status_line(entry)?);
    }
    output.push('\n');

    if options.include_summary {
        output.push_str(&generate_summary_text(&report.summary));
        output.push('\n');

        let top = most_problematic(&run.evaluations, 5);
        if !top.is_empty() {
            output.push_str("\nMost occurrences:\n");
            for (evaluation, count) in top {
                output.push_str(&format!("- {} ({}): {}\n", evaluation.meta.name, evaluation.meta.code, count));
            }
        }
        output.push('\n');
    }

    output.push_str("* Detailed coverage of each Quality Issue:\n");
    for (category, evaluations) in group_by_category(&run.evaluations) {
        let heading = match category {
            Category::Statistical => "Statistics",
            Category::Analytical => "Analytical checks",
        };
        output.push_str(&format!("\n== {}\n", heading));

        for evaluation in evaluations {
            let Some(entry) = report.entries.iter().find(|e| e.meta.code == evaluation.meta.code)
            else {
                continue;
            };
            output.push_str(&generate_entry_section(entry, options.style)?);
        }
    }

    Ok(output)
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("vocabaudit report\n");
    section.push_str(&format!("Input: {}\n", metadata.input));
    section.push_str(&format!(
        "Analysis date: {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("Triples: {}\n", metadata.triples));
    if let Some(base_uri) = &metadata.base_uri {
        section.push_str(&format!("Base URI: {}\n", base_uri));
    }
    if let Some(percent) = metadata.subset_percent {
        section.push_str(&format!("Sampling: {}%\n", percent));
    }
    section.push_str(&format!("Run mode: {}\n", metadata.run_mode));
    section.push_str(&format!("Duration: {:.1}s\n\n", metadata.duration_seconds));

    section
}

fn status_line(entry: &ReportEntry) -> Result<String, RenderError> {
    let status = match &entry.result {
        IssueStatus::Info {
            occurrences: Some(n),
        } => n.to_string(),
        IssueStatus::Info { occurrences: None } => match &entry.outcome {
            Some(outcome) => outcome
                .render_to_string(ReportFormat::Text, ReportStyle::Short)?
                .trim_end()
                .to_string(),
            None => String::new(),
        },
        IssueStatus::Ok => "OK (no potential problems found)".to_string(),
        IssueStatus::Fail {
            occurrences: Some(n),
        } => format!("FAIL ({})", n),
        IssueStatus::Fail { occurrences: None } => "FAIL".to_string(),
        IssueStatus::Error { message } => format!("ERROR ({})", message),
    };

    Ok(format!("{}: {}\n", entry.meta.name, status))
}

fn generate_entry_section(entry: &ReportEntry, style: ReportStyle) -> Result<String, RenderError> {
    let mut block = String::new();

    block.push_str(&format!("\n--- {}\n", entry.meta.name));
    block.push_str(&format!("Description: {}\n", entry.meta.description));
    if let Some(link) = entry.meta.weblink {
        block.push_str(&format!("Detailed information: {}\n", link));
    }

    match (&entry.outcome, &entry.result) {
        (Some(outcome), _) => {
            block.push_str(&outcome.render_to_string(ReportFormat::Text, style)?);
        }
        (None, IssueStatus::Error { message }) => {
            block.push_str(&format!("error: {}\n", message));
        }
        (None, _) => {}
    }

    Ok(block)
}

/// Generate the JSON report.
pub fn generate_json_report(report: &Report) -> Result<String, RenderError> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write `content` to `path`.
pub fn write_report(content: &str, path: &Path) -> Result<(), RenderError> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Write one `<code>.dot` file per graph-capable outcome into `dir`.
///
/// Returns the written paths in report order.
pub fn write_graphs(report: &Report, dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for entry in &report.entries {
        let Some(outcome) = entry.outcome.as_ref().filter(|o| o.has_graph()) else {
            continue;
        };

        let path = dir.join(format!("{}.dot", entry.meta.code));
        let mut sink = BufWriter::new(File::create(&path)?);
        outcome.render(&mut sink, ReportFormat::Graph, ReportStyle::Short)?;
        sink.flush()?;

        debug!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::tests::fixture_engine;
    use crate::issues::IssueSettings;
    use crate::models::RunMode;
    use chrono::Utc;

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            input: "fixtures/vocabulary.nt".to_string(),
            analysis_date: Utc::now(),
            triples: 60,
            base_uri: Some("http://example.org/voc/".to_string()),
            subset_percent: None,
            run_mode: RunMode::BestEffort,
            duration_seconds: 0.2,
        }
    }

    async fn fixture_run() -> RunReport {
        // no link checker is attached, so `bl` fails and the rest succeeds
        let mut engine = fixture_engine(&IssueSettings::default());
        engine.run(&[]).await.unwrap()
    }

    #[tokio::test]
    async fn test_build_report() {
        let run = fixture_run().await;
        let report = build_report(metadata(), &run);

        assert_eq!(report.entries.len(), 20);
        assert_eq!(report.summary.total, 20);
        assert_eq!(report.summary.failed, 1);

        let bl = report.entries.iter().find(|e| e.meta.code == "bl").unwrap();
        assert!(bl.result.is_error());
        assert!(bl.outcome.is_none());
    }

    #[tokio::test]
    async fn test_generate_text_report() {
        let run = fixture_run().await;
        let report = build_report(metadata(), &run);
        let text = generate_text_report(&report, &run, TextOptions::default()).unwrap();

        assert!(text.contains("Input: fixtures/vocabulary.nt"));
        assert!(text.contains("* Summary of Quality Issue Occurrences:"));
        assert!(text.contains("All Concepts: 11"));
        assert!(text.contains("Orphan Concepts: FAIL (1)"));
        assert!(text.contains("Concept Graph: nodes: 10, edges: 10"));
        assert!(text.contains("Broken Links: ERROR"));
        assert!(text.contains("--- Cyclic Hierarchical Relations"));
        assert!(text.contains("Most occurrences:"));
        // extensive sections list the offending resources
        assert!(text.contains("http://example.org/voc/orphan"));
    }

    #[tokio::test]
    async fn test_text_report_prints_reference_links() {
        let run = fixture_run().await;
        let report = build_report(metadata(), &run);
        let text = generate_text_report(&report, &run, TextOptions::default()).unwrap();

        let section = text
            .split("\n--- ")
            .find(|s| s.starts_with("Orphan Concepts"))
            .unwrap();
        assert!(section.contains(
            "Detailed information: https://github.com/cmader/qSKOS/wiki/Quality-Issues#orphan-concepts"
        ));

        // statistics have no reference page
        let section = text
            .split("\n--- ")
            .find(|s| s.starts_with("All Concepts"))
            .unwrap();
        assert!(!section.contains("Detailed information:"));
    }

    #[tokio::test]
    async fn test_summary_can_be_omitted() {
        let run = fixture_run().await;
        let report = build_report(metadata(), &run);
        let options = TextOptions {
            style: ReportStyle::Short,
            include_summary: false,
        };
        let text = generate_text_report(&report, &run, options).unwrap();

        assert!(!text.contains("Issues evaluated:"));
        assert!(!text.contains("Most occurrences:"));
    }

    #[tokio::test]
    async fn test_generate_json_report() {
        let run = fixture_run().await;
        let report = build_report(metadata(), &run);
        let json = generate_json_report(&report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["total"], 20);
        let entries = value["entries"].as_array().unwrap();
        let oc = entries.iter().find(|e| e["meta"]["code"] == "oc").unwrap();
        assert_eq!(oc["result"]["status"], "fail");
        assert_eq!(oc["outcome"]["kind"], "collection");
    }

    #[tokio::test]
    async fn test_write_graphs() {
        let run = fixture_run().await;
        let report = build_report(metadata(), &run);
        let dir = tempfile::tempdir().unwrap();

        let written = write_graphs(&report, dir.path()).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["cg.dot", "dcc.dot", "hc.dot"]);

        let dot = std::fs::read_to_string(dir.path().join("cg.dot")).unwrap();
        assert!(dot.starts_with("digraph"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        write_report("hello\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
    }
}
