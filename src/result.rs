//! Typed results of quality issues and how they are rendered.

use crate::error::{RenderError, Unsupported};
use crate::graph::{escape_dot, local_name, Cluster, ConceptGraph, Cycle};
use crate::links::LinkReport;
use crate::models::{ReportFormat, ReportStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// Payload produced by one issue's compute step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Outcome {
    /// A plain statistic.
    Count(u64),
    /// Offending (or enumerated) resources.
    Collection(Vec<String>),
    /// Resources mapped to their offending values.
    Mapping(BTreeMap<String, Vec<String>>),
    Graph(ConceptGraph),
    Clusters(Vec<Cluster>),
    Cycles(Vec<Cycle>),
    Links(LinkReport),
}

impl Outcome {
    /// Whether the payload points at potential quality problems.
    pub fn is_problematic(&self) -> bool {
        match self {
            Outcome::Count(_) | Outcome::Graph(_) => false,
            Outcome::Collection(items) => !items.is_empty(),
            Outcome::Mapping(map) => !map.is_empty(),
            Outcome::Clusters(clusters) => clusters.len() > 1,
            Outcome::Cycles(cycles) => !cycles.is_empty(),
            Outcome::Links(report) => report.estimate.value > 0,
        }
    }

    /// Scalar size of the payload.
    ///
    /// A raw graph has no natural count and yields [`Unsupported`].
    pub fn occurrence_count(&self) -> Result<u64, Unsupported> {
        match self {
            Outcome::Count(n) => Ok(*n),
            Outcome::Collection(items) => Ok(items.len() as u64),
            Outcome::Mapping(map) => Ok(map.len() as u64),
            Outcome::Clusters(clusters) => Ok(clusters.len() as u64),
            Outcome::Cycles(cycles) => Ok(cycles.len() as u64),
            Outcome::Links(report) => Ok(report.estimate.value),
            Outcome::Graph(_) => Err(Unsupported("occurrence count")),
        }
    }

    /// Whether [`ReportFormat::Graph`] output exists for this payload.
    pub fn has_graph(&self) -> bool {
        matches!(
            self,
            Outcome::Graph(_) | Outcome::Clusters(_) | Outcome::Cycles(_)
        )
    }

    /// Write the payload to `sink`.
    pub fn render(
        &self,
        sink: &mut dyn Write,
        format: ReportFormat,
        style: ReportStyle,
    ) -> Result<(), RenderError> {
        match format {
            ReportFormat::Text => self.render_text(sink, style).map_err(Into::into),
            ReportFormat::Graph => self.render_graph(sink),
        }
    }

    /// Render into a string, for callers that do not stream.
    pub fn render_to_string(
        &self,
        format: ReportFormat,
        style: ReportStyle,
    ) -> Result<String, RenderError> {
        let mut buf = Vec::new();
        self.render(&mut buf, format, style)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn render_text(&self, sink: &mut dyn Write, style: ReportStyle) -> std::io::Result<()> {
        let extensive = style == ReportStyle::Extensive;

        match self {
            Outcome::Count(n) => writeln!(sink, "count: {}", n),
            Outcome::Collection(items) => {
                writeln!(sink, "count: {}", items.len())?;
                if extensive {
                    for item in items {
                        writeln!(sink, "{}", item)?;
                    }
                }
                Ok(())
            }
            Outcome::Mapping(map) => {
                writeln!(sink, "count: {}", map.len())?;
                if extensive {
                    for (key, values) in map {
                        writeln!(sink, "{}: {}", key, values.join(", "))?;
                    }
                }
                Ok(())
            }
            Outcome::Graph(graph) => {
                writeln!(sink, "nodes: {}, edges: {}", graph.node_count(), graph.edge_count())?;
                if extensive {
                    for edge in graph.edges() {
                        writeln!(
                            sink,
                            "{} -[{}]-> {}",
                            graph.name(edge.source),
                            local_name(&edge.label),
                            graph.name(edge.target)
                        )?;
                    }
                }
                Ok(())
            }
            Outcome::Clusters(clusters) => {
                writeln!(sink, "count: {}", clusters.len())?;
                let sizes: Vec<String> = clusters.iter().map(|c| c.len().to_string()).collect();
                writeln!(sink, "sizes: {}", sizes.join(", "))?;
                if extensive {
                    for (i, cluster) in clusters.iter().enumerate() {
                        writeln!(sink, "cluster {} ({} concepts):", i + 1, cluster.len())?;
                        for member in &cluster.members {
                            writeln!(sink, "  {}", member)?;
                        }
                    }
                }
                Ok(())
            }
            Outcome::Cycles(cycles) => {
                writeln!(sink, "count: {}", cycles.len())?;
                if extensive {
                    for cycle in cycles {
                        writeln!(sink, "{}", cycle)?;
                    }
                }
                Ok(())
            }
            Outcome::Links(report) => {
                let estimate = &report.estimate;
                writeln!(
                    sink,
                    "checked: {}, reachable: {}, broken: {}",
                    report.total_checked, report.reachable, report.broken
                )?;
                if estimate.extrapolated {
                    writeln!(
                        sink,
                        "estimated broken: {} of {} (sample of {})",
                        estimate.value, estimate.population, estimate.sample_size
                    )?;
                }
                if extensive {
                    for outcome in report.broken_uris() {
                        writeln!(sink, "{} ({})", outcome.uri, outcome.status)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn render_graph(&self, sink: &mut dyn Write) -> Result<(), RenderError> {
        match self {
            Outcome::Graph(graph) => graph.write_dot(sink)?,
            Outcome::Clusters(clusters) => {
                writeln!(sink, "graph clusters {{")?;
                for (i, cluster) in clusters.iter().enumerate() {
                    writeln!(sink, "  subgraph cluster_{} {{", i)?;
                    for member in &cluster.members {
                        writeln!(sink, "    \"{}\";", escape_dot(member))?;
                    }
                    writeln!(sink, "  }}")?;
                }
                writeln!(sink, "}}")?;
            }
            Outcome::Cycles(cycles) => {
                writeln!(sink, "digraph cycles {{")?;
                for cycle in cycles {
                    let members = &cycle.members;
                    for (i, member) in members.iter().enumerate() {
                        let next = &members[(i + 1) % members.len()];
                        writeln!(
                            sink,
                            "  \"{}\" -> \"{}\";",
                            escape_dot(member),
                            escape_dot(next)
                        )?;
                    }
                }
                writeln!(sink, "}}")?;
            }
            _ => return Err(Unsupported("graph rendering").into()),
        }
        Ok(())
    }
}
