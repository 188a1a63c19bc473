//! Issues over the shape of the concept graph.

use crate::engine::{Issue, IssueContext};
use crate::error::ComputeError;
use crate::graph::{find_clusters, find_cycles, ConceptGraph};
use crate::models::{Category, IssueMeta};
use crate::result::Outcome;
use crate::vocab;
use async_trait::async_trait;
use tracing::debug;

/// `cg`: the graph of semantic relations between concepts.
pub struct ConceptGraphIssue;

const CONCEPT_GRAPH: IssueMeta = IssueMeta {
    code: "cg",
    name: "Concept Graph",
    description: "Builds the graph of semantic relations between concepts",
    category: Category::Statistical,
    weblink: None,
};

#[async_trait]
impl Issue for ConceptGraphIssue {
    fn meta(&self) -> &IssueMeta {
        &CONCEPT_GRAPH
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let rows = ctx.store().query_predicates(vocab::SEMANTIC_RELATIONS)?;
        let graph = ConceptGraph::from_triples(&rows);
        debug!(
            "Concept graph has {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Outcome::Graph(graph))
    }
}

/// `dcc`: weakly connected components among all concepts.
pub struct DisconnectedClusters;

const DISCONNECTED_CLUSTERS: IssueMeta = IssueMeta {
    code: "dcc",
    name: "Disconnected Concept Clusters",
    description: "Finds sets of concepts that are isolated from the rest of the vocabulary",
    category: Category::Analytical,
    weblink: Some(quality_issue!("disconnected-concept-clusters")),
};

#[async_trait]
impl Issue for DisconnectedClusters {
    fn meta(&self) -> &IssueMeta {
        &DISCONNECTED_CLUSTERS
    }

    fn dependencies(&self) -> &[&'static str] {
        &["c", "cg"]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let concepts = ctx.collection("c")?;
        let graph = ctx.graph("cg")?;
        Ok(Outcome::Clusters(find_clusters(graph, Some(concepts))))
    }
}

/// `hc`: cycles in the broader/narrower hierarchy.
pub struct HierarchicalCycles;

const HIERARCHICAL_CYCLES: IssueMeta = IssueMeta {
    code: "hc",
    name: "Cyclic Hierarchical Relations",
    description: "Finds cycles in the hierarchy of concepts",
    category: Category::Analytical,
    weblink: Some(quality_issue!("cyclic-hierarchical-relations")),
};

#[async_trait]
impl Issue for HierarchicalCycles {
    fn meta(&self) -> &IssueMeta {
        &HIERARCHICAL_CYCLES
    }

    fn dependencies(&self) -> &[&'static str] {
        &["cg"]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        Ok(Outcome::Cycles(find_cycles(ctx.graph("cg")?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::tests::{fixture_engine, voc};
    use crate::issues::IssueSettings;

    #[tokio::test]
    async fn test_fixture_structure() {
        let mut engine = fixture_engine(&IssueSettings::default());
        let report = engine.run(&["cg", "dcc", "hc"]).await.unwrap();
        assert_eq!(report.failures().count(), 0);

        match engine.result("cg").unwrap().as_ref() {
            Outcome::Graph(graph) => {
                assert_eq!(graph.node_count(), 10);
                assert_eq!(graph.edge_count(), 10);
            }
            other => panic!("expected a graph, got {:?}", other),
        }

        match engine.result("dcc").unwrap().as_ref() {
            Outcome::Clusters(clusters) => {
                let sizes: Vec<usize> = clusters.iter().map(|c| c.len()).collect();
                assert_eq!(sizes, vec![6, 2, 2, 1]);
                assert_eq!(clusters[3].members, vec![voc("orphan")]);
            }
            other => panic!("expected clusters, got {:?}", other),
        }

        match engine.result("hc").unwrap().as_ref() {
            Outcome::Cycles(cycles) => {
                assert_eq!(cycles.len(), 1);
                assert_eq!(cycles[0].members, vec![voc("loopA"), voc("loopB")]);
            }
            other => panic!("expected cycles, got {:?}", other),
        }

        assert!(report.get("dcc").unwrap().is_problematic());
        assert!(report.get("hc").unwrap().is_problematic());
        assert!(!report.get("cg").unwrap().is_problematic());
    }
}
