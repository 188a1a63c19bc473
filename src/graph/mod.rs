//! Concept relation graph.
//!
//! The graph is an arena: node identifiers are interned into a vector and
//! edges reference them by index. It is built once from store rows and never
//! mutated afterwards.

pub mod clusters;
pub mod cycles;

use crate::store::Triple;
use crate::vocab;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::{self, Write};

pub use clusters::{find_clusters, Cluster};
pub use cycles::{find_cycles, Cycle};

/// Index of a node inside a [`ConceptGraph`].
pub type NodeId = usize;

/// Coarse classification of a relation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Hierarchical,
    Associative,
    Mapping,
    Other,
}

impl RelationKind {
    /// Classify a predicate IRI.
    pub fn of(predicate: &str) -> Self {
        if vocab::HIERARCHICAL_RELATIONS.contains(&predicate) {
            RelationKind::Hierarchical
        } else if vocab::ASSOCIATIVE_RELATIONS.contains(&predicate) {
            RelationKind::Associative
        } else if vocab::MAPPING_RELATIONS.contains(&predicate) {
            RelationKind::Mapping
        } else {
            RelationKind::Other
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Hierarchical => write!(f, "hierarchical"),
            RelationKind::Associative => write!(f, "associative"),
            RelationKind::Mapping => write!(f, "mapping"),
            RelationKind::Other => write!(f, "other"),
        }
    }
}

/// A directed, labeled edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub label: String,
    pub kind: RelationKind,
}

/// Directed multigraph of relations between concepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConceptGraph {
    nodes: Vec<String>,
    edges: Vec<Edge>,
    #[serde(skip)]
    index: HashMap<String, NodeId>,
}

impl ConceptGraph {
    /// Build a graph from relation rows.
    ///
    /// Literal objects are skipped; self-loops and duplicate rows are kept.
    /// Nodes and edges are sorted, so the result does not depend on row order.
    pub fn from_triples<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a Triple>,
    {
        let mut raw = Vec::new();
        let mut names = BTreeSet::new();

        for row in rows {
            let (Some(source), Some(target)) = (row.subject.resource_id(), row.object.resource_id())
            else {
                continue;
            };
            names.insert(source.clone());
            names.insert(target.clone());
            raw.push((source, target, row.predicate.clone()));
        }

        let nodes: Vec<String> = names.into_iter().collect();
        let index: HashMap<String, NodeId> = nodes
            .iter()
            .enumerate()
            .map(|(id, name)| (name.clone(), id))
            .collect();

        let mut edges: Vec<Edge> = raw
            .into_iter()
            .map(|(source, target, label)| Edge {
                source: index[&source],
                target: index[&target],
                kind: RelationKind::of(&label),
                label,
            })
            .collect();
        edges.sort();

        Self {
            nodes,
            edges,
            index,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node identifiers in id order.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id]
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Hierarchical edges oriented child -> parent (`narrower` rows reversed).
    pub fn hierarchical_edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges
            .iter()
            .filter(|e| e.kind == RelationKind::Hierarchical)
            .map(|e| {
                if e.label == vocab::NARROWER || e.label == vocab::NARROWER_TRANSITIVE {
                    (e.target, e.source)
                } else {
                    (e.source, e.target)
                }
            })
    }

    /// Write the graph in Graphviz DOT format.
    pub fn write_dot(&self, sink: &mut dyn Write) -> io::Result<()> {
        writeln!(sink, "digraph concepts {{")?;
        for node in &self.nodes {
            writeln!(sink, "  \"{}\";", escape_dot(node))?;
        }
        for edge in &self.edges {
            writeln!(
                sink,
                "  \"{}\" -> \"{}\" [label=\"{}\"];",
                escape_dot(&self.nodes[edge.source]),
                escape_dot(&self.nodes[edge.target]),
                escape_dot(local_name(&edge.label)),
            )?;
        }
        writeln!(sink, "}}")
    }
}

/// Short name of an IRI for display (fragment or last path segment).
pub fn local_name(iri: &str) -> &str {
    let namespace = vocab::namespace_of(iri);
    match &iri[namespace.len()..] {
        "" => iri,
        local => local,
    }
}

pub(crate) fn escape_dot(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Term;

    fn rel(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(Term::iri(s), p, Term::iri(o))
    }

    #[test]
    fn test_build_is_order_independent() {
        let rows = vec![
            rel("c", vocab::BROADER, "b"),
            rel("a", vocab::RELATED, "c"),
            rel("b", vocab::BROADER, "a"),
            rel("b", vocab::BROADER, "a"),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let g1 = ConceptGraph::from_triples(&rows);
        let g2 = ConceptGraph::from_triples(&reversed);

        assert_eq!(g1, g2);
        assert_eq!(g1.node_count(), 3);
        // duplicate rows stay as parallel edges
        assert_eq!(g1.edge_count(), 4);
    }

    #[test]
    fn test_self_loops_and_literals() {
        let rows = vec![
            rel("a", vocab::BROADER, "a"),
            Triple::new(Term::iri("a"), vocab::RELATED, Term::literal("not a node")),
        ];
        let graph = ConceptGraph::from_triples(&rows);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].source, graph.edges()[0].target);
    }

    #[test]
    fn test_narrower_edges_are_reversed() {
        let rows = vec![rel("parent", vocab::NARROWER, "child")];
        let graph = ConceptGraph::from_triples(&rows);
        let edges: Vec<_> = graph.hierarchical_edges().collect();
        let child = graph.id_of("child").unwrap();
        let parent = graph.id_of("parent").unwrap();
        assert_eq!(edges, vec![(child, parent)]);
    }

    #[test]
    fn test_relation_kinds() {
        assert_eq!(RelationKind::of(vocab::BROADER), RelationKind::Hierarchical);
        assert_eq!(RelationKind::of(vocab::RELATED), RelationKind::Associative);
        assert_eq!(RelationKind::of(vocab::EXACT_MATCH), RelationKind::Mapping);
        assert_eq!(RelationKind::of("http://ex.org/p"), RelationKind::Other);
    }

    #[test]
    fn test_write_dot() {
        let graph = ConceptGraph::from_triples(&[rel("http://ex.org/a", vocab::BROADER, "http://ex.org/b")]);
        let mut out = Vec::new();
        graph.write_dot(&mut out).unwrap();
        let dot = String::from_utf8(out).unwrap();
        assert!(dot.starts_with("digraph concepts {"));
        assert!(dot.contains("\"http://ex.org/a\" -> \"http://ex.org/b\" [label=\"broader\"]"));
    }
}
