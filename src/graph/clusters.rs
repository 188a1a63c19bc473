//! Weakly-connected components of the concept graph.

use super::ConceptGraph;
use serde::Serialize;
use std::collections::HashMap;

/// One weakly-connected component, members sorted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Cluster {
    pub members: Vec<String>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut a, mut b) = (self.find(a), self.find(b));
        if a == b {
            return;
        }
        if self.size[a] < self.size[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a;
        self.size[a] += self.size[b];
    }
}

/// Find the weakly-connected components of `graph`.
///
/// With `subset`, only those nodes are considered and edges leaving the subset
/// are ignored; subset members missing from the graph become isolated
/// clusters. Direction and labels of edges are irrelevant.
///
/// Clusters are ordered by size (largest first), then by first member.
pub fn find_clusters(graph: &ConceptGraph, subset: Option<&[String]>) -> Vec<Cluster> {
    let requested: Vec<&str> = match subset {
        Some(names) => {
            let mut names: Vec<&str> = names.iter().map(String::as_str).collect();
            names.sort_unstable();
            names.dedup();
            names
        }
        None => graph.nodes().iter().map(String::as_str).collect(),
    };

    let local: HashMap<&str, usize> = requested
        .iter()
        .enumerate()
        .map(|(pos, name)| (*name, pos))
        .collect();
    let graph_to_local: Vec<Option<usize>> = graph
        .nodes()
        .iter()
        .map(|name| local.get(name.as_str()).copied())
        .collect();

    let mut sets = UnionFind::new(requested.len());
    for edge in graph.edges() {
        if let (Some(a), Some(b)) = (graph_to_local[edge.source], graph_to_local[edge.target]) {
            sets.union(a, b);
        }
    }

    let mut groups: HashMap<usize, Vec<String>> = HashMap::new();
    for (pos, name) in requested.iter().enumerate() {
        let root = sets.find(pos);
        groups.entry(root).or_default().push(name.to_string());
    }

    let mut clusters: Vec<Cluster> = groups
        .into_values()
        .map(|mut members| {
            members.sort();
            Cluster { members }
        })
        .collect();
    clusters.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.members.cmp(&b.members)));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Term, Triple};
    use crate::vocab;

    fn graph(edges: &[(&str, &str, &str)]) -> ConceptGraph {
        let rows: Vec<Triple> = edges
            .iter()
            .map(|(s, p, o)| Triple::new(Term::iri(*s), *p, Term::iri(*o)))
            .collect();
        ConceptGraph::from_triples(&rows)
    }

    #[test]
    fn test_two_disjoint_subgraphs() {
        let g = graph(&[
            ("a1", vocab::BROADER, "a2"),
            ("a3", vocab::RELATED, "a2"),
            ("b1", vocab::NARROWER, "b2"),
            ("b2", vocab::EXACT_MATCH, "b3"),
        ]);
        let clusters = find_clusters(&g, None);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec!["a1", "a2", "a3"]);
        assert_eq!(clusters[1].members, vec!["b1", "b2", "b3"]);
    }

    #[test]
    fn test_connected_graph_is_one_cluster() {
        let g = graph(&[
            ("a", vocab::BROADER, "b"),
            ("c", vocab::BROADER, "b"),
            ("c", vocab::RELATED, "d"),
        ]);
        let clusters = find_clusters(&g, None);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 4);
    }

    #[test]
    fn test_single_isolated_node() {
        let g = ConceptGraph::default();
        let subset = vec!["lonely".to_string()];
        let clusters = find_clusters(&g, Some(&subset));
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec!["lonely"]);
    }

    #[test]
    fn test_subset_ignores_outside_edges() {
        // a and c are only connected through the excluded node b
        let g = graph(&[("a", vocab::BROADER, "b"), ("c", vocab::BROADER, "b")]);
        let subset = vec!["a".to_string(), "c".to_string()];
        let clusters = find_clusters(&g, Some(&subset));
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_empty_graph_has_no_clusters() {
        assert!(find_clusters(&ConceptGraph::default(), None).is_empty());
    }
}
