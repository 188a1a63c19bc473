//! Cycle detection over the hierarchical subgraph.

use super::{ConceptGraph, NodeId};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A directed cycle, rotated to start at its smallest member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Cycle {
    pub members: Vec<String>,
}

impl Cycle {
    /// Canonicalize a cycle given in traversal order.
    pub fn new(mut members: Vec<String>) -> Self {
        if let Some(start) = members
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(pos, _)| pos)
        {
            members.rotate_left(start);
        }
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for member in &self.members {
            write!(f, "{} -> ", member)?;
        }
        match self.members.first() {
            Some(first) => write!(f, "{}", first),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnStack(usize),
    Done,
}

/// Find the distinct cycles of the graph's hierarchical edges.
///
/// Each back-edge met during a depth-first traversal yields the stack segment
/// it closes. Parallel edges are collapsed first; they cannot add cycles.
pub fn find_cycles(graph: &ConceptGraph) -> Vec<Cycle> {
    let node_count = graph.node_count();
    let mut successors: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];
    for (child, parent) in graph.hierarchical_edges() {
        successors[child].push(parent);
    }
    for list in &mut successors {
        list.sort_unstable();
        list.dedup();
    }

    let mut state = vec![Visit::New; node_count];
    let mut path: Vec<NodeId> = Vec::new();
    let mut seen: HashSet<Cycle> = HashSet::new();
    let mut cycles = Vec::new();

    for root in 0..node_count {
        if state[root] != Visit::New {
            continue;
        }

        // (node, index of the next successor to visit)
        let mut frames: Vec<(NodeId, usize)> = vec![(root, 0)];
        state[root] = Visit::OnStack(0);
        path.push(root);

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;

            let Some(&succ) = successors[node].get(next) else {
                frames.pop();
                path.pop();
                state[node] = Visit::Done;
                continue;
            };
            frame.1 += 1;

            match state[succ] {
                Visit::New => {
                    state[succ] = Visit::OnStack(path.len());
                    path.push(succ);
                    frames.push((succ, 0));
                }
                Visit::OnStack(start) => {
                    let members = path[start..]
                        .iter()
                        .map(|&id| graph.name(id).to_string())
                        .collect();
                    let cycle = Cycle::new(members);
                    if seen.insert(cycle.clone()) {
                        cycles.push(cycle);
                    }
                }
                Visit::Done => {}
            }
        }
    }

    cycles.sort();
    cycles
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
    fn test_three_node_cycle() {
        let g = graph(&[
            ("A", vocab::BROADER, "B"),
            ("B", vocab::BROADER, "C"),
            ("C", vocab::BROADER, "A"),
        ]);
        let cycles = find_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].members, vec!["A", "B", "C"]);
        assert_eq!(cycles[0].to_string(), "A -> B -> C -> A");
    }

    #[test]
    fn test_acyclic_graph() {
        let g = graph(&[
            ("A", vocab::BROADER, "B"),
            ("A", vocab::BROADER, "C"),
            ("B", vocab::BROADER, "D"),
            ("C", vocab::BROADER, "D"),
        ]);
        assert!(find_cycles(&g).is_empty());
    }

    #[test]
    fn test_canonical_start_is_smallest_member() {
        let g = graph(&[
            ("Z", vocab::BROADER, "M"),
            ("M", vocab::BROADER, "B"),
            ("B", vocab::BROADER, "Z"),
        ]);
        assert_eq!(find_cycles(&g)[0].members, vec!["B", "Z", "M"]);
    }

    #[test]
    fn test_broader_narrower_pair_is_not_a_cycle() {
        // a broader b, b narrower a describe the same hierarchy link
        let g = graph(&[("a", vocab::BROADER, "b"), ("b", vocab::NARROWER, "a")]);
        assert!(find_cycles(&g).is_empty());
    }

    #[test]
    fn test_mixed_direction_cycle() {
        // a broader b and a narrower b contradict each other
        let g = graph(&[("a", vocab::BROADER, "b"), ("a", vocab::NARROWER, "b")]);
        let cycles = find_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].members, vec!["a", "b"]);
    }

    #[test]
    fn test_self_loop_is_one_node_cycle() {
        let g = graph(&[("a", vocab::BROADER, "a")]);
        let cycles = find_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 1);
    }

    #[test]
    fn test_associative_edges_ignored() {
        let g = graph(&[("a", vocab::RELATED, "b"), ("b", vocab::RELATED, "a")]);
        assert!(find_cycles(&g).is_empty());
    }

    #[test]
    fn test_two_disjoint_cycles() {
        let g = graph(&[
            ("a", vocab::BROADER, "b"),
            ("b", vocab::BROADER, "a"),
            ("x", vocab::BROADER_TRANSITIVE, "y"),
            ("y", vocab::BROADER_TRANSITIVE, "x"),
            ("b", vocab::BROADER, "x"),
        ]);
        let cycles = find_cycles(&g);
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].members, vec!["a", "b"]);
        assert_eq!(cycles[1].members, vec!["x", "y"]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let names: Vec<String> = (0..50_000).map(|i| format!("n{:06}", i)).collect();
        let rows: Vec<Triple> = names
            .windows(2)
            .map(|w| Triple::new(Term::iri(w[0].clone()), vocab::BROADER, Term::iri(w[1].clone())))
            .collect();
        let g = ConceptGraph::from_triples(&rows);
        assert!(find_cycles(&g).is_empty());
    }
}
