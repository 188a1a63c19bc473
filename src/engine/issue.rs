//! The issue abstraction and the catalog that wires issues into a DAG.

use crate::error::{ComputeError, ConfigError};
use crate::graph::ConceptGraph;
use crate::links::LinkChecker;
use crate::models::IssueMeta;
use crate::result::Outcome;
use crate::store::DataStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// One quality check.
///
/// Implementations are stateless with respect to results: the engine owns
/// the cache and only calls [`Issue::compute`] once all dependencies have
/// produced their outcome.
#[async_trait]
pub trait Issue: Send + Sync {
    fn meta(&self) -> &IssueMeta;

    /// Codes of the issues whose outcomes this one consumes, in evaluation order.
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError>;
}

/// Read-only view handed to a compute step.
pub struct IssueContext<'a> {
    store: &'a dyn DataStore,
    links: Option<&'a LinkChecker>,
    resolved: HashMap<&'static str, Arc<Outcome>>,
}

impl<'a> IssueContext<'a> {
    pub fn new(
        store: &'a dyn DataStore,
        links: Option<&'a LinkChecker>,
        resolved: HashMap<&'static str, Arc<Outcome>>,
    ) -> Self {
        Self {
            store,
            links,
            resolved,
        }
    }

    pub fn store(&self) -> &dyn DataStore {
        self.store
    }

    /// The run's link checker.
    pub fn links(&self) -> Result<&LinkChecker, ComputeError> {
        self.links.ok_or(ComputeError::NoLinkChecker)
    }

    pub fn dependency(&self, code: &'static str) -> Result<&Outcome, ComputeError> {
        self.resolved
            .get(code)
            .map(Arc::as_ref)
            .ok_or(ComputeError::MissingDependency(code))
    }

    /// Outcome of `code`, which must be a collection.
    pub fn collection(&self, code: &'static str) -> Result<&[String], ComputeError> {
        match self.dependency(code)? {
            Outcome::Collection(items) => Ok(items),
            _ => Err(ComputeError::DependencyShape {
                dependency: code,
                expected: "a collection",
            }),
        }
    }

    /// Outcome of `code`, which must be a concept graph.
    pub fn graph(&self, code: &'static str) -> Result<&ConceptGraph, ComputeError> {
        match self.dependency(code)? {
            Outcome::Graph(graph) => Ok(graph),
            _ => Err(ComputeError::DependencyShape {
                dependency: code,
                expected: "a graph",
            }),
        }
    }
}

/// The set of issues available to a run, keyed by code.
#[derive(Default, Clone)]
pub struct IssueCatalog {
    issues: Vec<Arc<dyn Issue>>,
    index: HashMap<&'static str, usize>,
}

impl IssueCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue; its code must not be taken yet.
    pub fn register(&mut self, issue: Arc<dyn Issue>) -> Result<(), ConfigError> {
        let code = issue.meta().code;
        if self.index.contains_key(code) {
            return Err(ConfigError::DuplicateIssue(code.to_string()));
        }
        self.index.insert(code, self.issues.len());
        self.issues.push(issue);
        Ok(())
    }

    pub fn get(&self, code: &str) -> Option<&Arc<dyn Issue>> {
        self.index.get(code).map(|&i| &self.issues[i])
    }

    /// Resolve a user-supplied code to the catalog's static code.
    pub fn code_of(&self, code: &str) -> Result<&'static str, ConfigError> {
        self.get(code)
            .map(|issue| issue.meta().code)
            .ok_or_else(|| ConfigError::UnknownIssue(code.to_string()))
    }

    /// Codes in registration order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.issues.iter().map(|i| i.meta().code).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Issue>> {
        self.issues.iter()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Check that every dependency exists and the dependency relation is acyclic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for issue in &self.issues {
            for dep in issue.dependencies() {
                if !self.index.contains_key(dep) {
                    return Err(ConfigError::UnknownDependency {
                        issue: issue.meta().code.to_string(),
                        dependency: dep.to_string(),
                    });
                }
            }
        }

        let mut marks = vec![Mark::Unvisited; self.issues.len()];
        let mut chain = Vec::new();
        for start in 0..self.issues.len() {
            self.visit(start, &mut marks, &mut chain, &mut |_| {})?;
        }
        Ok(())
    }

    /// Dependency closure of `requested`, dependencies before dependents.
    pub fn resolution_order(&self, requested: &[&'static str]) -> Result<Vec<&'static str>, ConfigError> {
        let mut marks = vec![Mark::Unvisited; self.issues.len()];
        let mut chain = Vec::new();
        let mut order = Vec::new();
        for code in requested {
            let start = *self
                .index
                .get(code)
                .ok_or_else(|| ConfigError::UnknownIssue(code.to_string()))?;
            self.visit(start, &mut marks, &mut chain, &mut |code| order.push(code))?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        at: usize,
        marks: &mut [Mark],
        chain: &mut Vec<&'static str>,
        emit: &mut dyn FnMut(&'static str),
    ) -> Result<(), ConfigError> {
        let code = self.issues[at].meta().code;
        match marks[at] {
            Mark::Done => return Ok(()),
            Mark::Active => {
                let from = chain.iter().position(|c| *c == code).unwrap_or(0);
                let mut cycle: Vec<String> = chain[from..].iter().map(|c| c.to_string()).collect();
                cycle.push(code.to_string());
                return Err(ConfigError::DependencyCycle(cycle));
            }
            Mark::Unvisited => {}
        }

        marks[at] = Mark::Active;
        chain.push(code);
        for dep in self.issues[at].dependencies() {
            let next = *self.index.get(dep).ok_or_else(|| ConfigError::UnknownDependency {
                issue: code.to_string(),
                dependency: dep.to_string(),
            })?;
            self.visit(next, marks, chain, emit)?;
        }
        chain.pop();
        marks[at] = Mark::Done;
        emit(code);
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Active,
    Done,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Category;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts its compute calls and returns a fixed outcome.
    pub(crate) struct Probe {
        pub meta: IssueMeta,
        pub deps: Vec<&'static str>,
        pub outcome: Result<Outcome, ComputeError>,
        pub calls: AtomicUsize,
    }

    impl Probe {
        pub(crate) fn new(code: &'static str, deps: &[&'static str]) -> Self {
            Self {
                meta: IssueMeta {
                    code,
                    name: code,
                    description: "test issue",
                    category: Category::Analytical,
                    weblink: None,
                },
                deps: deps.to_vec(),
                outcome: Ok(Outcome::Count(1)),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing(mut self, error: ComputeError) -> Self {
            self.outcome = Err(error);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Issue for Probe {
        fn meta(&self) -> &IssueMeta {
            &self.meta
        }

        fn dependencies(&self) -> &[&'static str] {
            &self.deps
        }

        async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for &dep in &self.deps {
                ctx.dependency(dep)?;
            }
            self.outcome.clone()
        }
    }

    fn catalog(specs: &[(&'static str, &[&'static str])]) -> IssueCatalog {
        let mut catalog = IssueCatalog::new();
        for (code, deps) in specs {
            catalog.register(Arc::new(Probe::new(code, deps))).unwrap();
        }
        catalog
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut catalog = catalog(&[("a", &[])]);
        let err = catalog.register(Arc::new(Probe::new("a", &[]))).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateIssue("a".to_string()));
    }

    #[test]
    fn test_self_dependency_rejected() {
        let catalog = catalog(&[("a", &["a"])]);
        assert_eq!(
            catalog.validate(),
            Err(ConfigError::DependencyCycle(vec!["a".into(), "a".into()]))
        );
    }

    #[test]
    fn test_transitive_cycle_rejected() {
        let catalog = catalog(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"]), ("d", &[])]);
        match catalog.validate() {
            Err(ConfigError::DependencyCycle(chain)) => {
                assert_eq!(chain, vec!["a", "b", "c", "a"]);
            }
            other => panic!("expected a dependency cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let catalog = catalog(&[("a", &["ghost"])]);
        assert_eq!(
            catalog.validate(),
            Err(ConfigError::UnknownDependency {
                issue: "a".into(),
                dependency: "ghost".into()
            })
        );
    }

    #[test]
    fn test_resolution_order_puts_dependencies_first() {
        let catalog = catalog(&[("c", &[]), ("ac", &["c"]), ("ud", &["ac"]), ("mol", &["ac"]), ("cs", &[])]);
        let order = catalog.resolution_order(&["ud", "mol"]).unwrap();
        assert_eq!(order, vec!["c", "ac", "ud", "mol"]);

        assert_eq!(
            catalog.resolution_order(&["nope"]),
            Err(ConfigError::UnknownIssue("nope".into()))
        );
    }
}
