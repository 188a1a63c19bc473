//! Dependency-aware, memoized evaluation of quality issues.
//!
//! The engine resolves requested issues depth-first. Every issue is computed
//! at most once per engine: outcomes and failures are cached by issue code and
//! survive across [`Engine::run`] calls against the same dataset snapshot.

pub mod issue;
pub mod progress;

pub use issue::{Issue, IssueCatalog, IssueContext};
pub use progress::{BarProgress, NoProgress, ProgressEvent, ProgressMonitor};

use crate::error::{ComputeError, ConfigError, EvalError};
use crate::links::LinkChecker;
use crate::models::{Category, IssueMeta, IssueStatus, RunMode};
use crate::result::Outcome;
use crate::store::DataStore;
use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

enum Slot {
    InProgress,
    Done(Arc<Outcome>),
    Failed(EvalError),
}

/// Outcome of one requested issue.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub meta: IssueMeta,
    pub result: Result<Arc<Outcome>, EvalError>,
}

impl Evaluation {
    /// Analytical issues whose outcome is problematic. Statistics never are.
    pub fn is_problematic(&self) -> bool {
        self.meta.category == Category::Analytical
            && matches!(&self.result, Ok(outcome) if outcome.is_problematic())
    }

    /// Report status: failed, informational, problematic or ok.
    pub fn status(&self) -> IssueStatus {
        match &self.result {
            Err(e) => IssueStatus::Error {
                message: e.to_string(),
            },
            Ok(outcome) if self.meta.category == Category::Statistical => IssueStatus::Info {
                occurrences: outcome.occurrence_count().ok(),
            },
            Ok(outcome) if outcome.is_problematic() => IssueStatus::Fail {
                occurrences: outcome.occurrence_count().ok(),
            },
            Ok(_) => IssueStatus::Ok,
        }
    }
}

/// Evaluations of one [`Engine::run`], in request order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub evaluations: Vec<Evaluation>,
}

impl RunReport {
    pub fn has_problems(&self) -> bool {
        self.evaluations.iter().any(Evaluation::is_problematic)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Evaluation> {
        self.evaluations.iter().filter(|e| e.result.is_err())
    }

    pub fn get(&self, code: &str) -> Option<&Evaluation> {
        self.evaluations.iter().find(|e| e.meta.code == code)
    }
}

/// Evaluates issues from a validated catalog against one data store.
pub struct Engine {
    catalog: IssueCatalog,
    store: Arc<dyn DataStore>,
    links: Option<Arc<LinkChecker>>,
    mode: RunMode,
    monitor: Box<dyn ProgressMonitor>,
    memo: HashMap<&'static str, Slot>,
    resolving: Vec<&'static str>,
    position: usize,
    total: usize,
}

impl Engine {
    /// Validate `catalog` and create an engine over `store`.
    ///
    /// Dependency cycles and unknown dependencies are rejected here, before
    /// anything is computed.
    pub fn new(catalog: IssueCatalog, store: Arc<dyn DataStore>) -> Result<Self, ConfigError> {
        catalog.validate()?;
        Ok(Self::assemble(catalog, store))
    }

    fn assemble(catalog: IssueCatalog, store: Arc<dyn DataStore>) -> Self {
        Self {
            catalog,
            store,
            links: None,
            mode: RunMode::default(),
            monitor: Box::new(NoProgress),
            memo: HashMap::new(),
            resolving: Vec::new(),
            position: 0,
            total: 0,
        }
    }

    pub fn with_links(mut self, links: Arc<LinkChecker>) -> Self {
        self.links = Some(links);
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_monitor(mut self, monitor: impl ProgressMonitor + 'static) -> Self {
        self.monitor = Box::new(monitor);
        self
    }

    pub fn catalog(&self) -> &IssueCatalog {
        &self.catalog
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Cached outcome of `code`, if it has been computed successfully.
    pub fn result(&self, code: &str) -> Option<Arc<Outcome>> {
        match self.memo.get(code) {
            Some(Slot::Done(outcome)) => Some(Arc::clone(outcome)),
            _ => None,
        }
    }

    /// Whether `code` has a cached outcome or failure.
    pub fn is_settled(&self, code: &str) -> bool {
        matches!(self.memo.get(code), Some(Slot::Done(_) | Slot::Failed(_)))
    }

    /// Evaluate `requested` (all catalog issues when empty).
    ///
    /// Configuration faults always abort the run. Other failures abort it in
    /// [`RunMode::FailFast`] and are reported per issue otherwise.
    pub async fn run(&mut self, requested: &[&str]) -> Result<RunReport, EvalError> {
        let codes: Vec<&'static str> = if requested.is_empty() {
            self.catalog.codes()
        } else {
            let mut seen = HashSet::new();
            let mut codes = Vec::new();
            for code in requested {
                let code = self.catalog.code_of(code)?;
                if seen.insert(code) {
                    codes.push(code);
                }
            }
            codes
        };

        let order = self.catalog.resolution_order(&codes)?;
        self.total = order.iter().filter(|code| !self.is_settled(code)).count();
        self.position = 0;
        info!(
            "Evaluating {} issues ({} to compute, {})",
            codes.len(),
            self.total,
            self.mode
        );

        let mut evaluations = Vec::with_capacity(codes.len());
        for code in codes {
            let Some(meta) = self.catalog.get(code).map(|issue| *issue.meta()) else {
                continue;
            };
            let result = self.evaluate(code).await;

            if let Err(e) = &result {
                if e.is_config() {
                    return Err(e.clone());
                }
                if self.mode == RunMode::FailFast {
                    return Err(self.root_cause(e.clone()));
                }
                warn!("{}", e);
            }

            evaluations.push(Evaluation { meta, result });
        }

        info!("Evaluation finished");
        Ok(RunReport { evaluations })
    }

    fn evaluate(&mut self, code: &'static str) -> BoxFuture<'_, Result<Arc<Outcome>, EvalError>> {
        Box::pin(async move {
            match self.memo.get(code) {
                Some(Slot::Done(outcome)) => {
                    debug!("Using cached result of '{}'", code);
                    return Ok(Arc::clone(outcome));
                }
                Some(Slot::Failed(e)) => return Err(e.clone()),
                Some(Slot::InProgress) => {
                    let from = self.resolving.iter().position(|c| *c == code).unwrap_or(0);
                    let mut chain: Vec<String> =
                        self.resolving[from..].iter().map(|c| c.to_string()).collect();
                    chain.push(code.to_string());
                    return Err(ConfigError::DependencyCycle(chain).into());
                }
                None => {}
            }

            let issue = match self.catalog.get(code) {
                Some(issue) => Arc::clone(issue),
                None => return Err(ConfigError::UnknownIssue(code.to_string()).into()),
            };

            debug!("Resolving '{}'", code);
            self.memo.insert(code, Slot::InProgress);
            self.resolving.push(code);

            let mut resolved = HashMap::new();
            let mut early: Option<EvalError> = None;
            for &dep in issue.dependencies() {
                match self.evaluate(dep).await {
                    Ok(outcome) => {
                        resolved.insert(dep, outcome);
                    }
                    Err(e) if e.is_config() => {
                        early = Some(e);
                        break;
                    }
                    Err(_) => {
                        early = Some(EvalError::DependencyFailed {
                            issue: code.to_string(),
                            dependency: dep.to_string(),
                        });
                        break;
                    }
                }
            }

            let result = match early {
                Some(e) => Err(e),
                None => self.compute(issue.as_ref(), resolved).await,
            };
            self.resolving.pop();

            match &result {
                Ok(outcome) => {
                    self.memo.insert(code, Slot::Done(Arc::clone(outcome)));
                }
                Err(e) if e.is_config() => {
                    self.memo.remove(code);
                    return result;
                }
                Err(e) => {
                    self.memo.insert(code, Slot::Failed(e.clone()));
                }
            }

            self.position += 1;
            let meta = issue.meta();
            self.monitor.finished(&ProgressEvent {
                code,
                name: meta.name,
                index: self.position,
                total: self.total.max(self.position),
                failed: result.is_err(),
            });
            result
        })
    }

    async fn compute(
        &self,
        issue: &dyn Issue,
        resolved: HashMap<&'static str, Arc<Outcome>>,
    ) -> Result<Arc<Outcome>, EvalError> {
        let meta = issue.meta();
        self.monitor.started(meta, self.total);

        let ctx = IssueContext::new(self.store.as_ref(), self.links.as_deref(), resolved);
        match issue.compute(&ctx).await {
            Ok(outcome) => {
                debug!("Computed '{}'", meta.code);
                Ok(Arc::new(outcome))
            }
            Err(ComputeError::Config(e)) => Err(e.into()),
            Err(source) => {
                warn!("Issue '{}' failed: {}", meta.code, source);
                Err(EvalError::Issue {
                    issue: meta.code.to_string(),
                    source,
                })
            }
        }
    }

    /// Follow `DependencyFailed` links to the failure that started the chain.
    fn root_cause(&self, mut err: EvalError) -> EvalError {
        while let EvalError::DependencyFailed { dependency, .. } = &err {
            match self.memo.get(dependency.as_str()) {
                Some(Slot::Failed(inner)) => err = inner.clone(),
                _ => break,
            }
        }
        err
    }
}
