//! Concept enumeration and resource classification.

use super::endpoints;
use crate::engine::{Issue, IssueContext};
use crate::error::ComputeError;
use crate::models::{Category, IssueMeta};
use crate::result::Outcome;
use crate::store::{Term, TriplePattern};
use crate::vocab;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tracing::info;

/// `c`: every concept of the vocabulary.
pub struct AllConcepts;

const ALL_CONCEPTS: IssueMeta = IssueMeta {
    code: "c",
    name: "All Concepts",
    description: "Finds all SKOS concepts involved in the vocabulary",
    category: Category::Statistical,
    weblink: None,
};

#[async_trait]
impl Issue for AllConcepts {
    fn meta(&self) -> &IssueMeta {
        &ALL_CONCEPTS
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let store = ctx.store();
        let mut concepts: BTreeSet<String> = store
            .instances_of(vocab::CONCEPT)?
            .into_iter()
            .filter(|id| !id.starts_with("_:"))
            .collect();

        for row in store.query_predicates(vocab::SEMANTIC_RELATIONS)? {
            concepts.extend(row.subject.as_iri().map(str::to_string));
            concepts.extend(row.object.as_iri().map(str::to_string));
        }

        Ok(Outcome::Collection(concepts.into_iter().collect()))
    }
}

/// `ac`: concepts within the authoritative namespace.
pub struct AuthoritativeConcepts {
    base_uri: Option<String>,
}

const AUTHORITATIVE_CONCEPTS: IssueMeta = IssueMeta {
    code: "ac",
    name: "Authoritative Concepts",
    description: "Finds all concepts defined within the authoritative namespace",
    category: Category::Statistical,
    weblink: None,
};

impl AuthoritativeConcepts {
    pub fn new(base_uri: Option<String>) -> Self {
        Self { base_uri }
    }
}

/// Most frequent namespace among `concepts`; ties go to the smallest.
pub fn infer_base_uri(concepts: &[String]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for concept in concepts {
        *counts.entry(vocab::namespace_of(concept)).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(namespace, _)| namespace.to_string())
}

#[async_trait]
impl Issue for AuthoritativeConcepts {
    fn meta(&self) -> &IssueMeta {
        &AUTHORITATIVE_CONCEPTS
    }

    fn dependencies(&self) -> &[&'static str] {
        &["c"]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let concepts = ctx.collection("c")?;

        let base = match &self.base_uri {
            Some(base) => base.clone(),
            None => match infer_base_uri(concepts) {
                Some(base) => {
                    info!("No base URI configured, using {}", base);
                    base
                }
                None => return Ok(Outcome::Collection(Vec::new())),
            },
        };

        Ok(Outcome::Collection(
            concepts
                .iter()
                .filter(|c| c.starts_with(&base))
                .cloned()
                .collect(),
        ))
    }
}

/// `cs`: concept schemes, declared or referenced.
pub struct ConceptSchemes;

const CONCEPT_SCHEMES: IssueMeta = IssueMeta {
    code: "cs",
    name: "Concept Schemes",
    description: "Finds the involved concept schemes",
    category: Category::Statistical,
    weblink: None,
};

#[async_trait]
impl Issue for ConceptSchemes {
    fn meta(&self) -> &IssueMeta {
        &CONCEPT_SCHEMES
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let store = ctx.store();
        let mut schemes: BTreeSet<String> =
            store.instances_of(vocab::CONCEPT_SCHEME)?.into_iter().collect();

        for row in store.query_predicates(&[vocab::IN_SCHEME, vocab::TOP_CONCEPT_OF])? {
            schemes.extend(row.object.resource_id());
        }
        for row in store.query_predicates(&[vocab::HAS_TOP_CONCEPT])? {
            schemes.extend(row.subject.resource_id());
        }

        Ok(Outcome::Collection(schemes.into_iter().collect()))
    }
}

/// `huri`: http(s) IRIs used as resources.
pub struct HttpUris;

const HTTP_URIS: IssueMeta = IssueMeta {
    code: "huri",
    name: "HTTP URIs",
    description: "Collects all HTTP URIs used as subject or object",
    category: Category::Statistical,
    weblink: None,
};

#[async_trait]
impl Issue for HttpUris {
    fn meta(&self) -> &IssueMeta {
        &HTTP_URIS
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let rows = ctx.store().query(&TriplePattern::any())?;
        let uris = endpoints(&rows)
            .into_iter()
            .filter(|id| vocab::is_http(id))
            .collect();
        Ok(Outcome::Collection(uris))
    }
}

/// `nhr`: IRIs using a scheme other than http(s).
pub struct NonHttpResources;

const NON_HTTP_RESOURCES: IssueMeta = IssueMeta {
    code: "nhr",
    name: "Non-HTTP Resources",
    description: "Finds resources not identified by an HTTP URI",
    category: Category::Analytical,
    weblink: Some(quality_issue!("non-http-resources")),
};

#[async_trait]
impl Issue for NonHttpResources {
    fn meta(&self) -> &IssueMeta {
        &NON_HTTP_RESOURCES
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let rows = ctx.store().query(&TriplePattern::any())?;
        let iris: BTreeSet<String> = rows
            .iter()
            .flat_map(|t| [&t.subject, &t.object])
            .filter_map(Term::as_iri)
            .filter(|iri| !vocab::is_http(iri))
            .map(str::to_string)
            .collect();
        Ok(Outcome::Collection(iris.into_iter().collect()))
    }
}

/// `oc`: concepts without any semantic relation.
pub struct OrphanConcepts;

const ORPHAN_CONCEPTS: IssueMeta = IssueMeta {
    code: "oc",
    name: "Orphan Concepts",
    description: "Finds concepts that are not connected to any other concept",
    category: Category::Analytical,
    weblink: Some(quality_issue!("orphan-concepts")),
};

#[async_trait]
impl Issue for OrphanConcepts {
    fn meta(&self) -> &IssueMeta {
        &ORPHAN_CONCEPTS
    }

    fn dependencies(&self) -> &[&'static str] {
        &["c"]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let related = endpoints(&ctx.store().query_predicates(vocab::SEMANTIC_RELATIONS)?);
        let orphans = ctx
            .collection("c")?
            .iter()
            .filter(|c| !related.contains(*c))
            .cloned()
            .collect();
        Ok(Outcome::Collection(orphans))
    }
}
