//! Plain statistics.

use crate::engine::{Issue, IssueContext};
use crate::error::ComputeError;
use crate::models::{Category, IssueMeta};
use crate::result::Outcome;
use crate::vocab;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};

/// `cc`: number of distinct collections.
pub struct CollectionCount;

const COLLECTION_COUNT: IssueMeta = IssueMeta {
    code: "cc",
    name: "Collection Count",
    description: "Counts the involved collections",
    category: Category::Statistical,
    weblink: None,
};

#[async_trait]
impl Issue for CollectionCount {
    fn meta(&self) -> &IssueMeta {
        &COLLECTION_COUNT
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let store = ctx.store();
        let mut collections = BTreeSet::new();
        collections.extend(store.instances_of(vocab::COLLECTION)?);
        collections.extend(store.instances_of(vocab::ORDERED_COLLECTION)?);
        collections.extend(super::subjects_of(store, &[vocab::MEMBER, vocab::MEMBER_LIST])?);
        Ok(Outcome::Count(collections.len() as u64))
    }
}

/// `sr`: number of semantic relation statements.
pub struct SemanticRelationCount;

const SEMANTIC_RELATION_COUNT: IssueMeta = IssueMeta {
    code: "sr",
    name: "Semantic Relations Count",
    description: "Counts the statements relating concepts to each other",
    category: Category::Statistical,
    weblink: None,
};

#[async_trait]
impl Issue for SemanticRelationCount {
    fn meta(&self) -> &IssueMeta {
        &SEMANTIC_RELATION_COUNT
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let rows = ctx.store().query_predicates(vocab::SEMANTIC_RELATIONS)?;
        Ok(Outcome::Count(rows.len() as u64))
    }
}

/// `ar`: number of aggregation statements (schemes and collections).
pub struct AggregationRelationCount;

const AGGREGATION_RELATION_COUNT: IssueMeta = IssueMeta {
    code: "ar",
    name: "Aggregation Relations Count",
    description: "Counts the statements relating resources to schemes or collections",
    category: Category::Statistical,
    weblink: None,
};

#[async_trait]
impl Issue for AggregationRelationCount {
    fn meta(&self) -> &IssueMeta {
        &AGGREGATION_RELATION_COUNT
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let rows = ctx.store().query_predicates(vocab::AGGREGATION_RELATIONS)?;
        Ok(Outcome::Count(rows.len() as u64))
    }
}

/// `lr`: number of label statements on involved concepts.
pub struct LexicalRelationCount;

const LEXICAL_RELATION_COUNT: IssueMeta = IssueMeta {
    code: "lr",
    name: "Lexical Relations Count",
    description: "Counts the lexical labels (preferred, alternative and hidden) attached to involved concepts",
    category: Category::Statistical,
    weblink: None,
};

#[async_trait]
impl Issue for LexicalRelationCount {
    fn meta(&self) -> &IssueMeta {
        &LEXICAL_RELATION_COUNT
    }

    fn dependencies(&self) -> &[&'static str] {
        &["c"]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let concepts: HashSet<&str> = ctx.collection("c")?.iter().map(String::as_str).collect();
        let labels = ctx
            .store()
            .query_predicates(vocab::LABEL_PROPERTIES)?
            .into_iter()
            .filter(|t| t.object.is_literal())
            .filter(|t| t.subject.as_iri().is_some_and(|s| concepts.contains(s)))
            .count();
        Ok(Outcome::Count(labels as u64))
    }
}
