//! Issues about how concepts relate to schemes and other vocabularies.

use crate::engine::{Issue, IssueContext};
use crate::error::ComputeError;
use crate::models::{Category, IssueMeta};
use crate::result::Outcome;
use crate::vocab;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};

/// `mol`: authoritative concepts without links into other vocabularies.
pub struct MissingOutLinks;

const MISSING_OUT_LINKS: IssueMeta = IssueMeta {
    code: "mol",
    name: "Missing Out-Links",
    description: "Finds authoritative concepts that are not linked to concepts outside the vocabulary",
    category: Category::Analytical,
    weblink: Some(quality_issue!("missing-out-links")),
};

#[async_trait]
impl Issue for MissingOutLinks {
    fn meta(&self) -> &IssueMeta {
        &MISSING_OUT_LINKS
    }

    fn dependencies(&self) -> &[&'static str] {
        &["ac"]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let authoritative = ctx.collection("ac")?;
        let inside: HashSet<&str> = authoritative.iter().map(String::as_str).collect();

        let mut linked: HashSet<String> = HashSet::new();
        for row in ctx.store().query_predicates(vocab::SEMANTIC_RELATIONS)? {
            let (Some(subject), Some(object)) = (row.subject.as_iri(), row.object.as_iri()) else {
                continue;
            };
            if inside.contains(subject) && !inside.contains(object) {
                linked.insert(subject.to_string());
            }
        }

        Ok(Outcome::Collection(
            authoritative
                .iter()
                .filter(|c| !linked.contains(*c))
                .cloned()
                .collect(),
        ))
    }
}

/// `otc`: concept schemes that name no top concept.
pub struct OmittedTopConcepts;

const OMITTED_TOP_CONCEPTS: IssueMeta = IssueMeta {
    code: "otc",
    name: "Omitted Top Concepts",
    description: "Finds concept schemes without top concepts",
    category: Category::Analytical,
    weblink: Some(quality_issue!("omitted-top-concepts")),
};

#[async_trait]
impl Issue for OmittedTopConcepts {
    fn meta(&self) -> &IssueMeta {
        &OMITTED_TOP_CONCEPTS
    }

    fn dependencies(&self) -> &[&'static str] {
        &["cs"]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let store = ctx.store();
        let mut with_top: BTreeSet<String> = super::subjects_of(store, &[vocab::HAS_TOP_CONCEPT])?;
        with_top.extend(
            store
                .query_predicates(&[vocab::TOP_CONCEPT_OF])?
                .iter()
                .filter_map(|t| t.object.resource_id()),
        );

        Ok(Outcome::Collection(
            ctx.collection("cs")?
                .iter()
                .filter(|s| !with_top.contains(*s))
                .cloned()
                .collect(),
        ))
    }
}

/// `mri`: mapping relations between concepts of the same vocabulary.
pub struct MappingRelationsMisuse;

const MAPPING_RELATIONS_MISUSE: IssueMeta = IssueMeta {
    code: "mri",
    name: "Mapping Relations Misuse",
    description: "Finds concepts within the same concept scheme that are related by a mapping relation",
    category: Category::Analytical,
    weblink: Some(quality_issue!("mapping-relations-misuse")),
};

#[async_trait]
impl Issue for MappingRelationsMisuse {
    fn meta(&self) -> &IssueMeta {
        &MAPPING_RELATIONS_MISUSE
    }

    fn dependencies(&self) -> &[&'static str] {
        &["ac"]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let store = ctx.store();
        let authoritative: HashSet<&str> = ctx.collection("ac")?.iter().map(String::as_str).collect();

        let mut schemes: HashMap<String, BTreeSet<String>> = HashMap::new();
        for row in store.query_predicates(&[vocab::IN_SCHEME])? {
            if let (Some(concept), Some(scheme)) = (row.subject.resource_id(), row.object.resource_id()) {
                schemes.entry(concept).or_default().insert(scheme);
            }
        }
        let no_schemes = BTreeSet::new();

        let mut misused = BTreeSet::new();
        for row in store.query_predicates(vocab::MAPPING_RELATIONS)? {
            let (Some(subject), Some(object)) = (row.subject.as_iri(), row.object.as_iri()) else {
                continue;
            };
            if !authoritative.contains(subject) || !authoritative.contains(object) {
                continue;
            }

            let left = schemes.get(subject).unwrap_or(&no_schemes);
            let right = schemes.get(object).unwrap_or(&no_schemes);
            if left.is_empty() || right.is_empty() || !left.is_disjoint(right) {
                misused.insert(row.to_string());
            }
        }

        Ok(Outcome::Collection(misused.into_iter().collect()))
    }
}
