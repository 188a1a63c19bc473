//! Documentation and language issues.

use crate::engine::{Issue, IssueContext};
use crate::error::ComputeError;
use crate::models::{Category, IssueMeta};
use crate::result::Outcome;
use crate::store::{Term, Triple, TriplePattern};
use crate::vocab;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// `ud`: authoritative concepts without any documentation property.
pub struct UndocumentedConcepts;

const UNDOCUMENTED_CONCEPTS: IssueMeta = IssueMeta {
    code: "ud",
    name: "Undocumented Concepts",
    description: "Finds concepts that don't use any SKOS documentation properties",
    category: Category::Analytical,
    weblink: Some(quality_issue!("undocumented-concepts")),
};

#[async_trait]
impl Issue for UndocumentedConcepts {
    fn meta(&self) -> &IssueMeta {
        &UNDOCUMENTED_CONCEPTS
    }

    fn dependencies(&self) -> &[&'static str] {
        &["ac"]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let documented = super::subjects_of(ctx.store(), vocab::DOCUMENTATION_PROPERTIES)?;
        Ok(Outcome::Collection(
            ctx.collection("ac")?
                .iter()
                .filter(|c| !documented.contains(*c))
                .cloned()
                .collect(),
        ))
    }
}

/// Whether `tag` has the shape of a BCP 47 language tag.
pub fn is_valid_language_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary_ok = parts
        .next()
        .is_some_and(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()));
    primary_ok && parts.all(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn text_literals(rows: Vec<Triple>) -> impl Iterator<Item = Triple> {
    rows.into_iter()
        .filter(|t| vocab::is_text_property(&t.predicate) && t.object.is_literal())
}

fn text_predicates() -> Vec<&'static str> {
    vocab::LABEL_PROPERTIES
        .iter()
        .chain(vocab::DOCUMENTATION_PROPERTIES)
        .copied()
        .collect()
}

/// `oilt`: literals without a usable language tag, on any predicate but
/// `skos:notation`. Datatyped literals are exempt.
pub struct LanguageTags;

const LANGUAGE_TAGS: IssueMeta = IssueMeta {
    code: "oilt",
    name: "Omitted or Invalid Language Tags",
    description: "Finds text literals that lack a language tag or carry a malformed one",
    category: Category::Analytical,
    weblink: Some(quality_issue!("omitted-or-invalid-language-tags")),
};

#[async_trait]
impl Issue for LanguageTags {
    fn meta(&self) -> &IssueMeta {
        &LANGUAGE_TAGS
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let rows = ctx.store().query(&TriplePattern::any())?;

        let mut offending: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        // notations are codes, not natural-language text
        for row in rows
            .into_iter()
            .filter(|t| t.predicate != vocab::NOTATION && t.object.is_literal())
        {
            let bad = match &row.object {
                Term::Literal {
                    lang: None,
                    datatype: None,
                    ..
                } => true,
                Term::Literal {
                    lang: Some(tag), ..
                } => !is_valid_language_tag(tag),
                _ => false,
            };
            if let (true, Some(subject)) = (bad, row.subject.resource_id()) {
                offending
                    .entry(subject)
                    .or_default()
                    .insert(row.object.to_string());
            }
        }

        Ok(Outcome::Mapping(
            offending
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().collect()))
                .collect(),
        ))
    }
}

/// `ilc`: concepts missing some of the vocabulary's languages.
pub struct LanguageCoverage;

const LANGUAGE_COVERAGE: IssueMeta = IssueMeta {
    code: "ilc",
    name: "Incomplete Language Coverage",
    description: "Finds concepts lacking labels or documentation in languages used elsewhere in the vocabulary",
    category: Category::Analytical,
    weblink: Some(quality_issue!("incomplete-language-coverage")),
};

#[async_trait]
impl Issue for LanguageCoverage {
    fn meta(&self) -> &IssueMeta {
        &LANGUAGE_COVERAGE
    }

    fn dependencies(&self) -> &[&'static str] {
        &["c"]
    }

    async fn compute(&self, ctx: &IssueContext<'_>) -> Result<Outcome, ComputeError> {
        let concepts = ctx.collection("c")?;
        let wanted: HashSet<&str> = concepts.iter().map(String::as_str).collect();
        let rows = ctx.store().query_predicates(&text_predicates())?;

        let mut used: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for row in text_literals(rows) {
            let (Some(subject), Term::Literal { lang: Some(tag), .. }) =
                (row.subject.resource_id(), &row.object)
            else {
                continue;
            };
            if wanted.contains(subject.as_str()) && is_valid_language_tag(tag) {
                used.entry(subject).or_default().insert(tag.to_ascii_lowercase());
            }
        }

        let all: BTreeSet<String> = used.values().flatten().cloned().collect();
        let no_languages = BTreeSet::new();
        let mut missing = BTreeMap::new();
        for concept in concepts {
            let own = used.get(concept).unwrap_or(&no_languages);
            let lacking: Vec<String> = all.difference(own).cloned().collect();
            if !lacking.is_empty() {
                missing.insert(concept.clone(), lacking);
            }
        }

        Ok(Outcome::Mapping(missing))
    }
}
