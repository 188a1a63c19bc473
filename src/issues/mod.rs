//! The built-in quality issues and the catalog that wires them together.

macro_rules! quality_issue {
    ($anchor:literal) => {
        concat!("https://github.com/cmader/qSKOS/wiki/Quality-Issues#", $anchor)
    };
}

pub mod concepts;
pub mod counts;
pub mod labels;
pub mod links;
pub mod relations;
pub mod structure;

use crate::engine::IssueCatalog;
use crate::error::{ConfigError, StoreError};
use crate::models::IssueMeta;
use crate::sampling::{check_percent, Sampler};
use crate::store::{DataStore, Triple};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Settings that shape individual issues.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueSettings {
    /// Prefix identifying authoritative concepts; inferred when absent.
    pub base_uri: Option<String>,
    /// Percentage of resources sampled by extrapolating issues.
    pub subset_percent: Option<f32>,
    /// Seed for reproducible sampling.
    pub seed: Option<u64>,
}

/// Build the catalog of all built-in issues.
pub fn catalog(settings: &IssueSettings) -> Result<IssueCatalog, ConfigError> {
    check_percent(settings.subset_percent)?;

    let sampler = match settings.seed {
        Some(seed) => Sampler::with_seed(seed),
        None => Sampler::new(),
    };

    let mut catalog = IssueCatalog::new();
    catalog.register(Arc::new(concepts::AllConcepts))?;
    catalog.register(Arc::new(concepts::AuthoritativeConcepts::new(
        settings.base_uri.clone(),
    )))?;
    catalog.register(Arc::new(concepts::ConceptSchemes))?;
    catalog.register(Arc::new(counts::CollectionCount))?;
    catalog.register(Arc::new(counts::SemanticRelationCount))?;
    catalog.register(Arc::new(counts::AggregationRelationCount))?;
    catalog.register(Arc::new(counts::LexicalRelationCount))?;
    catalog.register(Arc::new(concepts::HttpUris))?;
    catalog.register(Arc::new(structure::ConceptGraphIssue))?;
    catalog.register(Arc::new(concepts::OrphanConcepts))?;
    catalog.register(Arc::new(structure::DisconnectedClusters))?;
    catalog.register(Arc::new(structure::HierarchicalCycles))?;
    catalog.register(Arc::new(labels::UndocumentedConcepts))?;
    catalog.register(Arc::new(relations::MissingOutLinks))?;
    catalog.register(Arc::new(relations::OmittedTopConcepts))?;
    catalog.register(Arc::new(relations::MappingRelationsMisuse))?;
    catalog.register(Arc::new(labels::LanguageTags))?;
    catalog.register(Arc::new(labels::LanguageCoverage))?;
    catalog.register(Arc::new(concepts::NonHttpResources))?;
    catalog.register(Arc::new(links::BrokenLinks::new(
        settings.subset_percent,
        sampler,
    )))?;
    Ok(catalog)
}

/// Identity of every built-in issue, in catalog order.
pub fn all_issues() -> Vec<IssueMeta> {
    catalog(&IssueSettings::default())
        .map(|catalog| catalog.iter().map(|issue| *issue.meta()).collect())
        .unwrap_or_default()
}

/// Distinct resource ids (IRIs and blank nodes) in subject or object position.
pub(crate) fn endpoints(rows: &[Triple]) -> BTreeSet<String> {
    rows.iter()
        .flat_map(|t| [t.subject.resource_id(), t.object.resource_id()])
        .flatten()
        .collect()
}

/// Subjects of all rows using one of `predicates`.
pub(crate) fn subjects_of(
    store: &dyn DataStore,
    predicates: &[&str],
) -> Result<BTreeSet<String>, StoreError> {
    Ok(store
        .query_predicates(predicates)?
        .iter()
        .filter_map(|t| t.subject.resource_id())
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::models::Category;
    use crate::store::MemoryStore;

    pub(crate) const VOCABULARY: &str = include_str!("../../fixtures/vocabulary.nt");

    pub(crate) fn voc(local: &str) -> String {
        format!("http://example.org/voc/{}", local)
    }

    pub(crate) fn fixture_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::from_ntriples(VOCABULARY).unwrap())
    }

    pub(crate) fn fixture_engine(settings: &IssueSettings) -> Engine {
        Engine::new(catalog(settings).unwrap(), fixture_store()).unwrap()
    }

    #[test]
    fn test_catalog_is_valid() {
        let catalog = catalog(&IssueSettings::default()).unwrap();
        assert_eq!(catalog.len(), 20);
        assert!(catalog.validate().is_ok());
        assert_eq!(all_issues().len(), 20);
    }

    #[test]
    fn test_analytical_issues_link_to_reference() {
        for meta in all_issues() {
            match meta.category {
                Category::Analytical => {
                    let link = meta.weblink.unwrap_or_default();
                    assert!(
                        link.starts_with("https://github.com/cmader/qSKOS/wiki/Quality-Issues#"),
                        "{} has no reference link",
                        meta.code
                    );
                }
                Category::Statistical => assert!(meta.weblink.is_none(), "{}", meta.code),
            }
        }
    }

    #[test]
    fn test_catalog_rejects_bad_percent() {
        let settings = IssueSettings {
            subset_percent: Some(120.0),
            ..Default::default()
        };
        assert!(matches!(
            catalog(&settings),
            Err(ConfigError::InvalidSubsetPercent(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_dataset_runs_cleanly() {
        let settings = IssueSettings::default();
        let mut engine = Engine::new(catalog(&settings).unwrap(), Arc::new(MemoryStore::new())).unwrap();

        // bl has no links to check, so no link checker is needed
        let report = engine.run(&[]).await.unwrap();
        assert_eq!(report.evaluations.len(), 20);
        assert_eq!(report.failures().count(), 0);
        assert!(!report.has_problems());
        for evaluation in &report.evaluations {
            let outcome = evaluation.result.as_ref().unwrap();
            if let Ok(count) = outcome.occurrence_count() {
                assert_eq!(count, 0, "{} counted {}", evaluation.meta.code, count);
            }
        }
    }
}
