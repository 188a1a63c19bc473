//! Read-only pattern-query access to the vocabulary under test.
//!
//! Checks never talk to a concrete backend directly; they receive a
//! [`DataStore`] handle and issue triple pattern queries against it.

pub mod ntriples;

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

pub use ntriples::parse_ntriples;

/// An RDF term as it appears in subject or object position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn lang_literal(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            lang: Some(lang.into()),
            datatype: None,
        }
    }

    /// The IRI, if this term is one.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// Identifier of a resource term (IRI or `_:label`); `None` for literals.
    pub fn resource_id(&self) -> Option<String> {
        match self {
            Term::Iri(iri) => Some(iri.clone()),
            Term::Blank(label) => Some(format!("_:{}", label)),
            Term::Literal { .. } => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Blank(label) => write!(f, "_:{}", label),
            Term::Literal {
                value,
                lang,
                datatype,
            } => {
                write!(f, "\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))?;
                if let Some(lang) = lang {
                    write!(f, "@{}", lang)?;
                } else if let Some(datatype) = datatype {
                    write!(f, "^^<{}>", datatype)?;
                }
                Ok(())
            }
        }
    }
}

/// One row of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.subject, self.predicate, self.object)
    }
}

/// A triple pattern; `None` positions match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Option<Term>,
    pub predicate: Option<String>,
    pub object: Option<Term>,
}

impl TriplePattern {
    /// Matches every triple in the store.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: Term) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn with_object(mut self, object: Term) -> Self {
        self.object = Some(object);
        self
    }

    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == triple.subject)
            && self
                .predicate
                .as_deref()
                .map_or(true, |p| p == triple.predicate)
            && self.object.as_ref().map_or(true, |o| *o == triple.object)
    }
}

/// Read-only query interface over one immutable dataset snapshot.
pub trait DataStore: Send + Sync {
    /// Returns the rows matching `pattern`, in a stable order.
    fn query(&self, pattern: &TriplePattern) -> Result<Vec<Triple>, StoreError>;

    /// Rows using any of `predicates`, grouped in predicate order.
    fn query_predicates(&self, predicates: &[&str]) -> Result<Vec<Triple>, StoreError> {
        let mut rows = Vec::new();
        for predicate in predicates {
            rows.extend(self.query(&TriplePattern::any().with_predicate(*predicate))?);
        }
        Ok(rows)
    }

    /// Subjects of `rdf:type <class>` statements that are resources.
    fn instances_of(&self, class: &str) -> Result<Vec<String>, StoreError> {
        let rows = self.query(
            &TriplePattern::any()
                .with_predicate(crate::vocab::RDF_TYPE)
                .with_object(Term::iri(class)),
        )?;
        Ok(rows.iter().filter_map(|t| t.subject.resource_id()).collect())
    }
}

/// In-memory store holding a deduplicated triple set with a predicate index.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
    by_predicate: HashMap<String, Vec<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an N-Triples document into a new store.
    pub fn from_ntriples(input: &str) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.extend(parse_ntriples(input)?);
        Ok(store)
    }

    /// Adds a triple; duplicates are ignored. Returns whether it was new.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }
        let index = self.triples.len();
        self.by_predicate
            .entry(triple.predicate.clone())
            .or_default()
            .push(index);
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

impl Extend<Triple> for MemoryStore {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl FromIterator<Triple> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl DataStore for MemoryStore {
    fn query(&self, pattern: &TriplePattern) -> Result<Vec<Triple>, StoreError> {
        let rows = match pattern.predicate.as_deref() {
            Some(predicate) => self
                .by_predicate
                .get(predicate)
                .map(|indices| {
                    indices
                        .iter()
                        .map(|&i| &self.triples[i])
                        .filter(|t| pattern.matches(t))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
            None => self
                .triples
                .iter()
                .filter(|t| pattern.matches(t))
                .cloned()
                .collect(),
        };
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab;

    fn sample_store() -> MemoryStore {
        vec![
            Triple::new(Term::iri("http://ex.org/a"), vocab::RDF_TYPE, Term::iri(vocab::CONCEPT)),
            Triple::new(Term::iri("http://ex.org/a"), vocab::BROADER, Term::iri("http://ex.org/b")),
            Triple::new(Term::iri("http://ex.org/a"), vocab::PREF_LABEL, Term::lang_literal("A", "en")),
            Triple::new(Term::iri("http://ex.org/a"), vocab::BROADER, Term::iri("http://ex.org/b")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_insert_deduplicates() {
        let store = sample_store();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_query_by_predicate_and_object() {
        let store = sample_store();
        let rows = store
            .query(&TriplePattern::any().with_predicate(vocab::BROADER))
            .unwrap();
        assert_eq!(rows.len(), 1);

        let rows = store
            .query(&TriplePattern::any().with_object(Term::iri("http://ex.org/b")))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].predicate, vocab::BROADER);
    }

    #[test]
    fn test_query_any_returns_insertion_order() {
        let store = sample_store();
        let rows = store.query(&TriplePattern::any()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].predicate, vocab::RDF_TYPE);
    }

    #[test]
    fn test_instances_of() {
        let store = sample_store();
        assert_eq!(store.instances_of(vocab::CONCEPT).unwrap(), vec!["http://ex.org/a"]);
        assert!(store.instances_of(vocab::CONCEPT_SCHEME).unwrap().is_empty());
    }

    #[test]
    fn test_term_display() {
        assert_eq!(Term::iri("http://x").to_string(), "<http://x>");
        assert_eq!(Term::lang_literal("a \"b\"", "en").to_string(), "\"a \\\"b\\\"\"@en");
        assert_eq!(Term::Blank("n1".into()).resource_id().as_deref(), Some("_:n1"));
        assert_eq!(Term::literal("x").resource_id(), None);
    }
}
