//! IRIs of the SKOS and RDF terms the checks look at.

macro_rules! skos {
    ($name:literal) => {
        concat!("http://www.w3.org/2004/02/skos/core#", $name)
    };
}

pub const SKOS_NAMESPACE: &str = skos!("");
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const CONCEPT: &str = skos!("Concept");
pub const CONCEPT_SCHEME: &str = skos!("ConceptScheme");
pub const COLLECTION: &str = skos!("Collection");
pub const ORDERED_COLLECTION: &str = skos!("OrderedCollection");

pub const BROADER: &str = skos!("broader");
pub const NARROWER: &str = skos!("narrower");
pub const BROADER_TRANSITIVE: &str = skos!("broaderTransitive");
pub const NARROWER_TRANSITIVE: &str = skos!("narrowerTransitive");
pub const RELATED: &str = skos!("related");
pub const SEMANTIC_RELATION: &str = skos!("semanticRelation");

pub const MAPPING_RELATION: &str = skos!("mappingRelation");
pub const CLOSE_MATCH: &str = skos!("closeMatch");
pub const EXACT_MATCH: &str = skos!("exactMatch");
pub const BROAD_MATCH: &str = skos!("broadMatch");
pub const NARROW_MATCH: &str = skos!("narrowMatch");
pub const RELATED_MATCH: &str = skos!("relatedMatch");

pub const IN_SCHEME: &str = skos!("inScheme");
pub const HAS_TOP_CONCEPT: &str = skos!("hasTopConcept");
pub const TOP_CONCEPT_OF: &str = skos!("topConceptOf");
pub const MEMBER: &str = skos!("member");
pub const MEMBER_LIST: &str = skos!("memberList");

pub const PREF_LABEL: &str = skos!("prefLabel");
pub const ALT_LABEL: &str = skos!("altLabel");
pub const HIDDEN_LABEL: &str = skos!("hiddenLabel");
pub const NOTATION: &str = skos!("notation");

/// Relations whose edges form the broader/narrower hierarchy.
pub const HIERARCHICAL_RELATIONS: &[&str] =
    &[BROADER, NARROWER, BROADER_TRANSITIVE, NARROWER_TRANSITIVE];

pub const ASSOCIATIVE_RELATIONS: &[&str] = &[RELATED, SEMANTIC_RELATION];

pub const MAPPING_RELATIONS: &[&str] = &[
    MAPPING_RELATION,
    CLOSE_MATCH,
    EXACT_MATCH,
    BROAD_MATCH,
    NARROW_MATCH,
    RELATED_MATCH,
];

/// Every relation that links two concepts.
pub const SEMANTIC_RELATIONS: &[&str] = &[
    BROADER,
    NARROWER,
    BROADER_TRANSITIVE,
    NARROWER_TRANSITIVE,
    RELATED,
    SEMANTIC_RELATION,
    MAPPING_RELATION,
    CLOSE_MATCH,
    EXACT_MATCH,
    BROAD_MATCH,
    NARROW_MATCH,
    RELATED_MATCH,
];

pub const AGGREGATION_RELATIONS: &[&str] =
    &[TOP_CONCEPT_OF, HAS_TOP_CONCEPT, IN_SCHEME, MEMBER, MEMBER_LIST];

pub const DOCUMENTATION_PROPERTIES: &[&str] = &[
    skos!("note"),
    skos!("changeNote"),
    skos!("definition"),
    skos!("editorialNote"),
    skos!("example"),
    skos!("historyNote"),
    skos!("scopeNote"),
];

pub const LABEL_PROPERTIES: &[&str] = &[PREF_LABEL, ALT_LABEL, HIDDEN_LABEL];

/// Properties whose literal values are expected to carry a language tag.
pub fn is_text_property(predicate: &str) -> bool {
    LABEL_PROPERTIES.contains(&predicate) || DOCUMENTATION_PROPERTIES.contains(&predicate)
}

/// Namespace part of an IRI: everything up to and including the last `/` or `#`.
pub fn namespace_of(iri: &str) -> &str {
    match iri.rfind(['/', '#']) {
        Some(pos) => &iri[..=pos],
        None => iri,
    }
}

/// True for `http://` and `https://` IRIs (scheme compared case-insensitively).
pub fn is_http(iri: &str) -> bool {
    let lower = iri.get(..8).unwrap_or(iri).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
