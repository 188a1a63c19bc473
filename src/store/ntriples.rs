//! N-Triples loader for [`MemoryStore`](super::MemoryStore).
//!
//! Statements are parsed with `oxttl` one line at a time, so errors carry the
//! line they occurred on, and then mapped into the store's own [`Term`] model.
//! The parser runs in lenient mode: IRIs and language tags are kept as
//! written, and malformed tags are left for the language checks to report.

use super::{Term, Triple};
use crate::error::StoreError;
use oxrdf::vocab::xsd;
use oxttl::NTriplesParser;

/// Parse a whole N-Triples document.
pub fn parse_ntriples(input: &str) -> Result<Vec<Triple>, StoreError> {
    let mut triples = Vec::new();

    for (index, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        for parsed in NTriplesParser::new().unchecked().for_slice(line.as_bytes()) {
            let triple = parsed
                .map_err(|e| e.to_string())
                .and_then(convert)
                .map_err(|message| StoreError::Parse {
                    line: index + 1,
                    message,
                })?;
            triples.push(triple);
        }
    }

    Ok(triples)
}

fn convert(triple: oxrdf::Triple) -> Result<Triple, String> {
    let subject = match triple.subject {
        oxrdf::Subject::NamedNode(node) => Term::Iri(node.into_string()),
        oxrdf::Subject::BlankNode(node) => Term::Blank(node.as_str().to_string()),
        #[allow(unreachable_patterns)]
        other => return Err(format!("unsupported subject {}", other)),
    };

    let object = match triple.object {
        oxrdf::Term::NamedNode(node) => Term::Iri(node.into_string()),
        oxrdf::Term::BlankNode(node) => Term::Blank(node.as_str().to_string()),
        oxrdf::Term::Literal(literal) => literal_term(&literal),
        #[allow(unreachable_patterns)]
        other => return Err(format!("unsupported object {}", other)),
    };

    Ok(Triple::new(subject, triple.predicate.into_string(), object))
}

fn literal_term(literal: &oxrdf::Literal) -> Term {
    let value = literal.value().to_string();
    match literal.language() {
        Some(lang) => Term::Literal {
            value,
            lang: Some(lang.to_string()),
            datatype: None,
        },
        None if literal.datatype() == xsd::STRING => Term::literal(value),
        None => Term::Literal {
            value,
            lang: None,
            datatype: Some(literal.datatype().as_str().to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iri_triple() {
        let triples = parse_ntriples(
            "<http://ex.org/a> <http://www.w3.org/2004/02/skos/core#broader> <http://ex.org/b> .",
        )
        .unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].subject, Term::iri("http://ex.org/a"));
        assert_eq!(triples[0].object, Term::iri("http://ex.org/b"));
    }

    #[test]
    fn test_parse_literals() {
        let input = r#"
# comment line
<http://ex.org/a> <http://ex.org/p> "Café \"x\""@fr .
<http://ex.org/a> <http://ex.org/p> "42"^^<http://www.w3.org/2001/XMLSchema#int> .
_:b1 <http://ex.org/p> "plain" . # trailing comment
<http://ex.org/a> <http://ex.org/p> "typed string"^^<http://www.w3.org/2001/XMLSchema#string> .
"#;
        let triples = parse_ntriples(input).unwrap();
        assert_eq!(triples.len(), 4);
        assert_eq!(triples[0].object, Term::lang_literal("Café \"x\"", "fr"));
        assert_eq!(
            triples[1].object,
            Term::Literal {
                value: "42".to_string(),
                lang: None,
                datatype: Some("http://www.w3.org/2001/XMLSchema#int".to_string()),
            }
        );
        assert_eq!(triples[2].subject, Term::Blank("b1".to_string()));
        assert_eq!(triples[2].object, Term::literal("plain"));
        // xsd:string is the implicit datatype of plain literals
        assert_eq!(triples[3].object, Term::literal("typed string"));
    }

    #[test]
    fn test_malformed_language_tag_is_kept() {
        let triples =
            parse_ntriples("<http://ex.org/a> <http://ex.org/p> \"Birds\"@englishlang .").unwrap();
        match &triples[0].object {
            Term::Literal { lang: Some(tag), .. } => assert!(tag.eq_ignore_ascii_case("englishlang")),
            other => panic!("expected a tagged literal, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_reports_line() {
        let input = "<http://ex.org/a> <http://ex.org/p> <http://ex.org/b> .\n\"lit\" <http://ex.org/p> <http://ex.org/b> .";
        match parse_ntriples(input) {
            Err(StoreError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_terminator_is_rejected() {
        assert!(parse_ntriples("<http://a> <http://p> <http://b>").is_err());
    }

    #[test]
    fn test_unicode_escape_needs_hex_digits() {
        let result = parse_ntriples("<http://a> <http://p> \"x\\u+041\" .");
        assert!(matches!(result, Err(StoreError::Parse { line: 1, .. })), "{:?}", result);

        let triples = parse_ntriples("<http://a> <http://p> \"x\\u0041\" .").unwrap();
        assert_eq!(triples[0].object, Term::literal("xA"));
    }
}
