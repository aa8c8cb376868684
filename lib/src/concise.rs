//! Concise term keys: compact, deterministic string encodings of RDF terms.
//!
//! | Term kind            | Key form                              |
//! |----------------------|---------------------------------------|
//! | Default graph        | `*`                                   |
//! | Named node, prefixed | `prefix:suffix`                       |
//! | Named node, absolute | `>` + IRI                             |
//! | Blank node           | `_:` + label                          |
//! | Simple literal       | `"` + content                         |
//! | Languaged literal    | `@` + language + `"` + content        |
//! | Datatyped literal    | `^` + datatype key + `"` + content    |
//! | Variable             | `?` + name                            |
//!
//! Equal terms under the same [`PrefixMap`] always produce equal keys. Decoding
//! checks that a key may occupy the requested position but does not validate
//! IRI syntax.

use crate::consts::*;
use crate::errors::{QuadTreeError, Result};
use crate::prefixes::PrefixMap;
use oxigraph::model::{
    BlankNode, BlankNodeRef, GraphName, GraphNameRef, Literal, LiteralRef, NamedNode,
    NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Quad, QuadRef, Term, TermRef,
};
use std::fmt;

/// Position a term occupies, used to reject keys that cannot appear there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Graph,
    Subject,
    Predicate,
    Object,
    Datatype,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Graph => "graph",
            Role::Subject => "subject",
            Role::Predicate => "predicate",
            Role::Object => "object",
            Role::Datatype => "datatype",
        };
        f.write_str(name)
    }
}

/// The grammar row a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    DefaultGraph,
    PrefixedNamedNode,
    AbsoluteNamedNode,
    BlankNode,
    SimpleLiteral,
    LanguagedLiteral,
    DatatypedLiteral,
    Variable,
}

/// Classifies `key` by its leading marker, or `None` if it fits no grammar row.
pub fn key_kind(key: &str) -> Option<KeyKind> {
    let first = key.chars().next()?;
    let rest = &key[first.len_utf8()..];
    let kind = match first {
        '*' if rest.is_empty() => KeyKind::DefaultGraph,
        ABSOLUTE_IRI => KeyKind::AbsoluteNamedNode,
        '_' if key.starts_with(BLANK_NODE) => KeyKind::BlankNode,
        SIMPLE_LITERAL => KeyKind::SimpleLiteral,
        LANGUAGED_LITERAL if rest.contains(LITERAL_CONTENT) => KeyKind::LanguagedLiteral,
        DATATYPED_LITERAL if rest.contains(LITERAL_CONTENT) => KeyKind::DatatypedLiteral,
        VARIABLE => KeyKind::Variable,
        c if (c.is_ascii_alphabetic() || c == ':') && key.contains(':') => {
            KeyKind::PrefixedNamedNode
        }
        _ => return None,
    };
    Some(kind)
}

/// Encodes an IRI, compacting it with `prefixes` when a safe prefix exists.
pub fn iri_key(iri: &str, prefixes: &PrefixMap) -> String {
    match prefixes.compact(iri) {
        Some((prefix, suffix)) => format!("{prefix}:{suffix}"),
        None => format!("{ABSOLUTE_IRI}{iri}"),
    }
}

fn blank_node_key(node: BlankNodeRef<'_>) -> String {
    format!("{BLANK_NODE}{}", node.as_str())
}

fn literal_key(literal: LiteralRef<'_>, prefixes: &PrefixMap) -> String {
    let content = literal.value();
    if let Some(language) = literal.language() {
        return format!("{LANGUAGED_LITERAL}{language}{LITERAL_CONTENT}{content}");
    }
    let datatype = literal.datatype();
    if datatype == XSD_STRING {
        format!("{SIMPLE_LITERAL}{content}")
    } else {
        format!(
            "{DATATYPED_LITERAL}{}{LITERAL_CONTENT}{content}",
            iri_key(datatype.as_str(), prefixes)
        )
    }
}

pub fn graph_key(graph: GraphNameRef<'_>, prefixes: &PrefixMap) -> String {
    match graph {
        GraphNameRef::DefaultGraph => DEFAULT_GRAPH_KEY.to_string(),
        GraphNameRef::NamedNode(node) => iri_key(node.as_str(), prefixes),
        GraphNameRef::BlankNode(node) => blank_node_key(node),
    }
}

pub fn subject_key(subject: NamedOrBlankNodeRef<'_>, prefixes: &PrefixMap) -> String {
    match subject {
        NamedOrBlankNodeRef::NamedNode(node) => iri_key(node.as_str(), prefixes),
        NamedOrBlankNodeRef::BlankNode(node) => blank_node_key(node),
    }
}

pub fn predicate_key(predicate: NamedNodeRef<'_>, prefixes: &PrefixMap) -> String {
    iri_key(predicate.as_str(), prefixes)
}

pub fn object_key(object: TermRef<'_>, prefixes: &PrefixMap) -> String {
    match object {
        TermRef::NamedNode(node) => iri_key(node.as_str(), prefixes),
        TermRef::BlankNode(node) => blank_node_key(node),
        TermRef::Literal(literal) => literal_key(literal, prefixes),
    }
}

/// The four keys of one quad.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuadKeys {
    pub graph: String,
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl QuadKeys {
    pub fn from_quad(quad: QuadRef<'_>, prefixes: &PrefixMap) -> Self {
        Self {
            graph: graph_key(quad.graph_name, prefixes),
            subject: subject_key(quad.subject, prefixes),
            predicate: predicate_key(quad.predicate, prefixes),
            object: object_key(quad.object, prefixes),
        }
    }
}

fn invalid_role(key: &str, role: Role) -> QuadTreeError {
    QuadTreeError::InvalidRole {
        key: key.to_string(),
        role,
    }
}

fn named_node_from_key(key: &str, role: Role, prefixes: &PrefixMap) -> Result<NamedNode> {
    match key_kind(key) {
        Some(KeyKind::AbsoluteNamedNode) => Ok(NamedNode::new_unchecked(&key[1..])),
        Some(KeyKind::PrefixedNamedNode) => {
            let (prefix, suffix) = key
                .split_once(':')
                .ok_or_else(|| QuadTreeError::InvalidKey(key.to_string()))?;
            prefixes
                .expand(prefix, suffix)
                .map(NamedNode::new_unchecked)
                .ok_or_else(|| QuadTreeError::UnknownPrefix {
                    prefix: prefix.to_string(),
                    key: key.to_string(),
                })
        }
        Some(_) => Err(invalid_role(key, role)),
        None => Err(QuadTreeError::InvalidKey(key.to_string())),
    }
}

fn blank_node_from_key(key: &str) -> BlankNode {
    BlankNode::new_unchecked(&key[BLANK_NODE.len()..])
}

pub fn graph_from_key(key: &str, prefixes: &PrefixMap) -> Result<GraphName> {
    match key_kind(key) {
        Some(KeyKind::DefaultGraph) => Ok(GraphName::DefaultGraph),
        Some(KeyKind::BlankNode) => Ok(blank_node_from_key(key).into()),
        _ => named_node_from_key(key, Role::Graph, prefixes).map(GraphName::from),
    }
}

pub fn subject_from_key(key: &str, prefixes: &PrefixMap) -> Result<NamedOrBlankNode> {
    match key_kind(key) {
        Some(KeyKind::BlankNode) => Ok(blank_node_from_key(key).into()),
        _ => named_node_from_key(key, Role::Subject, prefixes).map(NamedOrBlankNode::from),
    }
}

pub fn predicate_from_key(key: &str, prefixes: &PrefixMap) -> Result<NamedNode> {
    named_node_from_key(key, Role::Predicate, prefixes)
}

pub fn object_from_key(key: &str, prefixes: &PrefixMap) -> Result<Term> {
    match key_kind(key) {
        Some(KeyKind::BlankNode) => Ok(blank_node_from_key(key).into()),
        Some(KeyKind::SimpleLiteral) => Ok(Literal::new_simple_literal(&key[1..]).into()),
        Some(KeyKind::LanguagedLiteral) => {
            let (language, content) = key[1..]
                .split_once(LITERAL_CONTENT)
                .ok_or_else(|| QuadTreeError::InvalidKey(key.to_string()))?;
            Ok(Literal::new_language_tagged_literal_unchecked(content, language).into())
        }
        Some(KeyKind::DatatypedLiteral) => {
            let (datatype, content) = key[1..]
                .split_once(LITERAL_CONTENT)
                .ok_or_else(|| QuadTreeError::InvalidKey(key.to_string()))?;
            let datatype = named_node_from_key(datatype, Role::Datatype, prefixes)?;
            Ok(Literal::new_typed_literal(content, datatype).into())
        }
        _ => named_node_from_key(key, Role::Object, prefixes).map(Term::from),
    }
}

/// Translates a stored key from one prefix table to another. A key that does
/// not decode under `from` is returned verbatim.
pub fn reencode_key(key: &str, role: Role, from: &PrefixMap, to: &PrefixMap) -> String {
    let reencoded = match role {
        Role::Graph => graph_from_key(key, from).map(|graph| graph_key(graph.as_ref(), to)),
        Role::Subject => {
            subject_from_key(key, from).map(|subject| subject_key(subject.as_ref(), to))
        }
        Role::Predicate | Role::Datatype => {
            predicate_from_key(key, from).map(|predicate| predicate_key(predicate.as_ref(), to))
        }
        Role::Object => object_from_key(key, from).map(|object| object_key(object.as_ref(), to)),
    };
    reencoded.unwrap_or_else(|_| key.to_string())
}

/// Re-materializes a full quad from its four keys.
pub fn quad_from_keys(
    graph: &str,
    subject: &str,
    predicate: &str,
    object: &str,
    prefixes: &PrefixMap,
) -> Result<Quad> {
    Ok(Quad::new(
        subject_from_key(subject, prefixes)?,
        predicate_from_key(predicate, prefixes)?,
        object_from_key(object, prefixes)?,
        graph_from_key(graph, prefixes)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> PrefixMap {
        PrefixMap::new()
            .with("ex", "http://example.org/")
            .with("xsd", "http://www.w3.org/2001/XMLSchema#")
    }

    #[test]
    fn encodes_every_term_kind() {
        let prefixes = prefixes();
        let alice = NamedNode::new_unchecked("http://example.org/alice");
        let other = NamedNode::new_unchecked("http://other.org/x/y");
        let bnode = BlankNode::new_unchecked("b0");

        assert_eq!(graph_key(GraphNameRef::DefaultGraph, &prefixes), "*");
        assert_eq!(predicate_key(alice.as_ref(), &prefixes), "ex:alice");
        assert_eq!(predicate_key(other.as_ref(), &prefixes), ">http://other.org/x/y");
        assert_eq!(subject_key(bnode.as_ref().into(), &prefixes), "_:b0");

        let simple = Literal::new_simple_literal("hi");
        let tagged = Literal::new_language_tagged_literal_unchecked("salut", "fr");
        let typed = Literal::new_typed_literal(
            "5",
            NamedNode::new_unchecked("http://www.w3.org/2001/XMLSchema#integer"),
        );
        assert_eq!(object_key(simple.as_ref().into(), &prefixes), "\"hi");
        assert_eq!(object_key(tagged.as_ref().into(), &prefixes), "@fr\"salut");
        assert_eq!(object_key(typed.as_ref().into(), &prefixes), "^xsd:integer\"5");
    }

    #[test]
    fn decodes_literals_with_quotes_in_content() {
        let prefixes = prefixes();
        let term = object_from_key("^xsd:integer\"4\"2", &prefixes).unwrap();
        match term {
            Term::Literal(l) => {
                assert_eq!(l.value(), "4\"2");
                assert_eq!(l.datatype().as_str(), "http://www.w3.org/2001/XMLSchema#integer");
            }
            other => panic!("expected literal, got {other}"),
        }
        let term = object_from_key("@en\"say \"hi\"", &prefixes).unwrap();
        assert_eq!(
            term,
            Literal::new_language_tagged_literal_unchecked("say \"hi\"", "en").into()
        );
    }

    #[test]
    fn rejects_keys_in_the_wrong_role() {
        let prefixes = prefixes();
        assert!(matches!(
            predicate_from_key("\"literal", &prefixes),
            Err(QuadTreeError::InvalidRole { role: Role::Predicate, .. })
        ));
        assert!(matches!(
            predicate_from_key("_:b0", &prefixes),
            Err(QuadTreeError::InvalidRole { .. })
        ));
        assert!(matches!(
            subject_from_key("*", &prefixes),
            Err(QuadTreeError::InvalidRole { role: Role::Subject, .. })
        ));
        assert!(matches!(
            object_from_key("?x", &prefixes),
            Err(QuadTreeError::InvalidRole { role: Role::Object, .. })
        ));
        assert_eq!(graph_from_key("*", &prefixes).unwrap(), GraphName::DefaultGraph);
    }

    #[test]
    fn rejects_malformed_and_unknown_prefixes() {
        let prefixes = prefixes();
        assert!(matches!(
            object_from_key("#b0", &prefixes),
            Err(QuadTreeError::InvalidKey(_))
        ));
        assert!(matches!(object_from_key("", &prefixes), Err(QuadTreeError::InvalidKey(_))));
        assert!(matches!(
            object_from_key("foaf:name", &prefixes),
            Err(QuadTreeError::UnknownPrefix { .. })
        ));
    }

    #[test]
    fn classifies_keys() {
        assert_eq!(key_kind("*"), Some(KeyKind::DefaultGraph));
        assert_eq!(key_kind("ex:a"), Some(KeyKind::PrefixedNamedNode));
        assert_eq!(key_kind(":a"), Some(KeyKind::PrefixedNamedNode));
        assert_eq!(key_kind(">http://x"), Some(KeyKind::AbsoluteNamedNode));
        assert_eq!(key_kind("_:x"), Some(KeyKind::BlankNode));
        assert_eq!(key_kind("\""), Some(KeyKind::SimpleLiteral));
        assert_eq!(key_kind("@en\"x"), Some(KeyKind::LanguagedLiteral));
        assert_eq!(key_kind("^ex:t\"x"), Some(KeyKind::DatatypedLiteral));
        assert_eq!(key_kind("?v"), Some(KeyKind::Variable));
        assert_eq!(key_kind("@en"), None);
        assert_eq!(key_kind("plain"), None);
    }

    #[test]
    fn quad_keys_round_trip_through_decoding() {
        let prefixes = prefixes();
        let quad = Quad::new(
            NamedNode::new_unchecked("http://example.org/s"),
            NamedNode::new_unchecked("http://example.org/p"),
            Literal::new_typed_literal(
                "2024-01-01",
                NamedNode::new_unchecked("http://www.w3.org/2001/XMLSchema#date"),
            ),
            NamedNode::new_unchecked("http://graphs.example.com/g/1"),
        );
        let keys = QuadKeys::from_quad(quad.as_ref(), &prefixes);
        assert_eq!(keys.graph, ">http://graphs.example.com/g/1");
        let decoded =
            quad_from_keys(&keys.graph, &keys.subject, &keys.predicate, &keys.object, &prefixes)
                .unwrap();
        assert_eq!(decoded, quad);
    }

    #[test]
    fn reencoding_moves_keys_between_tables() {
        let (empty, prefixes) = (PrefixMap::new(), prefixes());
        assert_eq!(
            reencode_key(">http://example.org/a", Role::Subject, &empty, &prefixes),
            "ex:a"
        );
        assert_eq!(
            reencode_key("ex:a", Role::Predicate, &prefixes, &empty),
            ">http://example.org/a"
        );
        assert_eq!(
            reencode_key("^>http://www.w3.org/2001/XMLSchema#integer\"4", Role::Object, &empty, &prefixes),
            "^xsd:integer\"4"
        );
        assert_eq!(reencode_key("*", Role::Graph, &empty, &prefixes), "*");
        assert_eq!(reencode_key("nope:a", Role::Object, &empty, &prefixes), "nope:a");
    }
}
