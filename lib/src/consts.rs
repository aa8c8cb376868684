//! Defines the reserved tokens and key markers of the concise term grammar,
//! plus the vocabulary terms the encoder treats specially.

use oxigraph::model::NamedNodeRef;

/// Key of the default graph. Its triples node always exists.
pub const DEFAULT_GRAPH_KEY: &str = "*";

// leading markers
pub const ABSOLUTE_IRI: char = '>';
pub const BLANK_NODE: &str = "_:";
pub const SIMPLE_LITERAL: char = '"';
pub const LANGUAGED_LITERAL: char = '@';
pub const DATATYPED_LITERAL: char = '^';
pub const VARIABLE: char = '?';

/// Separates the language tag or datatype key from the literal content.
pub const LITERAL_CONTENT: char = '"';

/// Literals with this datatype encode as simple literals.
pub const XSD_STRING: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#string");
