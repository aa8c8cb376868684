//! In-memory RDF quad store indexed graph → subject → predicate → objects.
//!
//! Terms are stored as concise keys (see [`concise`]). Mutation goes through a
//! [`QuadTreeBuilder`]; [`QuadTreeBuilder::deliver`] freezes it into a
//! [`QuadTree`] read view.
//!
//! ```
//! use linkedquad::{PrefixMap, QuadTree};
//!
//! let mut builder = QuadTree::builder(PrefixMap::new().with("ex", "http://example.org/"));
//! assert!(builder.add_triple("ex:a", "ex:p", "ex:b"));
//! assert!(builder.add_quad_key("ex:g", "ex:a", "ex:p", "ex:b"));
//! let tree = builder.deliver();
//! assert_eq!(tree.len(), 2);
//! assert_eq!(tree.distinct_graph_count(), 2);
//! assert_eq!(tree.distinct_object_count(), 1);
//! ```

extern crate derive_builder;

pub mod builder;
pub mod concise;
pub mod config;
pub mod consts;
pub mod dataset;
pub mod doctor;
pub mod errors;
pub mod handle;
pub mod index;
pub mod options;
pub mod pool;
pub mod prefixes;
pub mod util;

pub use builder::QuadTreeBuilder;
pub use dataset::{ConciseQuad, ConciseQuads, QuadTree, Quads};
pub use errors::{QuadTreeError, Result};
pub use handle::{GraphHandle, PredicateHandle, SubjectHandle};
pub use options::ParseMode;
pub use pool::ObjectDescriptor;
pub use prefixes::PrefixMap;
