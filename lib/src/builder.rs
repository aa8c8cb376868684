//! Mutable front of the store. Owns the object pool, the quad index and the
//! prefix table, and is the only way to change them.

use crate::concise::{self, QuadKeys, Role};
use crate::consts::DEFAULT_GRAPH_KEY;
use crate::dataset::{ConciseQuads, QuadTree, Quads};
use crate::errors::{QuadTreeError, Result};
use crate::handle::{GraphHandle, SubjectHandle};
use crate::index::QuadIndex;
use crate::pool::{ObjectDescriptor, ObjectPool};
use crate::prefixes::PrefixMap;
use log::debug;
use oxigraph::model::{
    GraphNameRef, NamedNodeRef, NamedOrBlankNodeRef, Quad, QuadRef, TermRef,
};

#[derive(Debug, Clone, Default)]
pub struct QuadTreeBuilder {
    pub(crate) pool: ObjectPool,
    pub(crate) index: QuadIndex,
    pub(crate) prefixes: PrefixMap,
}

impl QuadTreeBuilder {
    pub fn new(prefixes: PrefixMap) -> Self {
        Self {
            pool: ObjectPool::new(),
            index: QuadIndex::new(),
            prefixes,
        }
    }

    pub(crate) fn from_parts(pool: ObjectPool, index: QuadIndex, prefixes: PrefixMap) -> Self {
        Self {
            pool,
            index,
            prefixes,
        }
    }

    /// Builds a store from `quads`, encoding terms with `prefixes`.
    pub fn from_quads<I>(prefixes: PrefixMap, quads: I) -> Self
    where
        I: IntoIterator,
        Self: Extend<I::Item>,
    {
        let mut builder = Self::new(prefixes);
        builder.extend(quads);
        builder
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    /// Replaces the prefix table and re-encodes every stored key under it, so
    /// a term keeps a single key across the switch. Keys the old table cannot
    /// decode are kept verbatim and decode against the new table.
    pub fn attach_prefixes(&mut self, prefixes: PrefixMap) {
        let previous = std::mem::replace(&mut self.prefixes, prefixes);
        if self.is_empty() || previous == self.prefixes {
            return;
        }
        let index = std::mem::take(&mut self.index);
        self.pool = ObjectPool::new();
        for quad in ConciseQuads::new(&index) {
            let graph = concise::reencode_key(quad.graph, Role::Graph, &previous, &self.prefixes);
            let subject = concise::reencode_key(quad.subject, Role::Subject, &previous, &self.prefixes);
            let predicate =
                concise::reencode_key(quad.predicate, Role::Predicate, &previous, &self.prefixes);
            let object = concise::reencode_key(quad.object, Role::Object, &previous, &self.prefixes);
            self.add_quad_key(&graph, &subject, &predicate, &object);
        }
        debug!("Re-encoded {} quads under a new prefix table", self.len());
    }

    pub fn open_graph(&mut self, graph: GraphNameRef<'_>) -> GraphHandle<'_> {
        let key = concise::graph_key(graph, &self.prefixes);
        GraphHandle::new(self, &key)
    }

    pub fn open_graph_key(&mut self, graph: &str) -> GraphHandle<'_> {
        GraphHandle::new(self, graph)
    }

    /// Opens `subject` in the default graph.
    pub fn open_subject(&mut self, subject: NamedOrBlankNodeRef<'_>) -> SubjectHandle<'_> {
        let key = concise::subject_key(subject, &self.prefixes);
        SubjectHandle::new(self, DEFAULT_GRAPH_KEY, &key)
    }

    pub fn open_subject_key(&mut self, subject: &str) -> SubjectHandle<'_> {
        SubjectHandle::new(self, DEFAULT_GRAPH_KEY, subject)
    }

    /// Adds a triple of concise keys to the default graph.
    pub fn add_triple(&mut self, subject: &str, predicate: &str, object: &str) -> bool {
        self.add_quad_key(DEFAULT_GRAPH_KEY, subject, predicate, object)
    }

    pub fn add_quad_key(&mut self, graph: &str, subject: &str, predicate: &str, object: &str) -> bool {
        self.open_graph_key(graph)
            .open_subject(subject)
            .open_predicate(predicate)
            .add_object(object)
    }

    /// Deletes a quad of concise keys. Absent quads leave the store untouched.
    pub fn delete_quad_key(&mut self, graph: &str, subject: &str, predicate: &str, object: &str) -> bool {
        self.remove_quad_key(graph, subject, predicate, object)
    }

    pub fn has_quad_key(&self, graph: &str, subject: &str, predicate: &str, object: &str) -> bool {
        self.index.contains(graph, subject, predicate, object)
    }

    pub(crate) fn remove_quad_key(&mut self, graph: &str, subject: &str, predicate: &str, object: &str) -> bool {
        if !self.index.remove(graph, subject, predicate, object) {
            return false;
        }
        self.pool.release(object, predicate, subject);
        true
    }

    fn keys(&self, quad: QuadRef<'_>) -> QuadKeys {
        QuadKeys::from_quad(quad, &self.prefixes)
    }

    pub fn add(&mut self, quad: QuadRef<'_>) -> bool {
        let keys = self.keys(quad);
        self.add_quad_key(&keys.graph, &keys.subject, &keys.predicate, &keys.object)
    }

    pub fn delete(&mut self, quad: QuadRef<'_>) -> bool {
        let keys = self.keys(quad);
        self.remove_quad_key(&keys.graph, &keys.subject, &keys.predicate, &keys.object)
    }

    pub fn has(&self, quad: QuadRef<'_>) -> bool {
        let keys = self.keys(quad);
        self.has_quad_key(&keys.graph, &keys.subject, &keys.predicate, &keys.object)
    }

    pub fn iter(&self) -> Quads<'_> {
        Quads::new(&self.index, &self.prefixes)
    }

    pub fn concise_quads(&self) -> ConciseQuads<'_> {
        ConciseQuads::new(&self.index)
    }

    pub fn graph_len(&self, graph: &str) -> usize {
        self.index.graph_len(graph)
    }

    pub fn distinct_graph_count(&self) -> usize {
        self.index.graph_count()
    }

    pub fn distinct_subject_count(&self) -> usize {
        self.index.subject_count()
    }

    pub fn distinct_predicate_count(&self) -> usize {
        self.index.predicate_count()
    }

    pub fn distinct_object_count(&self) -> usize {
        self.pool.len()
    }

    pub fn descriptor(&self, object: &str) -> Option<&ObjectDescriptor> {
        self.pool.get(object)
    }

    pub fn match_pattern(
        &self,
        _subject: Option<NamedOrBlankNodeRef<'_>>,
        _predicate: Option<NamedNodeRef<'_>>,
        _object: Option<TermRef<'_>>,
        _graph: Option<GraphNameRef<'_>>,
    ) -> Result<QuadTree> {
        Err(QuadTreeError::NotImplemented("match"))
    }

    /// Freezes the store into a read view. The builder is consumed, so the
    /// view can never observe a later mutation.
    pub fn deliver(self) -> QuadTree {
        QuadTree::from_parts(self.pool, self.index, self.prefixes)
    }
}

impl Extend<Quad> for QuadTreeBuilder {
    fn extend<I: IntoIterator<Item = Quad>>(&mut self, iter: I) {
        for quad in iter {
            self.add(quad.as_ref());
        }
    }
}

impl<'a> Extend<QuadRef<'a>> for QuadTreeBuilder {
    fn extend<I: IntoIterator<Item = QuadRef<'a>>>(&mut self, iter: I) {
        for quad in iter {
            self.add(quad);
        }
    }
}
