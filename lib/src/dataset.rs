//! Read view over a delivered store: iteration, cardinalities and equality.

use crate::builder::QuadTreeBuilder;
use crate::concise;
use crate::errors::{QuadTreeError, Result};
use crate::index::{GraphNode, ObjectSet, QuadIndex, SubjectNode};
use crate::pool::{Key, ObjectDescriptor, ObjectPool};
use crate::prefixes::PrefixMap;
use indexmap::{map, set, IndexSet};
use oxigraph::model::{
    GraphName, GraphNameRef, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef,
    Quad, QuadRef, Term, TermRef,
};

/// An immutable quad store produced by [`QuadTreeBuilder::deliver`].
#[derive(Debug, Clone)]
pub struct QuadTree {
    pool: ObjectPool,
    index: QuadIndex,
    prefixes: PrefixMap,
}

impl QuadTree {
    pub(crate) fn from_parts(pool: ObjectPool, index: QuadIndex, prefixes: PrefixMap) -> Self {
        Self {
            pool,
            index,
            prefixes,
        }
    }

    pub fn builder(prefixes: PrefixMap) -> QuadTreeBuilder {
        QuadTreeBuilder::new(prefixes)
    }

    pub fn empty(prefixes: PrefixMap) -> Self {
        QuadTreeBuilder::new(prefixes).deliver()
    }

    /// Hands the structures back to a builder for further mutation.
    pub fn into_builder(self) -> QuadTreeBuilder {
        QuadTreeBuilder::from_parts(self.pool, self.index, self.prefixes)
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    pub(crate) fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    pub(crate) fn index(&self) -> &QuadIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn has(&self, quad: QuadRef<'_>) -> bool {
        let keys = concise::QuadKeys::from_quad(quad, &self.prefixes);
        self.has_quad_key(&keys.graph, &keys.subject, &keys.predicate, &keys.object)
    }

    pub fn has_quad_key(&self, graph: &str, subject: &str, predicate: &str, object: &str) -> bool {
        self.index.contains(graph, subject, predicate, object)
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

    /// Number of quads in one graph.
    pub fn graph_len(&self, graph: &str) -> usize {
        self.index.graph_len(graph)
    }

    pub fn distinct_predicate_keys(&self) -> IndexSet<&str> {
        self.index.predicate_keys()
    }

    pub fn distinct_object_keys(&self) -> impl Iterator<Item = &str> {
        self.pool.values()
    }

    pub fn distinct_predicates(&self) -> Result<Vec<NamedNode>> {
        self.index
            .predicate_keys()
            .into_iter()
            .map(|key| concise::predicate_from_key(key, &self.prefixes))
            .collect()
    }

    pub fn distinct_objects(&self) -> Result<Vec<Term>> {
        self.pool
            .values()
            .map(|key| concise::object_from_key(key, &self.prefixes))
            .collect()
    }

    /// Back-references of an object value: which (predicate, subject) pairs reach it.
    pub fn descriptor(&self, object: &str) -> Option<&ObjectDescriptor> {
        self.pool.get(object)
    }

    /// Each call starts a fresh traversal.
    pub fn iter(&self) -> Quads<'_> {
        Quads::new(&self.index, &self.prefixes)
    }

    pub fn concise_quads(&self) -> ConciseQuads<'_> {
        ConciseQuads::new(&self.index)
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

    pub fn union(&self, _other: &QuadTree) -> Result<QuadTree> {
        Err(QuadTreeError::NotImplemented("union"))
    }

    pub fn intersection(&self, _other: &QuadTree) -> Result<QuadTree> {
        Err(QuadTreeError::NotImplemented("intersection"))
    }

    pub fn difference(&self, _other: &QuadTree) -> Result<QuadTree> {
        Err(QuadTreeError::NotImplemented("difference"))
    }

    pub fn minus(&self, _other: &QuadTree) -> Result<QuadTree> {
        Err(QuadTreeError::NotImplemented("minus"))
    }

    pub fn contains(&self, _other: &QuadTree) -> Result<bool> {
        Err(QuadTreeError::NotImplemented("contains"))
    }

    pub fn disjoint(&self, _other: &QuadTree) -> Result<bool> {
        Err(QuadTreeError::NotImplemented("disjoint"))
    }

    pub fn normalize(&self) -> Result<QuadTree> {
        Err(QuadTreeError::NotImplemented("normalize"))
    }

    /// Re-encoding under a different prefix table.
    pub fn with_prefixes(&self, _prefixes: PrefixMap) -> Result<QuadTree> {
        Err(QuadTreeError::NotImplemented("with_prefixes"))
    }

    pub fn prefixed(&self) -> Result<QuadTree> {
        Err(QuadTreeError::NotImplemented("prefixed"))
    }

    pub fn expanded(&self) -> Result<QuadTree> {
        Err(QuadTreeError::NotImplemented("expanded"))
    }

    pub fn filter<F>(&self, _predicate: F) -> Result<QuadTree>
    where
        F: FnMut(QuadRef<'_>) -> bool,
    {
        Err(QuadTreeError::NotImplemented("filter"))
    }

    pub fn import<I>(&self, _quads: I) -> Result<QuadTree>
    where
        I: IntoIterator<Item = Quad>,
    {
        Err(QuadTreeError::NotImplemented("import"))
    }

    /// An empty tree sharing this tree's prefix table.
    pub fn sibling(&self) -> Result<QuadTree> {
        Err(QuadTreeError::NotImplemented("sibling"))
    }

    pub fn delete_matches(
        &self,
        _subject: Option<NamedOrBlankNodeRef<'_>>,
        _predicate: Option<NamedNodeRef<'_>>,
        _object: Option<TermRef<'_>>,
        _graph: Option<GraphNameRef<'_>>,
    ) -> Result<QuadTree> {
        Err(QuadTreeError::NotImplemented("delete_matches"))
    }
}

impl PartialEq for QuadTree {
    /// Set equality of the stored quads, short-circuiting on the first
    /// counter that differs. Keys are compared verbatim, so both trees must
    /// have been encoded with the same prefix table.
    fn eq(&self, other: &Self) -> bool {
        if self.pool.len() != other.pool.len()
            || self.index.keys != other.index.keys
            || self.index.quads != other.index.quads
        {
            return false;
        }
        self.index.graphs.iter().all(|(graph, node)| {
            other
                .index
                .graphs
                .get(graph)
                .is_some_and(|theirs| same_graph(node, theirs, &other.pool))
        })
    }
}

impl Eq for QuadTree {}

fn same_graph(ours: &GraphNode, theirs: &GraphNode, their_pool: &ObjectPool) -> bool {
    if ours.quads != theirs.quads || ours.keys != theirs.keys {
        return false;
    }
    ours.subjects.iter().all(|(subject, node)| {
        theirs
            .subjects
            .get(subject)
            .is_some_and(|other| same_subject(node, other, their_pool))
    })
}

fn same_subject(ours: &SubjectNode, theirs: &SubjectNode, their_pool: &ObjectPool) -> bool {
    if ours.quads != theirs.quads || ours.keys != theirs.keys {
        return false;
    }
    ours.predicates.iter().all(|(predicate, objects)| {
        theirs
            .predicates
            .get(predicate)
            .is_some_and(|other| same_objects(objects, other, their_pool))
    })
}

fn same_objects(ours: &ObjectSet, theirs: &ObjectSet, their_pool: &ObjectPool) -> bool {
    ours.len() == theirs.len()
        && ours
            .iter()
            .all(|value| their_pool.contains(value) && theirs.contains(value))
}

impl<'a> IntoIterator for &'a QuadTree {
    type Item = Result<Quad>;
    type IntoIter = Quads<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One stored quad as concise keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConciseQuad<'a> {
    pub graph: &'a str,
    pub subject: &'a str,
    pub predicate: &'a str,
    pub object: &'a str,
}

/// Depth-first traversal graph → subject → predicate → object in map order.
pub struct ConciseQuads<'a> {
    graphs: map::Iter<'a, Key, GraphNode>,
    subjects: Option<map::Iter<'a, Key, SubjectNode>>,
    predicates: Option<map::Iter<'a, Key, ObjectSet>>,
    objects: Option<set::Iter<'a, Key>>,
    graph: &'a str,
    subject: &'a str,
    predicate: &'a str,
}

impl<'a> ConciseQuads<'a> {
    pub(crate) fn new(index: &'a QuadIndex) -> Self {
        Self {
            graphs: index.graphs.iter(),
            subjects: None,
            predicates: None,
            objects: None,
            graph: "",
            subject: "",
            predicate: "",
        }
    }
}

impl<'a> Iterator for ConciseQuads<'a> {
    type Item = ConciseQuad<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(object) = self.objects.as_mut().and_then(Iterator::next) {
                return Some(ConciseQuad {
                    graph: self.graph,
                    subject: self.subject,
                    predicate: self.predicate,
                    object: &**object,
                });
            }
            if let Some((predicate, objects)) = self.predicates.as_mut().and_then(Iterator::next) {
                self.predicate = &**predicate;
                self.objects = Some(objects.iter());
                continue;
            }
            if let Some((subject, node)) = self.subjects.as_mut().and_then(Iterator::next) {
                self.subject = &**subject;
                self.predicates = Some(node.predicates.iter());
                self.objects = None;
                continue;
            }
            let (graph, node) = self.graphs.next()?;
            self.graph = &**graph;
            self.subjects = Some(node.subjects.iter());
            self.predicates = None;
            self.objects = None;
        }
    }
}

/// Lazily decoded quads. Terms shared by consecutive quads are decoded once.
pub struct Quads<'a> {
    inner: ConciseQuads<'a>,
    prefixes: &'a PrefixMap,
    graph: Option<(&'a str, GraphName)>,
    subject: Option<(&'a str, NamedOrBlankNode)>,
    predicate: Option<(&'a str, NamedNode)>,
}

impl<'a> Quads<'a> {
    pub(crate) fn new(index: &'a QuadIndex, prefixes: &'a PrefixMap) -> Self {
        Self {
            inner: ConciseQuads::new(index),
            prefixes,
            graph: None,
            subject: None,
            predicate: None,
        }
    }

    fn decode(&mut self, quad: ConciseQuad<'a>) -> Result<Quad> {
        let prefixes = self.prefixes;
        let graph = cached(&mut self.graph, quad.graph, |k| {
            concise::graph_from_key(k, prefixes)
        })?;
        let subject = cached(&mut self.subject, quad.subject, |k| {
            concise::subject_from_key(k, prefixes)
        })?;
        let predicate = cached(&mut self.predicate, quad.predicate, |k| {
            concise::predicate_from_key(k, prefixes)
        })?;
        let object = concise::object_from_key(quad.object, prefixes)?;
        Ok(Quad::new(subject, predicate, object, graph))
    }
}

fn cached<'a, T: Clone>(
    slot: &mut Option<(&'a str, T)>,
    key: &'a str,
    decode: impl FnOnce(&str) -> Result<T>,
) -> Result<T> {
    if let Some((cached_key, term)) = slot {
        if *cached_key == key {
            return Ok(term.clone());
        }
    }
    let term = decode(key)?;
    *slot = Some((key, term.clone()));
    Ok(term)
}

impl<'a> Iterator for Quads<'a> {
    type Item = Result<Quad>;

    fn next(&mut self) -> Option<Self::Item> {
        let quad = self.inner.next()?;
        Some(self.decode(quad))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(quads: &[(&str, &str, &str, &str)]) -> QuadTree {
        let mut builder = QuadTree::builder(PrefixMap::new().with("ex", "http://example.org/"));
        for (g, s, p, o) in quads {
            builder.add_quad_key(g, s, p, o);
        }
        builder.deliver()
    }

    #[test]
    fn iteration_visits_every_quad_once() {
        let tree = tree(&[
            ("*", "ex:a", "ex:p", "ex:b"),
            ("*", "ex:a", "ex:p", "\"lit"),
            ("ex:g", "ex:a", "ex:q", "ex:b"),
            ("ex:g", "ex:c", "ex:q", "@en\"hi"),
        ]);
        let keys: Vec<_> = tree.concise_quads().collect();
        assert_eq!(keys.len(), tree.len());
        assert_eq!(
            keys[0],
            ConciseQuad {
                graph: "*",
                subject: "ex:a",
                predicate: "ex:p",
                object: "ex:b"
            }
        );
        let quads = tree.iter().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(quads.len(), 4);
        assert!(quads.iter().all(|q| tree.has(q.as_ref())));
        // restartable
        assert_eq!((&tree).into_iter().count(), 4);
    }

    #[test]
    fn empty_tree_iterates_nothing() {
        let tree = QuadTree::empty(PrefixMap::new());
        assert_eq!(tree.iter().count(), 0);
        assert_eq!(tree.distinct_graph_count(), 1);
        assert!(tree.is_empty());
    }

    #[test]
    fn equality_is_order_independent_and_rejects_supersets() {
        let a = tree(&[("*", "ex:a", "ex:p", "ex:b"), ("ex:g", "ex:c", "ex:p", "ex:b")]);
        let b = tree(&[("ex:g", "ex:c", "ex:p", "ex:b"), ("*", "ex:a", "ex:p", "ex:b")]);
        let c = tree(&[
            ("*", "ex:a", "ex:p", "ex:b"),
            ("ex:g", "ex:c", "ex:p", "ex:b"),
            ("ex:g", "ex:c", "ex:p", "ex:d"),
        ]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(c, a);
        let d = tree(&[("*", "ex:a", "ex:p", "ex:b"), ("ex:h", "ex:c", "ex:p", "ex:b")]);
        assert_ne!(a, d);
    }

    #[test]
    fn distinct_terms_decode() {
        let tree = tree(&[("*", "ex:a", "ex:p", "ex:b"), ("*", "ex:b", "ex:q", "ex:b")]);
        let predicates = tree.distinct_predicates().unwrap();
        assert_eq!(predicates.len(), 2);
        assert_eq!(predicates[0].as_str(), "http://example.org/p");
        assert_eq!(tree.distinct_objects().unwrap().len(), 1);
        assert_eq!(tree.distinct_object_keys().collect::<Vec<_>>(), vec!["ex:b"]);
    }

    #[test]
    fn set_algebra_is_not_implemented() {
        let tree = tree(&[("*", "ex:a", "ex:p", "ex:b")]);
        assert_eq!(tree.union(&tree).err(), Some(QuadTreeError::NotImplemented("union")));
        assert_eq!(tree.contains(&tree).err(), Some(QuadTreeError::NotImplemented("contains")));
        assert_eq!(tree.normalize().err(), Some(QuadTreeError::NotImplemented("normalize")));
        assert_eq!(tree.sibling().err(), Some(QuadTreeError::NotImplemented("sibling")));
        assert!(matches!(
            tree.filter(|_| true),
            Err(QuadTreeError::NotImplemented("filter"))
        ));
    }
}
