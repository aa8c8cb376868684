//! Cursors over one graph, subject or predicate of a [`QuadTreeBuilder`].
//!
//! A handle borrows its builder mutably and only remembers the keys of its
//! path, so it can never outlive a mutation made elsewhere. Every operation
//! resolves the path again; nodes removed by a cascading delete through the
//! same handle are recreated by the next insertion.

use crate::builder::QuadTreeBuilder;
use crate::pool::Key;

pub struct GraphHandle<'a> {
    builder: &'a mut QuadTreeBuilder,
    graph: Key,
}

impl<'a> GraphHandle<'a> {
    pub(crate) fn new(builder: &'a mut QuadTreeBuilder, graph: &str) -> Self {
        let graph = builder.index.open_graph(graph);
        Self { builder, graph }
    }

    pub fn key(&self) -> &str {
        &self.graph
    }

    /// Locates or creates `subject` within this graph.
    pub fn open_subject(&mut self, subject: &str) -> SubjectHandle<'_> {
        let subject = self.builder.index.open_subject(&self.graph, subject);
        SubjectHandle {
            builder: self.builder,
            graph: self.graph.clone(),
            subject,
        }
    }
}

pub struct SubjectHandle<'a> {
    builder: &'a mut QuadTreeBuilder,
    graph: Key,
    subject: Key,
}

impl<'a> SubjectHandle<'a> {
    pub(crate) fn new(builder: &'a mut QuadTreeBuilder, graph: &str, subject: &str) -> Self {
        let graph = builder.index.open_graph(graph);
        let subject = builder.index.open_subject(&graph, subject);
        Self {
            builder,
            graph,
            subject,
        }
    }

    pub fn key(&self) -> &str {
        &self.subject
    }

    pub fn graph(&self) -> &str {
        &self.graph
    }

    pub fn open_predicate(&mut self, predicate: &str) -> PredicateHandle<'_> {
        let predicate = self
            .builder
            .index
            .open_predicate(&self.graph, &self.subject, predicate);
        PredicateHandle {
            builder: self.builder,
            graph: self.graph.clone(),
            subject: self.subject.clone(),
            predicate,
        }
    }

    /// Shorthand for `open_predicate(predicate).add_object(object)`.
    pub fn add_predicate_object(&mut self, predicate: &str, object: &str) -> bool {
        self.open_predicate(predicate).add_object(object)
    }
}

pub struct PredicateHandle<'a> {
    builder: &'a mut QuadTreeBuilder,
    graph: Key,
    subject: Key,
    predicate: Key,
}

impl PredicateHandle<'_> {
    pub fn key(&self) -> &str {
        &self.predicate
    }

    /// Adds `object` under this path. Returns `false` if the quad already exists.
    pub fn add_object(&mut self, object: &str) -> bool {
        let builder = &mut *self.builder;
        let leaf = builder.index.leaf(&self.graph, &self.subject, &self.predicate);
        if leaf.objects.contains(object) {
            return false;
        }
        let value = builder
            .pool
            .add_reference(object, &self.predicate, &self.subject);
        leaf.objects.insert(value);
        *leaf.root_quads += 1;
        *leaf.graph_quads += 1;
        *leaf.subject_quads += 1;
        true
    }

    /// Removes `object` from this path, cascading empty nodes away.
    /// Returns `false` if the quad does not exist.
    pub fn delete_object(&mut self, object: &str) -> bool {
        self.builder
            .remove_quad_key(&self.graph, &self.subject, &self.predicate, object)
    }

    pub fn has_object(&self, object: &str) -> bool {
        self.builder
            .index
            .contains(&self.graph, &self.subject, &self.predicate, object)
    }
}
