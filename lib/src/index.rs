//! Nested graph → subject → predicate → object-set index with per-node counters.
//!
//! Every level keeps `keys` (live children) and `quads` (quads beneath it).
//! Counters are maintained on each insertion and removal and never
//! recomputed. Maps are insertion ordered; removals swap the last entry of a
//! map into the vacated slot.

use crate::consts::DEFAULT_GRAPH_KEY;
use crate::pool::Key;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use std::collections::HashSet;

/// Pooled object values under one (graph, subject, predicate) path.
pub type ObjectSet = IndexSet<Key>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectNode {
    pub(crate) predicates: IndexMap<Key, ObjectSet>,
    pub(crate) keys: usize,
    pub(crate) quads: usize,
}

impl SubjectNode {
    pub fn predicates(&self) -> impl Iterator<Item = (&str, &ObjectSet)> {
        self.predicates.iter().map(|(p, o)| (&**p, o))
    }

    pub fn key_count(&self) -> usize {
        self.keys
    }

    pub fn quad_count(&self) -> usize {
        self.quads
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphNode {
    pub(crate) subjects: IndexMap<Key, SubjectNode>,
    pub(crate) keys: usize,
    pub(crate) quads: usize,
}

impl GraphNode {
    pub fn subjects(&self) -> impl Iterator<Item = (&str, &SubjectNode)> {
        self.subjects.iter().map(|(s, n)| (&**s, n))
    }

    pub fn key_count(&self) -> usize {
        self.keys
    }

    pub fn quad_count(&self) -> usize {
        self.quads
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadIndex {
    pub(crate) graphs: IndexMap<Key, GraphNode>,
    pub(crate) keys: usize,
    pub(crate) quads: usize,
}

/// Counters and object set along one insertion path.
pub(crate) struct Leaf<'a> {
    pub root_quads: &'a mut usize,
    pub graph_quads: &'a mut usize,
    pub subject_quads: &'a mut usize,
    pub objects: &'a mut ObjectSet,
}

impl Default for QuadIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadIndex {
    /// Creates an index holding only the empty default graph.
    pub fn new() -> Self {
        let mut graphs = IndexMap::new();
        graphs.insert(Key::from(DEFAULT_GRAPH_KEY), GraphNode::default());
        Self {
            graphs,
            keys: 1,
            quads: 0,
        }
    }

    pub fn graphs(&self) -> impl Iterator<Item = (&str, &GraphNode)> {
        self.graphs.iter().map(|(g, n)| (&**g, n))
    }

    pub fn graph(&self, graph: &str) -> Option<&GraphNode> {
        self.graphs.get(graph)
    }

    /// Total number of quads.
    pub fn len(&self) -> usize {
        self.quads
    }

    pub fn is_empty(&self) -> bool {
        self.quads == 0
    }

    fn graph_entry(&mut self, graph: &Key) -> &mut GraphNode {
        let keys = &mut self.keys;
        self.graphs.entry(graph.clone()).or_insert_with(|| {
            *keys += 1;
            debug!("Opened graph {graph}");
            GraphNode::default()
        })
    }

    fn subject_entry<'a>(node: &'a mut GraphNode, subject: &Key) -> &'a mut SubjectNode {
        let keys = &mut node.keys;
        node.subjects.entry(subject.clone()).or_insert_with(|| {
            *keys += 1;
            SubjectNode::default()
        })
    }

    fn predicate_entry<'a>(node: &'a mut SubjectNode, predicate: &Key) -> &'a mut ObjectSet {
        let keys = &mut node.keys;
        node.predicates
            .entry(predicate.clone())
            .or_insert_with(|| {
                *keys += 1;
                ObjectSet::new()
            })
    }

    /// Locates or creates the graph node, returning its interned key.
    pub(crate) fn open_graph(&mut self, graph: &str) -> Key {
        if let Some((key, _)) = self.graphs.get_key_value(graph) {
            return key.clone();
        }
        let key = Key::from(graph);
        self.graph_entry(&key);
        key
    }

    pub(crate) fn open_subject(&mut self, graph: &Key, subject: &str) -> Key {
        let node = self.graph_entry(graph);
        if let Some((key, _)) = node.subjects.get_key_value(subject) {
            return key.clone();
        }
        let key = Key::from(subject);
        Self::subject_entry(node, &key);
        key
    }

    pub(crate) fn open_predicate(&mut self, graph: &Key, subject: &Key, predicate: &str) -> Key {
        let node = Self::subject_entry(self.graph_entry(graph), subject);
        if let Some((key, _)) = node.predicates.get_key_value(predicate) {
            return key.clone();
        }
        let key = Key::from(predicate);
        Self::predicate_entry(node, &key);
        key
    }

    /// Creates any missing node along the path and returns its counters.
    /// Only key-counts change here; quad-counts are left to the caller.
    pub(crate) fn leaf(&mut self, graph: &Key, subject: &Key, predicate: &Key) -> Leaf<'_> {
        let keys = &mut self.keys;
        let graph_node = self.graphs.entry(graph.clone()).or_insert_with(|| {
            *keys += 1;
            debug!("Opened graph {graph}");
            GraphNode::default()
        });
        let GraphNode {
            subjects,
            keys: graph_keys,
            quads: graph_quads,
        } = graph_node;
        let subject_node = subjects.entry(subject.clone()).or_insert_with(|| {
            *graph_keys += 1;
            SubjectNode::default()
        });
        let SubjectNode {
            predicates,
            keys: subject_keys,
            quads: subject_quads,
        } = subject_node;
        let objects = predicates.entry(predicate.clone()).or_insert_with(|| {
            *subject_keys += 1;
            ObjectSet::new()
        });
        Leaf {
            root_quads: &mut self.quads,
            graph_quads,
            subject_quads,
            objects,
        }
    }

    pub(crate) fn objects(&self, graph: &str, subject: &str, predicate: &str) -> Option<&ObjectSet> {
        self.graphs
            .get(graph)?
            .subjects
            .get(subject)?
            .predicates
            .get(predicate)
    }

    pub fn contains(&self, graph: &str, subject: &str, predicate: &str, object: &str) -> bool {
        self.objects(graph, subject, predicate)
            .is_some_and(|objects| objects.contains(object))
    }

    /// Removes one quad, dropping every node it leaves empty except the
    /// default graph. Returns `false` without touching anything when the quad
    /// is absent.
    pub(crate) fn remove(&mut self, graph: &str, subject: &str, predicate: &str, object: &str) -> bool {
        let Some(graph_node) = self.graphs.get_mut(graph) else {
            return false;
        };
        let Some(subject_node) = graph_node.subjects.get_mut(subject) else {
            return false;
        };
        let Some(objects) = subject_node.predicates.get_mut(predicate) else {
            return false;
        };
        if !objects.contains(object) {
            return false;
        }

        self.quads -= 1;
        if objects.len() == 1 {
            if subject_node.keys == 1 {
                if graph_node.keys == 1 && graph != DEFAULT_GRAPH_KEY {
                    self.graphs.swap_remove(graph);
                    self.keys -= 1;
                    debug!("Removed graph {graph}");
                    return true;
                }
                graph_node.subjects.swap_remove(subject);
                graph_node.keys -= 1;
                graph_node.quads -= 1;
                debug!("Removed subject {subject} from graph {graph}");
                return true;
            }
            subject_node.predicates.swap_remove(predicate);
            subject_node.keys -= 1;
        } else {
            objects.swap_remove(object);
        }
        subject_node.quads -= 1;
        graph_node.quads -= 1;
        true
    }

    /// Quad-count of one graph, zero when the graph is absent.
    pub fn graph_len(&self, graph: &str) -> usize {
        self.graphs.get(graph).map_or(0, |node| node.quads)
    }

    pub fn graph_count(&self) -> usize {
        self.keys
    }

    pub fn subject_count(&self) -> usize {
        if self.keys == 1 {
            if let Some(node) = self.graphs.get(DEFAULT_GRAPH_KEY) {
                return node.keys;
            }
        }
        self.graphs
            .values()
            .flat_map(|node| node.subjects.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn predicate_count(&self) -> usize {
        self.predicate_keys().len()
    }

    /// Distinct predicate keys across all graphs, in first-seen order.
    pub fn predicate_keys(&self) -> IndexSet<&str> {
        self.graphs
            .values()
            .flat_map(|node| node.subjects.values())
            .flat_map(|node| node.predicates.keys())
            .map(|p| &**p)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(index: &mut QuadIndex, g: &str, s: &str, p: &str, o: &str) {
        let leaf = index.leaf(&Key::from(g), &Key::from(s), &Key::from(p));
        if leaf.objects.insert(Key::from(o)) {
            *leaf.root_quads += 1;
            *leaf.graph_quads += 1;
            *leaf.subject_quads += 1;
        }
    }

    #[test]
    fn new_index_holds_empty_default_graph() {
        let index = QuadIndex::new();
        assert_eq!(index.graph_count(), 1);
        assert_eq!(index.len(), 0);
        assert_eq!(index.graph_len("*"), 0);
    }

    #[test]
    fn leaf_counts_keys_but_not_quads() {
        let mut index = QuadIndex::new();
        let leaf = index.leaf(&Key::from("ex:g"), &Key::from("ex:s"), &Key::from("ex:p"));
        assert!(leaf.objects.is_empty());
        assert_eq!(index.graph_count(), 2);
        assert_eq!(index.len(), 0);
        let graph = index.graph("ex:g").unwrap();
        assert_eq!(graph.key_count(), 1);
        assert_eq!(graph.quad_count(), 0);
    }

    #[test]
    fn remove_cascades_to_the_graph() {
        let mut index = QuadIndex::new();
        add(&mut index, "ex:g", "ex:s", "ex:p", "ex:o1");
        add(&mut index, "ex:g", "ex:s", "ex:p", "ex:o2");
        add(&mut index, "ex:g", "ex:s", "ex:q", "ex:o1");
        assert_eq!(index.len(), 3);

        assert!(index.remove("ex:g", "ex:s", "ex:p", "ex:o1"));
        assert_eq!(index.graph("ex:g").unwrap().subjects.get("ex:s").unwrap().quads, 2);
        assert!(index.remove("ex:g", "ex:s", "ex:p", "ex:o2"));
        let subject = &index.graph("ex:g").unwrap().subjects["ex:s"];
        assert_eq!((subject.keys, subject.quads), (1, 1));

        assert!(index.remove("ex:g", "ex:s", "ex:q", "ex:o1"));
        assert!(index.graph("ex:g").is_none());
        assert_eq!(index.graph_count(), 1);
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn default_graph_survives_its_last_quad() {
        let mut index = QuadIndex::new();
        add(&mut index, "*", "ex:s", "ex:p", "ex:o");
        assert!(index.remove("*", "ex:s", "ex:p", "ex:o"));
        let graph = index.graph("*").unwrap();
        assert_eq!((graph.keys, graph.quads), (0, 0));
        assert_eq!(index.graph_count(), 1);
    }

    #[test]
    fn removing_absent_quad_changes_nothing() {
        let mut index = QuadIndex::new();
        add(&mut index, "ex:g", "ex:s", "ex:p", "ex:o");
        let before = index.clone();
        assert!(!index.remove("ex:g", "ex:s", "ex:p", "ex:other"));
        assert!(!index.remove("ex:g", "ex:s", "ex:missing", "ex:o"));
        assert!(!index.remove("ex:missing", "ex:s", "ex:p", "ex:o"));
        assert_eq!(index, before);
    }

    #[test]
    fn counts_distinct_subjects_and_predicates_across_graphs() {
        let mut index = QuadIndex::new();
        add(&mut index, "*", "ex:a", "ex:p", "ex:o");
        add(&mut index, "*", "ex:b", "ex:p", "ex:o");
        add(&mut index, "*", "ex:b", "ex:q", "ex:o");
        assert_eq!(index.subject_count(), 2);
        assert_eq!(index.predicate_count(), 2);

        add(&mut index, "ex:g", "ex:a", "ex:r", "ex:o");
        add(&mut index, "ex:g", "ex:c", "ex:p", "ex:o");
        assert_eq!(index.subject_count(), 3);
        assert_eq!(index.predicate_count(), 3);
        assert_eq!(index.graph_len("ex:g"), 2);
        assert_eq!(index.graph_len("ex:none"), 0);
    }
}
