//! Deduplicated table of object values shared by every graph of a store.

use indexmap::IndexMap;
use log::debug;
use std::sync::Arc;

/// Interned concise key shared between the index and the pool.
pub type Key = Arc<str>;

/// Back-references from an object value to the (predicate, subject) pairs
/// that reach it.
///
/// Each pair carries the number of graphs in which the quad exists, so a pair
/// used from several graphs survives until its last graph drops it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectRefs {
    pub(crate) predicates: IndexMap<Key, IndexMap<Key, usize>>,
    pub(crate) keys: usize,
    pub(crate) quads: usize,
}

/// One distinct object value and the references that keep it alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub(crate) value: Key,
    pub(crate) refs: ObjectRefs,
}

impl ObjectDescriptor {
    fn new(value: Key) -> Self {
        Self {
            value,
            refs: ObjectRefs::default(),
        }
    }

    /// The concise key of the object value.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn predicates(&self) -> impl Iterator<Item = &str> {
        self.refs.predicates.keys().map(|p| &**p)
    }

    /// Subjects reaching this value through `predicate`, in any graph.
    pub fn subjects<'a>(&'a self, predicate: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.refs
            .predicates
            .get(predicate)
            .into_iter()
            .flat_map(|subjects| subjects.keys().map(|s| &**s))
    }

    /// Number of graphs holding the quad (subject, predicate, this value).
    pub fn multiplicity(&self, predicate: &str, subject: &str) -> usize {
        self.refs
            .predicates
            .get(predicate)
            .and_then(|subjects| subjects.get(subject))
            .copied()
            .unwrap_or(0)
    }

    /// Number of quads, across all graphs, whose object is this value.
    pub fn quad_count(&self) -> usize {
        self.refs.quads
    }

    pub fn predicate_count(&self) -> usize {
        self.refs.keys
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPool {
    pub(crate) objects: IndexMap<Key, ObjectDescriptor>,
    pub(crate) keys: usize,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct object values.
    pub fn len(&self) -> usize {
        self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys == 0
    }

    pub fn get(&self, value: &str) -> Option<&ObjectDescriptor> {
        self.objects.get(value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.objects.contains_key(value)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(|v| &**v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectDescriptor> {
        self.objects.values()
    }

    /// Records that `subject` reaches `object` through `predicate` in one more
    /// graph, creating the descriptor on first sight. Returns the interned value.
    pub(crate) fn add_reference(&mut self, object: &str, predicate: &Key, subject: &Key) -> Key {
        let index = match self.objects.get_index_of(object) {
            Some(index) => index,
            None => {
                let value = Key::from(object);
                let (index, _) = self
                    .objects
                    .insert_full(value.clone(), ObjectDescriptor::new(value));
                self.keys += 1;
                debug!("Pooled new object value {object}");
                index
            }
        };
        let descriptor = &mut self.objects[index];
        let refs = &mut descriptor.refs;
        let subjects = match refs.predicates.get_index_of(&**predicate) {
            Some(index) => &mut refs.predicates[index],
            None => {
                refs.keys += 1;
                let (index, _) = refs.predicates.insert_full(predicate.clone(), IndexMap::new());
                &mut refs.predicates[index]
            }
        };
        *subjects.entry(subject.clone()).or_insert(0) += 1;
        refs.quads += 1;
        descriptor.value.clone()
    }

    /// Drops one graph's worth of the (predicate, subject) reference to `object`,
    /// destroying the descriptor once nothing reaches it.
    pub(crate) fn release(&mut self, object: &str, predicate: &str, subject: &str) {
        let Some(descriptor) = self.objects.get_mut(object) else {
            return;
        };
        let refs = &mut descriptor.refs;
        let Some(subjects) = refs.predicates.get_mut(predicate) else {
            return;
        };
        let Some(multiplicity) = subjects.get_mut(subject) else {
            return;
        };
        refs.quads -= 1;
        if *multiplicity > 1 {
            *multiplicity -= 1;
        } else if subjects.len() > 1 {
            subjects.swap_remove(subject);
        } else if refs.keys == 1 {
            self.objects.swap_remove(object);
            self.keys -= 1;
            debug!("Released object value {object}");
        } else {
            refs.predicates.swap_remove(predicate);
            refs.keys -= 1;
        }
    }
}
