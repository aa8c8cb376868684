//! Diagnoses drift between the maintained counters of a store and what a full
//! traversal finds. Nothing here repairs a store; problems are only reported.

use crate::builder::QuadTreeBuilder;
use crate::consts::DEFAULT_GRAPH_KEY;
use crate::dataset::QuadTree;
use crate::index::QuadIndex;
use crate::pool::ObjectPool;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterProblem {
    /// Path to the offending node, e.g. `graph ex:g / subject ex:s`.
    pub location: String,
    pub message: String,
}

impl fmt::Display for CounterProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// The structures a check looks at, borrowed from a tree or a builder.
#[derive(Clone, Copy)]
pub struct Structures<'a> {
    pool: &'a ObjectPool,
    index: &'a QuadIndex,
}

impl<'a> Structures<'a> {
    pub fn pool(&self) -> &'a ObjectPool {
        self.pool
    }

    pub fn index(&self) -> &'a QuadIndex {
        self.index
    }
}

impl<'a> From<&'a QuadTree> for Structures<'a> {
    fn from(tree: &'a QuadTree) -> Self {
        Self {
            pool: tree.pool(),
            index: tree.index(),
        }
    }
}

impl<'a> From<&'a QuadTreeBuilder> for Structures<'a> {
    fn from(builder: &'a QuadTreeBuilder) -> Self {
        Self {
            pool: &builder.pool,
            index: &builder.index,
        }
    }
}

pub trait CounterCheck {
    fn name(&self) -> &str;
    fn check(&mut self, store: Structures<'_>, problems: &mut Vec<CounterProblem>);
}

pub struct Doctor {
    checks: Vec<Box<dyn CounterCheck>>,
}

impl Default for Doctor {
    /// A doctor running every built-in check.
    fn default() -> Self {
        let mut doctor = Self::new();
        doctor.add_check(Box::new(IndexCounters {}));
        doctor.add_check(Box::new(PoolCounters {}));
        doctor.add_check(Box::new(PoolCoverage {}));
        doctor
    }
}

impl Doctor {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn add_check(&mut self, check: Box<dyn CounterCheck>) {
        self.checks.push(check);
    }

    pub fn run<'a>(&mut self, store: impl Into<Structures<'a>>) -> Vec<CounterProblem> {
        let store = store.into();
        let mut problems = Vec::new();
        for check in &mut self.checks {
            let before = problems.len();
            check.check(store, &mut problems);
            if problems.len() > before {
                log::debug!("{} found {} problem(s)", check.name(), problems.len() - before);
            }
        }
        problems
    }
}

/// Runs every built-in check.
pub fn audit<'a>(store: impl Into<Structures<'a>>) -> Vec<CounterProblem> {
    Doctor::default().run(store)
}

fn mismatch(location: String, counter: &str, maintained: usize, actual: usize) -> CounterProblem {
    CounterProblem {
        location,
        message: format!("{counter} is {maintained} but traversal finds {actual}"),
    }
}

/// Key and quad counters of every index node, plus node minimality.
pub struct IndexCounters {}

impl CounterCheck for IndexCounters {
    fn name(&self) -> &str {
        "Index Counters"
    }

    fn check(&mut self, store: Structures<'_>, problems: &mut Vec<CounterProblem>) {
        let index = store.index;
        if index.graph(DEFAULT_GRAPH_KEY).is_none() {
            problems.push(CounterProblem {
                location: "root".to_string(),
                message: "default graph is missing".to_string(),
            });
        }
        if index.keys != index.graphs.len() {
            problems.push(mismatch("root".into(), "key-count", index.keys, index.graphs.len()));
        }

        let mut root_quads = 0;
        for (graph, node) in &index.graphs {
            let location = format!("graph {graph}");
            if node.keys != node.subjects.len() {
                problems.push(mismatch(location.clone(), "key-count", node.keys, node.subjects.len()));
            }
            if node.subjects.is_empty() && &**graph != DEFAULT_GRAPH_KEY {
                problems.push(CounterProblem {
                    location: location.clone(),
                    message: "empty graph was not removed".to_string(),
                });
            }

            let mut graph_quads = 0;
            for (subject, subject_node) in &node.subjects {
                let location = format!("{location} / subject {subject}");
                if subject_node.keys != subject_node.predicates.len() {
                    problems.push(mismatch(
                        location.clone(),
                        "key-count",
                        subject_node.keys,
                        subject_node.predicates.len(),
                    ));
                }
                if subject_node.predicates.is_empty() {
                    problems.push(CounterProblem {
                        location: location.clone(),
                        message: "empty subject was not removed".to_string(),
                    });
                }
                let mut subject_quads = 0;
                for (predicate, objects) in &subject_node.predicates {
                    if objects.is_empty() {
                        problems.push(CounterProblem {
                            location: format!("{location} / predicate {predicate}"),
                            message: "empty predicate was not removed".to_string(),
                        });
                    }
                    subject_quads += objects.len();
                }
                if subject_node.quads != subject_quads {
                    problems.push(mismatch(location, "quad-count", subject_node.quads, subject_quads));
                }
                graph_quads += subject_node.quads;
            }
            if node.quads != graph_quads {
                problems.push(mismatch(location, "quad-count", node.quads, graph_quads));
            }
            root_quads += node.quads;
        }
        if index.quads != root_quads {
            problems.push(mismatch("root".into(), "quad-count", index.quads, root_quads));
        }
    }
}

/// Pool key-count and the key/quad counters of each descriptor's refs.
pub struct PoolCounters {}

impl CounterCheck for PoolCounters {
    fn name(&self) -> &str {
        "Pool Counters"
    }

    fn check(&mut self, store: Structures<'_>, problems: &mut Vec<CounterProblem>) {
        let pool = store.pool;
        if pool.keys != pool.objects.len() {
            problems.push(mismatch("pool".into(), "key-count", pool.keys, pool.objects.len()));
        }
        for (value, descriptor) in &pool.objects {
            let location = format!("object {value}");
            let refs = &descriptor.refs;
            if refs.keys != refs.predicates.len() {
                problems.push(mismatch(location.clone(), "refs key-count", refs.keys, refs.predicates.len()));
            }
            let quads: usize = refs.predicates.values().flat_map(|s| s.values()).sum();
            if refs.quads != quads {
                problems.push(mismatch(location.clone(), "refs quad-count", refs.quads, quads));
            }
            if refs.predicates.is_empty() {
                problems.push(CounterProblem {
                    location,
                    message: "descriptor has no references".to_string(),
                });
            }
        }
    }
}

/// Every indexed object has a descriptor whose references match the index
/// exactly, and no descriptor outlives its last quad.
pub struct PoolCoverage {}

impl CounterCheck for PoolCoverage {
    fn name(&self) -> &str {
        "Pool Coverage"
    }

    fn check(&mut self, store: Structures<'_>, problems: &mut Vec<CounterProblem>) {
        // (object, predicate, subject) -> number of graphs holding the quad
        let mut expected: HashMap<(&str, &str, &str), usize> = HashMap::new();
        for node in store.index.graphs.values() {
            for (subject, subject_node) in &node.subjects {
                for (predicate, objects) in &subject_node.predicates {
                    for object in objects {
                        *expected
                            .entry((&**object, &**predicate, &**subject))
                            .or_default() += 1;
                    }
                }
            }
        }

        for ((object, predicate, subject), graphs) in &expected {
            let found = store
                .pool
                .get(*object)
                .map_or(0, |d| d.multiplicity(predicate, subject));
            if found != *graphs {
                problems.push(mismatch(
                    format!("object {object} / predicate {predicate} / subject {subject}"),
                    "multiplicity",
                    found,
                    *graphs,
                ));
            }
        }
        for descriptor in store.pool.iter() {
            for predicate in descriptor.predicates() {
                for subject in descriptor.subjects(predicate) {
                    if !expected.contains_key(&(descriptor.value(), predicate, subject)) {
                        problems.push(CounterProblem {
                            location: format!("object {}", descriptor.value()),
                            message: format!("stale reference from {subject} {predicate}"),
                        });
                    }
                }
            }
        }
    }
}
