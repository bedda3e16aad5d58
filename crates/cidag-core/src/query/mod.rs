//! Module: query
//! Responsibility: execute a parsed `Pattern` against an `ObjectSet`,
//! producing an immutable `ObjectView`.
//! Does not own: parsing (see `pattern`) or storage (see `store`).
//!
//! Invariants:
//! - Indices are built once per execution and are read-only afterwards.
//! - A concrete hop advances exactly one relation; a wildcard hop takes the
//!   breadth-first transitive closure in its direction.
//! - Result buckets keep first-seen order; an object appears at most once.
//! - Execution is a pure function of (pattern, snapshot, registry).

mod graph;
mod view;


use crate::{
    model::ObjectModel,
    obs::{MetricsEvent, record},
    object::ObjectSet,
    pattern::{Direction, Hop, Pattern, TypeMatcher},
};
use graph::{Graph, Node};
use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};
use tracing::debug;

pub use view::{Bucket, ObjectRef, ObjectView, ParentLink};

///
/// QueryExecutor
///
/// Runs patterns against snapshots for one registry. Holds no state
/// between executions.
///

#[derive(Clone, Debug)]
pub struct QueryExecutor {
    model: Arc<ObjectModel>,
}

impl QueryExecutor {
    #[must_use]
    pub const fn new(model: Arc<ObjectModel>) -> Self {
        Self { model }
    }

    #[must_use]
    pub fn model(&self) -> &ObjectModel {
        &self.model
    }

    /// Execute a pattern hop by hop, left to right.
    #[must_use]
    pub fn execute(&self, pattern: &Pattern, objects: &ObjectSet) -> ObjectView {
        let graph = Graph::build(Arc::clone(&self.model), objects.clone());
        let mut result = ResultBuilder::new(graph.type_count());
        let mut edges = 0u64;
        let mut reached_total = 0u64;

        let mut frontier = vec![Node::Root];
        for hop in pattern.hops() {
            let reached = advance(&graph, &frontier, hop, &mut edges);
            reached_total = reached_total.saturating_add(reached.len() as u64);

            if hop.marked {
                result.extend(&graph, &reached);
            }
            frontier = reached.into_iter().map(Node::Object).collect();
        }

        debug!(
            pattern = %pattern,
            reached = reached_total,
            edges,
            "pattern executed"
        );
        record(MetricsEvent::QueryExecuted {
            hops: pattern.hops().len() as u64,
            objects_reached: reached_total,
            edges_traversed: edges,
        });

        ObjectView::new(graph, result.buckets)
    }
}

// Objects newly reached by one hop, in first-seen order.
fn advance(graph: &Graph, frontier: &[Node], hop: &Hop, edges: &mut u64) -> Vec<usize> {
    match &hop.matcher {
        TypeMatcher::Type(name) => match graph.model().position(name) {
            Some(position) => step(graph, frontier, hop.direction, position, edges),
            None => Vec::new(),
        },
        TypeMatcher::Any => closure(graph, frontier, hop.direction, edges),
    }
}

// One relation hop, keeping only objects of the requested type.
fn step(
    graph: &Graph,
    frontier: &[Node],
    direction: Direction,
    type_position: usize,
    edges: &mut u64,
) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut reached = Vec::new();

    for &node in frontier {
        for &next in graph.neighbors(node, direction) {
            *edges += 1;
            if graph.type_of(next) == Some(type_position) && seen.insert(next) {
                reached.push(next);
            }
        }
    }

    reached
}

// Breadth-first transitive closure; the relation graph is a DAG, so this
// terminates once no new object is reached.
fn closure(graph: &Graph, frontier: &[Node], direction: Direction, edges: &mut u64) -> Vec<usize> {
    let mut visited: HashSet<Node> = frontier.iter().copied().collect();
    let mut queue: VecDeque<Node> = frontier.iter().copied().collect();
    let mut reached = Vec::new();

    while let Some(node) = queue.pop_front() {
        for &next in graph.closure_neighbors(node, direction) {
            *edges += 1;
            if graph.type_of(next).is_some() && visited.insert(Node::Object(next)) {
                reached.push(next);
                queue.push_back(Node::Object(next));
            }
        }
    }

    reached
}

///
/// ResultBuilder
/// Accumulates marked objects into per-type buckets.
///

struct ResultBuilder {
    buckets: Vec<Vec<usize>>,
    marked: HashSet<usize>,
}

impl ResultBuilder {
    fn new(type_count: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); type_count],
            marked: HashSet::new(),
        }
    }

    fn extend(&mut self, graph: &Graph, reached: &[usize]) {
        for &index in reached {
            if let Some(position) = graph.type_of(index)
                && self.marked.insert(index)
            {
                self.buckets[position].push(index);
            }
        }
    }
}
