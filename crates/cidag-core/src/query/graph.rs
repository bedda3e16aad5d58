use crate::{
    model::{ObjectModel, ParentOf},
    obs::{MetricsEvent, record},
    object::{Object, ObjectSet},
    pattern::Direction,
};
use std::sync::Arc;
use tracing::debug;

///
/// Node
/// Traversal position: the virtual root, or one object in the arena.
/// Concrete hops see the root's root-type children only; wildcard closures
/// also see every orphan.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Node {
    Root,
    Object(usize),
}

///
/// ParentSlot
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ParentSlot {
    Root,
    Resolved(usize),
    Unresolved,
}

///
/// Graph
///
/// Per-execution indices over one snapshot. Objects are addressed by their
/// position in the snapshot; parent and child links are positions, never
/// owning references. Built once, read-only afterwards.
///

pub(crate) struct Graph {
    model: Arc<ObjectModel>,
    objects: ObjectSet,
    /// Registration position of each object's type; `None` if unregistered.
    type_of: Vec<Option<usize>>,
    by_type: Vec<Vec<usize>>,
    parents: Vec<ParentSlot>,
    children: Vec<Vec<usize>>,
    /// Root-type objects, then orphans; the first `root_count` are roots.
    entry: Vec<usize>,
    root_count: usize,
}

impl Graph {
    pub(crate) fn build(model: Arc<ObjectModel>, objects: ObjectSet) -> Self {
        let count = objects.len();
        let mut type_of = Vec::with_capacity(count);
        let mut by_type = vec![Vec::new(); model.len()];
        let mut parents = vec![ParentSlot::Root; count];
        let mut children = vec![Vec::new(); count];

        // Phase 1: per-type index.
        for (index, object) in objects.iter().enumerate() {
            let position = model.position(object.type_name());
            if let Some(position) = position {
                by_type[position].push(index);
            }
            type_of.push(position);
        }

        // Phase 2: parent slots and the children index keyed by parent.
        for (index, object) in objects.iter().enumerate() {
            let parent = match model.parent_of(object, &objects) {
                ParentOf::Root => continue,
                ParentOf::Resolved(key) => objects.position(&key),
                ParentOf::Unresolved(_) => None,
            };

            match parent {
                Some(parent) => {
                    parents[index] = ParentSlot::Resolved(parent);
                    children[parent].push(index);
                }
                None => {
                    parents[index] = ParentSlot::Unresolved;
                    debug!(object = %object.key(), "unresolved parent");
                    record(MetricsEvent::UnresolvedParent {
                        type_name: object.type_name(),
                    });
                }
            }
        }

        // Phase 3: children of the virtual root. Root-type objects first, then
        // objects whose parent did not resolve, both in registration order.
        let mut entry: Vec<usize> = model
            .types()
            .zip(&by_type)
            .filter(|(descriptor, _)| descriptor.is_root())
            .flat_map(|(_, indices)| indices.iter().copied())
            .collect();
        let root_count = entry.len();
        entry.extend(
            by_type
                .iter()
                .flatten()
                .copied()
                .filter(|&index| parents[index] == ParentSlot::Unresolved),
        );

        Self {
            model,
            objects,
            type_of,
            by_type,
            parents,
            children,
            entry,
            root_count,
        }
    }

    pub(crate) fn model(&self) -> &ObjectModel {
        &self.model
    }

    pub(crate) fn objects(&self) -> &ObjectSet {
        &self.objects
    }

    pub(crate) fn object(&self, index: usize) -> &Object {
        &self.objects[index]
    }

    pub(crate) fn type_of(&self, index: usize) -> Option<usize> {
        self.type_of[index]
    }

    pub(crate) fn type_count(&self) -> usize {
        self.by_type.len()
    }

    pub(crate) fn parent(&self, index: usize) -> ParentSlot {
        self.parents[index]
    }

    pub(crate) fn children(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    /// Adjacent objects of a node in one direction, as one concrete hop sees
    /// them.
    pub(crate) fn neighbors(&self, node: Node, direction: Direction) -> &[usize] {
        match (node, direction) {
            (Node::Root, Direction::Forward) => &self.entry[..self.root_count],
            (Node::Root, Direction::Backward) => &[],
            (Node::Object(index), Direction::Forward) => &self.children[index],
            (Node::Object(index), Direction::Backward) => match &self.parents[index] {
                ParentSlot::Resolved(parent) => std::slice::from_ref(parent),
                ParentSlot::Root | ParentSlot::Unresolved => &[],
            },
        }
    }

    /// Like `neighbors`, but a forward walk from the virtual root also starts
    /// at every orphan, so a closure never loses a detached subtree.
    pub(crate) fn closure_neighbors(&self, node: Node, direction: Direction) -> &[usize] {
        match (node, direction) {
            (Node::Root, Direction::Forward) => &self.entry,
            _ => self.neighbors(node, direction),
        }
    }
}
