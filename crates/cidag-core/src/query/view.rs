use crate::{
    object::{Object, ObjectKey},
    query::graph::{Graph, ParentSlot},
    value::Value,
};
use std::{fmt, sync::Arc};

///
/// ObjectView
///
/// Immutable result of one pattern execution: for every registered type,
/// the ordered objects the pattern marked. The view also resolves parent and
/// child links against the snapshot it was built from. Cheap to clone and
/// safe to share across threads.
///

#[derive(Clone)]
pub struct ObjectView {
    inner: Arc<ViewInner>,
}

struct ViewInner {
    graph: Graph,
    buckets: Vec<Vec<usize>>,
}

impl ObjectView {
    pub(crate) fn new(graph: Graph, buckets: Vec<Vec<usize>>) -> Self {
        Self {
            inner: Arc::new(ViewInner { graph, buckets }),
        }
    }

    fn graph(&self) -> &Graph {
        &self.inner.graph
    }

    #[must_use]
    pub fn model(&self) -> &crate::model::ObjectModel {
        self.graph().model()
    }

    /// Every registered type with its bucket, in registration order.
    pub fn types(&self) -> impl Iterator<Item = (&str, Bucket<'_>)> {
        self.model()
            .types()
            .zip(&self.inner.buckets)
            .map(|(descriptor, indices)| {
                (
                    descriptor.name.as_str(),
                    Bucket {
                        graph: self.graph(),
                        indices,
                    },
                )
            })
    }

    /// Bucket of one type; empty for types the pattern never marked or the
    /// registry does not know.
    #[must_use]
    pub fn bucket(&self, type_name: &str) -> Bucket<'_> {
        let indices = self
            .model()
            .position(type_name)
            .map_or(&[][..], |position| self.inner.buckets[position].as_slice());

        Bucket {
            graph: self.graph(),
            indices,
        }
    }

    /// All result objects: types in registration order, then bucket order.
    pub fn iter(&self) -> impl Iterator<Item = ObjectRef<'_>> {
        self.types().flat_map(|(_, bucket)| bucket.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.buckets.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve any object of the snapshot by key, marked or not.
    #[must_use]
    pub fn get(&self, key: &ObjectKey) -> Option<ObjectRef<'_>> {
        let index = self.graph().objects().position(key)?;
        self.graph().type_of(index)?;

        Some(ObjectRef {
            graph: self.graph(),
            index,
        })
    }

    /// True if the pattern marked this object.
    #[must_use]
    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.bucket(key.type_name())
            .iter()
            .any(|object| object.key() == key)
    }
}

impl fmt::Debug for ObjectView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, bucket) in self.types() {
            map.entry(&name, &bucket);
        }
        map.finish()
    }
}

///
/// Bucket
/// Ordered result objects of one type.
///

#[derive(Clone, Copy)]
pub struct Bucket<'v> {
    graph: &'v Graph,
    indices: &'v [usize],
}

impl<'v> Bucket<'v> {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<ObjectRef<'v>> {
        let index = *self.indices.get(position)?;

        Some(ObjectRef {
            graph: self.graph,
            index,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectRef<'v>> + use<'v> {
        let graph = self.graph;
        self.indices
            .iter()
            .map(move |&index| ObjectRef { graph, index })
    }
}

impl fmt::Debug for Bucket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

///
/// ParentLink
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParentLink<'v> {
    /// The object's type has no parent relation.
    Root,
    Resolved(ObjectRef<'v>),
    /// Dangling (or absent) foreign key. Not an error.
    Unresolved(Option<&'v ObjectKey>),
}

///
/// ObjectRef
///
/// Borrowed handle to one object inside a view. Parent and child access is
/// a lookup against the view's indices.
///

#[derive(Clone, Copy)]
pub struct ObjectRef<'v> {
    graph: &'v Graph,
    index: usize,
}

impl<'v> ObjectRef<'v> {
    #[must_use]
    pub fn object(&self) -> &'v Object {
        self.graph.object(self.index)
    }

    #[must_use]
    pub fn key(&self) -> &'v ObjectKey {
        self.object().key()
    }

    #[must_use]
    pub fn type_name(&self) -> &'v str {
        self.object().type_name()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&'v Value> {
        self.object().get(path)
    }

    #[must_use]
    pub fn valid(&self) -> Option<bool> {
        self.object().valid()
    }

    #[must_use]
    pub fn parent(&self) -> ParentLink<'v> {
        match self.graph.parent(self.index) {
            ParentSlot::Root => ParentLink::Root,
            ParentSlot::Resolved(index) => ParentLink::Resolved(ObjectRef {
                graph: self.graph,
                index,
            }),
            ParentSlot::Unresolved => ParentLink::Unresolved(self.object().parent_key()),
        }
    }

    #[must_use]
    pub fn has_unresolved_parent(&self) -> bool {
        matches!(self.parent(), ParentLink::Unresolved(_))
    }

    /// Children of every type, in snapshot order.
    pub fn children(&self) -> impl Iterator<Item = ObjectRef<'v>> + use<'v> {
        let graph = self.graph;
        graph
            .children(self.index)
            .iter()
            .map(move |&index| ObjectRef { graph, index })
    }

    /// Resolved ancestors, nearest first; stops at a root or a dangling key.
    pub fn ancestors(&self) -> impl Iterator<Item = ObjectRef<'v>> + use<'v> {
        std::iter::successors(self.resolved_parent(), ObjectRef::resolved_parent)
    }

    fn resolved_parent(&self) -> Option<Self> {
        match self.parent() {
            ParentLink::Resolved(parent) => Some(parent),
            ParentLink::Root | ParentLink::Unresolved(_) => None,
        }
    }
}

impl PartialEq for ObjectRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.index == other.index
    }
}

impl fmt::Debug for ObjectRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
