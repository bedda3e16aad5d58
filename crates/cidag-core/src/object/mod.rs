//! Module: object
//! Responsibility: object identity, the generic object representation and
//! the immutable object-set snapshot queries run against.
//!
//! Invariants:
//! - `(type, origin, local id)` identity never changes after construction.
//! - An `ObjectSet` never holds two objects with the same key.


use crate::{ID_SEPARATOR, value::Value};
use derive_more::Deref;
use std::{collections::BTreeMap, collections::HashMap, fmt, sync::Arc};

///
/// ObjectKey
///
/// Canonical identity of one object. Two objects with the same local id
/// and different origins are distinct; no merging ever happens.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ObjectKey {
    type_name: String,
    origin: String,
    local_id: String,
}

impl ObjectKey {
    #[must_use]
    pub fn new(
        type_name: impl Into<String>,
        origin: impl Into<String>,
        local_id: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            origin: origin.into(),
            local_id: local_id.into(),
        }
    }

    /// Build a key from a record's declared origin and raw id.
    ///
    /// A raw id already prefixed with `origin:` is stripped of the prefix;
    /// anything else is taken as the local id verbatim.
    #[must_use]
    pub fn from_record_id(type_name: &str, origin: &str, raw_id: &str) -> Self {
        let local_id = raw_id
            .strip_prefix(origin)
            .and_then(|rest| rest.strip_prefix(ID_SEPARATOR))
            .unwrap_or(raw_id);

        Self::new(type_name, origin, local_id)
    }

    /// Build a key from a foreign-key value.
    ///
    /// The value is a canonical `origin:local-id`; a value without a
    /// separator is qualified with the referring object's origin.
    #[must_use]
    pub fn from_reference(type_name: &str, referrer_origin: &str, reference: &str) -> Self {
        match reference.split_once(ID_SEPARATOR) {
            Some((origin, local_id)) => Self::new(type_name, origin, local_id),
            None => Self::new(type_name, referrer_origin, reference),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[must_use]
    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// Client-facing identifier, `origin:local-id`.
    #[must_use]
    pub fn canonical_id(&self) -> String {
        format!("{}{ID_SEPARATOR}{}", self.origin, self.local_id)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}{ID_SEPARATOR}{})", self.type_name, self.origin, self.local_id)
    }
}

///
/// Object
///
/// Generic immutable value object. The attribute map always carries the
/// canonical `id` and the `origin`; everything else is open-ended.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    key: ObjectKey,
    parent: Option<ObjectKey>,
    attributes: BTreeMap<String, Value>,
}

impl Object {
    #[must_use]
    pub fn new(key: ObjectKey) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("id".to_string(), Value::Text(key.canonical_id()));
        attributes.insert("origin".to_string(), Value::Text(key.origin.clone()));

        Self {
            key,
            parent: None,
            attributes,
        }
    }

    /// Attach the parent key referenced by the foreign key `attribute`.
    #[must_use]
    pub fn with_parent(mut self, attribute: &str, parent: ObjectKey) -> Self {
        self.attributes
            .insert(attribute.to_string(), Value::Text(parent.canonical_id()));
        self.parent = Some(parent);
        self
    }

    /// Set one attribute. `id` and `origin` are identity and stay untouched.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if name != "id" && name != "origin" {
            self.attributes.insert(name, value.into());
        }
        self
    }

    #[must_use]
    pub const fn key(&self) -> &ObjectKey {
        &self.key
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.key.type_name
    }

    #[must_use]
    pub const fn parent_key(&self) -> Option<&ObjectKey> {
        self.parent.as_ref()
    }

    /// Tri-state validity: `None` when unknown.
    #[must_use]
    pub fn valid(&self) -> Option<bool> {
        self.attributes.get("valid").and_then(Value::as_bool)
    }

    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Read an attribute by dotted path (`misc.pipeline_id`).
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let head = self.attributes.get(segments.next()?)?;

        head.get_path(segments)
    }
}

///
/// ObjectSet
///
/// Immutable, cheaply cloneable snapshot of objects. Later loads into a
/// store never change a snapshot that was already handed out.
///

#[derive(Clone, Debug, Default, Deref)]
pub struct ObjectSet {
    #[deref]
    objects: Arc<[Object]>,
    index: Arc<HashMap<ObjectKey, usize>>,
}

impl ObjectSet {
    /// Build a snapshot. A later object with an already-seen key replaces
    /// the earlier one in place.
    #[must_use]
    pub fn from_objects(objects: impl IntoIterator<Item = Object>) -> Self {
        let mut list: Vec<Object> = Vec::new();
        let mut index = HashMap::new();

        for object in objects {
            if let Some(&pos) = index.get(object.key()) {
                list[pos] = object;
            } else {
                index.insert(object.key().clone(), list.len());
                list.push(object);
            }
        }

        Self {
            objects: list.into(),
            index: Arc::new(index),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.index.contains_key(key)
    }

    #[must_use]
    pub fn position(&self, key: &ObjectKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    #[must_use]
    pub fn get(&self, key: &ObjectKey) -> Option<&Object> {
        self.position(key).map(|pos| &self.objects[pos])
    }
}
