//! Module: model
//! Responsibility: the registry of object types, their attributes and their
//! parent relations, plus the schema versions the registry understands.
//! Does not own: object storage, traversal, or payload validation.
//!
//! Invariants:
//! - Type names and collection names are unique within one registry.
//! - A parent relation may only name a type registered earlier, so the
//!   relation graph between types is always acyclic.
//! - Registration is append-only; descriptors never change once registered.

mod version;


use crate::{
    object::{Object, ObjectKey, ObjectSet},
    pattern::is_ident_char,
};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error as ThisError;

pub use version::{SchemaSupport, SchemaVersion, SchemaVersionError};

///
/// ModelError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ModelError {
    #[error("type '{0}' already registered")]
    DuplicateType(String),

    #[error("collection '{collection}' already used by type '{owner}'")]
    DuplicateCollection { collection: String, owner: String },

    #[error("invalid relation on type '{type_name}': {reason}")]
    InvalidRelation { type_name: String, reason: String },

    #[error("type name '{0}' must be non-empty and use only ASCII letters, digits and '_'")]
    InvalidTypeName(String),

    #[error("type '{0}' is not registered")]
    UnknownType(String),
}

///
/// AttributeKind
///
/// Semantic type of one declared attribute.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Text,
    Number,
    /// Boolean or unknown (null).
    Bool,
    Timestamp,
    /// Free-form mapping.
    Map,
    /// Sequence of values or sub-records.
    Records,
}

///
/// AttributeDescriptor
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct AttributeDescriptor {
    pub name: String,
    pub kind: AttributeKind,
}

///
/// ParentRelation
/// Parent type plus the foreign-key attribute that references it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ParentRelation {
    #[serde(rename = "type")]
    pub type_name: String,
    pub foreign_key: String,
}

///
/// TypeDescriptor
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct TypeDescriptor {
    pub name: String,

    /// Batch key carrying records of this type; defaults to the lower-cased
    /// name with an `s` suffix.
    #[serde(default)]
    pub collection: String,

    #[serde(default)]
    pub attributes: Vec<AttributeDescriptor>,

    #[serde(default)]
    pub parent: Option<ParentRelation>,
}

impl TypeDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let collection = default_collection(&name);

        Self {
            name,
            collection,
            attributes: Vec::new(),
            parent: None,
        }
    }

    #[must_use]
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        self.attributes.push(AttributeDescriptor {
            name: name.into(),
            kind,
        });
        self
    }

    /// Declare the parent relation. The foreign key is added as a text
    /// attribute if it was not declared already.
    #[must_use]
    pub fn parent(mut self, type_name: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        let foreign_key = foreign_key.into();
        if self.attribute_kind(&foreign_key).is_none() {
            self = self.attribute(foreign_key.clone(), AttributeKind::Text);
        }
        self.parent = Some(ParentRelation {
            type_name: type_name.into(),
            foreign_key,
        });
        self
    }

    #[must_use]
    pub fn attribute_kind(&self, name: &str) -> Option<AttributeKind> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.kind)
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

fn default_collection(name: &str) -> String {
    format!("{}s", name.to_lowercase())
}

///
/// ParentOf
/// Outcome of resolving an object's foreign key against an object set.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParentOf {
    /// The object's type has no parent relation.
    Root,
    Resolved(ObjectKey),
    /// The foreign key names no loaded object; `None` when the key itself
    /// is absent.
    Unresolved(Option<ObjectKey>),
}

///
/// ObjectModel
///
/// Append-only registry of type descriptors, kept in registration order.
///

#[derive(Clone, Debug)]
pub struct ObjectModel {
    types: Vec<TypeDescriptor>,
    by_name: HashMap<String, usize>,
    by_collection: HashMap<String, usize>,
    schema: SchemaSupport,
}

impl ObjectModel {
    #[must_use]
    pub fn new(schema: SchemaSupport) -> Self {
        Self {
            types: Vec::new(),
            by_name: HashMap::new(),
            by_collection: HashMap::new(),
            schema,
        }
    }

    /// Build a registry from descriptors, registering them in order.
    pub fn from_descriptors(
        schema: SchemaSupport,
        descriptors: impl IntoIterator<Item = TypeDescriptor>,
    ) -> Result<Self, ModelError> {
        let mut model = Self::new(schema);
        for descriptor in descriptors {
            model.register(descriptor)?;
        }

        Ok(model)
    }

    /// Register one type descriptor.
    pub fn register(&mut self, mut descriptor: TypeDescriptor) -> Result<(), ModelError> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(ModelError::DuplicateType(descriptor.name));
        }
        if descriptor.name.is_empty() || !descriptor.name.chars().all(is_ident_char) {
            return Err(ModelError::InvalidTypeName(descriptor.name));
        }
        if descriptor.collection.is_empty() {
            descriptor.collection = default_collection(&descriptor.name);
        }
        if let Some(owner) = self.by_collection.get(&descriptor.collection) {
            return Err(ModelError::DuplicateCollection {
                collection: descriptor.collection,
                owner: self.types[*owner].name.clone(),
            });
        }

        if let Some(relation) = &descriptor.parent {
            if !self.by_name.contains_key(&relation.type_name) {
                return Err(ModelError::InvalidRelation {
                    reason: format!("parent type '{}' is not registered", relation.type_name),
                    type_name: descriptor.name,
                });
            }
            if descriptor.attribute_kind(&relation.foreign_key) != Some(AttributeKind::Text) {
                return Err(ModelError::InvalidRelation {
                    reason: format!(
                        "foreign key '{}' must be a declared text attribute",
                        relation.foreign_key
                    ),
                    type_name: descriptor.name,
                });
            }
        }

        let position = self.types.len();
        self.by_name.insert(descriptor.name.clone(), position);
        self.by_collection
            .insert(descriptor.collection.clone(), position);
        self.types.push(descriptor);

        Ok(())
    }

    //
    // Lookup
    //

    #[must_use]
    pub const fn schema(&self) -> &SchemaSupport {
        &self.schema
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.position(name).map(|pos| &self.types[pos])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registration position of a type; iteration everywhere follows it.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn by_collection(&self, collection: &str) -> Option<&TypeDescriptor> {
        self.by_collection.get(collection).map(|pos| &self.types[*pos])
    }

    /// Registered types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Types with no parent relation, in registration order.
    pub fn root_types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter().filter(|t| t.is_root())
    }

    /// Types whose parent relation names `name`, in registration order.
    pub fn child_types<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TypeDescriptor> {
        self.types.iter().filter(move |t| {
            t.parent
                .as_ref()
                .is_some_and(|relation| relation.type_name == name)
        })
    }

    //
    // Identity
    //

    /// Build the canonical key for one object of a registered type.
    pub fn resolve(
        &self,
        type_name: &str,
        local_id: &str,
        origin: &str,
    ) -> Result<ObjectKey, ModelError> {
        if !self.contains(type_name) {
            return Err(ModelError::UnknownType(type_name.to_string()));
        }

        Ok(ObjectKey::new(type_name, origin, local_id))
    }

    /// Resolve an object's parent against the supplied object set.
    ///
    /// A dangling foreign key is not an error; it comes back as
    /// `ParentOf::Unresolved`.
    #[must_use]
    pub fn parent_of(&self, object: &Object, objects: &ObjectSet) -> ParentOf {
        let Some(relation) = self
            .get(object.type_name())
            .and_then(|descriptor| descriptor.parent.as_ref())
        else {
            return ParentOf::Root;
        };

        match object.parent_key() {
            Some(key) if key.type_name() == relation.type_name && objects.contains(key) => {
                ParentOf::Resolved(key.clone())
            }
            key => ParentOf::Unresolved(key.cloned()),
        }
    }
}
