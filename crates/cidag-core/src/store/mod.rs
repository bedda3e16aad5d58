//! Module: store
//! Responsibility: the relational-store boundary the core consumes, plus an
//! in-memory reference store.
//! Does not own: physical persistence or payload schema validation.
//!
//! Invariants:
//! - A batch is committed entirely or not at all.
//! - Snapshots handed out by `current_object_set` never change.

mod batch;


use crate::{
    model::{ObjectModel, SchemaVersion, SchemaVersionError, TypeDescriptor},
    obs::{MetricsEvent, record},
    object::{Object, ObjectKey, ObjectSet},
    value::Value,
};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

pub use batch::Batch;

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error(transparent)]
    SchemaVersion(#[from] SchemaVersionError),

    #[error("batch carries unknown collection '{0}'")]
    UnknownCollection(String),

    #[error("invalid record {index} in '{collection}': {reason}")]
    InvalidRecord {
        collection: String,
        index: usize,
        reason: String,
    },
}

///
/// LoadSummary
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoadSummary {
    pub version: Option<SchemaVersion>,
    /// Objects not seen before.
    pub inserted: usize,
    /// Objects that replaced an existing object with the same key.
    pub replaced: usize,
}

///
/// Store
///
/// Relational store as seen by the core: loads batches and hands out
/// immutable snapshots.
///

pub trait Store {
    fn load(&mut self, batch: Batch) -> Result<LoadSummary, StoreError>;

    fn current_object_set(&self) -> ObjectSet;
}

///
/// MemoryStore
///
/// In-memory reference store. Insertion order is preserved; reloading an
/// object with an existing key replaces it in place.
///

#[derive(Clone, Debug)]
pub struct MemoryStore {
    model: Arc<ObjectModel>,
    objects: Vec<Object>,
    index: HashMap<ObjectKey, usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(model: Arc<ObjectModel>) -> Self {
        Self {
            model,
            objects: Vec::new(),
            index: HashMap::new(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &ObjectModel {
        &self.model
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // Convert every record of a batch, in registration order of types.
    fn convert(&self, batch: &Batch) -> Result<Vec<Object>, StoreError> {
        if let Some(unknown) = batch
            .collections
            .keys()
            .find(|name| self.model.by_collection(name).is_none())
        {
            return Err(StoreError::UnknownCollection(unknown.clone()));
        }

        let mut converted = Vec::new();
        for descriptor in self.model.types() {
            let Some(records) = batch.collections.get(&descriptor.collection) else {
                continue;
            };
            for (index, record) in records.iter().enumerate() {
                let object = object_from_record(descriptor, record).map_err(|reason| {
                    StoreError::InvalidRecord {
                        collection: descriptor.collection.clone(),
                        index,
                        reason,
                    }
                })?;
                converted.push(object);
            }
        }

        Ok(converted)
    }
}

impl Store for MemoryStore {
    fn load(&mut self, batch: Batch) -> Result<LoadSummary, StoreError> {
        // Phase 1: validate version and convert without touching state.
        let converted = self
            .model
            .schema()
            .check(batch.version)
            .map_err(StoreError::from)
            .and_then(|()| self.convert(&batch))
            .inspect_err(|err| {
                warn!(version = %batch.version, error = %err, "batch rejected");
                record(MetricsEvent::BatchRejected);
            })?;

        // Phase 2: commit.
        let mut summary = LoadSummary {
            version: Some(batch.version),
            ..LoadSummary::default()
        };
        for object in converted {
            record(MetricsEvent::ObjectLoaded {
                type_name: object.type_name(),
            });
            if let Some(&pos) = self.index.get(object.key()) {
                self.objects[pos] = object;
                summary.replaced += 1;
            } else {
                self.index.insert(object.key().clone(), self.objects.len());
                self.objects.push(object);
                summary.inserted += 1;
            }
        }

        debug!(
            version = %batch.version,
            inserted = summary.inserted,
            replaced = summary.replaced,
            "batch loaded"
        );
        record(MetricsEvent::BatchLoaded {
            objects: (summary.inserted + summary.replaced) as u64,
        });

        Ok(summary)
    }

    fn current_object_set(&self) -> ObjectSet {
        ObjectSet::from_objects(self.objects.iter().cloned())
    }
}

// Build one object from a raw JSON record of a known type.
fn object_from_record(
    descriptor: &TypeDescriptor,
    record: &serde_json::Value,
) -> Result<Object, String> {
    let serde_json::Value::Object(fields) = record else {
        return Err("record is not an object".to_string());
    };
    let origin = text_field(fields, "origin")?;
    let key = ObjectKey::from_record_id(&descriptor.name, origin, text_field(fields, "id")?);
    let mut object = Object::new(key);

    // An absent or null foreign key leaves the parent unresolved; an explicit
    // null is still kept as an attribute.
    if let Some(relation) = &descriptor.parent {
        match fields.get(&relation.foreign_key) {
            None => {}
            Some(serde_json::Value::Null) => {
                object = object.with(relation.foreign_key.clone(), Value::Null);
            }
            Some(serde_json::Value::String(reference)) => {
                let parent = ObjectKey::from_reference(&relation.type_name, origin, reference);
                object = object.with_parent(&relation.foreign_key, parent);
            }
            Some(_) => {
                return Err(format!(
                    "foreign key '{}' must be text",
                    relation.foreign_key
                ));
            }
        }
    }

    for (name, raw) in fields {
        let is_foreign_key = descriptor
            .parent
            .as_ref()
            .is_some_and(|relation| &relation.foreign_key == name);
        if is_foreign_key {
            continue;
        }

        let value = descriptor
            .attribute_kind(name)
            .map_or_else(|| Value::from_json(raw), |kind| Value::from_json_as(kind, raw));
        object = object.with(name.clone(), value);
    }

    Ok(object)
}

fn text_field<'a>(
    fields: &'a serde_json::Map<String, serde_json::Value>,
    name: &str,
) -> Result<&'a str, String> {
    fields
        .get(name)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| format!("missing text field '{name}'"))
}
