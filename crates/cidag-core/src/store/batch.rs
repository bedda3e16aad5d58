use crate::model::SchemaVersion;
use serde::Deserialize;
use std::collections::BTreeMap;

///
/// Batch
///
/// One unit of raw input in the JSON I/O format:
/// `{"version": {"major": 4, "minor": 0}, "checkouts": [...], ...}`.
/// Every key other than `version` names a type's collection.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Batch {
    pub version: SchemaVersion,

    #[serde(flatten)]
    pub collections: BTreeMap<String, Vec<serde_json::Value>>,
}

impl Batch {
    #[must_use]
    pub const fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            collections: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_records(
        mut self,
        collection: impl Into<String>,
        records: impl IntoIterator<Item = serde_json::Value>,
    ) -> Self {
        self.collections
            .entry(collection.into())
            .or_default()
            .extend(records);
        self
    }

    pub fn from_json(json: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json)
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }
}
