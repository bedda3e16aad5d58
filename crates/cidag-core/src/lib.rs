//! Core runtime for cidag: the object model registry, object values, the
//! pattern language, the graph query executor and the store boundary.
//!
//! Nothing in this crate performs network I/O. Every query runs against an
//! immutable `ObjectSet` snapshot and produces an immutable `ObjectView`.

// public exports are one module level down
pub mod error;
pub mod model;
pub mod obs;
pub mod object;
pub mod pattern;
pub mod query;
pub mod store;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::Error;

///
/// CONSTANTS
///

/// Separator between origin and local id in a canonical object id.
pub const ID_SEPARATOR: char = ':';

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, stores or sinks are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{AttributeKind, ObjectModel, SchemaVersion, TypeDescriptor},
        object::{Object, ObjectKey, ObjectSet},
        pattern::{Direction, Pattern, TypeMatcher},
        query::{ObjectRef, ObjectView, ParentLink},
        value::Value,
    };
}
