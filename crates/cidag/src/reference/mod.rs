//! Reference data: the CI type set (Checkout, Build, Test) at schema major
//! 4, and the "test" rule catalog.


use crate::Error;
use cidag_core::model::{AttributeKind, ObjectModel, SchemaSupport, TypeDescriptor};
use cidag_monitor::catalog::Catalog;
use std::sync::Arc;

///
/// CONSTANTS
///

pub const CHECKOUT: &str = "Checkout";
pub const BUILD: &str = "Build";
pub const TEST: &str = "Test";

/// Supported batch schema: major 4, any minor.
pub const SCHEMA: SchemaSupport = SchemaSupport::new(4, 4, 0);

/// Catalog notifying on every object from the "test" origin.
pub const TEST_CATALOG: &str = include_str!("test_catalog.toml");

/// Type descriptors in registration order.
#[must_use]
pub fn descriptors() -> Vec<TypeDescriptor> {
    use AttributeKind::{Bool, Map, Number, Records, Text, Timestamp};

    vec![
        TypeDescriptor::new(CHECKOUT)
            .attribute("tree_name", Text)
            .attribute("git_repository_url", Text)
            .attribute("git_commit_hash", Text)
            .attribute("git_commit_name", Text)
            .attribute("git_repository_branch", Text)
            .attribute("patchset_files", Records)
            .attribute("patchset_hash", Text)
            .attribute("message_id", Text)
            .attribute("comment", Text)
            .attribute("start_time", Timestamp)
            .attribute("contacts", Records)
            .attribute("log_url", Text)
            .attribute("log_excerpt", Text)
            .attribute("valid", Bool)
            .attribute("misc", Map),
        TypeDescriptor::new(BUILD)
            .parent(CHECKOUT, "checkout_id")
            .attribute("comment", Text)
            .attribute("start_time", Timestamp)
            .attribute("duration", Number)
            .attribute("architecture", Text)
            .attribute("command", Text)
            .attribute("compiler", Text)
            .attribute("input_files", Records)
            .attribute("output_files", Records)
            .attribute("config_name", Text)
            .attribute("config_url", Text)
            .attribute("log_url", Text)
            .attribute("log_excerpt", Text)
            .attribute("valid", Bool)
            .attribute("misc", Map),
        TypeDescriptor::new(TEST)
            .parent(BUILD, "build_id")
            .attribute("environment", Map)
            .attribute("path", Text)
            .attribute("comment", Text)
            .attribute("log_url", Text)
            .attribute("log_excerpt", Text)
            .attribute("status", Text)
            .attribute("waived", Bool)
            .attribute("start_time", Timestamp)
            .attribute("duration", Number)
            .attribute("output_files", Records)
            .attribute("misc", Map),
    ]
}

/// The reference registry.
pub fn model() -> Result<Arc<ObjectModel>, Error> {
    let model = ObjectModel::from_descriptors(SCHEMA, descriptors())?;

    Ok(Arc::new(model))
}

/// The "test" catalog, validated against `model`.
pub fn test_catalog(model: &ObjectModel) -> Result<Catalog, Error> {
    Ok(Catalog::from_toml_str(TEST_CATALOG, model)?)
}
