use crate::{
    model::{AttributeKind, ObjectModel, SchemaSupport, TypeDescriptor},
    object::{Object, ObjectKey, ObjectSet},
};
use std::sync::Arc;

pub(crate) const CHECKOUT: &str = "Checkout";
pub(crate) const BUILD: &str = "Build";
pub(crate) const TEST: &str = "Test";

/// Three-level hierarchy Checkout -> Build -> Test.
pub(crate) fn ci_model() -> Arc<ObjectModel> {
    let model = ObjectModel::from_descriptors(
        SchemaSupport::new(4, 4, 0),
        [
            TypeDescriptor::new(CHECKOUT)
                .attribute("valid", AttributeKind::Bool)
                .attribute("start_time", AttributeKind::Timestamp)
                .attribute("misc", AttributeKind::Map),
            TypeDescriptor::new(BUILD)
                .parent(CHECKOUT, "checkout_id")
                .attribute("architecture", AttributeKind::Text)
                .attribute("duration", AttributeKind::Number),
            TypeDescriptor::new(TEST)
                .parent(BUILD, "build_id")
                .attribute("status", AttributeKind::Text)
                .attribute("path", AttributeKind::Text),
        ],
    )
    .expect("fixture model registers");

    Arc::new(model)
}

pub(crate) fn checkout(origin: &str, id: &str) -> Object {
    Object::new(ObjectKey::new(CHECKOUT, origin, id)).with("valid", true)
}

pub(crate) fn build(origin: &str, id: &str, checkout: &str) -> Object {
    Object::new(ObjectKey::new(BUILD, origin, id))
        .with_parent("checkout_id", ObjectKey::new(CHECKOUT, origin, checkout))
}

pub(crate) fn test(origin: &str, id: &str, build: &str, status: &str) -> Object {
    Object::new(ObjectKey::new(TEST, origin, id))
        .with_parent("build_id", ObjectKey::new(BUILD, origin, build))
        .with("status", status)
}

/// C1 -> {B1 -> {T1, T2}, B2 -> {T3}}, C2 (no builds), all origin "a".
pub(crate) fn ci_objects() -> ObjectSet {
    ObjectSet::from_objects([
        checkout("a", "C1"),
        checkout("a", "C2"),
        build("a", "B1", "C1"),
        build("a", "B2", "C1"),
        test("a", "T1", "B1", "ERROR"),
        test("a", "T2", "B1", "PASS"),
        test("a", "T3", "B2", "FAIL"),
    ])
}
