use cidag_core::{
    model::{AttributeKind, ObjectModel, SchemaSupport, TypeDescriptor},
    object::{Object, ObjectKey, ObjectSet},
    pattern::Pattern,
    query::{ObjectView, QueryExecutor},
    value::Value,
};
use std::sync::Arc;

pub(crate) const CHECKOUT: &str = "Checkout";
pub(crate) const BUILD: &str = "Build";
pub(crate) const TEST: &str = "Test";

pub(crate) fn ci_model() -> Arc<ObjectModel> {
    let model = ObjectModel::from_descriptors(
        SchemaSupport::new(4, 4, 0),
        [
            TypeDescriptor::new(CHECKOUT)
                .attribute("valid", AttributeKind::Bool)
                .attribute("git_repository_branch", AttributeKind::Text)
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
    Object::new(ObjectKey::new(CHECKOUT, origin, id))
        .with("valid", true)
        .with("git_repository_branch", "master")
}

pub(crate) fn build(origin: &str, id: &str, checkout: &str) -> Object {
    Object::new(ObjectKey::new(BUILD, origin, id))
        .with_parent("checkout_id", ObjectKey::new(CHECKOUT, origin, checkout))
        .with("architecture", "x86_64")
        .with("duration", 237.5)
}

pub(crate) fn test(origin: &str, id: &str, build: &str, status: &str) -> Object {
    Object::new(ObjectKey::new(TEST, origin, id))
        .with_parent("build_id", ObjectKey::new(BUILD, origin, build))
        .with("status", status)
        .with("path", "boot.smoke")
}

/// C1 -> B1 -> {T1 ERROR, T2 PASS}; B2 (dangling checkout) -> T3 FAIL.
pub(crate) fn ci_objects() -> ObjectSet {
    ObjectSet::from_objects([
        checkout("a", "C1"),
        build("a", "B1", "C1"),
        build("a", "B2", "C9"),
        test("a", "T1", "B1", "ERROR"),
        test("a", "T2", "B1", "PASS"),
        test("a", "T3", "B2", "FAIL"),
        Object::new(ObjectKey::new(TEST, "a", "T4")).with("status", Value::Null),
    ])
}

/// Execute `pattern` against `objects` under the fixture model.
pub(crate) fn view_of(pattern: &str, objects: &ObjectSet) -> ObjectView {
    let model = ci_model();
    let pattern = Pattern::parse(pattern, &model).expect("fixture pattern parses");

    QueryExecutor::new(model).execute(&pattern, objects)
}

/// Every object of the fixture set, marked.
pub(crate) fn full_view() -> ObjectView {
    view_of(">*#", &ci_objects())
}

/// Failing tests and slow builds, two templates.
pub(crate) const CI_CATALOG: &str = r#"
[templates.failure]
from = "bot@example.org"
to = ["ci@example.org", "dev@example.org"]
message_id = "failure-{type}"
subject = "{type} {id} finished with {status}"
body = """
Test {path} on {origin} reported {status}.
See <{id}> & friends.
"""

[templates.generic]
to = ["ci@example.org"]
subject = "{type}: {id}"
body = "{type} {local_id} from {origin}"

[[rules]]
name = "test-failed"
type = "Test"
template = "failure"
when = { compare = { field = "status", op = "in", value = ["ERROR", "FAIL"] } }

[[rules]]
name = "test-any"
type = "Test"
template = "generic"

[[rules]]
name = "slow-build"
type = "Build"
template = "generic"
when = { compare = { field = "duration", op = "gt", value = 100 } }
"#;

pub(crate) fn ci_catalog() -> crate::catalog::Catalog {
    crate::catalog::Catalog::from_toml_str(CI_CATALOG, &ci_model()).expect("fixture catalog")
}
