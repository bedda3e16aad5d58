//! End-to-end checks: store, pattern, catalog, renderer and transport.

use cidag::{
    core::{
        model::ObjectModel,
        object::ObjectKey,
        query::ParentLink,
        store::{Batch, MemoryStore, Store},
    },
    monitor::{render::NOTIFICATION_ID_HEADER, transport::MemoryTransport},
    prelude::*,
    reference,
};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

const ERROR_CATALOG: &str = r#"
[templates.failure]
to = ["ci@example.org"]
subject = "{type} {id} is {status}"
body = "Test {path} failed with {status}"

[[rules]]
name = "test-error"
type = "Test"
template = "failure"
when = { compare = { field = "status", op = "eq", value = "ERROR" } }
"#;

fn model() -> Arc<ObjectModel> {
    reference::model().unwrap()
}

fn store_with(batch: serde_json::Value) -> MemoryStore {
    let mut store = MemoryStore::new(model());
    store.load(Batch::from_json(batch).unwrap()).unwrap();
    store
}

fn batch(build_id: &str) -> serde_json::Value {
    json!({
        "version": {"major": 4, "minor": 0},
        "checkouts": [{"id": "a:C1", "origin": "a", "valid": true}],
        "builds": [{"id": "a:B1", "origin": "a", "checkout_id": "a:C1"}],
        "tests": [{
            "id": "a:T1",
            "origin": "a",
            "build_id": build_id,
            "status": "ERROR",
            "path": "boot"
        }]
    })
}

fn error_monitor() -> Monitor {
    Monitor::from_toml_str(model(), ERROR_CATALOG).unwrap()
}

#[test]
fn error_test_yields_one_notification() {
    let store = store_with(batch("a:B1"));
    let monitor = error_monitor();

    let view = monitor.query(&store, ">*#").unwrap();
    let report = match_view(&view, monitor.catalog());
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].object.key(), &ObjectKey::new("Test", "a", "T1"));

    let message = Renderer::new(monitor.catalog())
        .render(&report.matches[0])
        .unwrap();
    assert_eq!(message.header(NOTIFICATION_ID_HEADER).as_deref(), Some("Test"));
    assert!(message.subject.contains("Test"));
    assert!(message.subject.contains("a:T1"));
}

#[test]
fn dangling_build_still_notifies_on_the_test() {
    let store = store_with(batch("a:B404"));
    let monitor = error_monitor();

    let view = monitor.query(&store, ">*#").unwrap();
    let t1 = view.get(&ObjectKey::new("Test", "a", "T1")).unwrap();
    assert!(view.contains(t1.key()));
    assert!(t1.has_unresolved_parent());
    assert_eq!(
        t1.parent(),
        ParentLink::Unresolved(Some(&ObjectKey::new("Build", "a", "B404")))
    );

    let report = match_view(&view, monitor.catalog());
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].object, t1);
}

#[test]
fn empty_store_yields_empty_view_and_no_matches() {
    let store = MemoryStore::new(model());
    let monitor = error_monitor();

    for pattern in [">*#", ">Checkout#", ">Checkout>Build>Test#", "<*#"] {
        let view = monitor.query(&store, pattern).unwrap();
        assert!(view.is_empty(), "{pattern}");
        assert_eq!(view.types().count(), 3);
        assert!(match_view(&view, monitor.catalog()).matches.is_empty());
    }
}

#[test]
fn run_sends_once_and_suppresses_repeats() {
    let store = store_with(batch("a:B1"));
    let monitor = error_monitor();
    let transport = MemoryTransport::new();

    let first = monitor.run(&store, ">*#", &transport).unwrap();
    assert_eq!(first.objects, 3);
    assert_eq!(first.matched, 1);
    assert_eq!(first.rendered, 1);
    assert_eq!(first.sent, 1);
    assert_eq!(first.soft_failures(), 0);

    let second = monitor.run(&store, ">*#", &transport).unwrap();
    assert_eq!(second.sent, 0);
    assert_eq!(second.duplicates, 1);
    assert_eq!(transport.len(), 1);
}

#[test]
fn soft_failures_are_reported_not_raised() {
    let mut store = MemoryStore::new(model());
    store
        .load(
            Batch::from_json(json!({
                "version": {"major": 4, "minor": 1},
                "tests": [
                    // No path: renders nothing.
                    {"id": "a:T1", "origin": "a", "build_id": "a:B1", "status": "ERROR"},
                    // No status: the rule cannot be evaluated.
                    {"id": "a:T2", "origin": "a", "build_id": "a:B1"},
                    {"id": "a:T3", "origin": "a", "build_id": "a:B1", "status": "ERROR", "path": "ok"}
                ]
            }))
            .unwrap(),
        )
        .unwrap();

    let transport = MemoryTransport::new();
    let report = error_monitor().run(&store, ">*#", &transport).unwrap();

    assert_eq!(report.objects, 3);
    assert_eq!(report.matched, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.render_failures.len(), 1);
    assert_eq!(report.sent, 1);
    assert_eq!(transport.sent()[0].subject, "Test a:T3 is ERROR");
}

#[test]
fn explicit_null_foreign_key_is_visible_to_predicates() {
    const DETACHED: &str = r#"
[templates.detached]
to = ["ci@example.org"]
subject = "{type} {id} has no build"
body = "{id}"

[[rules]]
name = "detached-test"
type = "Test"
template = "detached"
when = { is_null = { field = "build_id" } }
"#;

    let mut store = MemoryStore::new(model());
    store
        .load(
            Batch::from_json(json!({
                "version": {"major": 4, "minor": 0},
                "tests": [
                    {"id": "a:T1", "origin": "a", "build_id": null},
                    {"id": "a:T2", "origin": "a"},
                    {"id": "a:T3", "origin": "a", "build_id": "a:B1"}
                ]
            }))
            .unwrap(),
        )
        .unwrap();

    let monitor = Monitor::from_toml_str(model(), DETACHED).unwrap();
    let view = monitor.query(&store, ">*#").unwrap();
    let report = match_view(&view, monitor.catalog());

    // T1 carries `build_id = null`; T2 has no `build_id` at all.
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].object.key(), &ObjectKey::new("Test", "a", "T1"));
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].object, ObjectKey::new("Test", "a", "T2"));
}

#[test]
fn bad_pattern_aborts_the_run() {
    let store = MemoryStore::new(model());
    let err = error_monitor()
        .run(&store, ">Patch#", &MemoryTransport::new())
        .unwrap_err();

    assert_eq!(err.kind, cidag::ErrorKind::Pattern);
}

#[test]
fn unsupported_major_is_rejected_before_anything_loads() {
    let mut store = MemoryStore::new(model());
    let mut raw = batch("a:B1");
    raw["version"] = json!({"major": 5, "minor": 0});

    let err: cidag::Error = store
        .load(Batch::from_json(raw).unwrap())
        .unwrap_err()
        .into();

    assert_eq!(err.kind, cidag::ErrorKind::Unsupported);
    assert!(store.is_empty());
}

fn arb_batch() -> impl Strategy<Value = serde_json::Value> {
    prop::collection::vec((0..3usize, prop_oneof![Just("ERROR"), Just("PASS")]), 0..12).prop_map(
        |tests| {
            let tests: Vec<_> = tests
                .iter()
                .enumerate()
                .map(|(i, (build, status))| {
                    json!({
                        "id": format!("a:T{i}"),
                        "origin": "a",
                        "build_id": format!("a:B{build}"),
                        "status": status,
                        "path": "p"
                    })
                })
                .collect();

            json!({
                "version": {"major": 4, "minor": 0},
                "checkouts": [{"id": "a:C1", "origin": "a"}],
                "builds": [
                    {"id": "a:B0", "origin": "a", "checkout_id": "a:C1"},
                    {"id": "a:B1", "origin": "a", "checkout_id": "a:C1"}
                ],
                "tests": tests
            })
        },
    )
}

proptest! {
    #[test]
    fn matching_is_deterministic(raw in arb_batch()) {
        let store = store_with(raw.clone());
        let monitor = error_monitor();

        let keys = |view: &ObjectView| {
            match_view(view, monitor.catalog())
                .matches
                .iter()
                .map(|m| m.object.key().clone())
                .collect::<Vec<_>>()
        };

        let first = monitor.query(&store, ">*#").unwrap();
        let second = monitor.query(&store, ">*#").unwrap();
        prop_assert_eq!(keys(&first), keys(&second));

        let errors = raw["tests"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|t| t["status"] == "ERROR")
            .count();
        prop_assert_eq!(keys(&first).len(), errors);
    }

    #[test]
    fn rendered_parts_carry_the_same_content(raw in arb_batch()) {
        let store = store_with(raw);
        let transport = MemoryTransport::new();
        error_monitor().run(&store, ">*#", &transport).unwrap();

        for message in transport.sent() {
            let [text, html] = message.parts();
            prop_assert_eq!(text.charset, "utf-8");
            prop_assert_eq!(html.charset, "utf-8");
            prop_assert_eq!(&html.content, &format!("<pre>{}</pre>", text.content));
        }
    }
}
