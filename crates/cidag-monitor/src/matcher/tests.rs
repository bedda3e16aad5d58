use super::*;
use crate::{
    catalog::{CatalogConfig, TemplateConfig},
    predicate::Predicate,
    test_fixtures::{BUILD, TEST, ci_catalog, ci_model, ci_objects, full_view, view_of},
};
use cidag_core::{
    obs::{metrics_report, metrics_reset_all},
    object::ObjectSet,
};

fn pairs(report: &MatchReport<'_>) -> Vec<(String, String)> {
    report
        .matches
        .iter()
        .map(|m| (m.object.key().to_string(), m.rule.name.clone()))
        .collect()
}

fn catalog_with(rules: Vec<Rule>) -> Catalog {
    let mut config = CatalogConfig {
        rules,
        ..CatalogConfig::default()
    };
    config.templates.insert(
        "t".to_string(),
        TemplateConfig {
            from: None,
            to: vec!["ci@example.org".to_string()],
            message_id: "{type}".to_string(),
            subject: "{id}".to_string(),
            body: "{id}".to_string(),
        },
    );

    Catalog::new(config, &ci_model()).unwrap()
}

fn rule(name: &str, type_name: &str, when: Predicate) -> Rule {
    Rule {
        name: name.to_string(),
        type_name: type_name.to_string(),
        template: "t".to_string(),
        when,
    }
}

#[test]
fn results_follow_registration_then_view_order() {
    let view = full_view();
    let catalog = ci_catalog();
    let report = match_view(&view, &catalog);

    // Buckets keep breadth-first order: orphans B2 and T4 hang off the
    // virtual root and are reached before the children of C1.
    let expected = [
        ("Build(a:B2)", "slow-build"),
        ("Build(a:B1)", "slow-build"),
        ("Test(a:T4)", "test-any"),
        ("Test(a:T3)", "test-failed"),
        ("Test(a:T1)", "test-failed"),
        ("Test(a:T2)", "test-any"),
    ];
    let expected: Vec<_> = expected
        .iter()
        .map(|(o, r)| ((*o).to_string(), (*r).to_string()))
        .collect();

    assert_eq!(pairs(&report), expected);
    assert!(report.skipped.is_empty());
}

#[test]
fn repeated_matching_is_deterministic() {
    let catalog = ci_catalog();
    let first = full_view();
    let second = full_view();

    assert_eq!(
        pairs(&match_view(&first, &catalog)),
        pairs(&match_view(&second, &catalog))
    );
}

#[test]
fn only_marked_objects_are_matched() {
    let catalog = ci_catalog();
    let view = view_of(">Checkout>Build#", &ci_objects());
    let report = match_view(&view, &catalog);

    // B2 is an orphan, not a child of any checkout.
    assert_eq!(
        pairs(&report),
        [("Build(a:B1)".to_string(), "slow-build".to_string())]
    );
}

#[test]
fn missing_attribute_skips_the_pairing_and_reports_it() {
    metrics_reset_all();
    let view = full_view();
    let catalog = catalog_with(vec![
        rule("by-path", TEST, Predicate::eq("path", "boot.smoke")),
        rule("always", TEST, Predicate::True),
    ]);

    let report = match_view(&view, &catalog);

    // T4 has no path: its `by-path` pairing is skipped and `always` is tried
    // next. The other tests stop at `by-path`.
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.skipped[0].object.to_string(), "Test(a:T4)");
    assert_eq!(report.skipped[0].rule, "by-path");
    assert_eq!(
        pairs(&report)
            .iter()
            .filter(|(_, rule)| rule == "always")
            .collect::<Vec<_>>(),
        [&("Test(a:T4)".to_string(), "always".to_string())]
    );
    assert_eq!(report.matches.len(), 4);

    let metrics = metrics_report();
    assert_eq!(metrics.ops.rules_skipped, 1);
    assert_eq!(metrics.ops.rules_evaluated, 4);
    assert_eq!(metrics.ops.rules_matched, 4);
    assert_eq!(metrics.types[TEST].rules_skipped, 1);
}

#[test]
fn first_matching_rule_wins_for_each_object() {
    let view = full_view();
    let catalog = catalog_with(vec![
        rule("never", TEST, Predicate::False),
        rule("first", TEST, Predicate::True),
        rule("second", TEST, Predicate::True),
    ]);
    let report = match_view(&view, &catalog);

    assert_eq!(report.matches.len(), 4);
    assert!(report.matches.iter().all(|m| m.rule.name == "first"));

    let mut objects: Vec<_> = report.matches.iter().map(|m| m.object.key()).collect();
    objects.dedup();
    assert_eq!(objects.len(), 4);
}

#[test]
fn distinct_objects_are_not_deduplicated() {
    let view = full_view();
    let catalog = catalog_with(vec![rule("builds", BUILD, Predicate::True)]);

    assert_eq!(match_view(&view, &catalog).matches.len(), 2);
}

#[test]
fn empty_view_yields_no_results() {
    let view = view_of(">*#", &ObjectSet::default());
    let catalog = ci_catalog();
    let report = match_view(&view, &catalog);

    assert!(report.matches.is_empty());
    assert!(report.skipped.is_empty());
}

#[test]
fn match_result_exposes_template_name() {
    let view = full_view();
    let catalog = ci_catalog();
    let report = match_view(&view, &catalog);

    assert_eq!(report.matches[0].template(), "generic");
}
