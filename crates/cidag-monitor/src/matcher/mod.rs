//! Module: matcher
//! Responsibility: evaluate catalog rules against every object of a view.
//! Does not own: rule configuration (see `catalog`) or rendering.
//!
//! Invariants:
//! - Output order is type registration order, then view order within a
//!   type.
//! - Rules for a type are tried in catalog order; the first that matches
//!   wins, so each matching object yields exactly one result.
//! - A predicate that fails on a missing attribute skips that pairing only;
//!   the next rule for the type is still tried.
//! - No deduplication across objects.

#[cfg(test)]
mod tests;

use crate::{
    catalog::{Catalog, Rule},
    predicate::{EvalError, eval},
};
use cidag_core::{
    obs::{MetricsEvent, record},
    object::ObjectKey,
    query::{ObjectRef, ObjectView},
};
use std::fmt;
use tracing::{debug, warn};

///
/// MatchResult
/// One object and the first rule it satisfied.
///

#[derive(Clone, Copy)]
pub struct MatchResult<'a> {
    pub object: ObjectRef<'a>,
    pub rule: &'a Rule,
}

impl MatchResult<'_> {
    #[must_use]
    pub fn template(&self) -> &str {
        &self.rule.template
    }
}

impl fmt::Debug for MatchResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchResult")
            .field("object", &self.object)
            .field("rule", &self.rule.name)
            .finish()
    }
}

///
/// RuleSkip
/// Soft failure: the rule could not be evaluated for this object.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleSkip {
    pub object: ObjectKey,
    pub rule: String,
    pub error: EvalError,
}

///
/// MatchReport
///

#[derive(Debug, Default)]
pub struct MatchReport<'a> {
    pub matches: Vec<MatchResult<'a>>,
    pub skipped: Vec<RuleSkip>,
}

impl MatchReport<'_> {
    #[must_use]
    pub const fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Match every object of `view` against the rules `catalog` holds for its
/// type, stopping at the first rule that matches.
#[must_use]
pub fn match_view<'a>(view: &'a ObjectView, catalog: &'a Catalog) -> MatchReport<'a> {
    let mut report = MatchReport::default();

    for object in view.iter() {
        for rule in catalog.rules_for(object.type_name()) {
            match eval(&object, &rule.when) {
                Ok(matched) => {
                    record(MetricsEvent::RuleEvaluated {
                        type_name: object.type_name(),
                        matched,
                    });
                    if matched {
                        report.matches.push(MatchResult { object, rule });
                        break;
                    }
                }
                Err(error) => {
                    warn!(object = %object.key(), rule = %rule.name, %error, "rule skipped");
                    record(MetricsEvent::RuleSkipped {
                        type_name: object.type_name(),
                    });
                    report.skipped.push(RuleSkip {
                        object: object.key().clone(),
                        rule: rule.name.clone(),
                        error,
                    });
                }
            }
        }
    }

    debug!(
        objects = view.len(),
        matches = report.matches.len(),
        skipped = report.skipped.len(),
        "view matched"
    );

    report
}
