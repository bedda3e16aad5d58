//! One monitoring pass: query a store snapshot, match the catalog, render
//! and hand every message to a transport.

use crate::{Error, reference};
use cidag_core::{
    model::ObjectModel,
    pattern::Pattern,
    query::{ObjectView, QueryExecutor},
    store::Store,
};
use cidag_monitor::{
    catalog::Catalog,
    matcher::{RuleSkip, match_view},
    render::{DedupId, RenderFailure, Renderer},
    transport::{Delivery, Transport, TransportError},
};
use std::sync::Arc;
use tracing::{info, warn};

///
/// TransportFailure
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportFailure {
    pub dedup_id: DedupId,
    pub subject: String,
    pub error: TransportError,
}

///
/// RunReport
///
/// Outcome of one pass. Soft failures are listed, never raised.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunReport {
    /// Objects the pattern marked.
    pub objects: usize,
    pub matched: usize,
    pub rendered: usize,
    pub sent: usize,
    pub duplicates: usize,
    pub skipped: Vec<RuleSkip>,
    pub render_failures: Vec<RenderFailure>,
    pub transport_failures: Vec<TransportFailure>,
}

impl RunReport {
    /// Total per-object soft failures across all stages.
    #[must_use]
    pub const fn soft_failures(&self) -> usize {
        self.skipped.len() + self.render_failures.len() + self.transport_failures.len()
    }
}

///
/// Monitor
///
/// Registry, catalog and executor bundled for repeated passes. Holds no
/// state between runs.
///

#[derive(Clone, Debug)]
pub struct Monitor {
    catalog: Catalog,
    executor: QueryExecutor,
}

impl Monitor {
    #[must_use]
    pub const fn new(model: Arc<ObjectModel>, catalog: Catalog) -> Self {
        Self {
            catalog,
            executor: QueryExecutor::new(model),
        }
    }

    /// Load a TOML catalog against `model`.
    pub fn from_toml_str(model: Arc<ObjectModel>, catalog: &str) -> Result<Self, Error> {
        let catalog = Catalog::from_toml_str(catalog, &model)?;

        Ok(Self::new(model, catalog))
    }

    /// Reference registry with the "test" catalog.
    pub fn reference() -> Result<Self, Error> {
        let model = reference::model()?;
        let catalog = reference::test_catalog(&model)?;

        Ok(Self::new(model, catalog))
    }

    #[must_use]
    pub fn model(&self) -> &ObjectModel {
        self.executor.model()
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn parse(&self, pattern: &str) -> Result<Pattern, Error> {
        Ok(Pattern::parse(pattern, self.model())?)
    }

    /// Run `pattern` against the store's current snapshot.
    pub fn query<S>(&self, store: &S, pattern: &str) -> Result<ObjectView, Error>
    where
        S: Store + ?Sized,
    {
        let pattern = self.parse(pattern)?;

        Ok(self.executor.execute(&pattern, &store.current_object_set()))
    }

    /// Query, match, render and send. Only a bad pattern aborts the run.
    pub fn run<S, T>(&self, store: &S, pattern: &str, transport: &T) -> Result<RunReport, Error>
    where
        S: Store + ?Sized,
        T: Transport + ?Sized,
    {
        let view = self.query(store, pattern)?;

        Ok(self.notify(&view, transport))
    }

    /// Match, render and send for an existing view.
    pub fn notify<T>(&self, view: &ObjectView, transport: &T) -> RunReport
    where
        T: Transport + ?Sized,
    {
        // Phase 1: match.
        let matches = match_view(view, &self.catalog);

        // Phase 2: render.
        let rendered = Renderer::new(&self.catalog).render_all(&matches.matches);

        // Phase 3: send.
        let mut report = RunReport {
            objects: view.len(),
            matched: matches.matches.len(),
            rendered: rendered.messages.len(),
            skipped: matches.skipped,
            render_failures: rendered.failures,
            ..RunReport::default()
        };

        for message in &rendered.messages {
            match transport.send(message) {
                Ok(Delivery::Sent) => report.sent += 1,
                Ok(Delivery::Duplicate) => report.duplicates += 1,
                Err(error) => {
                    warn!(dedup_id = %message.dedup_id, %error, "send failed");
                    report.transport_failures.push(TransportFailure {
                        dedup_id: message.dedup_id,
                        subject: message.subject.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            objects = report.objects,
            matched = report.matched,
            sent = report.sent,
            duplicates = report.duplicates,
            soft_failures = report.soft_failures(),
            "monitor pass complete"
        );

        report
    }
}
