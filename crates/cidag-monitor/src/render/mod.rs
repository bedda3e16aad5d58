//! Module: render
//! Responsibility: turn a `MatchResult` into a fully formed `Message`.
//! Does not own: delivery (see `transport`).
//!
//! Invariants:
//! - A message is rendered completely or not at all.
//! - Every message has exactly one plain-text and one HTML part, both
//!   UTF-8, built from the same substituted body.

mod template;


use crate::{
    catalog::{Catalog, Template},
    matcher::MatchResult,
};
use cidag_core::{
    obs::{MetricsEvent, record},
    object::ObjectKey,
    query::ObjectRef,
};
use derive_more::Display;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error as ThisError;
use tracing::{debug, warn};

pub use template::{Segment, TemplateError, TemplateText};

///
/// CONSTANTS
///

/// Header carrying the notification id the transport threads and
/// deduplicates on.
pub const NOTIFICATION_ID_HEADER: &str = "X-Cidag-Notification-Message-ID";

/// Charset of every rendered part.
pub const CHARSET: &str = "utf-8";

const DEDUP_DOMAIN_TAG: &[u8] = b"cidag:dedup:v1";

///
/// RenderError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RenderError {
    #[error("template '{template}' references field '{field}' missing on {object}")]
    TemplateField {
        template: String,
        field: String,
        object: String,
    },

    #[error("rule '{rule}' refers to template '{template}' not in this catalog")]
    UnknownTemplate { rule: String, template: String },
}

///
/// ContentType
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ContentType {
    #[display("text/plain")]
    TextPlain,
    #[display("text/html")]
    TextHtml,
}

///
/// Part
/// One encoded body part.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Part {
    pub content_type: ContentType,
    pub charset: &'static str,
    pub content: String,
}

impl Part {
    fn new(content_type: ContentType, content: String) -> Self {
        Self {
            content_type,
            charset: CHARSET,
            content,
        }
    }

    /// Full MIME type, e.g. `text/plain; charset=utf-8`.
    #[must_use]
    pub fn mime_type(&self) -> String {
        format!("{}; charset={}", self.content_type, self.charset)
    }
}

///
/// DedupId
///
/// Stable digest of (object, rule, notification id). Rendering the same
/// match twice yields the same id.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DedupId([u8; 32]);

impl DedupId {
    pub(crate) fn compute(key: &ObjectKey, rule: &str, notification_id: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DEDUP_DOMAIN_TAG);
        write_str(&mut hasher, key.type_name());
        write_str(&mut hasher, &key.canonical_id());
        write_str(&mut hasher, rule);
        write_str(&mut hasher, notification_id);

        Self(hasher.finalize().into())
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl fmt::Display for DedupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    let len = u32::try_from(value.len()).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
    hasher.update(value.as_bytes());
}

///
/// Message
///
/// Rendered notification, ready for a transport.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub from: Option<String>,
    pub to: Vec<String>,
    pub notification_id: String,
    pub subject: String,
    pub text: Part,
    pub html: Part,
    pub dedup_id: DedupId,
}

impl Message {
    /// Header value by (case-insensitive) name. `To` is comma-joined.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case("from") {
            self.from.clone()
        } else if name.eq_ignore_ascii_case("to") {
            Some(self.to.join(", "))
        } else if name.eq_ignore_ascii_case("subject") {
            Some(self.subject.clone())
        } else if name.eq_ignore_ascii_case(NOTIFICATION_ID_HEADER) {
            Some(self.notification_id.clone())
        } else {
            None
        }
    }

    /// Body parts: plain text first, then HTML.
    #[must_use]
    pub const fn parts(&self) -> [&Part; 2] {
        [&self.text, &self.html]
    }
}

///
/// RenderFailure
/// One match that could not be rendered.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderFailure {
    pub object: ObjectKey,
    pub rule: String,
    pub error: RenderError,
}

///
/// RenderReport
///

#[derive(Clone, Debug, Default)]
pub struct RenderReport {
    pub messages: Vec<Message>,
    pub failures: Vec<RenderFailure>,
}

///
/// Renderer
///
/// Pure: no I/O, no state beyond the borrowed catalog.
///

#[derive(Clone, Copy, Debug)]
pub struct Renderer<'c> {
    catalog: &'c Catalog,
}

impl<'c> Renderer<'c> {
    #[must_use]
    pub const fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    pub fn render(&self, result: &MatchResult<'_>) -> Result<Message, RenderError> {
        let rule = result.rule;
        let template =
            self.catalog
                .template(&rule.template)
                .ok_or_else(|| RenderError::UnknownTemplate {
                    rule: rule.name.clone(),
                    template: rule.template.clone(),
                })?;

        let object = result.object;
        let notification_id = substitute(template, &template.message_id, object)?;
        let subject = substitute(template, &template.subject, object)?;
        let body = substitute(template, &template.body, object)?;
        let html = format!("<pre>{}</pre>", html_escape::encode_text(&body));

        debug!(object = %object.key(), rule = %rule.name, "message rendered");

        Ok(Message {
            from: template.from.clone(),
            to: template.to.clone(),
            dedup_id: DedupId::compute(object.key(), &rule.name, &notification_id),
            notification_id,
            subject,
            text: Part::new(ContentType::TextPlain, body),
            html: Part::new(ContentType::TextHtml, html),
        })
    }

    /// Render every match; failures are collected, never fatal.
    #[must_use]
    pub fn render_all(&self, results: &[MatchResult<'_>]) -> RenderReport {
        let mut report = RenderReport::default();

        for result in results {
            match self.render(result) {
                Ok(message) => {
                    record(MetricsEvent::MessageRendered);
                    report.messages.push(message);
                }
                Err(error) => {
                    warn!(
                        object = %result.object.key(),
                        rule = %result.rule.name,
                        %error,
                        "render failed"
                    );
                    record(MetricsEvent::RenderFailed);
                    report.failures.push(RenderFailure {
                        object: result.object.key().clone(),
                        rule: result.rule.name.clone(),
                        error,
                    });
                }
            }
        }

        report
    }
}

fn substitute(
    template: &Template,
    text: &TemplateText,
    object: ObjectRef<'_>,
) -> Result<String, RenderError> {
    text.render(|field| lookup(object, field))
        .map_err(|field| RenderError::TemplateField {
            template: template.name.clone(),
            field: field.to_string(),
            object: object.key().to_string(),
        })
}

// Pseudo-fields first, then attribute paths.
fn lookup(object: ObjectRef<'_>, field: &str) -> Option<String> {
    match field {
        "type" => Some(object.type_name().to_string()),
        "local_id" => Some(object.key().local_id().to_string()),
        path => object.get(path).map(ToString::to_string),
    }
}
