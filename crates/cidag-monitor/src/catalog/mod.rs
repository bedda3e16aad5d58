//! Module: catalog
//! Responsibility: load and validate the rule catalog, the externally
//! supplied mapping from object type to predicate and notification template.
//! Does not own: predicate evaluation (see `predicate`) or rendering.
//!
//! Invariants:
//! - Every rule names a registered type and an existing template.
//! - Every template has at least one recipient and parses cleanly.
//! - Rules keep their configured order; `rules_for` yields them in it.


use crate::{
    predicate::Predicate,
    render::{TemplateError, TemplateText},
};
use cidag_core::model::ObjectModel;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error as ThisError;
use tracing::debug;

/// Notification id used when a template does not configure one.
pub const DEFAULT_MESSAGE_ID: &str = "{type}";

///
/// CatalogError
///
/// Configuration errors. Raised once, when the catalog is loaded.
///

#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("rule '{rule}' is defined more than once")]
    DuplicateRule { rule: String },

    #[error("rule '{rule}' refers to unknown type '{type_name}'")]
    UnknownType { rule: String, type_name: String },

    #[error("rule '{rule}' refers to unknown template '{template}'")]
    UnknownTemplate { rule: String, template: String },

    #[error("template '{template}' has no recipients")]
    NoRecipients { template: String },

    #[error("template '{template}' {part}: {source}")]
    Template {
        template: String,
        part: &'static str,
        source: TemplateError,
    },
}

///
/// CatalogConfig
/// Raw catalog as written in configuration.
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateConfig>,

    #[serde(default)]
    pub rules: Vec<Rule>,
}

///
/// TemplateConfig
///

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    #[serde(default)]
    pub from: Option<String>,
    pub to: Vec<String>,
    #[serde(default = "default_message_id")]
    pub message_id: String,
    pub subject: String,
    pub body: String,
}

fn default_message_id() -> String {
    DEFAULT_MESSAGE_ID.to_string()
}

///
/// Rule
///
/// One catalog entry: objects of `type_name` satisfying `when` are notified
/// through `template`.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub template: String,
    #[serde(default)]
    pub when: Predicate,
}

///
/// Template
/// Validated notification template.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Template {
    pub name: String,
    pub from: Option<String>,
    pub to: Vec<String>,
    pub message_id: TemplateText,
    pub subject: TemplateText,
    pub body: TemplateText,
}

impl Template {
    fn compile(name: &str, config: TemplateConfig) -> Result<Self, CatalogError> {
        if config.to.is_empty() {
            return Err(CatalogError::NoRecipients {
                template: name.to_string(),
            });
        }

        let part = |part: &'static str, text: &str| {
            TemplateText::parse(text).map_err(|source| CatalogError::Template {
                template: name.to_string(),
                part,
                source,
            })
        };

        Ok(Self {
            name: name.to_string(),
            message_id: part("message_id", &config.message_id)?,
            subject: part("subject", &config.subject)?,
            body: part("body", &config.body)?,
            from: config.from,
            to: config.to,
        })
    }
}

///
/// Catalog
///

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    templates: BTreeMap<String, Template>,
    rules: Vec<Rule>,
    by_type: HashMap<String, Vec<usize>>,
}

impl Catalog {
    /// Parse a TOML catalog and validate it against `model`.
    pub fn from_toml_str(text: &str, model: &ObjectModel) -> Result<Self, CatalogError> {
        let config: CatalogConfig = toml::from_str(text)?;

        Self::new(config, model)
    }

    pub fn new(config: CatalogConfig, model: &ObjectModel) -> Result<Self, CatalogError> {
        // Phase 1: templates.
        let templates = config
            .templates
            .into_iter()
            .map(|(name, template)| Template::compile(&name, template).map(|t| (name, t)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        // Phase 2: rules, in configured order.
        let mut names = HashSet::new();
        let mut by_type: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, rule) in config.rules.iter().enumerate() {
            if !names.insert(rule.name.as_str()) {
                return Err(CatalogError::DuplicateRule {
                    rule: rule.name.clone(),
                });
            }

            let mut types = vec![rule.type_name.clone()];
            rule.when.child_types(&mut types);
            if let Some(unknown) = types.into_iter().find(|name| !model.contains(name)) {
                return Err(CatalogError::UnknownType {
                    rule: rule.name.clone(),
                    type_name: unknown,
                });
            }

            if !templates.contains_key(&rule.template) {
                return Err(CatalogError::UnknownTemplate {
                    rule: rule.name.clone(),
                    template: rule.template.clone(),
                });
            }

            by_type
                .entry(rule.type_name.clone())
                .or_default()
                .push(index);
        }

        debug!(
            rules = config.rules.len(),
            templates = templates.len(),
            "catalog loaded"
        );

        Ok(Self {
            templates,
            rules: config.rules,
            by_type,
        })
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules for one type, in configured order.
    pub fn rules_for<'a>(&'a self, type_name: &str) -> impl Iterator<Item = &'a Rule> + use<'a> {
        self.by_type
            .get(type_name)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .map(|&index| &self.rules[index])
    }

    #[must_use]
    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
