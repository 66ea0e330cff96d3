//! Prompt template registry.
//!
//! A [`TemplateRegistry`] maps template names to [`PromptTemplate`]s. It is
//! assembled once (built-ins plus any templates from the config file) and
//! then only read, so it can be shared behind an `Arc` without locking.
//!
//! Templates are plain text with `{placeholder}` slots:
//!
//! - `{labels}`: the label set joined with `", "`
//! - `{format_instructions}`: output schema hint from the parser (system part)
//! - `{text}`: the utterance being classified (user part)
//!
//! Substitution is a single pass, so braces inside substituted values are
//! never expanded again. Unknown `{...}` sequences are left as they are.

mod builtin;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{LabelSet, Message};
use crate::{AugurError, Result};

/// Name of the template used when the caller does not pick one.
pub const DEFAULT_TEMPLATE: &str = "concise";

const LABELS_SLOT: &str = "labels";
const FORMAT_SLOT: &str = "format_instructions";
const TEXT_SLOT: &str = "text";

/// A system + user message pair with placeholder slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub system: String,
    #[serde(default = "default_human")]
    pub human: String,
}

fn default_human() -> String {
    "{text}".to_string()
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>, human: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            human: human.into(),
        }
    }

    /// Fill labels and format instructions, leaving `{text}` for invocation.
    ///
    /// When the system part has no `{format_instructions}` slot, supplied
    /// instructions are appended after a blank line.
    pub fn fill(
        &self,
        name: &str,
        labels: &LabelSet,
        format_instructions: Option<&str>,
    ) -> FilledPrompt {
        let labels = labels.joined();
        let instructions = format_instructions.unwrap_or_default();
        let mut system = substitute(
            &self.system,
            &[(LABELS_SLOT, labels.as_str()), (FORMAT_SLOT, instructions)],
        );
        if !instructions.is_empty() && !has_slot(&self.system, FORMAT_SLOT) {
            system.push_str("\n\n");
            system.push_str(instructions);
        }

        FilledPrompt {
            name: name.to_string(),
            system,
            human: self.human.clone(),
            labels,
        }
    }
}

/// A template with labels and format instructions already substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledPrompt {
    name: String,
    system: String,
    human: String,
    labels: String,
}

impl FilledPrompt {
    /// Registry name of the template this was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The filled system message.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Produce the chat messages for one utterance.
    pub fn render(&self, text: &str) -> Vec<Message> {
        let human = substitute(
            &self.human,
            &[(TEXT_SLOT, text), (LABELS_SLOT, self.labels.as_str())],
        );
        vec![Message::system(self.system.clone()), Message::user(human)]
    }
}

/// Immutable table of named prompt templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, PromptTemplate>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `concise` and `analysis_first` templates.
    pub fn builtin() -> Self {
        builtin::all()
            .into_iter()
            .fold(Self::new(), |registry, (name, template)| {
                registry.with_template(name, template)
            })
    }

    /// Add a template, replacing any existing one with the same name.
    pub fn with_template(mut self, name: impl Into<String>, template: PromptTemplate) -> Self {
        self.templates.insert(name.into(), template);
        self
    }

    /// Registered template names in alphabetical order.
    pub fn available(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Look up a template, failing with [`AugurError::UnknownTemplate`]
    /// listing the available names when `name` is not registered.
    pub fn require(&self, name: &str) -> Result<&PromptTemplate> {
        self.templates
            .get(name)
            .ok_or_else(|| AugurError::UnknownTemplate {
                name: name.to_string(),
                available: self.available().into_iter().map(String::from).collect(),
            })
    }

    /// Fill the named template with `labels` and optional format instructions.
    ///
    /// Fails with [`AugurError::UnknownTemplate`] listing the available names
    /// when `name` is not registered.
    pub fn build(
        &self,
        name: &str,
        labels: &LabelSet,
        format_instructions: Option<&str>,
    ) -> Result<FilledPrompt> {
        let template = self.require(name)?;
        debug!(template = name, labels = labels.len(), "building prompt");
        Ok(template.fill(name, labels, format_instructions))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn has_slot(template: &str, slot: &str) -> bool {
    template.contains(&format!("{{{slot}}}"))
}

/// Replace `{key}` occurrences in one left-to-right pass.
fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let hit = after.find('}').and_then(|end| {
            let key = &after[..end];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, end))
        });
        match hit {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
