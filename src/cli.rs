//! Option resolution for the `augur` command.
//!
//! Command-line values win over `[defaults]` in the config file, which win
//! over the built-in defaults.

use crate::classifier::LabelPolicy;
use crate::config::Config;
use crate::templates::TemplateRegistry;
use crate::types::{ChatOptions, LabelSet};
use crate::Result;

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub prompt: Option<String>,
    pub model: Option<String>,
    /// Comma-separated, as typed.
    pub labels: Option<String>,
    pub temperature: Option<f32>,
    pub strict_labels: bool,
}

/// Settings for one classification, after merging overrides into config.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub template: String,
    pub options: ChatOptions,
    pub labels: LabelSet,
    pub label_policy: LabelPolicy,
}

impl Invocation {
    /// Merge `overrides` into `config`.
    ///
    /// The template name is checked against `registry` here, so an unknown
    /// name is rejected before any credential check or request.
    pub fn resolve(
        config: &Config,
        registry: &TemplateRegistry,
        overrides: Overrides,
    ) -> Result<Self> {
        let template = overrides
            .prompt
            .unwrap_or_else(|| config.defaults.template.clone());
        registry.require(&template)?;

        let mut options = config.chat_options();
        if let Some(model) = overrides.model {
            options = options.model(model);
        }
        if let Some(temperature) = overrides.temperature {
            options = options.temperature(temperature);
        }

        let labels = overrides
            .labels
            .as_deref()
            .map(LabelSet::parse_list)
            .unwrap_or_else(|| config.labels());

        let label_policy = if overrides.strict_labels {
            LabelPolicy::Enforce
        } else {
            config.defaults.label_policy
        };

        Ok(Self {
            template,
            options,
            labels,
            label_policy,
        })
    }
}
