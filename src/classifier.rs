//! Intent classifier with a fixed fallback on uninterpretable replies.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::chain::{Chain, ChainOutput, build_chain};
use crate::telemetry;
use crate::templates::TemplateRegistry;
use crate::traits::ChatModel;
use crate::types::{ChatOptions, Classification, LabelSet};
use crate::Result;

/// What to do when the model names an intent outside the label set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Pass the reported intent through unchecked.
    #[default]
    Unchecked,
    /// Replace out-of-vocabulary intents with the fallback result.
    Enforce,
}

/// Classifies utterances against a label set using an injected chat model.
///
/// Cheap to clone and safe to share: the model and registry are behind
/// `Arc`, and nothing is mutated after construction.
#[derive(Clone)]
pub struct Classifier {
    model: Arc<dyn ChatModel>,
    registry: Arc<TemplateRegistry>,
    options: ChatOptions,
    label_policy: LabelPolicy,
}

impl Classifier {
    /// Classifier over the built-in templates with default chat options.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            registry: Arc::new(TemplateRegistry::builtin()),
            options: ChatOptions::default(),
            label_policy: LabelPolicy::default(),
        }
    }

    /// Use a different template registry.
    pub fn registry(mut self, registry: Arc<TemplateRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Set the chat options sent with every request.
    pub fn options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn label_policy(mut self, policy: LabelPolicy) -> Self {
        self.label_policy = policy;
        self
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Build the chain for `template_name` without invoking it.
    pub fn chain(&self, template_name: &str, labels: &LabelSet) -> Result<Chain> {
        build_chain(
            Arc::clone(&self.model),
            &self.registry,
            template_name,
            labels,
            self.options.clone(),
        )
    }

    /// Classify one utterance.
    ///
    /// Unknown templates and transport failures are errors. A reply that
    /// cannot be interpreted is not: it yields [`Classification::fallback`]
    /// with `raw` set to the model's text.
    #[instrument(name = "classify", skip(self, text, labels), fields(template = template_name))]
    pub async fn classify(
        &self,
        text: &str,
        template_name: &str,
        labels: &LabelSet,
    ) -> Result<Classification> {
        let outcome = match self.chain(template_name, labels) {
            Ok(chain) => chain.invoke(text).await,
            Err(e) => Err(e),
        };

        let result = outcome.map(|output| self.interpret(output, labels));
        record_outcome(template_name, &result);
        result
    }

    fn interpret(&self, output: ChainOutput, labels: &LabelSet) -> Classification {
        let ChainOutput {
            raw,
            parsed,
            finish_reason,
            ..
        } = output;
        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(reason) => {
                warn!(%reason, ?finish_reason, "unparseable model output, using fallback");
                return Classification::fallback(raw);
            }
        };

        if self.label_policy == LabelPolicy::Enforce && !labels.contains(&parsed.intent) {
            warn!(intent = %parsed.intent, "intent outside label set, using fallback");
            return Classification::fallback(raw);
        }

        let raw = serde_json::to_string(&parsed).unwrap_or(raw);
        Classification {
            intent: parsed.intent,
            confidence: parsed.confidence,
            rationale: parsed.rationale,
            raw,
        }
    }
}

/// One-shot classification over the built-in templates.
///
/// `template_name` is usually [`DEFAULT_TEMPLATE`](crate::templates::DEFAULT_TEMPLATE);
/// `labels` usually [`LabelSet::default`].
pub async fn classify(
    text: &str,
    model: Arc<dyn ChatModel>,
    template_name: &str,
    labels: &LabelSet,
) -> Result<Classification> {
    Classifier::new(model)
        .classify(text, template_name, labels)
        .await
}

fn record_outcome(template: &str, result: &Result<Classification>) {
    let outcome = match result {
        Ok(c) if c.is_fallback() => "fallback",
        Ok(_) => "parsed",
        Err(_) => "error",
    };
    metrics::counter!(telemetry::CLASSIFICATIONS_TOTAL,
        "template" => template.to_owned(),
        "outcome" => outcome,
    )
    .increment(1);
}
