//! Request pipeline: filled template → chat model → output parser.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::parser::{IntentOutput, IntentParser, ParseFailure};
use crate::telemetry;
use crate::templates::{FilledPrompt, TemplateRegistry};
use crate::traits::ChatModel;
use crate::types::{ChatOptions, ChatResponse, FinishReason, LabelSet, Usage};
use crate::Result;

/// What one chain invocation produced.
#[derive(Debug)]
pub struct ChainOutput {
    /// The model's text, unmodified.
    pub raw: String,
    /// Outcome of schema-validated parsing of `raw`.
    pub parsed: std::result::Result<IntentOutput, ParseFailure>,
    /// Why the model stopped. `Length` usually explains a parse failure.
    pub finish_reason: FinishReason,
    pub usage: Option<Usage>,
}

/// A composed, invokable classification request.
///
/// Holds the filled prompt, the injected model and the parser. Building is
/// pure; only [`invoke`](Self::invoke) performs I/O.
pub struct Chain {
    prompt: FilledPrompt,
    model: Arc<dyn ChatModel>,
    parser: IntentParser,
    options: ChatOptions,
}

/// Compose `template_name` and `labels` into a chain bound to `model`.
///
/// Fails only when the template is not registered.
pub fn build_chain(
    model: Arc<dyn ChatModel>,
    registry: &TemplateRegistry,
    template_name: &str,
    labels: &LabelSet,
    options: ChatOptions,
) -> Result<Chain> {
    let parser = IntentParser::new(labels);
    let prompt = registry.build(
        template_name,
        labels,
        Some(&parser.format_instructions()),
    )?;
    Ok(Chain {
        prompt,
        model,
        parser,
        options,
    })
}

impl Chain {
    pub fn prompt(&self) -> &FilledPrompt {
        &self.prompt
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Run the chain for one utterance.
    ///
    /// Transport and provider errors propagate. Parse problems do not: they
    /// are returned inside [`ChainOutput::parsed`].
    #[instrument(
        name = "chain.invoke",
        skip(self, text),
        fields(template = %self.prompt.name(), model = %self.options.model, provider = %self.model.name())
    )]
    pub async fn invoke(&self, text: &str) -> Result<ChainOutput> {
        let messages = self.prompt.render(text);
        let start = Instant::now();
        let response = self.model.chat(&messages, &self.options).await;
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "provider" => self.model.name().to_owned(),
        )
        .record(start.elapsed().as_secs_f64());

        let ChatResponse {
            content: raw,
            usage,
            model,
            finish_reason,
        } = response?;
        if let Some(usage) = &usage {
            debug!(
                served_by = model.as_deref(),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "model replied"
            );
        }

        let parsed = self.parser.parse(&raw);
        if parsed.is_err() && finish_reason == FinishReason::Length {
            warn!("model reply was cut off at the token limit");
        }
        Ok(ChainOutput {
            raw,
            parsed,
            finish_reason,
            usage,
        })
    }
}
