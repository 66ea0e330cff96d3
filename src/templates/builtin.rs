//! Built-in prompt templates.

use super::PromptTemplate;

const USER_TEXT: &str = "User text: {text}";

/// Short instruction, answer directly.
pub(crate) fn concise() -> PromptTemplate {
    PromptTemplate::new(
        "Classify the user text into one intent. Allowed intents: {labels}. \
         Return JSON with keys: intent (one of labels), confidence (0-1 float), \
         rationale (short). If unsure, use 'fallback'.",
        USER_TEXT,
    )
}

/// Asks the model to reason first and pick the dominant intent.
pub(crate) fn analysis_first() -> PromptTemplate {
    PromptTemplate::new(
        "You are an intent classifier. Allowed intents: {labels}. \
         First think step-by-step, then answer with JSON keys intent/confidence/rationale. \
         If multiple intents match, pick the dominant one and explain briefly.",
        USER_TEXT,
    )
}

/// All built-ins in registration order.
pub(crate) fn all() -> [(&'static str, PromptTemplate); 2] {
    [("concise", concise()), ("analysis_first", analysis_first())]
}
