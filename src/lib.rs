//! Augur - prompt-driven intent classification
//!
//! Classifies free-text utterances into a fixed set of intent labels by
//! asking a chat-completion model, with swappable prompt templates and a
//! fixed fallback when the model's answer cannot be interpreted.
//!
//! The pieces:
//! - [`TemplateRegistry`]: named prompt templates, built once and then read-only
//! - [`build_chain`]: template + labels + output schema bound to a [`ChatModel`]
//! - [`Classifier`]: invokes the chain and applies the fallback policy
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use augur::providers::OpenAiClient;
//! use augur::{Classifier, LabelSet};
//!
//! #[tokio::main]
//! async fn main() -> augur::Result<()> {
//!     let model = Arc::new(OpenAiClient::from_env()?);
//!     let classifier = Classifier::new(model);
//!
//!     let result = classifier
//!         .classify("where is my parcel?", "concise", &LabelSet::default())
//!         .await?;
//!
//!     println!("{} ({:.2})", result.intent, result.confidence);
//!     Ok(())
//! }
//! ```

pub mod chain;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod providers;
pub mod telemetry;
pub mod templates;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use chain::{Chain, ChainOutput, build_chain};
pub use classifier::{Classifier, LabelPolicy, classify};
pub use config::{Config, Credentials};
pub use error::{AugurError, Result};
pub use parser::{IntentOutput, IntentParser, ParseFailure};
pub use templates::{DEFAULT_TEMPLATE, FilledPrompt, PromptTemplate, TemplateRegistry};
pub use traits::ChatModel;

// Re-export all types
pub use types::{
    ChatOptions, ChatResponse, Classification, DEFAULT_LABELS, DEFAULT_MODEL, FALLBACK_INTENT,
    FALLBACK_RATIONALE, FinishReason, LabelSet, Message, Role, Usage,
};
