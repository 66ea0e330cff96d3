//! Core ChatModel trait

use async_trait::async_trait;

use crate::{ChatOptions, ChatResponse, Message, Result};

/// A chat-completion backend.
///
/// The classifier never constructs one of these itself: callers inject an
/// already-configured implementation (an [`OpenAiClient`](crate::providers::OpenAiClient)
/// or a test double), so credentials and network setup stay outside the
/// classification logic.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider name for logging/metrics.
    fn name(&self) -> &str;

    /// Non-streaming chat completion.
    ///
    /// Transport and provider failures are returned as errors; they are not
    /// retried or wrapped further by this crate.
    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse>;
}
