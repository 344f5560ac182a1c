use crate::chat::{Message, Role};
use crate::error::ChatError;
use crate::llm::CompletionOptions;

/// The completion client trait. Implementations turn a transcript into one
/// reply from the remote text endpoint.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request a completion for the conversation. Only the most recent user
    /// message is used as the prompt; earlier turns are not transmitted.
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, ChatError>;
}

/// The prompt a completion request is built from: the last user message.
pub fn prompt_from(messages: &[Message]) -> Result<&str, ChatError> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .ok_or_else(|| ChatError::validation("No user message to send"))
}
