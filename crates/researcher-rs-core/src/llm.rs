//! Language-model access for the router and responders.

use crate::LlmError;
use autoagents_llm::LLMProvider;
use autoagents_llm::chat::{ChatMessage, ChatProvider, ChatRole, MessageType};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// Default bound on a single model call.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(15);

/// Plain-text chat over an [`LLMProvider`] with a per-call timeout.
#[derive(Clone)]
pub struct ChatModel {
    provider: Arc<dyn LLMProvider>,
    timeout: Duration,
}

impl ChatModel {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_LLM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `messages` and return the trimmed reply text.
    pub async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let call = self.provider.chat_with_tools(messages, None, None);
        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))?
            .map_err(|err| LlmError::Provider(err.to_string()))?;
        let text = response.text().unwrap_or_default();
        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyReply);
        }
        debug!(
            "llm reply received (messages={}, chars={})",
            messages.len(),
            text.len()
        );
        Ok(text.to_string())
    }

    /// One system instruction followed by one user turn.
    pub async fn ask(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.invoke(&[system_message(system), user_message(user)])
            .await
    }
}

pub fn system_message(content: impl Into<String>) -> ChatMessage {
    text_message(ChatRole::System, content)
}

pub fn user_message(content: impl Into<String>) -> ChatMessage {
    text_message(ChatRole::User, content)
}

fn text_message(role: ChatRole, content: impl Into<String>) -> ChatMessage {
    ChatMessage {
        role,
        message_type: MessageType::Text,
        content: content.into(),
    }
}
