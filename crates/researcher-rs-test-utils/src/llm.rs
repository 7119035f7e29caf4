//! In-process [`LLMProvider`] fakes.
//!
//! Only chat is meaningful; completion and embedding calls fail.

use async_trait::async_trait;
use autoagents_llm::chat::{
    ChatMessage, ChatProvider, ChatResponse, StructuredOutputFormat, Tool,
};
use autoagents_llm::completion::{CompletionProvider, CompletionRequest, CompletionResponse};
use autoagents_llm::embedding::EmbeddingProvider;
use autoagents_llm::error::LLMError;
use autoagents_llm::models::ModelsProvider;
use autoagents_llm::{LLMProvider, ToolCall};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Chat-only fakes still have to satisfy the full provider surface.
macro_rules! chat_only_provider {
    ($name:ty) => {
        #[async_trait]
        impl CompletionProvider for $name {
            async fn complete(
                &self,
                _req: &CompletionRequest,
                _json_schema: Option<StructuredOutputFormat>,
            ) -> Result<CompletionResponse, LLMError> {
                Err(LLMError::ProviderError(
                    "completion not supported by fake".to_string(),
                ))
            }
        }

        #[async_trait]
        impl EmbeddingProvider for $name {
            async fn embed(&self, _input: Vec<String>) -> Result<Vec<Vec<f32>>, LLMError> {
                Err(LLMError::ProviderError(
                    "embedding not supported by fake".to_string(),
                ))
            }
        }

        #[async_trait]
        impl ModelsProvider for $name {}

        impl LLMProvider for $name {}
    };
}

fn reply(text: impl Into<String>) -> Result<Box<dyn ChatResponse>, LLMError> {
    Ok(Box::new(FixedChatResponse::new(text)))
}

#[derive(Debug, Clone)]
pub struct FixedChatResponse {
    text: String,
}

impl FixedChatResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl std::fmt::Display for FixedChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl ChatResponse for FixedChatResponse {
    fn text(&self) -> Option<String> {
        Some(self.text.clone())
    }

    fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        None
    }
}

/// Answers every chat call with the same text.
#[derive(Debug, Clone)]
pub struct FixedLLM {
    response: String,
}

impl FixedLLM {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for FixedLLM {
    async fn chat_with_tools(
        &self,
        _messages: &[ChatMessage],
        _tools: Option<&[Tool]>,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        reply(self.response.clone())
    }
}

chat_only_provider!(FixedLLM);

/// Answers with a fixed text and keeps the messages of the last call.
#[derive(Debug, Clone)]
pub struct RecordingChatLLM {
    response: String,
    pub last_messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl RecordingChatLLM {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            last_messages: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ChatProvider for RecordingChatLLM {
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        _tools: Option<&[Tool]>,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        *self.last_messages.lock() = messages.to_vec();
        reply(self.response.clone())
    }
}

chat_only_provider!(RecordingChatLLM);

/// Replies from a queue, one entry per call; the last entry repeats.
#[derive(Debug, Clone)]
pub struct ScriptedLLM {
    replies: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<Mutex<usize>>,
}

impl ScriptedLLM {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().map(Into::into).collect())),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of chat calls served so far.
    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl ChatProvider for ScriptedLLM {
    async fn chat_with_tools(
        &self,
        _messages: &[ChatMessage],
        _tools: Option<&[Tool]>,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        *self.calls.lock() += 1;
        let mut replies = self.replies.lock();
        let next = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        match next {
            Some(text) => reply(text),
            None => Err(LLMError::ProviderError("script exhausted".to_string())),
        }
    }
}

chat_only_provider!(ScriptedLLM);

/// Waits before answering; used to exercise call timeouts.
#[derive(Debug, Clone)]
pub struct SlowLLM {
    delay: Duration,
    response: String,
}

impl SlowLLM {
    pub fn new(delay: Duration, response: impl Into<String>) -> Self {
        Self {
            delay,
            response: response.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for SlowLLM {
    async fn chat_with_tools(
        &self,
        _messages: &[ChatMessage],
        _tools: Option<&[Tool]>,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        tokio::time::sleep(self.delay).await;
        reply(self.response.clone())
    }
}

chat_only_provider!(SlowLLM);

/// Fails every call with a provider error.
#[derive(Debug, Clone)]
pub struct FailingLLM {
    message: String,
}

impl FailingLLM {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for FailingLLM {
    async fn chat_with_tools(
        &self,
        _messages: &[ChatMessage],
        _tools: Option<&[Tool]>,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        Err(LLMError::ProviderError(self.message.clone()))
    }
}

chat_only_provider!(FailingLLM);
