use super::Responder;
use crate::ChatModel;
use async_trait::async_trait;
use log::warn;
use researcher_rs_protocol::AgentName;

const SYSTEM_PROMPT: &str = "You are a knowledgeable general assistant. Give accurate, \
well-structured answers in markdown. If you are unsure, say so instead of guessing.";

/// Answers anything the specialist domains do not cover.
pub struct GeneralResponder {
    llm: ChatModel,
}

impl GeneralResponder {
    pub fn new(llm: ChatModel) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Responder for GeneralResponder {
    fn agent(&self) -> AgentName {
        AgentName::GeneralAssistant
    }

    async fn respond(&self, query: &str) -> String {
        let prompt = format!("Answer the following query clearly and concisely: {query}");
        match self.llm.ask(SYSTEM_PROMPT, &prompt).await {
            Ok(answer) => format!("### General Knowledge Response\n\n{answer}"),
            Err(err) => {
                warn!("general answer failed (error={err})");
                format!("General LLM failed: {err}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use researcher_rs_test_utils::{FailingLLM, RecordingChatLLM};
    use std::sync::Arc;

    #[tokio::test]
    async fn wraps_the_model_answer() {
        let llm = Arc::new(RecordingChatLLM::new("Paris."));
        let responder = GeneralResponder::new(ChatModel::new(llm.clone()));
        let answer = responder.respond("capital of France?").await;
        assert_eq!(answer, "### General Knowledge Response\n\nParis.");
        let messages = llm.last_messages.lock().clone();
        assert!(messages[1].content.ends_with("capital of France?"));
    }

    #[tokio::test]
    async fn model_failure_becomes_text() {
        let responder = GeneralResponder::new(ChatModel::new(Arc::new(FailingLLM::new("down"))));
        let answer = responder.respond("anything").await;
        assert!(answer.starts_with("General LLM failed:"), "{answer}");
        assert!(answer.contains("down"), "{answer}");
    }
}
