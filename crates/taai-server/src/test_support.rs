use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use taai_core::chat::{ChatRequest, ChatResponse};
use taai_core::types::Message;
use taai_llm::{LLMError, LLMProvider, ProviderMetadata};

/// Provider that plays back queued replies and records what it was asked
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
    metadata: ProviderMetadata,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            metadata: ProviderMetadata {
                id: "scripted".to_string(),
                name: "Scripted".to_string(),
                default_model: "gpt-3.5-turbo".to_string(),
            },
        }
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn provider_id(&self) -> &str {
        &self.metadata.id
    }

    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn chat(&self, request: ChatRequest) -> taai_llm::Result<ChatResponse> {
        let model = request.model.clone();
        self.requests.lock().push(request);
        match self.replies.lock().pop_front() {
            Some(Ok(text)) => Ok(ChatResponse::new("scripted", model, Message::assistant(text))),
            Some(Err(message)) => Err(LLMError::Api {
                status: 500,
                message,
            }),
            None => Err(LLMError::Network("script exhausted".to_string())),
        }
    }

    async fn validate(&self) -> taai_llm::Result<()> {
        Ok(())
    }
}
