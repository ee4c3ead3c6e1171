//! Chat pipeline: cache, prompt, upstream call, language check, disclaimer.

use std::sync::Arc;

use taai_config::{Config, SamplingConfig};
use taai_core::chat::{ChatOptions, ChatRequest};
use taai_core::ChatCompletionRequest;
use taai_llm::LLMProvider;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::cache::{cache_key, ResponseCache};
use crate::error::ApiError;
use crate::language::LanguageGuard;
use crate::prompt::{crypto_disclaimer, is_crypto_question, PromptComposer};

/// Reply used when the model returns no text
pub const EMPTY_REPLY_PLACEHOLDER: &str = "Sorry, could not generate a response.";

pub struct ChatService {
    llm: Arc<dyn LLMProvider>,
    cache: ResponseCache,
    composer: PromptComposer,
    guard: LanguageGuard,
    model: String,
    sampling: SamplingConfig,
}

impl ChatService {
    pub fn new(llm: Arc<dyn LLMProvider>, model: impl Into<String>, sampling: SamplingConfig) -> Self {
        let model = model.into();
        let guard = LanguageGuard::new(
            model.clone(),
            sampling.correction_temperature,
            sampling.max_tokens,
        );
        Self {
            llm,
            cache: ResponseCache::default(),
            composer: PromptComposer::default(),
            guard,
            model,
            sampling,
        }
    }

    pub fn from_config(llm: Arc<dyn LLMProvider>, model: impl Into<String>, config: &Config) -> Self {
        Self::new(llm, model, config.llm.sampling.clone())
            .with_cache(ResponseCache::from_config(&config.cache))
            .with_composer(PromptComposer::from_config(&config.prompt))
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer one chat request
    pub async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ApiError> {
        request.validate()?;

        let span = info_span!(
            "chat",
            request_id = %Uuid::new_v4(),
            history_len = request.history.len()
        );
        self.answer(request).instrument(span).await
    }

    async fn answer(&self, request: &ChatCompletionRequest) -> Result<String, ApiError> {
        let message = request.message.as_str();
        let key = cache_key(message, &request.history);

        if let Some(entry) = self.cache.lookup(&key) {
            info!("Cache hit");
            return Ok(entry.response);
        }

        let upstream = ChatRequest::new(self.model.clone())
            .with_messages(self.composer.compose(message, &request.history))
            .with_options(self.primary_options());

        let response = self.llm.chat(upstream).await?;
        let reply = match response.non_empty_text() {
            Some(text) => text.to_string(),
            None => {
                debug!("Upstream returned an empty reply");
                EMPTY_REPLY_PLACEHOLDER.to_string()
            }
        };

        let mut reply = self.guard.enforce(self.llm.as_ref(), message, reply).await;

        if is_crypto_question(message) {
            debug!("Crypto question, prepending disclaimer");
            reply.insert_str(0, crypto_disclaimer(message));
        }

        self.cache.store(key, reply.clone());
        info!(reply_len = reply.len(), "Chat reply ready");
        Ok(reply)
    }

    fn primary_options(&self) -> ChatOptions {
        ChatOptions::new()
            .with_max_tokens(self.sampling.max_tokens)
            .with_temperature(self.sampling.temperature)
            .with_presence_penalty(self.sampling.presence_penalty)
            .with_frequency_penalty(self.sampling.frequency_penalty)
    }
}
