use async_trait::async_trait;
use taai_core::chat::{ChatRequest, ChatResponse};

use crate::error::Result;
use crate::provider::{BaseProvider, LLMProvider, ProviderConfig, ProviderMetadata};
use crate::transformer::OpenAiTransformer;

/// OpenAI Provider
/// Uses the OpenAI API or any endpoint speaking the same chat completion schema
pub struct OpenAiProvider {
    base: BaseProvider<OpenAiTransformer>,
}

impl OpenAiProvider {
    /// Create with custom configuration
    pub fn with_config(config: ProviderConfig) -> Result<Self> {
        let metadata = ProviderMetadata {
            id: config.provider_id.clone(),
            name: "OpenAI".to_string(),
            default_model: config.model.clone(),
        };

        let base = BaseProvider::new(config, OpenAiTransformer::new(), metadata)?;
        Ok(Self { base })
    }

    /// Create a new OpenAI provider with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let config = ProviderConfig::new("openai", "https://api.openai.com/v1").with_api_key(api_key);
        Self::with_config(config)
    }

    /// Create with custom base URL (for Azure or other compatible APIs)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let config = ProviderConfig::new("openai", base_url).with_api_key(api_key);
        Self::with_config(config)
    }

    /// Model used when a request leaves it empty
    pub fn model(&self) -> &str {
        &self.base.config().model
    }
}

#[async_trait]
impl LLMProvider for OpenAiProvider {
    fn provider_id(&self) -> &str {
        self.base.provider_id()
    }

    fn metadata(&self) -> &ProviderMetadata {
        &self.base.metadata
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.base.chat(request).await
    }

    async fn validate(&self) -> Result<()> {
        self.base.validate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LLMError;
    use taai_core::types::Message;

    #[test]
    fn test_new_provider() {
        let provider = OpenAiProvider::new("test-key").unwrap();
        assert_eq!(provider.provider_id(), "openai");
        assert_eq!(provider.model(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_with_base_url() {
        let provider = OpenAiProvider::with_base_url("test-key", "https://custom.openai.com/v1");
        assert!(provider.is_ok());
    }

    #[tokio::test]
    async fn test_chat_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 600
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"c1","model":"gpt-3.5-turbo","choices":[{"message":{"role":"assistant","content":"RSI measures momentum."},"finish_reason":"stop"}]}"#,
            )
            .create_async()
            .await;

        let provider = OpenAiProvider::with_base_url("sk-test", server.url()).unwrap();
        let request = ChatRequest::new("")
            .with_message(Message::user("What is RSI?"))
            .max_tokens(600);

        let response = provider.chat(request).await.unwrap();
        assert_eq!(response.text(), "RSI measures momentum.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upstream_errors_are_mapped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("bad key")
            .create_async()
            .await;

        let provider = OpenAiProvider::with_base_url("wrong", server.url()).unwrap();
        let request = ChatRequest::new("gpt-3.5-turbo").with_message(Message::user("hi"));

        let err = provider.chat(request).await.unwrap_err();
        assert!(matches!(err, LLMError::Auth(ref body) if body == "bad key"));
    }

    #[tokio::test]
    async fn test_server_error_without_retries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("overloaded")
            .expect(1)
            .create_async()
            .await;

        let provider = OpenAiProvider::with_base_url("k", server.url()).unwrap();
        let request = ChatRequest::new("gpt-3.5-turbo").with_message(Message::user("hi"));

        let err = provider.chat(request).await.unwrap_err();
        assert!(matches!(err, LLMError::Api { status: 500, .. }));
        mock.assert_async().await;
    }
}
