use serde_json::{json, Value};
use taai_core::chat::{ChatRequest, ChatResponse, ChatUsage};
use taai_core::types::{Message, Role};

use crate::error::ConversionError;
use crate::transformer::SchemaTransformer;

/// OpenAI-compatible schema transformer
/// Works with OpenAI API, Azure OpenAI, and compatible providers
pub struct OpenAiTransformer;

impl OpenAiTransformer {
    /// Create a new OpenAI transformer
    pub fn new() -> Self {
        Self
    }

    fn convert_message(&self, msg: &Message) -> Value {
        json!({
            "role": msg.role.to_string(),
            "content": msg.content,
        })
    }

    fn convert_role(&self, role: Option<&str>) -> Role {
        match role {
            Some("system") => Role::System,
            Some("user") => Role::User,
            _ => Role::Assistant,
        }
    }
}

impl Default for OpenAiTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaTransformer for OpenAiTransformer {
    fn provider_id(&self) -> &str {
        "openai"
    }

    fn transform_request(&self, request: &ChatRequest) -> Result<Value, ConversionError> {
        if request.messages.is_empty() {
            return Err(ConversionError::InvalidFormat(
                "request has no messages".to_string(),
            ));
        }

        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| self.convert_message(m))
            .collect();

        let mut body = json!({
            "model": request.model,
            "messages": messages,
        });

        // Add optional parameters
        let options = &request.options;
        if let Some(temp) = options.temperature {
            body["temperature"] = json!(temp);
        }

        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(penalty) = options.presence_penalty {
            body["presence_penalty"] = json!(penalty);
        }

        if let Some(penalty) = options.frequency_penalty {
            body["frequency_penalty"] = json!(penalty);
        }

        Ok(body)
    }

    fn parse_response(&self, data: &Value) -> Result<ChatResponse, ConversionError> {
        let id = data["id"].as_str().unwrap_or_default().to_string();
        let model = data["model"].as_str().unwrap_or_default().to_string();

        // No choices at all reads as an empty reply
        let choice = &data["choices"][0];

        let message_data = &choice["message"];
        let role = self.convert_role(message_data["role"].as_str());

        // A missing or null content field is an empty reply, not a failure
        let content = message_data["content"].as_str().unwrap_or_default();

        let usage_data = data.get("usage");
        let usage = ChatUsage {
            input_tokens: usage_data
                .and_then(|u| u["prompt_tokens"].as_u64())
                .unwrap_or(0) as u32,
            output_tokens: usage_data
                .and_then(|u| u["completion_tokens"].as_u64())
                .unwrap_or(0) as u32,
            total_tokens: usage_data
                .and_then(|u| u["total_tokens"].as_u64())
                .unwrap_or(0) as u32,
        };

        let mut response =
            ChatResponse::new(id, model, Message::new(role, content)).with_usage(usage);
        response.finish_reason = choice["finish_reason"].as_str().map(str::to_string);

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taai_core::chat::ChatOptions;

    #[test]
    fn test_transform_request() {
        let transformer = OpenAiTransformer::new();
        let request = ChatRequest::new("gpt-3.5-turbo")
            .with_message(Message::system("You are TAAI Agent"))
            .with_message(Message::user("What is RSI?"))
            .with_options(
                ChatOptions::new()
                    .with_temperature(0.5)
                    .with_max_tokens(600)
                    .with_presence_penalty(0.1)
                    .with_frequency_penalty(0.1),
            );

        let body = transformer.transform_request(&request).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 600);
        let temp = body["temperature"].as_f64().unwrap();
        assert!((temp - 0.5).abs() < 0.001, "temperature should be approximately 0.5, got {}", temp);
        assert!(body.get("presence_penalty").is_some());

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "What is RSI?");
    }

    #[test]
    fn test_omits_unset_options() {
        let transformer = OpenAiTransformer::new();
        let request = ChatRequest::new("m").with_message(Message::user("hi"));

        let body = transformer.transform_request(&request).unwrap();
        assert!(body.get("temperature").is_none());
        assert!(body.get("frequency_penalty").is_none());
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let transformer = OpenAiTransformer::new();
        let result = transformer.transform_request(&ChatRequest::new("m"));
        assert!(matches!(result, Err(ConversionError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_response() {
        let transformer = OpenAiTransformer::new();
        let data = json!({
            "id": "chatcmpl-1",
            "model": "gpt-3.5-turbo",
            "choices": [{
                "message": {"role": "assistant", "content": "RSI is a momentum oscillator."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 6, "total_tokens": 18}
        });

        let response = transformer.parse_response(&data).unwrap();
        assert_eq!(response.text(), "RSI is a momentum oscillator.");
        assert_eq!(response.usage.total_tokens, 18);
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_parse_null_content_as_empty() {
        let transformer = OpenAiTransformer::new();
        let data = json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        });

        let response = transformer.parse_response(&data).unwrap();
        assert_eq!(response.non_empty_text(), None);
    }

    #[test]
    fn test_parse_without_choices_as_empty() {
        let transformer = OpenAiTransformer::new();

        let empty = transformer
            .parse_response(&json!({"id": "c1", "model": "gpt-3.5-turbo", "choices": []}))
            .unwrap();
        assert_eq!(empty.id, "c1");
        assert_eq!(empty.non_empty_text(), None);

        let absent = transformer.parse_response(&json!({"id": "c2"})).unwrap();
        assert_eq!(absent.non_empty_text(), None);
    }
}
