use crate::types::Message;

/// Chat completion response
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub id: String,
    pub model: String,
    pub message: Message,
    pub usage: ChatUsage,
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// Create a new response
    pub fn new(id: impl Into<String>, model: impl Into<String>, message: Message) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            message,
            usage: ChatUsage::default(),
            finish_reason: None,
        }
    }

    /// Set usage
    pub fn with_usage(mut self, usage: ChatUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Get the text content
    pub fn text(&self) -> &str {
        self.message.text()
    }

    /// Text content, or `None` when the model produced nothing
    pub fn non_empty_text(&self) -> Option<&str> {
        let text = self.text();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl ChatUsage {
    /// Create new usage info
    pub fn new(input: u32, output: u32) -> Self {
        Self {
            input_tokens: input,
            output_tokens: output,
            total_tokens: input + output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response() {
        let response = ChatResponse::new("resp_123", "gpt-3.5-turbo", Message::assistant("Hello!"));

        assert_eq!(response.id, "resp_123");
        assert_eq!(response.text(), "Hello!");
        assert_eq!(response.non_empty_text(), Some("Hello!"));
    }

    #[test]
    fn test_empty_response_text() {
        let response = ChatResponse::new("resp_1", "m", Message::assistant(""));
        assert_eq!(response.non_empty_text(), None);
    }

    #[test]
    fn test_chat_usage() {
        let usage = ChatUsage::new(10, 20);
        assert_eq!(usage.total_tokens, 30);
    }
}
