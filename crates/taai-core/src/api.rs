//! Request and response bodies of the chat HTTP routes.
//!
//! Both `/api/chat` and `/api/agent` accept [`ChatCompletionRequest`] and
//! answer with [`ChatCompletionResponse`] or [`ErrorResponse`], so providers
//! can be swapped without touching clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::HistoryTurn;

/// Chat route request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

impl ChatCompletionRequest {
    pub fn new(message: impl Into<String>, history: Vec<HistoryTurn>) -> Self {
        Self {
            message: message.into(),
            history,
        }
    }

    /// Reject requests the chat pipeline cannot answer
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.message.trim().is_empty() {
            return Err(RequestError::EmptyMessage);
        }
        Ok(())
    }
}

/// Chat route success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub response: String,
}

/// Chat route failure body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Client-side mistakes in a chat request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("message must not be empty")]
    EmptyMessage,
}
