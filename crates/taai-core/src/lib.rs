pub mod api;
pub mod chat;
pub mod types;

pub use api::{ChatCompletionRequest, ChatCompletionResponse, ErrorResponse, RequestError};
pub use chat::{ChatOptions, ChatRequest, ChatResponse, ChatUsage};
pub use types::{ChatMessage, ChatSession, HistoryTurn, Message, MessageId, Role};
