pub mod request;
pub mod response;

pub use request::{ChatOptions, ChatRequest};
pub use response::{ChatResponse, ChatUsage};
