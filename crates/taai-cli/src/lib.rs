pub mod client;
pub mod orchestrator;

pub use client::{ChatBackend, ClientError, HttpChatClient, Provider};
pub use orchestrator::{Orchestrator, CLIENT_ERROR_REPLY};
