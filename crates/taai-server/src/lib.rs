pub mod agent;
pub mod cache;
pub mod error;
pub mod language;
pub mod logging;
pub mod prompt;
pub mod server;
pub mod service;
pub mod state;

#[cfg(test)]
mod test_support;

pub use agent::MockAgent;
pub use cache::{cache_key, CacheEntry, ResponseCache};
pub use error::ApiError;
pub use language::{Language, LanguageGuard, LanguageRule, ScriptDetector};
pub use prompt::PromptComposer;
pub use server::{create_router, run_server};
pub use service::ChatService;
pub use state::{create_llm_provider, AppState, LlmOverrides};
