pub mod auth;
pub mod error;
pub mod provider;
pub mod providers;
pub mod transformer;

// Re-export core types
pub use auth::{ApiKeyAuth, Authenticator, BearerAuth, NoAuth};
pub use error::{AuthError, ConversionError, LLMError, Result};
pub use provider::{AuthConfig, BaseProvider, LLMProvider, ProviderConfig, ProviderMetadata};
pub use providers::OpenAiProvider;
pub use transformer::{OpenAiTransformer, SchemaTransformer};
