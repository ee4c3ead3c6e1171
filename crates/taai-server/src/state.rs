use std::sync::Arc;
use std::time::Duration;

use taai_config::{AuthSettings, Config};
use taai_llm::provider::{AuthConfig, ProviderConfig};
use taai_llm::providers::OpenAiProvider;
use taai_llm::LLMProvider;

use crate::agent::MockAgent;
use crate::service::ChatService;

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct LlmOverrides {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

/// Shared handler state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub agent: Arc<MockAgent>,
    pub cors: bool,
}

impl AppState {
    /// State around an already constructed provider
    pub fn new(llm: Arc<dyn LLMProvider>, model: impl Into<String>, config: &Config) -> Self {
        let chat = ChatService::from_config(llm, model, config);
        let agent = MockAgent::new(
            "TAAI Agent",
            Duration::from_millis(config.agent.delay_ms),
        );

        Self {
            chat: Arc::new(chat),
            agent: Arc::new(agent),
            cors: config.server.cors,
        }
    }

    pub fn from_config(config: &Config, overrides: &LlmOverrides) -> anyhow::Result<Self> {
        let (llm, model) = create_llm_provider(config, overrides)?;
        Ok(Self::new(llm, model, config))
    }
}

/// Build the upstream provider from the default provider section.
///
/// Returns the provider together with the model requests should name.
pub fn create_llm_provider(
    config: &Config,
    overrides: &LlmOverrides,
) -> anyhow::Result<(Arc<dyn LLMProvider>, String)> {
    let provider_name = &config.llm.default_provider;
    tracing::info!("Creating LLM provider from config: {}", provider_name);

    let settings = config.llm.providers.get(provider_name).ok_or_else(|| {
        anyhow::anyhow!(
            "Provider '{}' not found in config. Available providers: {:?}",
            provider_name,
            config.llm.providers.keys().collect::<Vec<_>>()
        )
    })?;

    if !settings.enabled {
        return Err(anyhow::anyhow!(
            "Provider '{}' is disabled in config",
            provider_name
        ));
    }

    let auth = match (&overrides.api_key, &settings.auth) {
        (Some(key), _) => AuthConfig::ApiKey { key: key.clone() },
        (None, AuthSettings::ApiKey { env }) => {
            let key = std::env::var(env).map_err(|_| {
                anyhow::anyhow!(
                    "API key environment variable '{}' not set for provider '{}'",
                    env,
                    provider_name
                )
            })?;
            AuthConfig::ApiKey { key }
        }
        (None, AuthSettings::Bearer { env }) => {
            let token = std::env::var(env).map_err(|_| {
                anyhow::anyhow!(
                    "Bearer token environment variable '{}' not set for provider '{}'",
                    env,
                    provider_name
                )
            })?;
            AuthConfig::Bearer { token }
        }
        (None, AuthSettings::None) => AuthConfig::None,
    };

    let base_url = overrides
        .base_url
        .clone()
        .unwrap_or_else(|| settings.base_url.clone());
    let model = overrides
        .model
        .clone()
        .or_else(|| settings.model.clone())
        .unwrap_or_else(|| ProviderConfig::default().model);

    let mut provider_config = ProviderConfig::new(provider_name.clone(), base_url)
        .with_model(model.clone())
        .with_timeout(Duration::from_secs(settings.timeout_seconds.unwrap_or(60)))
        .with_max_retries(settings.max_retries.unwrap_or(0));
    provider_config.auth = auth;
    if let Some(headers) = &settings.headers {
        provider_config = provider_config.with_headers(headers.clone());
    }

    let provider = OpenAiProvider::with_config(provider_config)
        .map_err(|e| anyhow::anyhow!("Failed to create provider '{}': {}", provider_name, e))?;

    tracing::info!(
        "LLM provider ready: {} ({}) model={}",
        provider_name,
        provider.metadata().name,
        model
    );

    Ok((Arc::new(provider), model))
}
