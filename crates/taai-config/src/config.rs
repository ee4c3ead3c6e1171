use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 主配置结构体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            cache: CacheConfig::default(),
            prompt: PromptConfig::default(),
            agent: AgentConfig::default(),
            client: ClientConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// 获取配置值的快捷方法
    pub fn get_value(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["version"] => Some(self.version.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "cors"] => Some(self.server.cors.to_string()),
            ["llm", "default_provider"] => Some(self.llm.default_provider.clone()),
            ["llm", "sampling", "max_tokens"] => Some(self.llm.sampling.max_tokens.to_string()),
            ["llm", "sampling", "temperature"] => Some(self.llm.sampling.temperature.to_string()),
            ["llm", "sampling", "correction_temperature"] => {
                Some(self.llm.sampling.correction_temperature.to_string())
            }
            ["llm", "sampling", "presence_penalty"] => {
                Some(self.llm.sampling.presence_penalty.to_string())
            }
            ["llm", "sampling", "frequency_penalty"] => {
                Some(self.llm.sampling.frequency_penalty.to_string())
            }
            ["cache", "enabled"] => Some(self.cache.enabled.to_string()),
            ["cache", "ttl_secs"] => Some(self.cache.ttl_secs.to_string()),
            ["cache", "capacity"] => Some(self.cache.capacity.to_string()),
            ["prompt", "system_prompt"] => self.prompt.system_prompt.clone(),
            ["agent", "delay_ms"] => Some(self.agent.delay_ms.to_string()),
            ["client", "server_url"] => Some(self.client.server_url.clone()),
            ["client", "poll_interval_secs"] => Some(self.client.poll_interval_secs.to_string()),
            ["storage", "path"] => self.storage.path.clone(),
            ["logging", "level"] => Some(self.logging.level.to_string()),
            ["logging", "json"] => Some(self.logging.json.to_string()),
            _ => None,
        }
    }

    /// 设置配置值
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["server", "port"] => self.server.port = parse(value, "port number")?,
            ["server", "host"] => self.server.host = value.to_string(),
            ["server", "cors"] => self.server.cors = parse(value, "boolean")?,
            ["llm", "default_provider"] => self.llm.default_provider = value.to_string(),
            ["llm", "sampling", "max_tokens"] => {
                self.llm.sampling.max_tokens = parse(value, "number")?
            }
            ["llm", "sampling", "temperature"] => {
                self.llm.sampling.temperature = parse(value, "number")?
            }
            ["llm", "sampling", "correction_temperature"] => {
                self.llm.sampling.correction_temperature = parse(value, "number")?
            }
            ["llm", "sampling", "presence_penalty"] => {
                self.llm.sampling.presence_penalty = parse(value, "number")?
            }
            ["llm", "sampling", "frequency_penalty"] => {
                self.llm.sampling.frequency_penalty = parse(value, "number")?
            }
            ["cache", "enabled"] => self.cache.enabled = parse(value, "boolean")?,
            ["cache", "ttl_secs"] => self.cache.ttl_secs = parse(value, "number")?,
            ["cache", "capacity"] => self.cache.capacity = parse(value, "number")?,
            ["prompt", "system_prompt"] => self.prompt.system_prompt = Some(value.to_string()),
            ["agent", "delay_ms"] => self.agent.delay_ms = parse(value, "number")?,
            ["client", "server_url"] => self.client.server_url = value.to_string(),
            ["client", "poll_interval_secs"] => {
                self.client.poll_interval_secs = parse(value, "number")?
            }
            ["storage", "path"] => self.storage.path = Some(value.to_string()),
            ["logging", "level"] => self.logging.level = value.parse()?,
            ["logging", "json"] => self.logging.json = parse(value, "boolean")?,
            _ => return Err(ConfigError::KeyNotFound(key.to_string())),
        }
        Ok(())
    }

    /// 当前默认 provider 的配置
    pub fn default_provider(&self) -> Option<&ProviderSettings> {
        self.llm.providers.get(&self.llm.default_provider)
    }
}

fn parse<T: std::str::FromStr>(value: &str, what: &str) -> ConfigResult<T> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("Invalid {}: {}", what, value)))
}

/// Server 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            cors: true,
        }
    }
}

/// LLM 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    pub default_provider: String,
    pub providers: HashMap<String, ProviderSettings>,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let mut providers = HashMap::new();

        providers.insert(
            "openai".to_string(),
            ProviderSettings {
                enabled: true,
                base_url: "https://api.openai.com/v1".to_string(),
                model: Some("gpt-3.5-turbo".to_string()),
                auth: AuthSettings::ApiKey {
                    env: "OPENAI_API_KEY".to_string(),
                },
                headers: None,
                timeout_seconds: Some(60),
                max_retries: Some(0),
            },
        );

        Self {
            default_provider: "openai".to_string(),
            providers,
            sampling: SamplingConfig::default(),
        }
    }
}

/// Provider 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderSettings {
    pub enabled: bool,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub auth: AuthSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    /// 上游请求失败后的重试次数（默认不重试）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "auth_type", rename_all = "snake_case")]
pub enum AuthSettings {
    /// API Key authentication - reads from environment variable
    ApiKey { env: String },
    /// Bearer token authentication - reads from environment variable
    Bearer { env: String },
    /// No authentication
    #[default]
    None,
}

impl AuthSettings {
    /// Get API key from environment if applicable
    pub fn get_api_key(&self) -> Option<String> {
        match self {
            Self::ApiKey { env } => std::env::var(env).ok(),
            _ => None,
        }
    }

    /// Get bearer token from environment if applicable
    pub fn get_bearer_token(&self) -> Option<String> {
        match self {
            Self::Bearer { env } => std::env::var(env).ok(),
            _ => None,
        }
    }
}

/// 上游模型采样参数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplingConfig {
    pub max_tokens: u32,
    /// 主请求温度
    pub temperature: f32,
    /// 语言纠正请求温度
    pub correction_temperature: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 600,
            temperature: 0.5,
            correction_temperature: 0.3,
            presence_penalty: 0.1,
            frequency_penalty: 0.1,
        }
    }
}

/// 缓存有效期上限（一年）
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// 响应缓存配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    pub enabled: bool,
    /// 缓存条目有效期（秒）
    pub ttl_secs: u64,
    /// 最多保留的条目数
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            capacity: 100,
        }
    }
}

/// System prompt 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PromptConfig {
    /// 覆盖内置规则集；None 表示使用内置 prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// Mock agent 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    /// 模拟规划阶段的延迟（毫秒）
    pub delay_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { delay_ms: 500 }
    }
}

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
    /// 会话列表轮询间隔（秒）
    pub poll_interval_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            poll_interval_secs: 2,
        }
    }
}

/// Storage 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    pub path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: Some("~/.taai/storage".to_string()),
        }
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

/// Logging 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// 输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
