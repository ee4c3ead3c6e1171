use crate::config::{Config, ConfigError, ConfigResult, MAX_CACHE_TTL_SECS};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern compiles"));

/// 配置管理器
#[derive(Clone)]
pub struct ConfigManager {
    path: PathBuf,
    config: Arc<RwLock<Config>>,
}

impl ConfigManager {
    /// 加载配置文件；文件不存在时写入默认配置
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        let config = if path.exists() {
            info!("Loading config from {:?}", path);
            let content = tokio::fs::read_to_string(path).await?;
            let content = Self::expand_env_vars(&content)?;
            let config: Config = serde_json::from_str(&content)?;
            Self::validate(&config)?;
            config
        } else {
            info!("Config file not found, creating default config at {:?}", path);
            let default_config = Config::default();
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let content = serde_json::to_string_pretty(&default_config)?;
            tokio::fs::write(path, &content).await?;
            default_config
        };

        Ok(Self {
            path: path.to_path_buf(),
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 从默认位置加载配置
    pub async fn load_default() -> ConfigResult<Self> {
        let config_path = Self::default_config_path()?;
        Self::load(&config_path).await
    }

    /// 获取默认配置路径 (~/.taai/config.json)
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        crate::default_config_path()
            .ok_or_else(|| ConfigError::InvalidPath("Could not find home directory".to_string()))
    }

    /// 创建一个新的配置管理器（用于测试）
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置的共享引用
    pub fn get(&self) -> Arc<RwLock<Config>> {
        Arc::clone(&self.config)
    }

    /// 当前配置的快照
    pub async fn snapshot(&self) -> Config {
        self.config.read().await.clone()
    }

    /// 保存配置到文件
    pub async fn save(&self) -> ConfigResult<()> {
        let config = self.config.read().await;
        let content = serde_json::to_string_pretty(&*config)?;
        drop(config);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        info!("Config saved to {:?}", self.path);
        Ok(())
    }

    /// 重新加载配置
    pub async fn reload(&self) -> ConfigResult<()> {
        if !self.path.exists() {
            return Err(ConfigError::InvalidPath(format!(
                "Config file not found: {:?}",
                self.path
            )));
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let content = Self::expand_env_vars(&content)?;
        let new_config: Config = serde_json::from_str(&content)?;

        Self::validate(&new_config)?;

        let mut config = self.config.write().await;
        *config = new_config;
        drop(config);

        info!("Config reloaded from {:?}", self.path);
        Ok(())
    }

    /// 更新配置并写回文件；验证失败时不修改内存中的配置
    pub async fn update<F>(&self, f: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config) -> ConfigResult<()>,
    {
        let mut config = self.config.write().await;
        let mut next = config.clone();
        f(&mut next)?;
        Self::validate(&next)?;
        *config = next;
        drop(config);
        self.save().await
    }

    /// 验证配置
    pub fn validate(config: &Config) -> ConfigResult<()> {
        if config.server.port == 0 {
            return Err(ConfigError::Validation(
                "Server port cannot be 0".to_string(),
            ));
        }

        if config.cache.capacity == 0 {
            return Err(ConfigError::Validation(
                "Cache capacity must be greater than 0".to_string(),
            ));
        }

        if config.cache.ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::Validation(format!(
                "Cache ttl_secs must be at most {}, got {}",
                MAX_CACHE_TTL_SECS, config.cache.ttl_secs
            )));
        }

        if config.llm.sampling.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "LLM max_tokens must be greater than 0".to_string(),
            ));
        }

        for (name, temp) in [
            ("temperature", config.llm.sampling.temperature),
            ("correction_temperature", config.llm.sampling.correction_temperature),
        ] {
            if !(0.0..=2.0).contains(&temp) {
                return Err(ConfigError::Validation(format!(
                    "LLM {} must be between 0 and 2, got {}",
                    name, temp
                )));
            }
        }

        if !config.llm.providers.contains_key(&config.llm.default_provider) {
            return Err(ConfigError::Validation(format!(
                "Default LLM provider '{}' not found in providers list",
                config.llm.default_provider
            )));
        }

        Ok(())
    }

    /// 展开环境变量 ${VAR} 或 ${VAR:-default}
    pub fn expand_env_vars(content: &str) -> ConfigResult<String> {
        let mut result = content.to_string();

        for cap in ENV_VAR.captures_iter(content) {
            let (Some(full_match), Some(var_expr)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            let var_expr = var_expr.as_str();

            let (var_name, default_value) = match var_expr.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (var_expr, None),
            };

            let replacement = match std::env::var(var_name) {
                Ok(val) => val,
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    None => return Err(ConfigError::EnvVarNotFound(var_name.to_string())),
                },
            };

            result = result.replace(full_match.as_str(), &replacement);
        }

        Ok(result)
    }

    /// 获取配置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_creates_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        let manager = ConfigManager::load(&config_path).await.unwrap();
        let config = manager.snapshot().await;

        assert!(config_path.exists());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.sampling.temperature, 0.5);
    }

    #[tokio::test]
    async fn test_update_persists() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let manager = ConfigManager::load(&config_path).await.unwrap();
        manager
            .update(|c| c.set_value("cache.ttl_secs", "60"))
            .await
            .unwrap();

        let reloaded = ConfigManager::load(&config_path).await.unwrap();
        assert_eq!(reloaded.snapshot().await.cache.ttl_secs, 60);
    }

    #[tokio::test]
    async fn test_invalid_update_is_not_applied() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let manager = ConfigManager::load(&config_path).await.unwrap();
        let result = manager.update(|c| c.set_value("cache.capacity", "0")).await;

        assert!(matches!(result, Err(ConfigError::Validation(_))));
        assert_eq!(manager.snapshot().await.cache.capacity, 100);
    }

    #[tokio::test]
    async fn test_reload_picks_up_changes() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let manager = ConfigManager::load(&config_path).await.unwrap();

        let mut edited = Config::default();
        edited.agent.delay_ms = 10;
        tokio::fs::write(&config_path, serde_json::to_string(&edited).unwrap())
            .await
            .unwrap();

        manager.reload().await.unwrap();
        assert_eq!(manager.snapshot().await.agent.delay_ms, 10);
    }

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("TAAI_TEST_VAR", "test_value");

        let content = r#"{"key": "${TAAI_TEST_VAR}", "other": "${TAAI_UNSET_VAR:-fallback}"}"#;
        let expanded = ConfigManager::expand_env_vars(content).unwrap();

        assert!(expanded.contains("test_value"));
        assert!(expanded.contains("fallback"));
    }

    #[test]
    fn test_missing_env_var_is_an_error() {
        let content = r#"{"key": "${TAAI_SURELY_NOT_SET_12345}"}"#;
        assert!(matches!(
            ConfigManager::expand_env_vars(content),
            Err(ConfigError::EnvVarNotFound(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(ConfigManager::validate(&config).is_err());

        config.server.port = 8080;
        assert!(ConfigManager::validate(&config).is_ok());

        config.llm.default_provider = "missing".to_string();
        assert!(ConfigManager::validate(&config).is_err());
    }

    #[test]
    fn test_cache_ttl_is_bounded() {
        let mut config = Config::default();
        config.cache.ttl_secs = MAX_CACHE_TTL_SECS;
        assert!(ConfigManager::validate(&config).is_ok());

        config.set_value("cache.ttl_secs", "10000000000000000").unwrap();
        assert!(matches!(
            ConfigManager::validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
