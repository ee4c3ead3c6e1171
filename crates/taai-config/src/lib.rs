pub mod config;
pub mod manager;

pub use config::{
    AgentConfig, AuthSettings, CacheConfig, ClientConfig, Config, ConfigError, ConfigResult,
    LlmConfig, LogLevel, LoggingConfig, PromptConfig, ProviderSettings, SamplingConfig,
    ServerConfig, StorageConfig, MAX_CACHE_TTL_SECS,
};
pub use manager::ConfigManager;

use std::path::PathBuf;

/// 获取 TAAI 配置目录路径
pub fn taai_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".taai"))
}

/// 获取默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    taai_dir().map(|dir| dir.join("config.json"))
}

/// 获取默认会话存储目录
pub fn default_storage_dir() -> Option<PathBuf> {
    taai_dir().map(|dir| dir.join("storage"))
}

/// 初始化 TAAI 目录结构
pub async fn init_taai_dirs() -> ConfigResult<()> {
    if let Some(taai) = taai_dir() {
        tokio::fs::create_dir_all(&taai).await?;
        tokio::fs::create_dir_all(taai.join("storage")).await?;
    }
    Ok(())
}

/// 展开路径中的 ~ 为用户主目录
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taai_dir() {
        let dir = taai_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().to_string_lossy().contains(".taai"));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/.taai/config.json");
        assert!(expanded.is_some());
        assert!(!expanded.unwrap().to_string_lossy().starts_with('~'));

        assert_eq!(expand_tilde("/tmp/x"), Some(PathBuf::from("/tmp/x")));
    }
}
