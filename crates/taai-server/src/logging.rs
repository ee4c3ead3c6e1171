//! 日志初始化
//!
//! 基于 tracing-subscriber：`RUST_LOG` 优先，否则使用传入的级别。

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化全局日志订阅器
///
/// `json` 为 true 时输出结构化 JSON，否则输出带颜色的文本。
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(level)?,
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    tracing::debug!("Logging initialized with level: {}", level);
    Ok(())
}

/// 构建过滤器：依赖库保持在 warn，本项目使用指定级别
fn build_filter(level: &str) -> anyhow::Result<EnvFilter> {
    let directives = format!(
        "warn,taai_server={level},taai_llm={level},tower_http={level}",
        level = level
    );
    EnvFilter::try_new(directives).map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", level, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter() {
        assert!(build_filter("debug").is_ok());
        assert!(build_filter("info").is_ok());
        assert!(build_filter("verbose").is_err());
    }
}
