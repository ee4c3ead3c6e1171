use clap::Parser;
use taai_config::ConfigManager;
use taai_server::{logging::init_logging, run_server, AppState, LlmOverrides};

#[derive(Parser, Debug, Clone)]
#[command(name = "taai-server")]
#[command(about = "TAAI Agent HTTP Server")]
#[command(version)]
struct Cli {
    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Server port (overrides config)
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Bind address (overrides config)
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// LLM API base URL (overrides config)
    #[arg(long, env = "LLM_BASE_URL")]
    llm_base_url: Option<String>,

    /// LLM model name (overrides config)
    #[arg(long, env = "LLM_MODEL")]
    model: Option<String>,

    /// LLM API key (overrides config)
    #[arg(long, env = "LLM_API_KEY")]
    api_key: Option<String>,

    /// Log level (overrides config)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long, default_value = "false")]
    json_logs: bool,

    /// Config file path
    #[arg(long, env = "TAAI_CONFIG", default_value = "~/.taai/config.json")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 展开配置文件路径
    let config_path = taai_config::expand_tilde(&cli.config)
        .unwrap_or_else(|| std::path::PathBuf::from(&cli.config));

    if let Err(e) = taai_config::init_taai_dirs().await {
        eprintln!("Warning: Failed to init taai directories: {}", e);
    }

    let config_manager = ConfigManager::load(&config_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load config from {:?}: {}", config_path, e))?;
    let config = config_manager.snapshot().await;

    // CLI 参数覆盖配置文件
    let log_level = match (&cli.log_level, cli.debug) {
        (Some(level), _) => level.clone(),
        (None, true) => "debug".to_string(),
        (None, false) => config.logging.level.to_string(),
    };
    init_logging(&log_level, cli.json_logs || config.logging.json)?;

    tracing::info!("Config loaded from {:?}", config_path);

    let port = cli.port.unwrap_or(config.server.port);
    let host = cli.host.clone().unwrap_or_else(|| config.server.host.clone());

    let overrides = LlmOverrides {
        base_url: cli.llm_base_url.clone(),
        model: cli.model.clone(),
        api_key: cli.api_key.clone(),
    };
    let state = AppState::from_config(&config, &overrides)?;

    tracing::info!("Starting TAAI Server on {}:{}", host, port);
    tracing::info!("  Provider: {}", config.llm.default_provider);
    tracing::info!("  Model: {}", state.chat.model());
    tracing::info!(
        "  Cache: enabled={} capacity={} ttl={}s",
        config.cache.enabled,
        config.cache.capacity,
        config.cache.ttl_secs
    );
    tracing::debug!("  CORS: {}", config.server.cors);

    run_server(state, &host, port).await
}
