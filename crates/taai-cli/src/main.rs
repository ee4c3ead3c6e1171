use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use taai_cli::{ChatBackend, HttpChatClient, Orchestrator, Provider};
use taai_config::{Config, ConfigManager};
use taai_core::types::{ChatMessage, ChatSession};
use taai_session::{FileStore, SessionStore, SessionWatcher};

#[derive(Parser)]
#[command(name = "taai-cli")]
#[command(about = "Terminal client for the TAAI Agent")]
#[command(version)]
struct Cli {
    /// Server URL (overrides config)
    #[arg(long, env = "TAAI_SERVER_URL")]
    server_url: Option<String>,

    /// Backend that answers messages: openai or agent
    #[arg(long, default_value = "openai")]
    provider: Provider,

    /// Enable debug mode
    #[arg(long, short, default_value = "false")]
    debug: bool,

    /// Config file path
    #[arg(long, env = "TAAI_CONFIG", default_value = "~/.taai/config.json")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动交互式聊天
    Chat,
    /// 在当前会话中发送单条消息
    Send {
        /// 消息内容
        message: String,
    },
    /// 列出已保存的会话
    Sessions,
    /// 新建会话并设为当前会话
    New,
    /// 删除会话
    Delete {
        /// 会话 ID
        id: String,
    },
    /// 查看或设置显示名称
    Username {
        /// 新名称；省略时显示当前名称
        name: Option<String>,
    },
    /// 检查服务器状态
    Health,
    /// 配置管理命令
    Config(ConfigArgs),
}

#[derive(Args, Clone)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// 获取配置值
    Get {
        /// 配置键 (如: server.port, llm.sampling.temperature)
        key: String,
    },
    /// 设置配置值
    Set {
        /// 配置键 (如: server.port, cache.capacity)
        key: String,
        /// 配置值
        value: String,
    },
    /// 初始化默认配置
    Init {
        /// 强制覆盖已有配置
        #[arg(long, default_value = "false")]
        force: bool,
    },
    /// 显示当前配置
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "taai_cli=debug,taai_session=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(io::stderr)
        .try_init();

    // 展开配置文件路径
    let config_path = taai_config::expand_tilde(&cli.config)
        .unwrap_or_else(|| PathBuf::from(&cli.config));

    if cli.debug {
        eprintln!("{}", format!("[DEBUG] Config path: {:?}", config_path).dimmed());
    }

    if let Commands::Config(args) = &cli.command {
        return handle_config(args.clone(), config_path).await;
    }

    let config = ConfigManager::load(&config_path).await?.snapshot().await;
    let server_url = cli
        .server_url
        .clone()
        .unwrap_or_else(|| config.client.server_url.clone());

    if cli.debug {
        eprintln!("{}", format!("[DEBUG] Server URL: {}", server_url).dimmed());
    }

    let store = Arc::new(open_store(&config).await?);
    let client = HttpChatClient::new(server_url);

    match cli.command {
        Commands::Chat => {
            let orchestrator = Orchestrator::start(store.clone(), client)
                .await?
                .with_provider(cli.provider);
            let poll = Duration::from_secs(config.client.poll_interval_secs.max(1));
            run_interactive_chat(orchestrator, poll, cli.debug).await
        }
        Commands::Send { message } => {
            let mut orchestrator = Orchestrator::start(store, client)
                .await?
                .with_provider(cli.provider);
            send_message(&mut orchestrator, &message, cli.debug).await
        }
        Commands::Sessions => {
            print_sessions(&store.list_sessions().await?, store.current_session_id().await?);
            Ok(())
        }
        Commands::New => {
            let id = store.create_session().await?;
            println!("{}", format!("✅ New session: {}", id).green());
            Ok(())
        }
        Commands::Delete { id } => {
            let mut orchestrator = Orchestrator::start(store, client).await?;
            let was_active = orchestrator.active_id() == id;
            orchestrator.delete(&id).await?;
            println!("{}", format!("🗑  Deleted session {}", id).green());
            if was_active {
                println!(
                    "{}",
                    format!("Active session is now {}", orchestrator.active_id()).dimmed()
                );
            }
            Ok(())
        }
        Commands::Username { name } => {
            match name {
                Some(name) => {
                    store.save_username(&name).await?;
                    println!("{}", format!("✅ Username set to {}", name).green());
                }
                None => match store.username().await? {
                    Some(name) => println!("{}", name),
                    None => println!("{}", "No username set".dimmed()),
                },
            }
            Ok(())
        }
        Commands::Health => {
            let health = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
            Ok(())
        }
        Commands::Config(_) => Ok(()),
    }
}

async fn open_store(config: &Config) -> anyhow::Result<SessionStore> {
    let path = match &config.storage.path {
        Some(path) => path.clone(),
        None => taai_session::default_storage_path()
            .to_string_lossy()
            .into_owned(),
    };
    let backend = FileStore::new(&path).await?;
    Ok(SessionStore::new(Arc::new(backend)))
}

async fn handle_config(args: ConfigArgs, config_path: PathBuf) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Get { key } => {
            let manager = ConfigManager::load(&config_path).await?;
            let config = manager.snapshot().await;

            match config.get_value(&key) {
                Some(value) => {
                    println!("{}", format!("{} = {}", key, value).green());
                }
                None => {
                    println!("{}", format!("❌ Key not found: {}", key).red());
                    std::process::exit(1);
                }
            }
        }
        ConfigCommands::Set { key, value } => {
            let manager = ConfigManager::load(&config_path).await?;

            if let Err(e) = manager.update(|config| config.set_value(&key, &value)).await {
                eprintln!("{}", format!("❌ Failed to set value: {}", e).red());
                std::process::exit(1);
            }

            println!("{}", format!("✅ Set {} = {}", key, value).green());
        }
        ConfigCommands::Init { force } => {
            if config_path.exists() && !force {
                println!("{}", format!("⚠️  Config already exists at {:?}", config_path).yellow());
                println!("{}", "Use --force to overwrite".dimmed());
                return Ok(());
            }

            taai_config::init_taai_dirs().await?;

            let manager = ConfigManager::new(Config::default(), config_path.clone());
            manager.save().await?;

            println!("{}", format!("✅ Config initialized at {:?}", config_path).green());
            println!("{}", "You can edit this file to customize your settings".dimmed());
        }
        ConfigCommands::Show => {
            let manager = ConfigManager::load(&config_path).await?;
            let config = manager.snapshot().await;

            println!("{}", "📋 Current Configuration:".cyan().bold());
            println!();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

async fn send_message<C: ChatBackend>(
    orchestrator: &mut Orchestrator<C>,
    message: &str,
    debug: bool,
) -> anyhow::Result<()> {
    if debug {
        eprintln!(
            "{}",
            format!(
                "[DEBUG] Session {} via {}",
                orchestrator.active_id(),
                orchestrator.provider()
            )
            .dimmed()
        );
    }

    let start = Instant::now();
    let reply = orchestrator.submit(message).await?.cloned();

    if debug {
        eprintln!("{}", format!("[DEBUG] Reply in {:?}", start.elapsed()).dimmed());
    }

    match reply {
        Some(reply) => print_reply(&reply),
        None => println!("{}", "Nothing to send".dimmed()),
    }
    Ok(())
}

fn print_reply(message: &ChatMessage) {
    println!("{}", "TAAI:".green().bold());
    println!("{}", message.content);
}

fn print_sessions(sessions: &[ChatSession], current: Option<String>) {
    if sessions.is_empty() {
        println!("{}", "No saved sessions".dimmed());
        return;
    }

    for session in sessions {
        let marker = if current.as_deref() == Some(session.id.as_str()) { "*" } else { " " };
        println!(
            "{} {}  {}  {}",
            marker,
            session.id.cyan(),
            session.title,
            format!(
                "({} messages, {})",
                session.message_count,
                session.timestamp.format("%Y-%m-%d %H:%M")
            )
            .dimmed()
        );
    }
}

fn print_chat_help() {
    println!("{}", "Commands:".dimmed());
    println!("{}", "  /new              start a new session".dimmed());
    println!("{}", "  /sessions         list saved sessions".dimmed());
    println!("{}", "  /switch <id>      open another session".dimmed());
    println!("{}", "  /delete <id>      delete a session".dimmed());
    println!("{}", "  /provider <name>  openai or agent".dimmed());
    println!("{}", "  exit | quit       leave".dimmed());
}

async fn run_interactive_chat<C: ChatBackend>(
    mut orchestrator: Orchestrator<C>,
    poll_interval: Duration,
    debug: bool,
) -> anyhow::Result<()> {
    let (_watcher, mut sessions_rx) =
        SessionWatcher::spawn(orchestrator.store().clone(), poll_interval).await;

    let greeting = match orchestrator.store().username().await? {
        Some(name) => format!("🤖 TAAI Agent - welcome back, {}", name),
        None => "🤖 TAAI Agent Interactive Chat".to_string(),
    };
    println!("{}", greeting.cyan().bold());
    println!("{}", format!("Session ID: {}", orchestrator.active_id()).dimmed());
    println!("{}", format!("Provider: {}", orchestrator.provider()).dimmed());
    print_chat_help();
    println!();

    for message in orchestrator.messages().iter().filter(|m| !m.is_welcome()) {
        match message.role {
            taai_core::types::Role::User => println!("{} {}", "You:".cyan().bold(), message.content),
            _ => print_reply(message),
        }
    }

    loop {
        if sessions_rx.has_changed().unwrap_or(false) {
            let count = sessions_rx.borrow_and_update().len();
            if debug {
                eprintln!("{}", format!("[DEBUG] {} saved sessions", count).dimmed());
            }
        }

        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim_end_matches(['\r', '\n']);
        let command = input.trim();

        if command.eq_ignore_ascii_case("exit") || command.eq_ignore_ascii_case("quit") {
            println!("{}", "👋 Goodbye!".cyan());
            break;
        }

        if command.is_empty() {
            continue;
        }

        if let Some(rest) = command.strip_prefix('/') {
            let (name, arg) = match rest.split_once(' ') {
                Some((name, arg)) => (name, arg.trim()),
                None => (rest, ""),
            };

            let outcome = async {
                match name {
                    "new" => {
                        let id = orchestrator.new_chat().await?;
                        println!("{}", format!("✅ New session: {}", id).green());
                    }
                    "sessions" => {
                        let sessions = sessions_rx.borrow_and_update().clone();
                        print_sessions(&sessions, Some(orchestrator.active_id().to_string()));
                    }
                    "switch" if !arg.is_empty() => {
                        orchestrator.switch_to(arg).await?;
                        println!("{}", format!("Switched to {}", arg).green());
                    }
                    "delete" if !arg.is_empty() => {
                        orchestrator.delete(arg).await?;
                        println!("{}", format!("🗑  Deleted session {}", arg).green());
                        println!(
                            "{}",
                            format!("Active session: {}", orchestrator.active_id()).dimmed()
                        );
                    }
                    "provider" => match arg.parse::<Provider>() {
                        Ok(provider) => {
                            orchestrator.set_provider(provider);
                            println!("{}", format!("Provider: {}", provider).green());
                        }
                        Err(e) => println!("{}", format!("❌ {}", e).red()),
                    },
                    _ => print_chat_help(),
                }
                Ok::<(), anyhow::Error>(())
            }
            .await;

            if let Err(e) = outcome {
                println!("{}", format!("❌ Error: {}", e).red());
            }
            continue;
        }

        println!("{}", "Thinking...".dimmed());
        if let Err(e) = send_message(&mut orchestrator, input, debug).await {
            if debug {
                eprintln!("{}", format!("[DEBUG] Error: {:?}", e).dimmed());
            }
            println!("{}", format!("❌ Error: {}", e).red());
        }

        println!();
    }

    Ok(())
}
