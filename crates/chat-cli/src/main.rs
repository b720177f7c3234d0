use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use chat_core::Config;
use chat_gateway::{ChatGateway, HttpChatGateway};
use chat_state::{ChatSession, SubmitOutcome, SubmitRejected};
use clap::{Parser, Subcommand};
use colored::Colorize;

mod input;
mod logging;
mod render;

use input::{read_draft, InputLine};
use logging::init_logging;
use render::print_turn;

#[derive(Parser)]
#[command(name = "router-chat")]
#[command(about = "Terminal chat client for the multi-agent router")]
#[command(version)]
struct Cli {
    /// Router API base URL (overrides config and CHAT_API_BASE)
    #[arg(long)]
    server_url: Option<String>,

    /// User identifier sent with every message
    #[arg(long)]
    user_id: Option<String>,

    /// Path to a config.toml (default: ./config.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds, 0 to disable
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable debug mode
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat
    Chat,
    /// Send a single message and print the answer
    Send {
        /// Message content
        message: String,
    },
    /// View stored conversation history for the user
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Delete stored conversation history for the user
    ClearHistory,
    /// Check that the router is up
    Health,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::new(),
        };
        if let Some(server_url) = &self.server_url {
            config.api_base = server_url.clone();
        }
        if let Some(user_id) = &self.user_id {
            config.user_id = user_id.clone();
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = cli.load_config()?;
    log::debug!("Loaded config: {:?}", config);

    let gateway = Arc::new(HttpChatGateway::new(&config)?);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_interactive_chat(gateway, &config).await,
        Commands::Send { message } => send_message(gateway, &config, &message).await,
        Commands::History { limit } => get_history(&gateway, &config, limit).await,
        Commands::ClearHistory => clear_history(&gateway, &config).await,
        Commands::Health => check_health(&gateway).await,
    }
}

async fn send_message(
    gateway: Arc<HttpChatGateway>,
    config: &Config,
    message: &str,
) -> anyhow::Result<()> {
    let session = ChatSession::new(gateway, config.user_id.clone());
    session.update_draft(message).await;

    match session.submit().await {
        SubmitOutcome::Skipped => println!("{}", "Nothing to send.".yellow()),
        SubmitOutcome::Busy => anyhow::bail!("session is busy"),
        SubmitOutcome::Answered(turn) => print_turn(&turn),
        SubmitOutcome::Failed(turn) => {
            print_turn(&turn);
            let cause = session.last_error().await.unwrap_or_default();
            anyhow::bail!("request failed: {cause}");
        }
    }
    Ok(())
}

async fn run_interactive_chat(gateway: Arc<HttpChatGateway>, config: &Config) -> anyhow::Result<()> {
    let session = ChatSession::new(gateway.clone(), config.user_id.clone());

    println!("{}", "Multi-Agent AI Chat".cyan().bold());
    println!("{}", format!("User: {}  Server: {}", session.user_id(), config.api_base()).dimmed());
    println!(
        "{}",
        "Ask anything about DB, docs, or web. End a line with \\ for a newline; 'exit' or 'quit' to leave."
            .dimmed()
    );
    println!();

    let stdin = io::stdin();
    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let draft = match read_draft(&mut stdin.lock(), || {
            print!("{} ", "...".cyan());
            let _ = io::stdout().flush();
        })? {
            InputLine::Draft(draft) => draft,
            InputLine::Exit | InputLine::Eof => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
        };

        session.update_draft(draft).await;
        let pending = match session.begin_submit().await {
            Ok(pending) => pending,
            Err(SubmitRejected::EmptyDraft) => continue,
            Err(e) => {
                println!("{}", e.to_string().yellow());
                continue;
            }
        };
        println!("{}", session.phase().await.description().dimmed());

        // The user's own text is already on screen; print only the reply.
        let result = gateway.chat(session.user_id(), pending.message()).await;
        match session.complete_submit(pending, result).await? {
            SubmitOutcome::Answered(turn) => print_turn(&turn),
            SubmitOutcome::Failed(turn) => {
                print_turn(&turn);
                if let Some(error) = session.last_error().await {
                    log::debug!("Last gateway error: {}", error);
                }
            }
            SubmitOutcome::Skipped | SubmitOutcome::Busy => {}
        }
        println!();
    }

    Ok(())
}

async fn get_history(gateway: &HttpChatGateway, config: &Config, limit: usize) -> anyhow::Result<()> {
    let page = gateway.history(&config.user_id, limit).await?;

    println!(
        "{}",
        format!("History for {} ({} entries)", page.user_id, page.count).cyan()
    );
    for entry in &page.history {
        let when = entry.timestamp.as_deref().unwrap_or("-");
        let role = if entry.role == "user" {
            entry.role.cyan()
        } else {
            entry.role.green()
        };
        println!("{} {}: {}", when.dimmed(), role, entry.content);
    }
    Ok(())
}

async fn clear_history(gateway: &HttpChatGateway, config: &Config) -> anyhow::Result<()> {
    let response = gateway.clear_history(&config.user_id).await?;
    let message = response
        .message
        .unwrap_or_else(|| format!("History cleared for user {}", config.user_id));
    println!("{}", format!("{}: {}", response.status, message).green());
    Ok(())
}

async fn check_health(gateway: &HttpChatGateway) -> anyhow::Result<()> {
    let health = gateway.health().await?;
    if health.is_ok() {
        println!("{}", format!("Router is up ({})", gateway.api_base()).green());
        Ok(())
    } else {
        anyhow::bail!("Router reported status {:?}", health.status)
    }
}
