//! consolebot binary: greets the user and runs the console loop.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use consolebot::adapters::{ConsoleAdapter, LoggingMiddleware};
use consolebot::bot::{Bot, EchoBot, QnaBot};
use consolebot::config::Config;
use consolebot::credentials::{endpoint_env_file, resolve_endpoint_key};
use consolebot::logging::{self, LoggingGuard};
use consolebot::qna::QnaClient;

/// Console chat bot.
#[derive(Debug, Parser)]
#[command(name = "consolebot", version, about)]
struct Cli {
    /// Path to config.toml (default: $CONSOLEBOT_CONFIG or ~/.consolebot/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Echo every message back; `quit` ends the session.
    Echo,
    /// Send every message to the hosted Q&A knowledge base (default).
    Qna,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let _guard = init_logging(&config)?;

    let adapter = ConsoleAdapter::new(config.conversation.reference())
        .skip_blank_lines(config.console.skip_blank_lines)
        .with_middleware(Arc::new(LoggingMiddleware));

    let bot: Box<dyn Bot> = match cli.command.unwrap_or(Command::Qna) {
        Command::Echo => Box::new(EchoBot),
        Command::Qna => Box::new(build_qna_bot(&config)?),
    };

    println!("{}", config.console.greeting);

    tokio::select! {
        result = adapter.process_activity(bot.as_ref()) => {
            result.context("console loop failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
        }
    }

    Ok(())
}

fn init_logging(config: &Config) -> anyhow::Result<Option<LoggingGuard>> {
    match &config.logging.logs_dir {
        Some(dir) => logging::init_with_file(dir, &config.logging.level).map(Some),
        None => logging::init_console(&config.logging.level).map(|()| None),
    }
}

fn build_qna_bot(config: &Config) -> anyhow::Result<QnaBot> {
    let env_file = endpoint_env_file();
    let key = resolve_endpoint_key(&config.qna.endpoint_key_env, &env_file, |key| {
        std::env::var(key).ok()
    })?;
    let client = QnaClient::new(&config.qna.base_url, &config.qna.route, key)
        .context("invalid Q&A endpoint configuration")?;
    info!(endpoint = %client.endpoint(), "qna bot ready");
    Ok(QnaBot::new(client))
}
