//! Configuration loading.
//!
//! Loads `config.toml` from `--config`, `$CONSOLEBOT_CONFIG`, or
//! `~/.consolebot/config.toml`. A missing default file means defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::qna::{DEFAULT_BASE_URL, DEFAULT_ROUTE};
use crate::schema::ConversationReference;

/// Env var naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "CONSOLEBOT_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides for the fixed console conversation.
    pub conversation: ConversationConfig,
    /// Console input handling.
    pub console: ConsoleConfig,
    /// Hosted Q&A endpoint.
    pub qna: QnaConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// Optional overrides for the default conversation reference.
///
/// Unset fields keep the console defaults (`console`, `user`/`User1`,
/// `bot`/`Bot`, `convo1`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Channel identifier.
    pub channel_id: Option<String>,
    /// User account id.
    pub user_id: Option<String>,
    /// User display name.
    pub user_name: Option<String>,
    /// Bot account id.
    pub bot_id: Option<String>,
    /// Bot display name.
    pub bot_name: Option<String>,
    /// Conversation id.
    pub conversation_id: Option<String>,
    /// Conversation display name.
    pub conversation_name: Option<String>,
    /// Service URL.
    pub service_url: Option<String>,
}

impl ConversationConfig {
    /// Conversation reference with these overrides applied to the defaults.
    pub fn reference(&self) -> ConversationReference {
        let mut reference = ConversationReference::default();
        let overrides = [
            (&self.channel_id, &mut reference.channel_id),
            (&self.user_id, &mut reference.user.id),
            (&self.user_name, &mut reference.user.name),
            (&self.bot_id, &mut reference.bot.id),
            (&self.bot_name, &mut reference.bot.name),
            (&self.conversation_id, &mut reference.conversation.id),
            (&self.conversation_name, &mut reference.conversation.name),
            (&self.service_url, &mut reference.service_url),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
        reference
    }
}

/// Console input handling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Drop blank lines instead of dispatching an empty message.
    pub skip_blank_lines: bool,
    /// Line printed before the input loop starts.
    pub greeting: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            skip_blank_lines: true,
            greeting: default_greeting(),
        }
    }
}

/// Hosted Q&A endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QnaConfig {
    /// Scheme and host of the service.
    pub base_url: String,
    /// Route of the `generateAnswer` operation.
    pub route: String,
    /// Env var (or `.env` key) holding the endpoint key.
    pub endpoint_key_env: String,
}

impl Default for QnaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            route: DEFAULT_ROUTE.to_owned(),
            endpoint_key_env: default_endpoint_key_env(),
        }
    }
}

/// Log output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for daily-rotated JSON logs. Console-only when unset.
    pub logs_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_dir: None,
        }
    }
}

// Default value functions for serde

fn default_greeting() -> String {
    "Hi... I'm an echobot. Ask me a question".to_owned()
}
fn default_endpoint_key_env() -> String {
    "QNA_ENDPOINT_KEY".to_owned()
}
fn default_log_level() -> String {
    "warn".to_owned()
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// An explicit `path` must exist. Otherwise the file is taken from
    /// `$CONSOLEBOT_CONFIG` or the config directory, and may be absent.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed, or
    /// an explicit path does not exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let env = |key: &str| std::env::var(key).ok();
        let mut config = match path {
            Some(path) => load_config(path)?,
            None => load_optional(&resolve_config_path(env)?)?,
        };
        config.apply_overrides(env);
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver function so tests do not touch the process env.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("CONSOLEBOT_QNA_BASE_URL") {
            self.qna.base_url = v;
        }
        if let Some(v) = env("CONSOLEBOT_QNA_ROUTE") {
            self.qna.route = v;
        }
        if let Some(v) = env("CONSOLEBOT_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env("CONSOLEBOT_SKIP_BLANK_LINES") {
            match v.parse() {
                Ok(skip) => self.console.skip_blank_lines = skip,
                Err(_) => tracing::warn!(
                    var = "CONSOLEBOT_SKIP_BLANK_LINES",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }
}

/// Load the config from a TOML file that must exist.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))?;
    Ok(config)
}

fn load_optional(path: &Path) -> anyhow::Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            tracing::debug!(path = %path.display(), "loading config from file");
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse config at {}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(anyhow::anyhow!(
            "failed to read config at {}: {e}",
            path.display()
        )),
    }
}

/// Resolve the config file path from `$CONSOLEBOT_CONFIG` or the config dir.
///
/// # Errors
///
/// Returns an error if neither is available.
pub fn resolve_config_path(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<PathBuf> {
    if let Some(p) = env(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(p));
    }
    Ok(config_dir()?.join("config.toml"))
}

/// Resolve the default config directory (`~/.consolebot/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".consolebot"))
}
