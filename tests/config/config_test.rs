//! Coverage for config parsing, overrides and path resolution.

use std::path::{Path, PathBuf};

use consolebot::config::{
    config_dir, load_config, resolve_config_path, Config, ConversationConfig, CONFIG_PATH_ENV,
};
use consolebot::qna::{DEFAULT_BASE_URL, DEFAULT_ROUTE};

#[test]
fn defaults_match_console_bot() {
    let config = Config::default();
    assert!(config.console.skip_blank_lines);
    assert_eq!(config.qna.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.qna.route, DEFAULT_ROUTE);
    assert_eq!(config.qna.endpoint_key_env, "QNA_ENDPOINT_KEY");
    assert_eq!(config.logging.level, "warn");
    assert!(config.logging.logs_dir.is_none());
}

#[test]
fn config_dir_resolves() {
    let dir = config_dir();
    let path = match dir {
        Ok(path) => path,
        Err(err) => panic!("config dir should resolve: {err}"),
    };
    assert!(path.ends_with(".consolebot"));
}

#[test]
fn config_path_env_wins() {
    let resolved = resolve_config_path(|key| {
        (key == CONFIG_PATH_ENV).then(|| "/tmp/custom.toml".to_owned())
    });
    match resolved {
        Ok(path) => assert_eq!(path, PathBuf::from("/tmp/custom.toml")),
        Err(err) => panic!("path should resolve: {err}"),
    }
}

#[test]
fn parse_full_config() {
    let toml_str = r#"
[conversation]
channel_id = "terminal"
user_name = "Ada"
conversation_id = "session-7"

[console]
skip_blank_lines = false
greeting = "hello there"

[qna]
base_url = "http://127.0.0.1:8080"
route = "/kb/generateAnswer"
endpoint_key_env = "MY_KB_KEY"

[logging]
level = "debug"
logs_dir = "/tmp/consolebot-logs"
"#;
    let config = match toml::from_str::<Config>(toml_str) {
        Ok(config) => config,
        Err(err) => panic!("full config should parse: {err}"),
    };

    assert!(!config.console.skip_blank_lines);
    assert_eq!(config.console.greeting, "hello there");
    assert_eq!(config.qna.endpoint_key_env, "MY_KB_KEY");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.logging.logs_dir.as_deref(),
        Some(Path::new("/tmp/consolebot-logs"))
    );

    let reference = config.conversation.reference();
    assert_eq!(reference.channel_id, "terminal");
    assert_eq!(reference.user.name, "Ada");
    assert_eq!(reference.user.id, "user");
    assert_eq!(reference.conversation.id, "session-7");
    assert_eq!(reference.bot.name, "Bot");
}

#[test]
fn partial_sections_keep_defaults() {
    let config = match toml::from_str::<Config>("[qna]\nroute = \"/other\"\n") {
        Ok(config) => config,
        Err(err) => panic!("partial config should parse: {err}"),
    };
    assert_eq!(config.qna.route, "/other");
    assert_eq!(config.qna.base_url, DEFAULT_BASE_URL);
    assert!(config.console.skip_blank_lines);
}

#[test]
fn conversation_overrides_apply_to_reference() {
    let overrides = ConversationConfig {
        bot_id: Some("helper".to_owned()),
        service_url: Some("http://localhost".to_owned()),
        ..ConversationConfig::default()
    };
    let reference = overrides.reference();
    assert_eq!(reference.bot.id, "helper");
    assert_eq!(reference.service_url, "http://localhost");
    assert_eq!(reference.channel_id, "console");
}

#[test]
fn env_overrides_replace_file_values() {
    let mut config = Config::default();
    config.apply_overrides(|key| match key {
        "CONSOLEBOT_QNA_ROUTE" => Some("/env/route".to_owned()),
        "CONSOLEBOT_LOG_LEVEL" => Some("trace".to_owned()),
        "CONSOLEBOT_SKIP_BLANK_LINES" => Some("false".to_owned()),
        _ => None,
    });
    assert_eq!(config.qna.route, "/env/route");
    assert_eq!(config.logging.level, "trace");
    assert!(!config.console.skip_blank_lines);
}

#[test]
fn load_config_reads_file() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("temp dir should be created: {err}"),
    };
    let path = dir.path().join("config.toml");
    let write = std::fs::write(&path, "[console]\ngreeting = \"yo\"\n");
    assert!(write.is_ok());

    match load_config(&path) {
        Ok(config) => assert_eq!(config.console.greeting, "yo"),
        Err(err) => panic!("config should load: {err}"),
    }
}

#[test]
fn explicit_missing_config_is_an_error() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("temp dir should be created: {err}"),
    };
    let missing = dir.path().join("nope.toml");
    assert!(Config::load(Some(&missing)).is_err());
}

#[test]
fn malformed_config_is_an_error() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("temp dir should be created: {err}"),
    };
    let path = dir.path().join("config.toml");
    let write = std::fs::write(&path, "[console\n");
    assert!(write.is_ok());
    assert!(load_config(&path).is_err());
}
