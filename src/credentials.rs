//! Credential loading from the process environment and a private `.env` file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use crate::config::config_dir;
use crate::qna::EndpointKey;

const LOCAL_ENV_FILE: &str = ".env";

/// Credentials loaded from a `.env` file.
#[derive(Clone)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Returns a credential value for a key, if present and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// Load credentials from a specific `.env` path.
///
/// # Errors
///
/// Returns an error if the file does not exist, permissions are too broad,
/// or parsing fails.
pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "credentials file does not exist: {}",
            path.display()
        ));
    }

    validate_private_permissions(path)?;

    let mut vars = BTreeMap::new();
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to read credentials at {}", path.display()))?;

    for item in iter {
        let (key, value) = item.with_context(|| {
            format!(
                "failed to parse key-value entry in credentials file {}",
                path.display()
            )
        })?;
        vars.insert(key, value);
    }

    Ok(Credentials { vars })
}

/// Default `.env` location: `~/.consolebot/.env`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_env_file() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join(".env"))
}

/// `.env` location to read the endpoint key from.
///
/// Uses [`default_env_file`], or `.env` in the working directory when the
/// home directory cannot be determined.
pub fn endpoint_env_file() -> PathBuf {
    env_file_or_local(default_env_file())
}

fn env_file_or_local(resolved: anyhow::Result<PathBuf>) -> PathBuf {
    match resolved {
        Ok(path) => path,
        Err(err) => {
            warn!(
                error = %err,
                fallback = LOCAL_ENV_FILE,
                "config directory unavailable, reading .env from the working directory"
            );
            PathBuf::from(LOCAL_ENV_FILE)
        }
    }
}

/// Resolve the Q&A endpoint key named `var`.
///
/// The process environment (through `env`) wins; otherwise `env_file` is
/// consulted if it exists.
///
/// # Errors
///
/// Returns an error if the key is found in neither place or the `.env`
/// file is unreadable or too permissive.
pub fn resolve_endpoint_key(
    var: &str,
    env_file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<EndpointKey> {
    if let Some(key) = env(var).filter(|key| !key.trim().is_empty()) {
        debug!(var, "endpoint key taken from environment");
        return Ok(EndpointKey::new(key));
    }

    if env_file.exists() {
        let credentials = load_credentials(env_file)?;
        if let Some(key) = credentials.get(var) {
            debug!(var, path = %env_file.display(), "endpoint key taken from .env");
            return Ok(EndpointKey::new(key));
        }
    }

    Err(anyhow::anyhow!(
        "missing Q&A endpoint key: set {var} or add it to {}",
        env_file.display()
    ))
}

#[cfg(unix)]
fn validate_private_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .with_context(|| format!("failed to inspect credentials file {}", path.display()))?;
    let mode = metadata.permissions().mode() & 0o777;

    if mode & 0o077 != 0 {
        return Err(anyhow::anyhow!(
            "credentials file {} must be 0600, found {:o}",
            path.display(),
            mode
        ));
    }

    Ok(())
}

#[cfg(not(unix))]
fn validate_private_permissions(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
