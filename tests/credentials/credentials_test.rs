//! Coverage for credential loading, permission checks and key resolution.

use std::fs;
use std::path::{Path, PathBuf};

use consolebot::credentials::{load_credentials, resolve_endpoint_key};
use consolebot::qna::EndpointKey;

fn temp_env_path() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("consolebot_test_{}", uuid::Uuid::new_v4()));
    let create = fs::create_dir_all(&dir);
    assert!(create.is_ok());
    dir.join(".env")
}

fn write_private(path: &Path, contents: &str) {
    let write = fs::write(path, contents);
    assert!(write.is_ok());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let chmod = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
        assert!(chmod.is_ok());
    }
}

#[test]
fn loads_env_credentials() {
    let env_path = temp_env_path();
    write_private(&env_path, "QNA_ENDPOINT_KEY=abc123\nOTHER=value\n");

    let loaded = load_credentials(&env_path);
    let credentials = match loaded {
        Ok(credentials) => credentials,
        Err(err) => panic!("credentials should load: {err}"),
    };

    assert_eq!(credentials.get("QNA_ENDPOINT_KEY"), Some("abc123"));
    assert_eq!(credentials.get("OTHER"), Some("value"));
    assert!(credentials.get("MISSING").is_none());
}

#[cfg(unix)]
#[test]
fn rejects_world_readable_credentials() {
    use std::os::unix::fs::PermissionsExt;

    let env_path = temp_env_path();
    let write = fs::write(&env_path, "QNA_ENDPOINT_KEY=abc123\n");
    assert!(write.is_ok());
    let chmod = fs::set_permissions(&env_path, fs::Permissions::from_mode(0o644));
    assert!(chmod.is_ok());

    let loaded = load_credentials(&env_path);
    let err = match loaded {
        Ok(_) => panic!("0644 credentials should be rejected"),
        Err(err) => err,
    };
    assert!(err.to_string().contains("must be 0600"));
}

#[test]
fn missing_credentials_file_is_an_error() {
    let env_path = temp_env_path();
    assert!(load_credentials(&env_path).is_err());
}

#[test]
fn debug_output_hides_values() {
    let env_path = temp_env_path();
    write_private(&env_path, "QNA_ENDPOINT_KEY=super-secret\n");

    let credentials = match load_credentials(&env_path) {
        Ok(credentials) => credentials,
        Err(err) => panic!("credentials should load: {err}"),
    };

    let debug = format!("{credentials:?}");
    assert!(debug.contains("QNA_ENDPOINT_KEY"));
    assert!(!debug.contains("super-secret"));
}

#[test]
fn endpoint_key_prefers_process_env() {
    let env_path = temp_env_path();
    write_private(&env_path, "QNA_ENDPOINT_KEY=from-file\n");

    let resolved = resolve_endpoint_key("QNA_ENDPOINT_KEY", &env_path, |key| {
        (key == "QNA_ENDPOINT_KEY").then(|| "from-env".to_owned())
    });
    match resolved {
        Ok(key) => assert_eq!(key, EndpointKey::new("from-env")),
        Err(err) => panic!("key should resolve: {err}"),
    }
}

#[test]
fn endpoint_key_falls_back_to_env_file() {
    let env_path = temp_env_path();
    write_private(&env_path, "QNA_ENDPOINT_KEY=from-file\n");

    let resolved = resolve_endpoint_key("QNA_ENDPOINT_KEY", &env_path, |_| None);
    match resolved {
        Ok(key) => assert_eq!(key.header_value(), "EndpointKey from-file"),
        Err(err) => panic!("key should resolve from file: {err}"),
    }
}

#[test]
fn endpoint_key_missing_everywhere_is_an_error() {
    let env_path = temp_env_path();

    let resolved = resolve_endpoint_key("QNA_ENDPOINT_KEY", &env_path, |_| {
        Some("   ".to_owned())
    });
    let err = match resolved {
        Ok(_) => panic!("blank env value should not count as a key"),
        Err(err) => err,
    };
    assert!(err.to_string().contains("QNA_ENDPOINT_KEY"));
}
