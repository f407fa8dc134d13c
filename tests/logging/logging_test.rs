//! Tests for `src/logging.rs`.

use consolebot::logging::LoggingGuard;

#[test]
fn logging_guard_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<LoggingGuard>();
}

#[test]
fn init_with_file_creates_logs_dir() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let logs_dir = tmp.path().join("logs");
    assert!(!logs_dir.exists());

    // Only one global subscriber can exist per process, so the result may
    // be an error if another test got there first. The directory is created
    // before the subscriber is installed either way.
    let _result = consolebot::logging::init_with_file(&logs_dir, "info");
    assert!(logs_dir.exists(), "logs directory should be created");
}

#[test]
fn second_console_init_fails_instead_of_panicking() {
    let _first = consolebot::logging::init_console("info");
    let second = consolebot::logging::init_console("info");
    assert!(second.is_err());
}
