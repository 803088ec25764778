//! Log output lands in the configured file.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use tripboard::config::Config;
use tripboard::logging::init_logging;

#[test]
fn log_lines_are_appended_to_the_configured_file() {
    // The configured level must win for this check
    std::env::remove_var("RUST_LOG");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tripboard.log");
    let config = Config {
        log_file: Some(path.clone()),
        log_level: "debug".to_string(),
        ..Config::default()
    };

    assert_eq!(init_logging(&config).unwrap(), Some(path.clone()));
    tracing::info!(trip = "T1", "trip selected");

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("trip selected"));
    assert!(contents.contains("T1"));

    // A second subscriber cannot be installed in the same process
    assert!(init_logging(&config).is_err());
}
