/*!
 * Common test utilities for the strans test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use std::time::Duration;
use anyhow::Result;
use tempfile::TempDir;

use strans::app_config::Config;

// Re-export the mock translators module
pub mod mock_translators;

/// Accepted test key
pub const TEST_API_KEY: &str = "xai-test-key";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Three-block subtitle file content
pub const SAMPLE_SRT: &str = r#"1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
"#;

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// Creates a subtitle file with `count` single-line blocks "Line N"
pub fn create_numbered_subtitle(dir: &Path, filename: &str, count: usize) -> Result<PathBuf> {
    let content: String = (1..=count)
        .map(|i| format!("{}\n00:00:{:02},000 --> 00:00:{:02},500\nLine {}\n\n", i, i % 60, i % 60, i))
        .collect();
    create_test_file(dir, filename, &content)
}

/// Config with no backoff so retry tests stay fast
pub fn fast_config(batch_size: usize) -> Config {
    let mut config = Config::default();
    config.translation.batch_size = batch_size;
    config.retry.backoff_ms = 0;
    config
}

/// Route library logs to the test output; safe to call repeatedly
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Upper bound for any single run in tests
pub const RUN_TIMEOUT: Duration = Duration::from_secs(10);
