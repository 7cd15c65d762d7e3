/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;
use anyhow::Result;
use strans::file_utils::{FileManager, OutputKind};
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));

    Ok(())
}

/// Test that output_path builds translated and partial names next to the input
#[test]
fn test_output_path_withBothKinds_shouldPlaceFileNextToInput() {
    let input_file = Path::new("/tmp/input/movie.srt");

    assert_eq!(
        FileManager::output_path(input_file, "Bulgarian", OutputKind::Translated),
        Path::new("/tmp/input/movie_translated_Bulgarian.srt")
    );
    assert_eq!(
        FileManager::output_path(input_file, "Bulgarian", OutputKind::Partial),
        Path::new("/tmp/input/movie_partial_Bulgarian.srt")
    );
}

/// Test that the size guard rejects files above the limit
#[test]
fn test_check_file_size_withOversizedFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let small = common::create_test_file(temp_dir.path(), "small.srt", "12345")?;

    assert_eq!(FileManager::check_file_size(&small, 5)?, 5);
    let err = FileManager::check_file_size(&small, 4).unwrap_err();
    assert!(err.to_string().contains("File too large"));

    Ok(())
}

/// Test that directories are expanded to .srt and .json files only
#[test]
fn test_collect_inputs_withDirectory_shouldFindTranslatableFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("nested");
    fs::create_dir_all(&nested)?;
    common::create_test_subtitle(temp_dir.path(), "a.srt")?;
    common::create_test_file(&nested, "b.JSON", "{}")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "skip me")?;
    let explicit = common::create_test_file(temp_dir.path(), "explicit.txt", "kept")?;

    let files = FileManager::collect_inputs(&[
        temp_dir.path().to_path_buf(),
        explicit.clone(),
        temp_dir.path().join("missing.srt"),
    ])?;

    assert_eq!(files.len(), 3);
    assert!(files.iter().any(|p| p.ends_with("a.srt")));
    assert!(files.iter().any(|p| p.ends_with("nested/b.JSON")));
    assert!(files.contains(&explicit));

    Ok(())
}

/// Test that log lines carry the given timestamp and the log can be reset
#[test]
fn test_append_to_log_file_withTwoLines_shouldAppendInOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let log_path = temp_dir.path().join("translation_log.txt");

    FileManager::append_to_log_file(&log_path, "10:00:00", "Processing: a.srt (1/1)")?;
    FileManager::append_to_log_file(&log_path, "10:00:01", "Saved: a_translated_French.srt")?;
    let content = fs::read_to_string(&log_path)?;
    assert_eq!(
        content,
        "[10:00:00] Processing: a.srt (1/1)\n[10:00:01] Saved: a_translated_French.srt\n"
    );

    FileManager::reset_log_file(&log_path)?;
    assert!(!log_path.exists());
    // Resetting a missing log is fine
    FileManager::reset_log_file(&log_path)?;

    Ok(())
}
