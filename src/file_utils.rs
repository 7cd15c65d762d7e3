use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use std::fs::OpenOptions;
use std::io::Write;
use log::warn;

use crate::errors::FormatError;
use crate::formats::FileFormat;

// @module: File and directory utilities

/// Which output file to derive from an input path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Complete translation: `<stem>_translated_<Language><ext>`
    Translated,
    /// Translation interrupted by cancel: `<stem>_partial_<Language><ext>`
    Partial,
}

impl OutputKind {
    fn marker(&self) -> &'static str {
        match self {
            Self::Translated => "translated",
            Self::Partial => "partial",
        }
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Output path next to the input file
    // @params: input_file, target_language, kind
    pub fn output_path<P: AsRef<Path>>(input_file: P, target_language: &str, kind: OutputKind) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        let mut output_filename = format!("{}_{}_{}", stem, kind.marker(), target_language);
        if let Some(ext) = input_file.extension() {
            output_filename.push('.');
            output_filename.push_str(&ext.to_string_lossy());
        }

        input_file.with_file_name(output_filename)
    }

    /// Find translatable (.srt and .json) files below a directory, sorted by path
    pub fn find_translatable_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && FileFormat::from_path(path).is_ok() {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Expand command-line inputs into a file list.
    ///
    /// Directories are searched recursively, plain files are taken as given
    /// and missing paths are reported and dropped.
    pub fn collect_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if Self::dir_exists(path) {
                files.extend(Self::find_translatable_files(path)?);
            } else if Self::file_exists(path) {
                files.push(path.to_path_buf());
            } else {
                warn!("Input path does not exist: {:?}", path);
            }
        }
        files.dedup();
        Ok(files)
    }

    /// Reject files larger than `limit` bytes without reading them
    pub fn check_file_size<P: AsRef<Path>>(path: P, limit: u64) -> Result<u64> {
        let size = fs::metadata(&path)
            .with_context(|| format!("Failed to read metadata: {:?}", path.as_ref()))?
            .len();
        if size > limit {
            return Err(FormatError::TooLarge { size, limit }.into());
        }
        Ok(size)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Remove a log file left over from a previous session
    pub fn reset_log_file<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if Self::file_exists(path) {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove log file: {:?}", path))?;
        }
        Ok(())
    }

    /// Append one `[timestamp] content` line to a log file
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, timestamp: &str, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        // Open file in append mode, create if it doesn't exist
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
