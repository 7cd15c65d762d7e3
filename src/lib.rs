/*!
 * # strans - batch translator for subtitles and localization files
 *
 * Translates `.srt` subtitle files and flat `.json` localization files
 * through the xAI chat completions API.
 *
 * ## Features
 *
 * - Multi-file runs processed one file at a time
 * - Chunked requests with a fixed retry budget per chunk
 * - Fallback to the source text when a chunk cannot be translated
 * - Cancellation at chunk boundaries with a partial result saved to disk
 * - Format-preserving JSON rewriting (comments and layout survive)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `formats`: SRT and JSON parsing and rendering
 * - `providers`: The batch translation seam and the xAI client
 * - `translation`: AI-powered translation services:
 *   - `translation::batch`: Chunking with retry and fallback
 *   - `translation::retry`: Retry policy
 *   - `translation::cancel`: Cooperative cancellation
 * - `app_controller`: Run lifecycle, progress and log events
 * - `key_store`: API key persistence
 * - `file_utils`: File system operations
 * - `language_utils`: Target language resolution
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod formats;
pub mod key_store;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunEvent, RunHandle, RunStatus, RunSummary};
pub use errors::{AppError, ErrorKind, FormatError, ProviderError};
pub use formats::{FileFormat, ParsedDocument, TranslationUnit, UnitId};
pub use providers::{BatchOutcome, BatchTranslate};
pub use translation::{BatchTranslator, CancelSignal, RetryPolicy};
