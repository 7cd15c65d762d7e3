use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use log::{debug, error, info};
use parking_lot::RwLock;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::app_config::Config;
use crate::errors::{AppError, FormatError};
use crate::file_utils::{FileManager, OutputKind};
use crate::formats::{FileFormat, ParsedDocument, TranslationUnit};
use crate::key_store;
use crate::language_utils;
use crate::providers::BatchTranslate;
use crate::providers::xai::XaiClient;
use crate::translation::{BatchTranslator, CancelSignal, ChunkEvent, ChunkResolution, RetryPolicy};

// @module: Run controller for batch file translation

/// Step of the file currently being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePhase {
    Parsing,
    Translating,
    Saving,
}

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    /// Working on the file at `file_index` (one-based)
    Running { file_index: usize, phase: FilePhase },
    Completed,
    Canceled,
    /// The worker died unexpectedly
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Info,
    Success,
    Error,
    Progress,
}

/// One timestamped line of the run log
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    /// Local wall-clock time, `HH:MM:SS`
    pub timestamp: String,
    pub message: String,
    pub severity: LogSeverity,
}

impl LogLine {
    pub fn new(severity: LogSeverity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
            severity,
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp, self.message)
    }
}

/// Progress of the current file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// One-based index of the current file
    pub file_index: usize,
    pub file_count: usize,
    pub translated: usize,
    pub total: usize,
    /// `floor(100 * translated / total)`
    pub percent: u8,
}

impl ProgressUpdate {
    pub fn new(file_index: usize, file_count: usize, translated: usize, total: usize) -> Self {
        Self {
            file_index,
            file_count,
            translated,
            total,
            percent: percent(translated, total),
        }
    }
}

/// Integer percentage rounded down, capped at 100
pub fn percent(translated: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let value = translated.saturating_mul(100) / total;
    value.min(100) as u8
}

/// Messages posted from the worker to the foreground
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Progress(ProgressUpdate),
    Log(LogLine),
    StateChanged(RunStatus),
    /// Last event of a run
    RunFinished(RunSummary),
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Fully processed and saved
    Translated { output: PathBuf, fallback_chunks: usize },
    /// Interrupted by cancel; `output` is `None` when nothing was resolved
    Partial { output: Option<PathBuf> },
    /// Nothing to translate, or not a supported format
    Skipped { reason: String },
    Failed { error: String },
    /// Still queued when the run was canceled
    NotStarted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Final report of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub files: Vec<FileReport>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn translated_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Translated { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Failed { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Skipped { .. }))
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|report| predicate(&report.outcome)).count()
    }
}

/// Units of the file being translated
#[derive(Debug, Clone)]
pub struct FileJob {
    pub path: PathBuf,
    pub format: FileFormat,
    pub units: Vec<TranslationUnit>,
    pub total_count: usize,
    /// Units resolved so far; only grows
    pub translated_count: usize,
}

impl FileJob {
    pub fn new(path: impl Into<PathBuf>, format: FileFormat, units: Vec<TranslationUnit>) -> Self {
        Self {
            path: path.into(),
            format,
            total_count: units.len(),
            units,
            translated_count: 0,
        }
    }

    /// Store the resolved prefix returned by the chunk engine
    pub fn apply(&mut self, resolved: Vec<TranslationUnit>) {
        let count = resolved.len().min(self.units.len());
        for (slot, unit) in self.units.iter_mut().zip(resolved) {
            *slot = unit;
        }
        self.translated_count = count;
    }

    pub fn resolved_units(&self) -> &[TranslationUnit] {
        &self.units[..self.translated_count.min(self.units.len())]
    }
}

// Worker-side bookkeeping
struct RunState {
    cancel_requested: bool,
    current_file_job: Option<FileJob>,
    files_remaining: VecDeque<PathBuf>,
    reports: Vec<FileReport>,
}

// State readable from both sides of a run
struct RunShared {
    cancel: CancelSignal,
    status: RwLock<RunStatus>,
}

// Clears the controller's busy flag however the worker exits
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone)]
struct EventSink {
    sender: UnboundedSender<RunEvent>,
}

impl EventSink {
    // A dropped receiver only means nobody is watching
    fn emit(&self, event: RunEvent) {
        let _ = self.sender.send(event);
    }

    fn log(&self, severity: LogSeverity, message: impl Into<String>) {
        let line = LogLine::new(severity, message);
        debug!("{}", line.message);
        self.emit(RunEvent::Log(line));
    }
}

struct FileStep {
    outcome: FileOutcome,
    canceled: bool,
}

impl FileStep {
    fn done(outcome: FileOutcome) -> Self {
        Self { outcome, canceled: false }
    }

    fn canceled(outcome: FileOutcome) -> Self {
        Self { outcome, canceled: true }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Foreground side of a running translation
pub struct RunHandle {
    run_id: Uuid,
    started: Instant,
    shared: Arc<RunShared>,
    events: UnboundedReceiver<RunEvent>,
    worker: JoinHandle<RunSummary>,
}

impl RunHandle {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Ask the worker to stop at the next chunk or attempt boundary
    pub fn cancel(&self) {
        self.shared.cancel.cancel();
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        self.shared.cancel.clone()
    }

    /// Latest published status
    pub fn status(&self) -> RunStatus {
        *self.shared.status.read()
    }

    /// Next posted event; `None` once the worker has exited
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Wait for the worker and return its summary
    pub async fn wait(self) -> RunSummary {
        match self.worker.await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Translation worker stopped unexpectedly: {}", e);
                *self.shared.status.write() = RunStatus::Failed;
                RunSummary {
                    run_id: self.run_id,
                    status: RunStatus::Failed,
                    files: Vec::new(),
                    elapsed: self.started.elapsed(),
                }
            }
        }
    }

    /// Drain every event, then wait for the summary
    pub async fn collect(mut self) -> (Vec<RunEvent>, RunSummary) {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        let summary = self.wait().await;
        (events, summary)
    }
}

/// Starts runs; at most one at a time
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Set while a run is active
    active: Arc<AtomicBool>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Self {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start translating `files` with the xAI client.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, files: Vec<PathBuf>, target_language: &str, api_key: &str) -> Result<RunHandle, AppError> {
        self.check_api_key(api_key)?;
        let client = XaiClient::new(api_key.trim(), &self.config.translation)?;
        self.start_with_translator(files, target_language, api_key, Arc::new(client))
    }

    /// Start translating `files` with any [`BatchTranslate`] implementation
    pub fn start_with_translator(
        &self,
        files: Vec<PathBuf>,
        target_language: &str,
        api_key: &str,
        translator: Arc<dyn BatchTranslate>,
    ) -> Result<RunHandle, AppError> {
        if files.is_empty() {
            return Err(AppError::Config("No files selected".to_string()));
        }
        self.check_api_key(api_key)?;
        let language = language_utils::resolve_language_name(target_language)
            .map_err(|e| AppError::Config(e.to_string()))?;

        if self.active.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return Err(AppError::Config("A run is already in progress".to_string()));
        }

        let run_id = Uuid::new_v4();
        let shared = Arc::new(RunShared {
            cancel: CancelSignal::new(),
            status: RwLock::new(RunStatus::Idle),
        });
        let (sender, events) = mpsc::unbounded_channel();

        let worker = RunWorker {
            run_id,
            shared: shared.clone(),
            sink: EventSink { sender },
            engine: BatchTranslator::new(
                translator,
                self.config.translation.batch_size,
                RetryPolicy::from_config(&self.config.retry),
            ),
            target_language: language,
            max_file_size: self.config.files.max_file_size_bytes,
        };
        let state = RunState {
            cancel_requested: false,
            current_file_job: None,
            files_remaining: files.into(),
            reports: Vec::new(),
        };

        info!("Starting run {} with {} files", run_id, state.files_remaining.len());
        let guard = ActiveGuard(self.active.clone());
        let started = Instant::now();
        let worker = tokio::spawn(async move {
            let _guard = guard;
            worker.run(state, started).await
        });

        Ok(RunHandle {
            run_id,
            started,
            shared,
            events,
            worker,
        })
    }

    fn check_api_key(&self, api_key: &str) -> Result<(), AppError> {
        if key_store::is_valid_key(api_key, &self.config.keys.accepted_prefixes) {
            Ok(())
        } else {
            Err(AppError::Config("Missing or invalid API key".to_string()))
        }
    }

    /// Format a duration in a human-readable form
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

struct RunWorker {
    run_id: Uuid,
    shared: Arc<RunShared>,
    sink: EventSink,
    engine: BatchTranslator,
    target_language: String,
    max_file_size: u64,
}

impl RunWorker {
    async fn run(self, mut state: RunState, started: Instant) -> RunSummary {
        let file_count = state.files_remaining.len();
        let mut file_index = 0;

        while let Some(path) = state.files_remaining.pop_front() {
            if self.shared.cancel.is_canceled() {
                state.cancel_requested = true;
                self.sink.log(LogSeverity::Info, "Queue canceled.");
                state.files_remaining.push_front(path);
                break;
            }

            file_index += 1;
            let name = display_name(&path);
            self.sink.log(
                LogSeverity::Info,
                format!("Processing: {} ({}/{})", name, file_index, file_count),
            );

            let step = self.process_file(&mut state, &path, file_index, file_count).await;
            state.current_file_job = None;

            match step {
                Ok(step) => {
                    state.reports.push(FileReport { path, outcome: step.outcome });
                    if step.canceled {
                        state.cancel_requested = true;
                        break;
                    }
                }
                Err(e) => {
                    self.sink.log(LogSeverity::Error, format!("Failed: {}: {:#}", name, e));
                    state.reports.push(FileReport {
                        path,
                        outcome: FileOutcome::Failed { error: format!("{:#}", e) },
                    });
                }
            }
        }

        let not_started = state.files_remaining.drain(..).map(|path| FileReport {
            path,
            outcome: FileOutcome::NotStarted,
        });
        state.reports.extend(not_started);

        let status = if state.cancel_requested {
            RunStatus::Canceled
        } else {
            RunStatus::Completed
        };
        self.finish(status, state, file_count, started)
    }

    // Terminal cleanup, identical for every outcome
    fn finish(&self, status: RunStatus, state: RunState, file_count: usize, started: Instant) -> RunSummary {
        self.sink.emit(RunEvent::Progress(ProgressUpdate::new(0, file_count, 0, 0)));
        self.sink.log(LogSeverity::Info, "Translation finished or canceled.");
        self.set_status(status);

        let summary = RunSummary {
            run_id: self.run_id,
            status,
            files: state.reports,
            elapsed: started.elapsed(),
        };
        info!(
            "Run {} ended as {:?} in {}",
            self.run_id,
            status,
            Controller::format_duration(summary.elapsed)
        );
        self.sink.emit(RunEvent::RunFinished(summary.clone()));
        summary
    }

    fn set_status(&self, status: RunStatus) {
        *self.shared.status.write() = status;
        self.sink.emit(RunEvent::StateChanged(status));
    }

    async fn process_file(
        &self,
        state: &mut RunState,
        path: &Path,
        file_index: usize,
        file_count: usize,
    ) -> Result<FileStep> {
        let name = display_name(path);
        self.set_status(RunStatus::Running { file_index, phase: FilePhase::Parsing });

        let format = match FileFormat::from_path(path) {
            Ok(format) => format,
            Err(e) => {
                self.sink.log(LogSeverity::Error, format!("Skipped: {}: {}", name, e));
                return Ok(FileStep::done(FileOutcome::Skipped { reason: e.to_string() }));
            }
        };

        FileManager::check_file_size(path, self.max_file_size)?;
        let raw = FileManager::read_to_string(path)?;
        let document = ParsedDocument::parse(format, &raw);
        let skipped = document.skipped_blocks();
        if skipped > 0 {
            let problem = FormatError::Parse(format!("{}: {} malformed block(s) skipped", name, skipped));
            self.sink.log(LogSeverity::Error, problem.to_string());
        }
        let units = document.units();

        if units.iter().all(|unit| unit.source_text.trim().is_empty()) {
            self.sink.log(LogSeverity::Info, "No text to translate. Skipping.");
            return Ok(FileStep::done(FileOutcome::Skipped {
                reason: "No text to translate".to_string(),
            }));
        }

        let job = state.current_file_job.insert(FileJob::new(path, format, units));
        self.sink.emit(RunEvent::Progress(ProgressUpdate::new(file_index, file_count, 0, job.total_count)));
        self.set_status(RunStatus::Running { file_index, phase: FilePhase::Translating });

        let sink = &self.sink;
        let total = job.total_count;
        let translated_count = &mut job.translated_count;
        let result = self
            .engine
            .translate_chunked(&job.units, &self.target_language, &self.shared.cancel, |event| match event {
                ChunkEvent::Retrying { next_attempt, error, .. } => {
                    sink.log(LogSeverity::Error, format!("Retry {}... ({})", next_attempt - 1, error));
                }
                ChunkEvent::ChunkDone(report) => {
                    if let ChunkResolution::FellBack(kind) = &report.resolution {
                        sink.log(
                            LogSeverity::Error,
                            format!("Chunk {} kept original text: {}", report.chunk_index + 1, kind),
                        );
                    }
                    *translated_count += report.delta;
                    sink.emit(RunEvent::Progress(ProgressUpdate::new(
                        file_index,
                        file_count,
                        *translated_count,
                        total,
                    )));
                    sink.log(
                        LogSeverity::Progress,
                        format!("File {}: {}/{}", file_index, *translated_count, total),
                    );
                }
            })
            .await;

        job.apply(result.units);

        if result.canceled {
            return Ok(self.save_partial(job, &document, &name, file_index));
        }

        self.set_status(RunStatus::Running { file_index, phase: FilePhase::Saving });
        let output = FileManager::output_path(path, &self.target_language, OutputKind::Translated);
        FileManager::write_to_file(&output, &document.render(&job.units))?;
        self.sink.log(LogSeverity::Success, format!("Saved: {}", display_name(&output)));

        Ok(FileStep::done(FileOutcome::Translated {
            output,
            fallback_chunks: result.fallback_chunks,
        }))
    }

    fn save_partial(&self, job: &FileJob, document: &ParsedDocument, name: &str, file_index: usize) -> FileStep {
        let resolved = job.resolved_units();
        if resolved.is_empty() {
            self.sink.log(LogSeverity::Info, "Translation canceled. No content.");
            return FileStep::canceled(FileOutcome::Partial { output: None });
        }

        self.set_status(RunStatus::Running { file_index, phase: FilePhase::Saving });
        let output = FileManager::output_path(&job.path, &self.target_language, OutputKind::Partial);
        match FileManager::write_to_file(&output, &document.render(resolved)) {
            Ok(()) => {
                self.sink.log(
                    LogSeverity::Info,
                    format!("Translation canceled. Partial: {}", display_name(&output)),
                );
                FileStep::canceled(FileOutcome::Partial { output: Some(output) })
            }
            Err(e) => {
                self.sink.log(
                    LogSeverity::Error,
                    format!("Failed to save partial result for {}: {:#}", name, e),
                );
                FileStep::canceled(FileOutcome::Failed { error: format!("{:#}", e) })
            }
        }
    }
}
