// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{debug, error, info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};

use strans::app_config::{self, Config};
use strans::app_controller::{Controller, LogLine, LogSeverity, RunEvent, RunStatus};
use strans::file_utils::FileManager;
use strans::key_store::KeyStore;
use strans::language_utils;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate .srt and .json files (default command)
    Translate(TranslateArgs),

    /// Validate and store the xAI API key
    SetKey {
        /// API key, must start with 'xai-' or 'xai_'
        #[arg(value_name = "KEY")]
        key: String,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,

        /// Key file path (overrides the configured location)
        #[arg(long)]
        key_file: Option<PathBuf>,
    },

    /// Generate shell completions for strans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Files or directories to translate (directories are searched recursively)
    #[arg(value_name = "PATHS")]
    paths: Vec<PathBuf>,

    /// Target language name or ISO code (e.g. 'Bulgarian', 'fr', 'deu')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of texts sent per request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key to use for this run instead of the stored one
    #[arg(long, env = "XAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Key file path (overrides the configured location)
    #[arg(long)]
    key_file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// strans - batch translation of subtitles and localization files
///
/// Translates .srt subtitle files and flat .json localization files
/// through the xAI API, chunk by chunk, with retry and partial saves.
#[derive(Parser, Debug)]
#[command(name = "strans")]
#[command(version)]
#[command(about = "Batch translator for .srt and .json files using the xAI API")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "strans translates .srt subtitle files and .json localization files using the xAI API.

EXAMPLES:
    strans set-key xai-XXXXXXXX                # Store the API key
    strans movie.srt                           # Translate using default config
    strans -t fr movie.srt strings.json        # Translate several files to French
    strans -b 5 --log-level debug subs/        # Process a directory with smaller chunks
    strans completions bash > strans.bash      # Generate bash completions

Press Ctrl-C during a run to cancel; the file being translated is saved as
<name>_partial_<Language>.<ext>.

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // The level is adjusted through log::set_max_level after config load
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "strans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::SetKey { key, config_path, key_file }) => run_set_key(&key, &config_path, key_file),
        Some(Commands::Translate(args)) => run_translate(args).await,
        // Default behavior - top-level args are the translate args
        None => run_translate(cli.translate).await,
    }
}

fn key_store_for(config: &Config, key_file: Option<PathBuf>) -> KeyStore {
    match key_file {
        Some(path) => KeyStore::new(path, config.keys.accepted_prefixes.clone()),
        None => KeyStore::from_config(&config.keys),
    }
}

fn run_set_key(key: &str, config_path: &str, key_file: Option<PathBuf>) -> Result<()> {
    let config = Config::load_or_create(config_path)?;
    let store = key_store_for(&config, key_file);
    store.save(key)?;
    info!("Key saved to {:?}", store.path());
    Ok(())
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    if options.paths.is_empty() {
        return Err(anyhow!("At least one input path is required (see --help)"));
    }

    // Load or create configuration, then apply CLI overrides
    let mut config = Config::load_or_create(&options.config_path)?;
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(batch_size) = options.batch_size {
        config.translation.batch_size = batch_size;
    }
    if let Some(model) = &options.model {
        config.translation.model = model.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let language = language_utils::resolve_language_name(&config.target_language)?;

    let store = key_store_for(&config, options.key_file.clone());
    let api_key = match options.api_key.clone() {
        Some(key) => key,
        None => store.load()?.ok_or_else(|| {
            anyhow!("No valid API key found at {:?}. Run `strans set-key <KEY>` first.", store.path())
        })?,
    };

    let files = FileManager::collect_inputs(&options.paths)?;
    if files.is_empty() {
        return Err(anyhow!("No .srt or .json files found in the given paths"));
    }

    let log_path = PathBuf::from(&config.files.log_file);
    FileManager::reset_log_file(&log_path)?;

    info!("🚀 strans: {} - {} ({} files)", config.translation.model, language, files.len());

    let controller = Controller::with_config(config);
    let mut handle = controller.start(files, &language, &api_key)?;
    let cancel = handle.cancel_signal();
    debug!("Run id: {}", handle.run_id());

    let progress_bar = ProgressBar::new(100);
    let template_result = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}% {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(template_result.progress_chars("█▓▒░"));

    let mut cancel_requested = false;
    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(RunEvent::Progress(update)) => {
                    progress_bar.set_position(u64::from(update.percent));
                    if update.total > 0 {
                        progress_bar.set_message(format!(
                            "file {}/{} ({}/{})",
                            update.file_index, update.file_count, update.translated, update.total
                        ));
                    }
                }
                Some(RunEvent::Log(line)) => print_log_line(&progress_bar, &log_path, &line),
                Some(RunEvent::StateChanged(status)) => debug!("Run status: {:?}", status),
                Some(RunEvent::RunFinished(summary)) => debug!("Run {} finished", summary.run_id),
                None => break,
            },
            signal = tokio::signal::ctrl_c(), if !cancel_requested => {
                cancel_requested = true;
                match signal {
                    Ok(()) => {
                        cancel.cancel();
                        print_log_line(&progress_bar, &log_path, &LogLine::new(LogSeverity::Info, "Cancel requested..."));
                    }
                    Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
                }
            }
        }
    }

    let summary = handle.wait().await;
    progress_bar.finish_and_clear();

    info!(
        "{} translated, {} skipped, {} failed in {}",
        summary.translated_count(),
        summary.skipped_count(),
        summary.failed_count(),
        Controller::format_duration(summary.elapsed)
    );

    match summary.status {
        RunStatus::Completed => {
            info!("All files processed!");
            Ok(())
        }
        RunStatus::Canceled => {
            warn!("Translation canceled");
            Ok(())
        }
        status => {
            error!("Translation run ended as {:?}", status);
            Err(anyhow!("Translation run failed"))
        }
    }
}

// @prints: Run log line above the progress bar and appends it to the log file
fn print_log_line(progress_bar: &ProgressBar, log_path: &Path, line: &LogLine) {
    let color = match line.severity {
        LogSeverity::Error => "1;31",
        LogSeverity::Success => "1;32",
        LogSeverity::Progress => "36",
        LogSeverity::Info => "0",
    };
    progress_bar.println(format!("\x1B[{}m{}\x1B[0m", color, line));

    if let Err(e) = FileManager::append_to_log_file(log_path, &line.timestamp, &line.message) {
        warn!("Failed to write log file: {}", e);
    }
}
