// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use subcondense::app_config::{Config, LogLevel};
use subcondense::app_controller::Controller;
use subcondense::audio::{AudioFormat, FfmpegTranscoder};
use subcondense::condensed::CondensedFormat;
use subcondense::file_utils::FileManager;
use subcondense::{condensed, matching, periods, subtitle_processor};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for CondensedFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSubtitleFormat {
    Srt,
    Lrc,
}

impl From<CliSubtitleFormat> for CondensedFormat {
    fn from(format: CliSubtitleFormat) -> Self {
        match format {
            CliSubtitleFormat::Srt => CondensedFormat::Srt,
            CliSubtitleFormat::Lrc => CondensedFormat::Lrc,
        }
    }
}

/// CLI Wrapper for AudioFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAudioFormat {
    Wav,
    Mp3,
    Opus,
}

impl From<CliAudioFormat> for AudioFormat {
    fn from(format: CliAudioFormat) -> Self {
        match format {
            CliAudioFormat::Wav => AudioFormat::Wav,
            CliAudioFormat::Mp3 => AudioFormat::Mp3,
            CliAudioFormat::Opus => AudioFormat::Opus,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Condense every matched media file in a directory
    Condense(CondenseArgs),

    /// Print the speech periods of a subtitle file as JSON
    Periods {
        /// Subtitle file (SRT, VTT, ASS or SSA)
        #[arg(value_name = "SUBTITLE")]
        subtitle: PathBuf,
    },

    /// Print the filename analysis of one or more names as JSON
    Analyze {
        /// File names to analyze
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },

    /// Show which subtitle each media file in a directory would be paired with
    Match {
        /// Directory holding media and subtitle files
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Generate shell completions for subcondense
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct CondenseArgs {
    /// Directory holding media and subtitle files
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Output directory (defaults to the input directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Padding around each dialogue entry in milliseconds
    #[arg(short, long)]
    padding_ms: Option<u64>,

    /// Condensed subtitle format
    #[arg(short, long, value_enum)]
    subtitle_format: Option<CliSubtitleFormat>,

    /// Also write condensed audio in this format (requires ffmpeg)
    #[arg(short, long, value_enum)]
    audio_format: Option<CliAudioFormat>,
}

/// subcondense - condensed audio and subtitles from dialogue
///
/// Derives the speech periods of each video from its subtitles, writes
/// re-timed subtitles and, optionally, condensed audio.
#[derive(Parser, Debug)]
#[command(name = "subcondense")]
#[command(version)]
#[command(about = "Condense media down to its dialogue using subtitles")]
#[command(long_about = "subcondense pairs videos with their subtitle files and keeps only the dialogue.

EXAMPLES:
    subcondense condense ~/anime/show/                # Condensed SRT next to each video
    subcondense condense -a mp3 -s lrc ~/show/        # Condensed MP3 audio with LRC lyrics
    subcondense periods episode01.ass                 # Print speech periods as JSON
    subcondense analyze 'Show S01E01.mkv' 'Show 01.srt'
    subcondense match ~/anime/show/                   # Preview video/subtitle pairing
    subcondense completions bash > subcondense.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
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
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subcondense", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    match cli.command {
        Commands::Condense(args) => run_condense(config, args).await,
        Commands::Periods { subtitle } => run_periods(&config, &subtitle),
        Commands::Analyze { names } => run_analyze(&names),
        Commands::Match { dir } => run_match(&config, &dir),
        Commands::Completions { .. } => Ok(()),
    }
}

async fn run_condense(mut config: Config, args: CondenseArgs) -> Result<()> {
    if let Some(padding_ms) = args.padding_ms {
        config.padding_ms = padding_ms;
    }
    if let Some(format) = args.subtitle_format {
        config.output.subtitle_format = format.into();
    }
    if let Some(format) = args.audio_format {
        config.output.audio_format = Some(format.into());
    }

    let mut controller = Controller::with_config(config)?;
    if controller.config().output.audio_format.is_some() {
        controller = controller.with_transcoder(Arc::new(FfmpegTranscoder::default()));
    }

    let output_dir = args.output_dir.unwrap_or_else(|| args.input_dir.clone());
    let report = controller.run_folder(&args.input_dir, &output_dir, args.force_overwrite).await?;

    for path in &report.written {
        info!("Success: {:?}", path);
    }
    if !report.failed.is_empty() {
        return Err(anyhow!("{} file(s) failed to condense", report.failed.len()));
    }
    Ok(())
}

fn run_periods(config: &Config, subtitle: &Path) -> Result<()> {
    let text = FileManager::read_to_string(subtitle)?;
    let format = subtitle_processor::detect_format(&text);
    let periods = periods::extract_periods(&text, config)
        .with_context(|| format!("Failed to extract periods from {:?}", subtitle))?;

    info!(
        "{} {} periods, {} ms of speech",
        periods.len(),
        format,
        periods::total_duration_ms(&periods)
    );
    println!("{}", serde_json::to_string_pretty(&periods)?);

    // Also show how the condensed subtitles would start
    let preview = condensed::create_condensed_subtitles(&periods, &text, CondensedFormat::Srt)?;
    log::debug!("Condensed preview:\n{}", preview.lines().take(8).collect::<Vec<_>>().join("\n"));
    Ok(())
}

fn run_analyze(names: &[String]) -> Result<()> {
    let analyses: Vec<_> = names.iter().map(|name| matching::analyze_filename(name)).collect();
    println!("{}", serde_json::to_string_pretty(&analyses)?);
    Ok(())
}

fn run_match(config: &Config, dir: &Path) -> Result<()> {
    let (media, subtitles) = FileManager::list_media_and_subtitles(dir)?;
    let name_of = |p: &PathBuf| p.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let media_names: Vec<String> = media.iter().map(name_of).collect();
    let subtitle_names: Vec<String> = subtitles.iter().map(name_of).collect();

    for result in matching::find_matches_for_batch(&media_names, &subtitle_names, config) {
        match (&result.subtitle, result.kind, result.score) {
            (Some(subtitle), Some(kind), Some(score)) => {
                println!("{}\t{}\t{:?}\t{}", result.video, subtitle, kind, score);
            }
            _ => println!("{}\t-\t-\t-", result.video),
        }
    }
    Ok(())
}
