// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use log::{error, warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::sync::Arc;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use serde::Serialize;

use subcheck::app_config::{self, Config};
use subcheck::checker::MatchOrder;
use subcheck::file_utils::FileManager;
use subcheck::models::{AnalyzeRequest, AnalyzeResponse, SubtitleItem};
use subcheck::Controller;

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

/// CLI Wrapper for MatchOrder to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliMatchOrder {
    /// All matches of one rule before the next rule's
    Rule,
    /// Matches sorted by position in the text
    Position,
}

impl From<CliMatchOrder> for MatchOrder {
    fn from(cli_order: CliMatchOrder) -> Self {
        match cli_order {
            CliMatchOrder::Rule => MatchOrder::Rule,
            CliMatchOrder::Position => MatchOrder::Position,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a subtitle file and print its items as JSON
    Parse {
        /// Subtitle file (.srt or .txt)
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a subtitle file, or every subtitle file in a folder, against rules
    Analyze {
        /// Subtitle file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// JSON rules file
        #[arg(short, long)]
        rules: PathBuf,

        /// Order of matches within an item
        #[arg(long, value_enum)]
        order: Option<CliMatchOrder>,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run an analyze request ({"subtitles": [...], "rules": [...]}) from a JSON file
    Check {
        /// JSON request file
        #[arg(value_name = "REQUEST_PATH")]
        request_path: PathBuf,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serialize items (as printed by `parse`) into a subtitle format
    Export {
        /// JSON file holding an array of subtitle items
        #[arg(value_name = "ITEMS_PATH")]
        items_path: PathBuf,

        /// Target format identifier (e.g. srt, txt)
        #[arg(short = 'F', long)]
        format: Option<String>,

        /// Write the subtitles to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a subtitle file to another format
    Convert {
        /// Subtitle file
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Target format identifier (e.g. srt, txt)
        #[arg(short = 'F', long)]
        format: Option<String>,

        /// Output directory (defaults to the input's directory)
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Apply rule suggestions and write fixed_<filename>
    Fix {
        /// Subtitle file
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// JSON rules file
        #[arg(short, long)]
        rules: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Generate shell completions for subcheck
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subcheck - subtitle style checker
///
/// Checks subtitle files against regex rules and converts between
/// subtitle text formats.
#[derive(Parser, Debug)]
#[command(name = "subcheck")]
#[command(version)]
#[command(about = "Regex-based subtitle style checker and converter")]
#[command(long_about = "subcheck parses SRT and plain indexed-block subtitle files, checks them against regex rules and converts between formats.

EXAMPLES:
    subcheck parse movie.srt                      # Print items as JSON
    subcheck analyze movie.srt -r rules.json      # Report rule matches
    subcheck analyze ./subs -r rules.json         # Analyze a whole folder
    subcheck fix movie.txt -r rules.json          # Write fixed_movie.txt
    subcheck convert movie.txt -F srt             # Write movie.srt")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, visible_alias = "config", default_value = "subcheck.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
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

    // @returns: Tag and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
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
            let (tag, color) = Self::style_for_level(record.level());

            // stdout carries JSON output, logs always go to stderr
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // The logger accepts everything; log::max_level does the filtering
    if CustomLogger::init(LevelFilter::Trace).is_err() {
        eprintln!("Failed to initialize logger");
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subcheck", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it before loading config
    if let Some(cmd_log_level) = &cli.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    if let Commands::Analyze { order: Some(order), .. } = &cli.command {
        config.analysis.match_order = order.clone().into();
    }

    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Parse { input_path, output } => {
            let items = controller.parse_file(&input_path)?;
            info!("Parsed {} items from {:?}", items.len(), input_path);
            emit_json(&items, output.as_deref())
        }
        Commands::Analyze { input_path, rules, output, .. } => {
            let rules = FileManager::read_rules(&rules)?;
            if input_path.is_dir() {
                let summary = controller.analyze_folder(&input_path, Arc::new(rules)).await?;
                emit_json(&summary, output.as_deref())
            } else if input_path.is_file() {
                let report = controller.analyze_file(&input_path, &rules)?;
                info!(
                    "{} matches in {} of {} items",
                    report.match_count(),
                    report.results.len(),
                    report.item_count
                );
                emit_json(&AnalyzeResponse { results: report.results }, output.as_deref())
            } else {
                Err(anyhow!("Input path does not exist: {:?}", input_path))
            }
        }
        Commands::Check { request_path, output } => {
            let request: AnalyzeRequest = FileManager::read_json(&request_path)?;
            let response = controller.analyze_request(&request);
            emit_json(&response, output.as_deref())
        }
        Commands::Export { items_path, format, output } => {
            let items: Vec<SubtitleItem> = FileManager::read_json(&items_path)?;
            let content = controller.export_items(&items, format.as_deref())?;
            match output {
                Some(path) => {
                    FileManager::write_to_file(&path, &content)?;
                    info!("Exported {} items: {:?}", items.len(), path);
                    Ok(())
                }
                None => {
                    print!("{}", content);
                    Ok(())
                }
            }
        }
        Commands::Convert { input_path, format, output_dir, force_overwrite } => {
            let output_dir = output_dir.unwrap_or_else(|| parent_dir(&input_path));
            if controller.convert_file(&input_path, format.as_deref(), &output_dir, force_overwrite)?.is_none() {
                warn!("Nothing written for {:?}", input_path);
            }
            Ok(())
        }
        Commands::Fix { input_path, rules, output_dir, force_overwrite } => {
            let rules = FileManager::read_rules(&rules)?;
            let output_dir = output_dir.unwrap_or_else(|| parent_dir(&input_path));
            if controller.fix_file(&input_path, &rules, &output_dir, force_overwrite)?.is_none() {
                warn!("Nothing written for {:?}", input_path);
            }
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

// Helper function to write JSON to a file or stdout
fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => FileManager::write_to_file(path, &json),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn parent_dir(input_path: &Path) -> PathBuf {
    input_path.parent().unwrap_or(Path::new(".")).to_path_buf()
}
