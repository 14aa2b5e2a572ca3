use anyhow::{anyhow, Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::checker::{CheckReport, Checker};
use crate::file_utils::FileManager;
use crate::formats::FormatRegistry;
use crate::models::{AnalyzeRequest, AnalyzeResponse, Rule, SubtitleItem};
use crate::suggestions::{self, FixOutcome};

// @module: Application controller for subtitle analysis and conversion

/// Analysis of one subtitle file
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileReport {
    /// Analyzed file
    pub file: PathBuf,
    /// Number of parsed subtitle items
    pub item_count: usize,
    /// Sparse per-item matches
    pub results: Vec<crate::models::AnalysisResult>,
    /// Ids of rules whose pattern could not be compiled
    pub invalid_rules: Vec<String>,
}

impl FileReport {
    fn new(file: &Path, item_count: usize, report: CheckReport) -> Self {
        Self {
            file: file.to_path_buf(),
            item_count,
            results: report.results,
            invalid_rules: report
                .invalid_rules
                .iter()
                .map(|e| e.rule_id().to_string())
                .collect(),
        }
    }

    /// Total number of matches in the file
    pub fn match_count(&self) -> usize {
        self.results.iter().map(|r| r.matches.len()).sum()
    }
}

/// A file that could not be analyzed in folder mode
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileFailure {
    pub file: PathBuf,
    pub error: String,
}

/// Outcome of analyzing a whole folder
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FolderSummary {
    /// Reports sorted by file path
    pub reports: Vec<FileReport>,
    /// Files that failed, sorted by file path
    pub failures: Vec<FileFailure>,
}

/// Main application controller
#[derive(Debug, Clone)]
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Format identifiers -> parsers
    registry: Arc<FormatRegistry>,

    // @field: Rule matcher built from the analysis settings
    checker: Checker,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let registry = FormatRegistry::from_config(&config.formats)?;
        let checker = Checker::new()
            .with_match_order(config.analysis.match_order)
            .with_size_limit(config.analysis.regex_size_limit);

        Ok(Self {
            config,
            registry: Arc::new(registry),
            checker,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn checker(&self) -> &Checker {
        &self.checker
    }

    /// Parse an in-memory document, choosing the format from the filename
    pub fn parse_bytes(&self, content: &[u8], filename: &str) -> Result<Vec<SubtitleItem>> {
        let limit = self.config.analysis.max_input_bytes;
        if content.len() as u64 > limit {
            return Err(anyhow!(crate::errors::AppError::InputTooLarge {
                size: content.len() as u64,
                limit,
            }));
        }

        let format = self.registry.resolve_path(Path::new(filename))?;
        let items = format
            .parse(content, filename)
            .with_context(|| format!("Failed to parse {}", filename))?;
        debug!("{}: {} items ({})", filename, items.len(), format.name());
        Ok(items)
    }

    /// Read and parse a subtitle file
    pub fn parse_file(&self, path: &Path) -> Result<Vec<SubtitleItem>> {
        // Resolve first so unsupported files are rejected before reading them
        self.registry.resolve_path(path)?;
        let content = FileManager::read_bytes(path, self.config.analysis.max_input_bytes)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        self.parse_bytes(&content, &filename)
    }

    /// Parse a subtitle file and run the rules over it
    pub fn analyze_file(&self, path: &Path, rules: &[Rule]) -> Result<FileReport> {
        let items = self.parse_file(path)?;
        let report = self.checker.check_with_diagnostics(&items, rules);
        Ok(FileReport::new(path, items.len(), report))
    }

    /// Run an analysis request
    pub fn analyze_request(&self, request: &AnalyzeRequest) -> AnalyzeResponse {
        AnalyzeResponse {
            results: self.checker.check(&request.subtitles, &request.rules),
        }
    }

    /// Serialize items with the given format, or the configured default
    pub fn export_items(&self, items: &[SubtitleItem], format: Option<&str>) -> Result<String> {
        let format_id = format.unwrap_or(self.config.formats.default_export_format.as_str());
        let format = self.registry.resolve(format_id)?;
        let content = format
            .export(items)
            .with_context(|| format!("Failed to export {} items as {}", items.len(), format.name()))?;
        Ok(content)
    }

    /// Convert a subtitle file to another format. Returns the written path, or
    /// None when the output exists and `force_overwrite` is not set.
    pub fn convert_file(
        &self,
        input_file: &Path,
        format: Option<&str>,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        let format_id = format.unwrap_or(self.config.formats.default_export_format.as_str());
        // Unknown formats fail before any parsing work
        self.registry.resolve(format_id)?;

        let output_path = FileManager::generate_output_path(input_file, output_dir, &format_id.to_lowercase());
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, output already exists (use -f to force overwrite): {:?}", output_path);
            return Ok(None);
        }

        let items = self.parse_file(input_file)?;
        let content = self.export_items(&items, Some(format_id))?;
        FileManager::write_to_file(&output_path, &content)?;

        info!("Converted {} items: {:?}", items.len(), output_path);
        Ok(Some(output_path))
    }

    /// Apply rule suggestions to a file and write `fixed_<filename>` in the
    /// source format. Returns None when the output exists and
    /// `force_overwrite` is not set.
    pub fn fix_file(
        &self,
        input_file: &Path,
        rules: &[Rule],
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<Option<(PathBuf, FixOutcome)>> {
        let output_path = FileManager::generate_fixed_path(input_file, output_dir);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, output already exists (use -f to force overwrite): {:?}", output_path);
            return Ok(None);
        }

        let format = self.registry.resolve_path(input_file)?;
        let items = self.parse_file(input_file)?;
        let matches = self.checker.check_each(&items, rules);
        let outcome = suggestions::apply_to_items(&items, &matches);

        if outcome.skipped > 0 {
            warn!("{} overlapping suggestions were not applied", outcome.skipped);
        }

        let content = format
            .export(&outcome.items)
            .with_context(|| format!("Failed to export fixed subtitles as {}", format.name()))?;
        FileManager::write_to_file(&output_path, &content)?;

        info!("Applied {} suggestions: {:?}", outcome.applied, output_path);
        Ok(Some((output_path, outcome)))
    }

    /// Analyze every supported subtitle file under `input_dir`.
    ///
    /// Files are parsed and checked on blocking worker tasks, at most
    /// `analysis.concurrency` at a time. A file that fails is recorded in the
    /// summary and does not stop the others.
    pub async fn analyze_folder(&self, input_dir: &Path, rules: Arc<Vec<Rule>>) -> Result<FolderSummary> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let start_time = Instant::now();
        let files = FileManager::find_files(input_dir, &self.registry.identifiers())?;
        if files.is_empty() {
            warn!("No supported subtitle files found in {:?}", input_dir);
            return Ok(FolderSummary::default());
        }

        info!("Analyzing {} files in {:?}", files.len(), input_dir);

        let folder_pb = ProgressBar::new(files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("=> "));
        folder_pb.set_message("Analyzing files");

        let outcomes = stream::iter(files)
            .map(|path| {
                let controller = self.clone();
                let rules = Arc::clone(&rules);
                let progress = folder_pb.clone();
                async move {
                    let task_path = path.clone();
                    let joined = tokio::task::spawn_blocking(move || controller.analyze_file(&task_path, &rules)).await;
                    progress.inc(1);
                    let result = match joined {
                        Ok(result) => result,
                        Err(e) => Err(anyhow!("Analysis task failed: {}", e)),
                    };
                    (path, result)
                }
            })
            .buffer_unordered(self.config.analysis.concurrency)
            .collect::<Vec<_>>()
            .await;

        folder_pb.finish_and_clear();

        let mut summary = FolderSummary::default();
        for (path, result) in outcomes {
            match result {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    error!("Error analyzing {:?}: {:#}", path, e);
                    summary.failures.push(FileFailure {
                        file: path,
                        error: format!("{:#}", e),
                    });
                }
            }
        }
        summary.reports.sort_by(|a, b| a.file.cmp(&b.file));
        summary.failures.sort_by(|a, b| a.file.cmp(&b.file));

        info!(
            "Analyzed {} files ({} failed) in {}",
            summary.reports.len(),
            summary.failures.len(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    // @formats: Human-readable elapsed time
    pub fn format_duration(duration: std::time::Duration) -> String {
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
