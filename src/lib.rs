/*!
 * # subcheck - Subtitle style checker and converter
 *
 * A Rust library for checking subtitle files against user-defined regex
 * rules and converting between subtitle text formats.
 *
 * ## Features
 *
 * - Parse SubRip (`.srt`) and plain indexed-block text (`.txt`) files into a
 *   common item model, and export items back to either format
 * - Encoding fallback chains so legacy files always decode
 * - Regex rule matching with character offsets and suggestions
 * - Applying suggestions to produce a fixed file
 * - Concurrent analysis of whole folders
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `text_decoder`: Byte-to-text decoding with encoding fallbacks
 * - `formats`: Format parsers/serializers and the format registry:
 *   - `formats::srt`: SubRip
 *   - `formats::netflix_text`: Plain indexed-block text
 *   - `formats::timecode`: Timecode parsing and formatting
 * - `checker`: Regex rule matching
 * - `suggestions`: Applying rule suggestions to text
 * - `models`: Items, rules, matches and request/response envelopes
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
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
pub mod checker;
pub mod errors;
pub mod file_utils;
pub mod formats;
pub mod models;
pub mod suggestions;
pub mod text_decoder;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use checker::{CheckReport, Checker, MatchOrder};
pub use errors::{AppError, FormatError, RuleError, SubtitleError};
pub use formats::{FormatRegistry, NetflixTextFormat, SrtFormat, SubtitleFormat};
pub use models::{AnalysisResult, AnalyzeRequest, AnalyzeResponse, Match, Rule, SubtitleItem};
pub use text_decoder::TextDecoder;
