/*!
 * Subtitle format parsers and serializers.
 *
 * Every supported format implements [`SubtitleFormat`], turning raw file bytes
 * into format-neutral [`SubtitleItem`]s and back into text. Callers pick an
 * implementation through a [`FormatRegistry`], which maps format identifiers
 * (file extensions) to implementations.
 *
 * # Architecture
 *
 * - `timecode`: `HH:MM:SS,mmm` values
 * - `srt`: SubRip, blocks with an index and a timing line
 * - `netflix_text`: plain indexed blocks without timing
 */

pub mod netflix_text;
pub mod srt;
pub mod timecode;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use encoding_rs::Encoding;
use log::debug;

use crate::app_config::FormatsConfig;
use crate::errors::{AppError, FormatError, SubtitleError};
use crate::models::SubtitleItem;
use crate::text_decoder::TextDecoder;

pub use netflix_text::NetflixTextFormat;
pub use srt::SrtFormat;
pub use timecode::{MillisSeparator, Timecode};

/// Parse/export capability shared by all subtitle formats
pub trait SubtitleFormat: fmt::Debug + Send + Sync {
    /// Human-readable format name
    fn name(&self) -> &'static str;

    /// Identifiers (lowercase file extensions) this format answers to
    fn extensions(&self) -> &'static [&'static str];

    /// Decode and parse a whole document
    fn parse(&self, content: &[u8], filename: &str) -> Result<Vec<SubtitleItem>, SubtitleError>;

    /// Serialize items back into the format's text form
    fn export(&self, subtitles: &[SubtitleItem]) -> Result<String, SubtitleError>;
}

/// Explicit mapping from format identifiers to implementations
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    formats: HashMap<String, Arc<dyn SubtitleFormat>>,
}

impl FormatRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding SRT and plain-text formats
    pub fn with_defaults(legacy_encoding: &'static Encoding) -> Self {
        let mut registry = Self::new();
        registry.register(SrtFormat::new());
        registry.register(NetflixTextFormat::new(legacy_encoding));
        registry
    }

    /// Build the default registry from the formats section of the configuration
    pub fn from_config(config: &FormatsConfig) -> Result<Self, AppError> {
        let legacy = TextDecoder::encoding_for_label(&config.legacy_encoding).ok_or_else(|| {
            AppError::Config(format!("Unknown legacy encoding: {}", config.legacy_encoding))
        })?;
        Ok(Self::with_defaults(legacy))
    }

    /// Register a format under each of its extensions, replacing earlier entries
    pub fn register<F: SubtitleFormat + 'static>(&mut self, format: F) {
        let format: Arc<dyn SubtitleFormat> = Arc::new(format);
        for ext in format.extensions() {
            debug!("Registering {} format for '{}'", format.name(), ext);
            self.formats.insert(normalize_identifier(ext), Arc::clone(&format));
        }
    }

    /// Look up a format by identifier; case and a leading dot are ignored
    pub fn resolve(&self, identifier: &str) -> Result<&dyn SubtitleFormat, FormatError> {
        self.formats
            .get(&normalize_identifier(identifier))
            .map(|format| format.as_ref())
            .ok_or_else(|| FormatError::UnsupportedFormat(identifier.to_string()))
    }

    /// Look up a format by the extension of a file path
    pub fn resolve_path(&self, path: &Path) -> Result<&dyn SubtitleFormat, FormatError> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();
        if ext.is_empty() {
            return Err(FormatError::UnsupportedFormat(path.display().to_string()));
        }
        self.resolve(&ext)
    }

    /// Whether the identifier resolves to a format
    pub fn supports(&self, identifier: &str) -> bool {
        self.formats.contains_key(&normalize_identifier(identifier))
    }

    /// Registered identifiers, sorted
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().trim_start_matches('.').to_lowercase()
}
