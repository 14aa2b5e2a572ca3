/*!
 * Plain indexed-block text (`.txt`) as delivered for Netflix-style scripts.
 *
 * There is no timing. A line made only of digits opens a block and gives its
 * index; the non-blank lines after it are the block's text. Blank lines only
 * separate blocks.
 */

use encoding_rs::{Encoding, EUC_KR};
use log::debug;

use super::SubtitleFormat;
use crate::errors::SubtitleError;
use crate::models::SubtitleItem;
use crate::text_decoder::TextDecoder;

/// Timing placeholder for items of a format that has none
pub const PLACEHOLDER_TIMECODE: &str = "00:00:00,000";

/// Plain indexed-block format
#[derive(Debug, Clone)]
pub struct NetflixTextFormat {
    decoder: TextDecoder,
}

// @struct: Block being accumulated while scanning lines
struct PendingBlock {
    index: usize,
    lines: Vec<String>,
}

impl PendingBlock {
    // @returns: The finished item, or None when the block never got text
    fn finish(self) -> Option<SubtitleItem> {
        if self.lines.is_empty() {
            debug!("Dropping block {} without text", self.index);
            return None;
        }
        Some(SubtitleItem::new(
            self.index,
            PLACEHOLDER_TIMECODE,
            PLACEHOLDER_TIMECODE,
            self.lines.join("\n"),
        ))
    }
}

impl NetflixTextFormat {
    /// Plain text decoded as UTF-8, then the legacy code page, then windows-1252
    pub fn new(legacy_encoding: &'static Encoding) -> Self {
        Self::with_decoder(TextDecoder::with_legacy_fallback(legacy_encoding))
    }

    pub fn with_decoder(decoder: TextDecoder) -> Self {
        Self { decoder }
    }

    /// Parse already-decoded text. Never fails: input without index lines
    /// yields no items.
    pub fn parse_str(&self, content: &str) -> Vec<SubtitleItem> {
        let normalized = content.replace("\r\n", "\n");

        let mut items = Vec::new();
        let mut current: Option<PendingBlock> = None;

        for line in normalized.split('\n') {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }

            if let Some(index) = Self::index_line(stripped) {
                if let Some(block) = current.take() {
                    items.extend(block.finish());
                }
                current = Some(PendingBlock {
                    index,
                    lines: Vec::new(),
                });
            } else if let Some(block) = current.as_mut() {
                block.lines.push(stripped.to_string());
            }
        }

        if let Some(block) = current {
            items.extend(block.finish());
        }

        items
    }

    fn index_line(stripped: &str) -> Option<usize> {
        if stripped.bytes().all(|b| b.is_ascii_digit()) {
            stripped.parse().ok()
        } else {
            None
        }
    }
}

impl Default for NetflixTextFormat {
    fn default() -> Self {
        Self::new(EUC_KR)
    }
}

impl SubtitleFormat for NetflixTextFormat {
    fn name(&self) -> &'static str {
        "Netflix text"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["txt"]
    }

    fn parse(&self, content: &[u8], filename: &str) -> Result<Vec<SubtitleItem>, SubtitleError> {
        debug!("Parsing {} as plain indexed text ({} bytes)", filename, content.len());
        let text = self.decoder.decode_to_string(content);
        Ok(self.parse_str(&text))
    }

    fn export(&self, subtitles: &[SubtitleItem]) -> Result<String, SubtitleError> {
        let mut output = Vec::with_capacity(subtitles.len() * 3);
        for sub in subtitles {
            output.push(sub.index.to_string());
            output.push(sub.text.clone());
            output.push(String::new());
        }
        Ok(output.join("\n"))
    }
}
