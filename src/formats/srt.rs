/*!
 * SubRip (`.srt`) parsing and serialization.
 *
 * A document is a sequence of blocks separated by blank lines:
 *
 * ```text
 * 1
 * 00:00:01,000 --> 00:00:04,000
 * First line
 * Second line
 * ```
 *
 * Timing is load-bearing in this format, so a block whose index or timing
 * line cannot be read fails the whole document instead of being dropped.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::timecode::{MillisSeparator, Timecode};
use super::SubtitleFormat;
use crate::errors::SubtitleError;
use crate::models::SubtitleItem;
use crate::text_decoder::TextDecoder;

// @const: Timing line, anything after the end timecode (positions) is ignored
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\S+?)\s*-->\s*(\S+)").expect("timing regex is valid")
});

/// SubRip format
#[derive(Debug, Clone)]
pub struct SrtFormat {
    decoder: TextDecoder,
}

impl SrtFormat {
    /// SRT with statistical encoding detection
    pub fn new() -> Self {
        Self::with_decoder(TextDecoder::detecting())
    }

    pub fn with_decoder(decoder: TextDecoder) -> Self {
        Self { decoder }
    }

    /// Parse already-decoded SRT text
    pub fn parse_str(&self, content: &str) -> Result<Vec<SubtitleItem>, SubtitleError> {
        let normalized = content.replace("\r\n", "\n").replace('\r', "\n");

        let mut items = Vec::new();
        let mut block: Vec<(usize, &str)> = Vec::new();

        for (line_no, line) in normalized.split('\n').enumerate() {
            if line.trim().is_empty() {
                if !block.is_empty() {
                    items.push(Self::parse_block(items.len() + 1, &block)?);
                    block.clear();
                }
                continue;
            }
            block.push((line_no + 1, line));
        }

        if !block.is_empty() {
            items.push(Self::parse_block(items.len() + 1, &block)?);
        }

        debug!("Parsed {} SRT blocks", items.len());
        Ok(items)
    }

    // @parses: One non-empty run of lines
    fn parse_block(ordinal: usize, lines: &[(usize, &str)]) -> Result<SubtitleItem, SubtitleError> {
        let (index_line_no, index_line) = lines[0];
        let index_text = index_line.trim();
        let index = Some(index_text)
            .filter(|text| !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|text| text.parse::<usize>().ok())
            .ok_or_else(|| SubtitleError::MalformedDocument {
                block: ordinal,
                line: index_line_no,
                reason: format!("invalid index '{}'", index_text),
            })?;

        let Some(&(timing_line_no, timing_line)) = lines.get(1) else {
            return Err(SubtitleError::MalformedDocument {
                block: ordinal,
                line: index_line_no,
                reason: "missing timing line".to_string(),
            });
        };

        let malformed_timing = |reason: String| SubtitleError::MalformedDocument {
            block: ordinal,
            line: timing_line_no,
            reason,
        };

        let caps = TIMING_REGEX
            .captures(timing_line)
            .ok_or_else(|| malformed_timing(format!("invalid timing line '{}'", timing_line.trim())))?;

        let start = Timecode::parse(&caps[1]).map_err(|e| malformed_timing(e.to_string()))?;
        let end = Timecode::parse(&caps[2]).map_err(|e| malformed_timing(e.to_string()))?;

        let text = lines[2..]
            .iter()
            .map(|(_, line)| *line)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(SubtitleItem::new(
            index,
            start.format(MillisSeparator::Period),
            end.format(MillisSeparator::Period),
            text,
        ))
    }

    fn export_timecode(item: &SubtitleItem, value: Option<&str>) -> Result<String, SubtitleError> {
        let invalid = || SubtitleError::InvalidTimecode {
            index: item.index,
            value: value.unwrap_or_default().to_string(),
        };
        let value = value.ok_or_else(invalid)?;
        Timecode::parse(value)
            .map(|tc| tc.format(MillisSeparator::Comma))
            .map_err(|_| invalid())
    }
}

impl Default for SrtFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl SubtitleFormat for SrtFormat {
    fn name(&self) -> &'static str {
        "SubRip"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["srt"]
    }

    fn parse(&self, content: &[u8], filename: &str) -> Result<Vec<SubtitleItem>, SubtitleError> {
        debug!("Parsing {} as SRT ({} bytes)", filename, content.len());
        let text = self.decoder.decode_to_string(content);
        self.parse_str(&text)
    }

    fn export(&self, subtitles: &[SubtitleItem]) -> Result<String, SubtitleError> {
        let blocks = subtitles
            .iter()
            .map(|item| {
                let start = Self::export_timecode(item, item.start.as_deref())?;
                let end = Self::export_timecode(item, item.end.as_deref())?;
                Ok(format!("{}\n{} --> {}\n{}\n", item.index, start, end, item.text))
            })
            .collect::<Result<Vec<String>, SubtitleError>>()?;

        Ok(blocks.join("\n"))
    }
}
