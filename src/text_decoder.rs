/*!
 * Byte-to-text decoding for subtitle files.
 *
 * Subtitle files arrive in whatever encoding the authoring tool used. A
 * `TextDecoder` is an ordered chain of decode attempts; the first attempt that
 * decodes cleanly wins. Every chain ends with a replacing step, so decoding
 * never fails.
 */

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::debug;

// @struct: Outcome of decoding a byte buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    // @field: Decoded text without any byte-order mark
    pub text: String,

    // @field: Encoding that produced the text
    pub encoding: &'static Encoding,

    // @field: True when undecodable sequences were replaced with U+FFFD
    pub lossy: bool,
}

/// One attempt in a decode chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodeStep {
    /// Guess the encoding statistically, accept only a clean decode
    Detect,
    /// Decode with the encoding, accept only a clean decode
    Strict(&'static Encoding),
    /// Decode with the encoding, replacing malformed sequences. Always succeeds.
    Replace(&'static Encoding),
}

/// Ordered list of decode attempts
#[derive(Debug, Clone, PartialEq)]
pub struct TextDecoder {
    steps: Vec<DecodeStep>,
}

impl TextDecoder {
    /// Builds a chain from explicit steps. A lossy UTF-8 decode runs after
    /// the last step if none of them succeeded.
    pub fn new(steps: Vec<DecodeStep>) -> Self {
        Self { steps }
    }

    /// Statistical detection, then lossy UTF-8
    pub fn detecting() -> Self {
        Self::new(vec![DecodeStep::Detect, DecodeStep::Replace(UTF_8)])
    }

    /// Strict UTF-8, then the given legacy code page, then windows-1252
    pub fn with_legacy_fallback(legacy: &'static Encoding) -> Self {
        Self::new(vec![
            DecodeStep::Strict(UTF_8),
            DecodeStep::Strict(legacy),
            DecodeStep::Replace(WINDOWS_1252),
        ])
    }

    /// Resolves a WHATWG encoding label such as `euc-kr`, `windows-949` or `shift_jis`
    pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
        Encoding::for_label(label.trim().as_bytes())
    }

    pub fn steps(&self) -> &[DecodeStep] {
        &self.steps
    }

    /// Decodes the buffer, reporting which encoding was used
    pub fn decode(&self, bytes: &[u8]) -> Decoded {
        // A byte-order mark is authoritative
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            let (text, lossy) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            debug!("Decoded {} bytes as {} (byte-order mark)", bytes.len(), encoding.name());
            return Decoded {
                text: text.into_owned(),
                encoding,
                lossy,
            };
        }

        for step in &self.steps {
            if let Some(decoded) = Self::attempt(*step, bytes) {
                debug!(
                    "Decoded {} bytes as {}{}",
                    bytes.len(),
                    decoded.encoding.name(),
                    if decoded.lossy { " with replacements" } else { "" }
                );
                return decoded;
            }
        }

        let (text, lossy) = UTF_8.decode_without_bom_handling(bytes);
        debug!("Decode chain exhausted, fell back to lossy UTF-8");
        Decoded {
            text: text.into_owned(),
            encoding: UTF_8,
            lossy,
        }
    }

    /// Decodes the buffer and keeps only the text
    pub fn decode_to_string(&self, bytes: &[u8]) -> String {
        self.decode(bytes).text
    }

    fn attempt(step: DecodeStep, bytes: &[u8]) -> Option<Decoded> {
        match step {
            DecodeStep::Detect => {
                let mut detector = EncodingDetector::new();
                detector.feed(bytes, true);
                let encoding = detector.guess(None, true);
                Self::attempt(DecodeStep::Strict(encoding), bytes)
            }
            DecodeStep::Strict(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| Decoded {
                    text: text.into_owned(),
                    encoding,
                    lossy: false,
                }),
            DecodeStep::Replace(encoding) => {
                let (text, lossy) = encoding.decode_without_bom_handling(bytes);
                Some(Decoded {
                    text: text.into_owned(),
                    encoding,
                    lossy,
                })
            }
        }
    }
}

impl Default for TextDecoder {
    fn default() -> Self {
        Self::detecting()
    }
}
