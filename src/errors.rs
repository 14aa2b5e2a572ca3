/*!
 * Error types for the subcheck application.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions.
 * Decoding has no error type: every decode chain ends in an encoding that
 * accepts any byte sequence.
 */

use thiserror::Error;

/// Errors raised while parsing or serializing a subtitle document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubtitleError {
    /// A block could not be reconciled into an index and a timecode
    #[error("Malformed document at block {block} (line {line}): {reason}")]
    MalformedDocument {
        /// 1-based ordinal of the failing block
        block: usize,
        /// 1-based source line where the problem was found
        line: usize,
        /// What was wrong with the block
        reason: String,
    },

    /// An item's start or end could not be turned back into a timecode
    #[error("Invalid timecode '{value}' in subtitle {index}")]
    InvalidTimecode {
        /// Index of the offending subtitle item
        index: usize,
        /// The rejected value
        value: String,
    },
}

/// Errors raised when resolving a format identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No format is registered for the identifier
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Per-rule problems. Reported as diagnostics, never propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The rule's pattern failed to compile
    #[error("Rule '{rule_id}' has an invalid pattern: {message}")]
    InvalidPattern {
        rule_id: String,
        message: String,
    },
}

impl RuleError {
    /// Id of the rule this error refers to
    pub fn rule_id(&self) -> &str {
        match self {
            Self::InvalidPattern { rule_id, .. } => rule_id,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle parsing or export
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from format resolution
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input exceeds the configured size ceiling
    #[error("Input too large: {size} bytes (limit {limit})")]
    InputTooLarge { size: u64, limit: u64 },

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
