/*!
 * Data model shared by the parsers, the rule matcher and the CLI.
 *
 * Field names follow the JSON shapes the analysis service has always
 * exchanged, so documents produced by `subcheck parse` can be fed back into
 * `subcheck export` or embedded in an analyze request unchanged.
 */

use serde::{Deserialize, Serialize};

// @struct: Single subtitle item in format-neutral form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleItem {
    // @field: Sequence number as written in the source document
    pub index: usize,

    // @field: Start timecode, absent for formats without timing
    #[serde(default)]
    pub start: Option<String>,

    // @field: End timecode
    #[serde(default)]
    pub end: Option<String>,

    // @field: Display text, lines separated by '\n'
    pub text: String,
}

impl SubtitleItem {
    /// Creates an item with timing
    pub fn new(index: usize, start: impl Into<String>, end: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index,
            start: Some(start.into()),
            end: Some(end.into()),
            text: text.into(),
        }
    }

    /// Creates an item that carries no timing at all
    pub fn untimed(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            start: None,
            end: None,
            text: text.into(),
        }
    }
}

/// A user-defined regex rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Identifier, unique within one analysis request
    pub id: String,

    /// Regular expression
    pub pattern: String,

    /// Replacement or advisory text shown with every match
    #[serde(default)]
    pub suggestion: Option<String>,

    /// Free-form documentation
    #[serde(default)]
    pub description: Option<String>,

    /// Matches ignore case unless this is set
    #[serde(default)]
    pub case_sensitive: bool,
}

impl Rule {
    pub fn new(id: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            suggestion: None,
            description: None,
            case_sensitive: false,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

/// One located occurrence of a rule's pattern inside an item's text.
///
/// Offsets count characters (Unicode scalar values), not bytes, and form the
/// half-open range `[start_index, end_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub rule_id: String,
    pub start_index: usize,
    pub end_index: usize,
    pub matched_text: String,
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// All matches found in one subtitle item. Never built with an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// `index` of the matched SubtitleItem
    pub item_index: usize,
    pub matches: Vec<Match>,
}

/// Request envelope: items and the rules to run against them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub subtitles: Vec<SubtitleItem>,
    pub rules: Vec<Rule>,
}

/// Response envelope for an analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub results: Vec<AnalysisResult>,
}

/// Response envelope for an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResponse {
    pub content: String,
}

/// A rules file is either a bare array or an object with a `rules` key
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RuleSet {
    List(Vec<Rule>),
    Wrapped { rules: Vec<Rule> },
}

impl RuleSet {
    pub fn into_rules(self) -> Vec<Rule> {
        match self {
            Self::List(rules) | Self::Wrapped { rules } => rules,
        }
    }
}
