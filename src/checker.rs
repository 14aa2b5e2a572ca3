/*!
 * Rule matching over parsed subtitle items.
 *
 * Every rule is a regular expression. For each item, in input order, each
 * rule's non-overlapping matches are collected left to right and reported with
 * character offsets into the item's text. Items without matches are left out
 * of the result.
 *
 * A rule whose pattern does not compile matches nothing; the other rules and
 * items are unaffected. Such rules are reported through
 * [`Checker::check_with_diagnostics`].
 *
 * Patterns use the `regex` crate syntax, which guarantees linear-time
 * matching. Look-around (`(?=..)`, `(?<!..)`) and backreferences (`\1`) are
 * not part of it, so rules using them are reported as invalid.
 */

use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::RuleError;
use crate::models::{AnalysisResult, Match, Rule, SubtitleItem};

/// Default compiled-size ceiling for a single rule pattern (1 MiB)
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Order of matches inside one AnalysisResult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchOrder {
    /// All matches of the first rule, then all of the second, and so on
    #[default]
    Rule,
    /// Sorted by start offset; equal offsets keep rule order
    Position,
}

/// Results plus the rules that could not be used
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub results: Vec<AnalysisResult>,
    pub invalid_rules: Vec<RuleError>,
}

impl CheckReport {
    /// Total number of matches across all items
    pub fn match_count(&self) -> usize {
        self.results.iter().map(|r| r.matches.len()).sum()
    }
}

// @struct: Rule with its compiled pattern
struct CompiledRule<'a> {
    rule: &'a Rule,
    regex: Regex,
}

/// Regex rule matcher
#[derive(Debug, Clone)]
pub struct Checker {
    match_order: MatchOrder,
    size_limit: usize,
}

impl Checker {
    pub fn new() -> Self {
        Self {
            match_order: MatchOrder::default(),
            size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }

    pub fn with_match_order(mut self, match_order: MatchOrder) -> Self {
        self.match_order = match_order;
        self
    }

    /// Patterns whose compiled form exceeds `size_limit` bytes are treated as invalid
    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    pub fn match_order(&self) -> MatchOrder {
        self.match_order
    }

    /// Run every rule against every item
    pub fn check(&self, subtitles: &[SubtitleItem], rules: &[Rule]) -> Vec<AnalysisResult> {
        self.check_with_diagnostics(subtitles, rules).results
    }

    /// Like [`Checker::check`], also returning the rules that failed to compile
    pub fn check_with_diagnostics(&self, subtitles: &[SubtitleItem], rules: &[Rule]) -> CheckReport {
        let (per_item, invalid_rules) = self.scan(subtitles, rules);

        let results: Vec<AnalysisResult> = subtitles
            .iter()
            .zip(per_item)
            .filter(|(_, matches)| !matches.is_empty())
            .map(|(item, matches)| AnalysisResult {
                item_index: item.index,
                matches,
            })
            .collect();

        debug!(
            "Checked {} items against {} rules: {} items flagged",
            subtitles.len(),
            rules.len() - invalid_rules.len(),
            results.len()
        );

        CheckReport {
            results,
            invalid_rules,
        }
    }

    /// Matches for every item, aligned with `subtitles` by position.
    ///
    /// Unlike the sparse results, this stays unambiguous when several items
    /// share an `index`.
    pub fn check_each(&self, subtitles: &[SubtitleItem], rules: &[Rule]) -> Vec<Vec<Match>> {
        self.scan(subtitles, rules).0
    }

    // @scans: Every item with every compilable rule
    fn scan(&self, subtitles: &[SubtitleItem], rules: &[Rule]) -> (Vec<Vec<Match>>, Vec<RuleError>) {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut invalid_rules = Vec::new();

        for rule in rules {
            match self.compile(rule) {
                Ok(regex) => compiled.push(CompiledRule { rule, regex }),
                Err(e) => {
                    warn!("Ignoring rule: {}", e);
                    invalid_rules.push(e);
                }
            }
        }

        let per_item = subtitles
            .iter()
            .map(|item| {
                let mut item_matches = Vec::new();
                for compiled_rule in &compiled {
                    Self::collect_matches(compiled_rule, &item.text, &mut item_matches);
                }
                if self.match_order == MatchOrder::Position {
                    item_matches.sort_by_key(|m| m.start_index);
                }
                item_matches
            })
            .collect();

        (per_item, invalid_rules)
    }

    fn compile(&self, rule: &Rule) -> Result<Regex, RuleError> {
        RegexBuilder::new(&rule.pattern)
            .case_insensitive(!rule.case_sensitive)
            .size_limit(self.size_limit)
            .build()
            .map_err(|e| RuleError::InvalidPattern {
                rule_id: rule.id.clone(),
                message: e.to_string(),
            })
    }

    // @appends: Matches of one rule, converting byte offsets to char offsets
    fn collect_matches(compiled: &CompiledRule<'_>, text: &str, out: &mut Vec<Match>) {
        let mut byte_pos = 0;
        let mut char_pos = 0;

        for m in compiled.regex.find_iter(text) {
            char_pos += text[byte_pos..m.start()].chars().count();
            let len = m.as_str().chars().count();

            out.push(Match {
                rule_id: compiled.rule.id.clone(),
                start_index: char_pos,
                end_index: char_pos + len,
                matched_text: m.as_str().to_string(),
                suggestion: compiled.rule.suggestion.clone(),
            });

            char_pos += len;
            byte_pos = m.end();
        }
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}
