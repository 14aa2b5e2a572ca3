/*!
 * Applying rule suggestions to subtitle text.
 *
 * Matches are reported per rule, so spans from different rules can overlap.
 * Only the earliest of a set of overlapping spans is replaced; the others are
 * skipped and counted.
 */

use log::debug;

use crate::models::{Match, SubtitleItem};

/// Outcome of applying suggestions to a document
#[derive(Debug, Clone, PartialEq)]
pub struct FixOutcome {
    /// Items with suggestions applied
    pub items: Vec<SubtitleItem>,
    /// Number of replacements made
    pub applied: usize,
    /// Matches with a suggestion that overlapped an earlier replacement or
    /// fell outside the text
    pub skipped: usize,
}

/// Replace each suggested span of `text`, returning the new text and the
/// number of replacements and skipped overlaps
pub fn apply_suggestions(text: &str, matches: &[Match]) -> (String, usize, usize) {
    let mut candidates: Vec<&Match> = matches
        .iter()
        .filter(|m| m.suggestion.is_some() && m.start_index <= m.end_index)
        .collect();
    // Stable: equal starts keep report order
    candidates.sort_by_key(|m| m.start_index);

    // Char offset -> byte offset, with one extra entry for the end of text
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut applied = 0;
    let mut skipped = 0;

    for m in candidates {
        if m.start_index < cursor || m.end_index > char_len {
            skipped += 1;
            continue;
        }
        let (start, end) = (boundaries[m.start_index], boundaries[m.end_index]);
        output.push_str(&text[boundaries[cursor]..start]);
        output.push_str(m.suggestion.as_deref().unwrap_or_default());
        cursor = m.end_index;
        applied += 1;
        debug!("Replaced '{}' at {}..{}", &text[start..end], m.start_index, m.end_index);
    }

    output.push_str(&text[boundaries[cursor]..]);
    (output, applied, skipped)
}

/// Apply per-item matches to the items at the same position, as produced by
/// [`Checker::check_each`](crate::checker::Checker::check_each)
pub fn apply_to_items(items: &[SubtitleItem], matches: &[Vec<Match>]) -> FixOutcome {
    let mut applied = 0;
    let mut skipped = 0;
    let items = items
        .iter()
        .enumerate()
        .map(|(position, item)| match matches.get(position) {
            Some(item_matches) if !item_matches.is_empty() => {
                let (text, item_applied, item_skipped) = apply_suggestions(&item.text, item_matches);
                applied += item_applied;
                skipped += item_skipped;
                SubtitleItem {
                    text,
                    ..item.clone()
                }
            }
            _ => item.clone(),
        })
        .collect();

    FixOutcome {
        items,
        applied,
        skipped,
    }
}
