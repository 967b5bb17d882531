// ChatEvidence - core/negation.rs
//
// Window-based negation detection for keyword hits.
// Core layer: pure functions, no state across calls.
//
// Korean negation is mostly post-positional ("때리지 않았다", "때린 적 없다")
// with a short pre-verbal form ("안 때렸다", "못 갔다"). The detector looks a
// bounded number of characters either side of each keyword occurrence and
// never across a clause boundary or connective ending ("지만", "고 "), so a
// negated clause cannot suppress a hit in a neighbouring one.

use crate::util::constants;

/// Negators searched for after the keyword.
const POST_NEGATORS: &[&str] = &[
    "않", "없", "아니", "아냐", "아님", "안했", "안 했", "안함", "못했", "못 했", "못함", "말았",
    "지마", "지 마",
];

/// Negators searched for immediately before the keyword.
const PRE_NEGATORS: &[&str] = &["안 ", "못 "];

/// Outcome of a negation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegationCheck {
    pub negated: bool,
    /// The negator that decided the outcome, when negated.
    pub negator: Option<&'static str>,
}

impl NegationCheck {
    const NONE: NegationCheck = NegationCheck {
        negated: false,
        negator: None,
    };
}

/// Seam for swapping in a smarter (e.g. morphological) detector.
pub trait NegationDetector: Send + Sync {
    /// Whether `keyword` is negated wherever it occurs in `text`.
    fn check(&self, text: &str, keyword: &str) -> NegationCheck;
}

/// Fixed-window detector using the built-in negator lists.
#[derive(Debug, Clone)]
pub struct WindowNegationDetector {
    pub after_chars: usize,
    pub before_chars: usize,
}

impl Default for WindowNegationDetector {
    fn default() -> Self {
        Self {
            after_chars: constants::NEGATION_WINDOW_AFTER_CHARS,
            before_chars: constants::NEGATION_WINDOW_BEFORE_CHARS,
        }
    }
}

impl NegationDetector for WindowNegationDetector {
    /// A keyword is negated only if every occurrence is. One plain
    /// occurrence is enough for the keyword to count.
    fn check(&self, text: &str, keyword: &str) -> NegationCheck {
        let keyword = keyword.to_lowercase();
        if keyword.is_empty() {
            return NegationCheck::NONE;
        }
        let text = text.to_lowercase();

        let mut first_negator = None;
        let mut occurrences = 0;
        for (start, _) in text.match_indices(&keyword) {
            occurrences += 1;
            let end = start + keyword.len();
            match self.negator_near(&text, start, end) {
                Some(negator) => {
                    first_negator.get_or_insert(negator);
                }
                None => return NegationCheck::NONE,
            }
        }

        if occurrences == 0 {
            return NegationCheck::NONE;
        }
        NegationCheck {
            negated: true,
            negator: first_negator,
        }
    }
}

impl WindowNegationDetector {
    /// Negator within the windows around the byte range `start..end`.
    fn negator_near(&self, text: &str, start: usize, end: usize) -> Option<&'static str> {
        let after = clause_window_after(&text[end..], self.after_chars);
        if let Some(n) = POST_NEGATORS.iter().copied().find(|n| after.contains(n)) {
            return Some(n);
        }
        let before = clause_window_before(&text[..start], self.before_chars);
        PRE_NEGATORS.iter().copied().find(|n| before.ends_with(n))
    }
}

/// Up to `max_chars` characters from the start of `rest`, stopping at the
/// first clause boundary or connective ending.
fn clause_window_after(rest: &str, max_chars: usize) -> &str {
    let mut cut = rest.len();
    for (count, (idx, ch)) in rest.char_indices().enumerate() {
        if count == max_chars || constants::CLAUSE_BOUNDARIES.contains(&ch) {
            cut = idx;
            break;
        }
    }
    let window = &rest[..cut];
    let connective = constants::CLAUSE_CONNECTIVES
        .iter()
        .copied()
        .filter_map(|c| window.find(c))
        .min();
    match connective {
        Some(idx) => &window[..idx],
        None => window,
    }
}

/// Up to `max_chars` characters from the end of `prefix`, stopping at the
/// nearest clause boundary.
fn clause_window_before(prefix: &str, max_chars: usize) -> &str {
    let mut cut = 0;
    for (count, (idx, ch)) in prefix.char_indices().rev().enumerate() {
        if count == max_chars {
            cut = idx + ch.len_utf8();
            break;
        }
        if constants::CLAUSE_BOUNDARIES.contains(&ch) {
            cut = idx + ch.len_utf8();
            break;
        }
    }
    &prefix[cut..]
}

/// Check `keyword` in `text` with the default window detector.
pub fn has_negation(text: &str, keyword: &str) -> NegationCheck {
    WindowNegationDetector::default().check(text, keyword)
}
