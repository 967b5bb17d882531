// ChatEvidence - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Anything the parser, tagger or config loader treats as a bound lives here.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ChatEvidence";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ChatEvidence";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Parsing
// =============================================================================

/// Sender recorded on synthetic system-event messages (joins, leaves,
/// deletions, attachment placeholders).
pub const SYSTEM_SENDER: &str = "[시스템]";

/// Default number of characters of an unparseable line kept in
/// `ParsingResult::error_lines` for human review.
pub const DEFAULT_ERROR_PREVIEW_CHARS: usize = 100;

/// Minimum user-configurable error preview length.
pub const MIN_ERROR_PREVIEW_CHARS: usize = 10;

/// Maximum user-configurable error preview length.
pub const MAX_ERROR_PREVIEW_CHARS: usize = 1_000;

/// Minimum run of dash-like characters for a line to count as a divider.
pub const MIN_DIVIDER_RUN: usize = 5;

/// Reason recorded for an unrecognised line seen before any date header.
pub const REASON_NO_DATE_CONTEXT: &str = "no date context yet";

/// Reason recorded for an unrecognised line once a date is known.
pub const REASON_PATTERN_MISMATCH: &str = "pattern mismatch";

/// Reason recorded for a message header whose clock value cannot exist.
pub const REASON_INVALID_TIME: &str = "invalid time of day";

/// Reason recorded for a date header naming a calendar date that cannot exist.
pub const REASON_INVALID_DATE: &str = "invalid calendar date";

// =============================================================================
// Evidence chunks
// =============================================================================

/// Number of hex characters kept from the SHA-256 digest of chunk content.
/// The hash is a deduplication identifier, not an integrity control.
pub const CONTENT_HASH_HEX_LEN: usize = 16;

// =============================================================================
// Negation detection
// =============================================================================

/// Characters inspected after a keyword occurrence for a post-positional
/// negator ("때리지 않았다", "때린 적 없다").
pub const NEGATION_WINDOW_AFTER_CHARS: usize = 12;

/// Characters inspected before a keyword occurrence for a pre-verbal
/// negator ("안 때렸다", "못 갔다").
pub const NEGATION_WINDOW_BEFORE_CHARS: usize = 3;

/// Characters that end a clause. Negation never reaches across them.
pub const CLAUSE_BOUNDARIES: &[char] = &['.', '!', '?', ',', ';', '\n', '。'];

/// Connective endings that join two clauses ("했지만", "했고 ", "있는데").
/// The after-window stops at the first one, so a negator in the next clause
/// does not reach back.
pub const CLAUSE_CONNECTIVES: &[&str] = &["지만", "는데", "은데", "면서", "니까", "고 "];

// =============================================================================
// Tagging
// =============================================================================

/// Confidence reported for empty or whitespace-only content.
pub const CONFIDENCE_EMPTY: f64 = 0.0;

/// Confidence reported when no dictionary keyword matched.
pub const CONFIDENCE_NO_MATCH: f64 = 0.1;

/// Confidence reported when only general-evidence keywords matched.
pub const CONFIDENCE_GENERAL_ONLY: f64 = 0.3;

/// Base confidence before any keyword bonus.
pub const CONFIDENCE_BASE: f64 = 0.3;

/// Confidence added per distinct matched keyword.
pub const CONFIDENCE_PER_KEYWORD: f64 = 0.2;

/// Multiplier applied when more than one category is selected.
/// Diffuse signals across several grounds are slightly less conclusive.
pub const MULTI_CATEGORY_PENALTY: f64 = 0.9;

/// Number of matched keywords quoted in the reasoning string.
pub const REASONING_MAX_KEYWORDS: usize = 3;

// =============================================================================
// Keyword dictionary limits
// =============================================================================

/// Maximum size of a keyword dictionary TOML file in bytes.
pub const MAX_DICTIONARY_FILE_SIZE: u64 = 256 * 1024; // 256 KB

/// Maximum number of keywords accepted for a single category.
pub const MAX_KEYWORDS_PER_CATEGORY: usize = 500;

/// Maximum weight a category may carry.
pub const MAX_CATEGORY_WEIGHT: u32 = 10;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// User dictionaries subdirectory name.
pub const DICTIONARIES_DIR_NAME: &str = "dictionaries";

/// File name of a user dictionary override inside the dictionaries directory.
pub const USER_DICTIONARY_FILE_NAME: &str = "article840.toml";

// =============================================================================
// Command line
// =============================================================================

/// Case identifier used when none is given.
pub const DEFAULT_CASE_ID: &str = "unassigned";
