// ChatEvidence - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies. These types are the shared vocabulary across all layers and
// the wire contract toward storage and analysis collaborators.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Parsed message (in-flight parser output)
// =============================================================================

/// One chat message (or system event) recovered from an export, with the
/// exact 1-indexed line span it came from.
///
/// `line_number_end >= line_number_start` always holds. Once the parser closes
/// a message its content is never touched again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedMessage {
    /// Message body. Continuation lines are joined with `\n`.
    pub content: String,

    /// Display name of the sender, or `[시스템]` for system events.
    pub sender: String,

    /// Date header in effect plus the message's time of day. System events
    /// carry 00:00 of their date because the export records no time for them.
    pub timestamp: NaiveDateTime,

    /// First source line of the message (1-indexed).
    pub line_number_start: u64,

    /// Last source line of the message (1-indexed, inclusive).
    pub line_number_end: u64,

    /// The source lines of the span, exactly as decoded.
    #[serde(skip)]
    pub raw_lines: Vec<String>,

    /// True for synthetic system-event messages.
    pub is_system: bool,
}

impl ParsedMessage {
    /// Number of source lines covered by this message.
    pub fn line_count(&self) -> u64 {
        self.line_number_end - self.line_number_start + 1
    }
}

// =============================================================================
// Parsing result
// =============================================================================

/// A line the parser could not place, kept for human review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorLine {
    pub line_number: u64,
    /// Leading characters of the raw line (see `ParseConfig::error_preview_chars`).
    pub raw_text: String,
    pub reason: String,
}

/// Text encoding a chat export was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceEncoding {
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "cp949")]
    Cp949,
    #[serde(rename = "euc-kr")]
    EucKr,
}

impl SourceEncoding {
    /// Decoding priority: first entry that decodes cleanly wins.
    pub fn priority() -> &'static [SourceEncoding] {
        &[
            SourceEncoding::Utf8,
            SourceEncoding::Cp949,
            SourceEncoding::EucKr,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "UTF-8",
            SourceEncoding::Cp949 => "CP949",
            SourceEncoding::EucKr => "EUC-KR",
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal output of parsing one chat export.
///
/// Every line number in `1..=total_lines` appears in exactly one of: a
/// message span, `skipped_lines`, or `error_lines`.
#[derive(Debug, Clone, Serialize)]
pub struct ParsingResult {
    pub file_name: String,

    /// Encoding the bytes were decoded with.
    pub encoding: SourceEncoding,

    /// Messages in document order.
    pub messages: Vec<ParsedMessage>,

    pub total_lines: u64,

    /// Sum of the inclusive line counts of all messages.
    pub parsed_lines: u64,

    /// Blank, banner, divider and date-header lines. Intentionally not evidence.
    pub skipped_lines: Vec<u64>,

    /// Unparseable lines, never silently dropped.
    pub error_lines: Vec<ErrorLine>,
}

impl ParsingResult {
    /// Counts a reviewer needs to judge how much of the file was machine-parsed.
    pub fn summary(&self) -> ParsingSummary {
        let parsed_ratio = if self.total_lines == 0 {
            0.0
        } else {
            self.parsed_lines as f64 / self.total_lines as f64
        };
        ParsingSummary {
            file_name: self.file_name.clone(),
            encoding: self.encoding,
            total_lines: self.total_lines,
            messages: self.messages.len(),
            parsed_lines: self.parsed_lines,
            skipped_lines: self.skipped_lines.len(),
            error_lines: self.error_lines.len(),
            parsed_ratio,
        }
    }
}

/// Audit statistics derived from a `ParsingResult`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsingSummary {
    pub file_name: String,
    pub encoding: SourceEncoding,
    pub total_lines: u64,
    pub messages: usize,
    pub parsed_lines: u64,
    pub skipped_lines: usize,
    pub error_lines: usize,
    /// Fraction of lines that ended up inside a message (0.0-1.0).
    pub parsed_ratio: f64,
}

// =============================================================================
// Source location (legal citation)
// =============================================================================

/// Kind of original evidence file. This crate only produces `KakaoTalk`;
/// the other variants belong to the shared vocabulary with collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    KakaoTalk,
    Text,
    Pdf,
    Image,
    Audio,
    Video,
}

/// Citation-grade pointer into the original file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file_name: String,
    pub file_type: FileType,
    pub line_number: u64,
    /// Omitted for single-line citations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number_end: Option<u64>,
}

impl SourceLocation {
    /// Line reference alone: "12번째 줄" or "12-14번째 줄".
    pub fn line_citation(&self) -> String {
        match self.line_number_end {
            Some(end) if end != self.line_number => {
                format!("{}-{}번째 줄", self.line_number, end)
            }
            _ => format!("{}번째 줄", self.line_number),
        }
    }

    /// Full citation: "대화.txt 12-14번째 줄".
    pub fn citation(&self) -> String {
        format!("{} {}", self.file_name, self.line_citation())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.citation())
    }
}

// =============================================================================
// Evidence chunk (public output contract)
// =============================================================================

/// Atomic evidence unit handed to storage and analysis collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceChunk {
    /// Opaque identifiers assigned by the caller.
    pub file_id: String,
    pub case_id: String,

    pub source_location: SourceLocation,
    pub content: String,

    /// Truncated SHA-256 of `content`, used by collaborators for deduplication.
    pub content_hash: String,

    pub sender: String,
    pub timestamp: NaiveDateTime,
}

// =============================================================================
// Article 840 categories
// =============================================================================

/// Statutory grounds for judicial divorce (Korean Civil Code Art. 840),
/// plus the catch-all `General`. Closed set; never extended at runtime.
///
/// The serialized labels are a wire-level contract with consumers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Article840Category {
    Adultery,
    Desertion,
    MistreatmentByInlaws,
    HarmToOwnParents,
    UnknownWhereabouts,
    IrreconcilableDifferences,
    DomesticViolence,
    FinancialMisconduct,
    General,
}

impl Article840Category {
    /// Returns all variants in declaration order.
    pub fn all() -> &'static [Article840Category] {
        &[
            Article840Category::Adultery,
            Article840Category::Desertion,
            Article840Category::MistreatmentByInlaws,
            Article840Category::HarmToOwnParents,
            Article840Category::UnknownWhereabouts,
            Article840Category::IrreconcilableDifferences,
            Article840Category::DomesticViolence,
            Article840Category::FinancialMisconduct,
            Article840Category::General,
        ]
    }

    /// Wire label.
    pub fn label(&self) -> &'static str {
        match self {
            Article840Category::Adultery => "adultery",
            Article840Category::Desertion => "desertion",
            Article840Category::MistreatmentByInlaws => "mistreatment_by_inlaws",
            Article840Category::HarmToOwnParents => "harm_to_own_parents",
            Article840Category::UnknownWhereabouts => "unknown_whereabouts",
            Article840Category::IrreconcilableDifferences => "irreconcilable_differences",
            Article840Category::DomesticViolence => "domestic_violence",
            Article840Category::FinancialMisconduct => "financial_misconduct",
            Article840Category::General => "general",
        }
    }

    /// Korean display label used in reasoning strings.
    pub fn korean_label(&self) -> &'static str {
        match self {
            Article840Category::Adultery => "배우자의 부정행위",
            Article840Category::Desertion => "악의의 유기",
            Article840Category::MistreatmentByInlaws => "배우자 직계존속의 부당한 대우",
            Article840Category::HarmToOwnParents => "자기 직계존속에 대한 부당한 대우",
            Article840Category::UnknownWhereabouts => "3년 이상 생사불명",
            Article840Category::IrreconcilableDifferences => "혼인을 계속하기 어려운 중대한 사유",
            Article840Category::DomesticViolence => "가정폭력",
            Article840Category::FinancialMisconduct => "경제적 문제",
            Article840Category::General => "일반 증거",
        }
    }

    /// Look up a category by its wire label.
    pub fn from_label(label: &str) -> Option<Article840Category> {
        Self::all().iter().copied().find(|c| c.label() == label)
    }
}

impl fmt::Display for Article840Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Tagging result
// =============================================================================

/// Multi-label classification of one message.
///
/// If `categories == [General]` then either nothing matched or only
/// general-evidence keywords did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggingResult {
    /// Non-empty, duplicate-free; ordered by ranking, not semantically meaningful.
    pub categories: Vec<Article840Category>,

    /// 0.0-1.0, rounded to two decimals.
    pub confidence: f64,

    /// Distinct matched keywords in first-seen order.
    pub matched_keywords: Vec<String>,

    /// Keywords present in the text but suppressed by negation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub negated_keywords: Vec<String>,

    /// Audit display only. Never parse this back.
    pub reasoning: String,
}

impl TaggingResult {
    /// True when the result carries only the catch-all category.
    pub fn is_general_only(&self) -> bool {
        self.categories == [Article840Category::General]
    }
}
