// ChatEvidence - tests/e2e_parser_properties.rs
//
// Property tests for the line accounting of the parser.
//
// Exports are generated from a mix of every line shape the parser knows,
// including malformed headers and banner text appearing mid-conversation.
// Whatever the mix, each line must land in exactly one message span, the
// skipped list or the error list.

use chat_evidence::core::model::ParsingResult;
use chat_evidence::core::parser::{parse_content, ParseConfig};
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Strategies
// =============================================================================

fn sender_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("홍길동".to_string()),
        Just("김영희".to_string()),
        "[a-z]{1,8}",
    ]
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("어제 또 때렸잖아".to_string()),
        Just("비밀번호 : 1234".to_string()),
        Just("사진을 보냈어".to_string()),
        "[a-zA-Z0-9 ]{1,20}",
    ]
}

/// Lines that never open a message: blanks, banners, dividers, date headers.
fn structural_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        Just("홍길동 님과 카카오톡 대화".to_string()),
        Just("저장한 날짜 : 2024-01-20 오후 3:20".to_string()),
        Just("━━━━━━━━━━".to_string()),
        (2020i32..2026, 1u32..13, 1u32..29)
            .prop_map(|(y, m, d)| format!("--------------- {y}년 {m}월 {d}일 ---------------")),
        Just("2024년 2월 30일".to_string()),
        Just("2024. 1. 16.".to_string()),
    ]
}

/// Message headers (valid and not), system events and free text.
fn content_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..13, 0u32..60, sender_strategy(), text_strategy())
            .prop_map(|(h, min, s, t)| format!("오전 {h}:{min:02}, {s} : {t}")),
        (sender_strategy(), 1u32..13, text_strategy())
            .prop_map(|(s, h, t)| format!("[{s}] [오후 {h}:05] {t}")),
        (1u32..29, sender_strategy(), text_strategy())
            .prop_map(|(d, s, t)| format!("2024. 1. {d}. 오후 2:30, {s} : {t}")),
        Just("오후 13:00, 홍길동 : 이상한 시각".to_string()),
        Just("홍길동님이 나갔습니다.".to_string()),
        Just("사진 3장".to_string()),
        text_strategy(),
    ]
}

/// One source line of any shape the parser distinguishes.
fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => structural_line_strategy(),
        2 => content_line_strategy(),
    ]
}

fn export_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(line_strategy(), 0..40).prop_map(|lines| lines.join("\n"))
}

// =============================================================================
// Helpers
// =============================================================================

/// Collect every line number the result accounts for, failing on duplicates.
fn accounted_lines(result: &ParsingResult) -> Result<HashSet<u64>, TestCaseError> {
    let mut seen = HashSet::new();
    for m in &result.messages {
        prop_assert!(m.line_number_start <= m.line_number_end);
        for n in m.line_number_start..=m.line_number_end {
            prop_assert!(seen.insert(n), "line {} counted twice (message)", n);
        }
    }
    for &n in &result.skipped_lines {
        prop_assert!(seen.insert(n), "line {} counted twice (skipped)", n);
    }
    for e in &result.error_lines {
        prop_assert!(seen.insert(e.line_number), "line {} counted twice (error)", e.line_number);
    }
    Ok(seen)
}

// =============================================================================
// Line accounting
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn e2e_every_line_accounted_exactly_once(content in export_strategy()) {
        let result = parse_content(&content, "chat.txt", &ParseConfig::default());
        prop_assert_eq!(result.total_lines, content.lines().count() as u64);

        let seen = accounted_lines(&result)?;
        let expected: HashSet<u64> = (1..=result.total_lines).collect();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn e2e_spans_are_disjoint_and_in_document_order(content in export_strategy()) {
        let result = parse_content(&content, "chat.txt", &ParseConfig::default());
        for pair in result.messages.windows(2) {
            prop_assert!(pair[0].line_number_end < pair[1].line_number_start);
        }
        let parsed: u64 = result.messages.iter().map(|m| m.line_count()).sum();
        prop_assert_eq!(result.parsed_lines, parsed);
    }

    #[test]
    fn e2e_skipped_and_error_lines_are_sorted(content in export_strategy()) {
        let result = parse_content(&content, "chat.txt", &ParseConfig::default());
        prop_assert!(result.skipped_lines.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(result.error_lines.windows(2).all(|w| w[0].line_number < w[1].line_number));
    }

    #[test]
    fn e2e_raw_lines_match_span_length(content in export_strategy()) {
        let result = parse_content(&content, "chat.txt", &ParseConfig::default());
        for m in &result.messages {
            prop_assert_eq!(m.raw_lines.len() as u64, m.line_count());
        }
    }
}
