// ChatEvidence - core/encoding.rs
//
// Byte-to-text resolution for chat exports. PC exports are UTF-8; older
// Windows exports are CP949 (Unified Hangul Code) or plain EUC-KR.
//
// The first encoding in `SourceEncoding::priority()` that decodes without a
// malformed sequence wins. Nothing checks that the decoded text is plausible
// Korean, so bytes that happen to be valid under an earlier encoding are
// accepted as such.
//
// Strict EUC-KR (KS X 1001) is a subset of CP949, so any input the EUC-KR
// step accepts has already been taken by CP949. `decode` never reports
// `SourceEncoding::EucKr`; the step is kept so the priority order and the
// `tried` list in `FileNotReadable` name every encoding exports use.

use crate::core::model::SourceEncoding;
use crate::util::error::ParseError;
use encoding_rs::EUC_KR;

/// UTF-8 byte-order mark as a char.
const BOM: char = '\u{feff}';

/// Decode raw export bytes using the first supported encoding that succeeds.
///
/// `file_name` is only used for the error message.
pub fn decode(bytes: &[u8], file_name: &str) -> Result<(String, SourceEncoding), ParseError> {
    for &encoding in SourceEncoding::priority() {
        if let Some(text) = try_decode(bytes, encoding) {
            tracing::debug!(
                file = file_name,
                encoding = %encoding,
                bytes = bytes.len(),
                "Decoded chat export"
            );
            return Ok((text, encoding));
        }
        tracing::trace!(file = file_name, encoding = %encoding, "Encoding rejected");
    }

    Err(ParseError::FileNotReadable {
        file: file_name.to_string(),
        tried: SourceEncoding::priority().iter().map(|e| e.label()).collect(),
    })
}

/// Attempt a single encoding. `None` on any malformed or unmapped sequence.
fn try_decode(bytes: &[u8], encoding: SourceEncoding) -> Option<String> {
    match encoding {
        SourceEncoding::Utf8 => std::str::from_utf8(bytes)
            .ok()
            .map(|s| s.strip_prefix(BOM).unwrap_or(s).to_string()),
        // encoding_rs implements the WHATWG "EUC-KR" decoder, which is the
        // windows-949 (CP949) superset.
        SourceEncoding::Cp949 => EUC_KR
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|cow| cow.into_owned()),
        // Only reached for bytes CP949 rejected, which always fail here too.
        SourceEncoding::EucKr => {
            if is_strict_euc_kr(bytes) {
                EUC_KR
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|cow| cow.into_owned())
            } else {
                None
            }
        }
    }
}

/// KS X 1001 structure check: ASCII, or a lead and trail byte both in
/// 0xA1..=0xFE. CP949's extended lead/trail ranges are rejected.
fn is_strict_euc_kr(bytes: &[u8]) -> bool {
    let mut iter = bytes.iter();
    while let Some(&b) = iter.next() {
        if b < 0x80 {
            continue;
        }
        if !(0xA1..=0xFE).contains(&b) {
            return false;
        }
        match iter.next() {
            Some(&trail) if (0xA1..=0xFE).contains(&trail) => {}
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_is_preferred() {
        let (text, enc) = decode("2024년 1월 15일 월요일".as_bytes(), "a.txt").unwrap();
        assert_eq!(enc, SourceEncoding::Utf8);
        assert_eq!(text, "2024년 1월 15일 월요일");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("대화".as_bytes());
        let (text, enc) = decode(&bytes, "bom.txt").unwrap();
        assert_eq!(enc, SourceEncoding::Utf8);
        assert_eq!(text, "대화");
    }

    #[test]
    fn test_cp949_fallback() {
        let (bytes, _, had_errors) = EUC_KR.encode("오후 3:45, 홍길동 : 안녕하세요");
        assert!(!had_errors);
        let (text, enc) = decode(&bytes, "legacy.txt").unwrap();
        assert_eq!(enc, SourceEncoding::Cp949);
        assert_eq!(text, "오후 3:45, 홍길동 : 안녕하세요");
    }

    #[test]
    fn test_undecodable_bytes_fail() {
        // 0x80 is neither valid UTF-8 nor a CP949 lead byte.
        let bytes = [0x41, 0x80, 0x80, 0x42];
        match decode(&bytes, "garbage.bin") {
            Err(ParseError::FileNotReadable { file, tried }) => {
                assert_eq!(file, "garbage.bin");
                assert_eq!(tried, vec!["UTF-8", "CP949", "EUC-KR"]);
            }
            other => panic!("Expected FileNotReadable, got: {other:?}"),
        }
    }

    #[test]
    fn test_strict_euc_kr_structure() {
        assert!(is_strict_euc_kr(b"plain ascii"));
        assert!(is_strict_euc_kr(&[0xB0, 0xA1])); // 가
        assert!(!is_strict_euc_kr(&[0x81, 0x41])); // CP949 extension
        assert!(!is_strict_euc_kr(&[0xB0])); // truncated pair
    }

    #[test]
    fn test_strict_euc_kr_bytes_resolve_as_cp949() {
        let (bytes, _, had_errors) = EUC_KR.encode("가나다 대화");
        assert!(!had_errors);
        assert!(is_strict_euc_kr(&bytes));
        assert_eq!(
            try_decode(&bytes, SourceEncoding::EucKr).as_deref(),
            Some("가나다 대화")
        );

        // CP949 sits earlier in the priority order and accepts the same bytes.
        let (text, enc) = decode(&bytes, "euc.txt").unwrap();
        assert_eq!(enc, SourceEncoding::Cp949);
        assert_eq!(text, "가나다 대화");
    }

    #[test]
    fn test_cp949_rejects_what_euc_kr_rejects() {
        let bytes = [0x41, 0xB0];
        assert_eq!(try_decode(&bytes, SourceEncoding::Cp949), None);
        assert_eq!(try_decode(&bytes, SourceEncoding::EucKr), None);
    }

    #[test]
    fn test_empty_input_decodes_as_utf8() {
        let (text, enc) = decode(&[], "empty.txt").unwrap();
        assert_eq!(enc, SourceEncoding::Utf8);
        assert!(text.is_empty());
    }
}
