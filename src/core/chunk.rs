// ChatEvidence - core/chunk.rs
//
// Maps parsed messages to evidence chunks: the unit storage and analysis
// collaborators consume. Pure mapping, one chunk per message, document order.

use crate::core::model::{EvidenceChunk, FileType, ParsedMessage, ParsingResult, SourceLocation};
use crate::util::constants;
use sha2::{Digest, Sha256};

/// Build one evidence chunk per parsed message.
///
/// `case_id` and `file_id` are opaque to this crate and copied verbatim.
pub fn build(parsing_result: &ParsingResult, case_id: &str, file_id: &str) -> Vec<EvidenceChunk> {
    let chunks: Vec<EvidenceChunk> = parsing_result
        .messages
        .iter()
        .map(|message| make_chunk(message, &parsing_result.file_name, case_id, file_id))
        .collect();

    tracing::debug!(
        file = %parsing_result.file_name,
        chunks = chunks.len(),
        "Evidence chunks built"
    );
    chunks
}

fn make_chunk(message: &ParsedMessage, file_name: &str, case_id: &str, file_id: &str) -> EvidenceChunk {
    let line_number_end = (message.line_number_end != message.line_number_start)
        .then_some(message.line_number_end);

    EvidenceChunk {
        file_id: file_id.to_string(),
        case_id: case_id.to_string(),
        source_location: SourceLocation {
            file_name: file_name.to_string(),
            file_type: FileType::KakaoTalk,
            line_number: message.line_number_start,
            line_number_end,
        },
        content: message.content.clone(),
        content_hash: content_hash(&message.content),
        sender: message.sender.clone(),
        timestamp: message.timestamp,
    }
}

/// SHA-256 of the UTF-8 bytes of `content`, as lower-case hex truncated to
/// `CONTENT_HASH_HEX_LEN` characters.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let mut hash = format!("{:x}", hasher.finalize());
    hash.truncate(constants::CONTENT_HASH_HEX_LEN);
    hash
}
