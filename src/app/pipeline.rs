// ChatEvidence - app/pipeline.rs
//
// One chat export from disk to tagged evidence:
// read -> decode -> parse -> chunk -> tag.
//
// Parsing is per-file and sequential; tagging fans out over the rayon pool.

use crate::core::chunk;
use crate::core::export::TaggedEvidence;
use crate::core::model::{ParsingResult, ParsingSummary};
use crate::core::parser::{self, ParseConfig};
use crate::core::tagger::ArticleTagger;
use crate::platform::fs;
use crate::util::error::ParseError;
use std::path::Path;

/// Identifiers and parser settings for one run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub case_id: String,
    /// Defaults to the export's file name when `None`.
    pub file_id: Option<String>,
    pub parse: ParseConfig,
}

/// Everything produced for one export.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub parsing: ParsingResult,
    /// One entry per parsed message, in document order.
    pub evidence: Vec<TaggedEvidence>,
}

impl ProcessedFile {
    pub fn summary(&self) -> ParsingSummary {
        self.parsing.summary()
    }

    /// Evidence whose tagging names at least one Article 840 ground.
    pub fn substantive(&self) -> impl Iterator<Item = &TaggedEvidence> {
        self.evidence.iter().filter(|e| !e.tagging.is_general_only())
    }
}

/// Read and parse a chat export.
pub fn parse_file(path: &Path, config: &ParseConfig) -> Result<ParsingResult, ParseError> {
    let bytes = fs::read_evidence_file(path)?;
    parser::parse_bytes(&bytes, &display_name(path), config)
}

/// Parse, chunk and tag a chat export.
pub fn process_file(
    path: &Path,
    tagger: &ArticleTagger,
    options: &PipelineOptions,
) -> Result<ProcessedFile, ParseError> {
    let parsing = parse_file(path, &options.parse)?;
    let file_id = options
        .file_id
        .clone()
        .unwrap_or_else(|| parsing.file_name.clone());

    let chunks = chunk::build(&parsing, &options.case_id, &file_id);
    let taggings = tagger.tag_batch(&chunks);
    let evidence: Vec<TaggedEvidence> = chunks
        .into_iter()
        .zip(taggings)
        .map(|(chunk, tagging)| TaggedEvidence { chunk, tagging })
        .collect();

    let processed = ProcessedFile { parsing, evidence };
    let summary = processed.summary();
    tracing::info!(
        file = %summary.file_name,
        encoding = %summary.encoding,
        lines = summary.total_lines,
        messages = summary.messages,
        skipped = summary.skipped_lines,
        errors = summary.error_lines,
        substantive = processed.substantive().count(),
        negation = tagger.negation_enabled(),
        "Export processed"
    );
    if !processed.parsing.error_lines.is_empty() {
        let lines: Vec<u64> = processed
            .parsing
            .error_lines
            .iter()
            .map(|e| e.line_number)
            .collect();
        tracing::warn!(file = %summary.file_name, lines = ?lines, "Unparseable lines recorded");
    }

    Ok(processed)
}

/// File name used in citations: the final path component.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
