// ChatEvidence - core/export.rs
//
// CSV and JSON export of tagged evidence chunks.
// Core layer: writes to any Write trait object.

use crate::core::model::{EvidenceChunk, TaggingResult};
use crate::util::error::ExportError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// An evidence chunk together with its classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedEvidence {
    pub chunk: EvidenceChunk,
    pub tagging: TaggingResult,
}

/// Output format for tagged evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Case-insensitive lookup of a format name.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Write `items` in the requested format. Returns the number of records.
pub fn export<W: Write>(
    format: ExportFormat,
    items: &[TaggedEvidence],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    match format {
        ExportFormat::Json => export_json(items, writer, export_path),
        ExportFormat::Csv => export_csv(items, writer, export_path),
    }
}

/// Export tagged evidence to CSV, one row per chunk.
///
/// Multi-valued columns (categories, matched_keywords) are joined with `;`.
pub fn export_csv<W: Write>(
    items: &[TaggedEvidence],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "case_id",
            "file_id",
            "citation",
            "line_start",
            "line_end",
            "sender",
            "timestamp",
            "content_hash",
            "categories",
            "confidence",
            "matched_keywords",
            "reasoning",
            "content",
        ])
        .map_err(csv_err)?;

    for item in items {
        let chunk = &item.chunk;
        let location = &chunk.source_location;
        let categories = item
            .tagging
            .categories
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(";");
        let citation = location.citation();
        let line_start = location.line_number.to_string();
        let line_end = location
            .line_number_end
            .map(|n| n.to_string())
            .unwrap_or_default();
        let timestamp = chunk.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string();
        let confidence = format!("{:.2}", item.tagging.confidence);
        let keywords = item.tagging.matched_keywords.join(";");

        csv_writer
            .write_record([
                chunk.case_id.as_str(),
                chunk.file_id.as_str(),
                citation.as_str(),
                line_start.as_str(),
                line_end.as_str(),
                chunk.sender.as_str(),
                timestamp.as_str(),
                chunk.content_hash.as_str(),
                categories.as_str(),
                confidence.as_str(),
                keywords.as_str(),
                item.tagging.reasoning.as_str(),
                chunk.content.as_str(),
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(items.len())
}

/// Export tagged evidence to JSON (pretty-printed array of objects).
pub fn export_json<W: Write>(
    items: &[TaggedEvidence],
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(&mut writer, items).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writeln!(writer).map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(items.len())
}
