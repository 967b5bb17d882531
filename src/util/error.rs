// ChatEvidence - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Line-level parse anomalies are NOT errors: they are recorded in
// `ParsingResult::error_lines`. Only whole-file failures live here.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all ChatEvidence operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum ChatEvidenceError {
    /// Chat log could not be read or decoded.
    Parse(ParseError),

    /// Keyword dictionary loading or validation failed.
    Dictionary(DictionaryError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for ChatEvidenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Dictionary(e) => write!(f, "Dictionary error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for ChatEvidenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Dictionary(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Unrecoverable input errors. Surfaced immediately; no partial result.
#[derive(Debug)]
pub enum ParseError {
    /// The chat export path does not exist.
    NotFound { path: PathBuf },

    /// None of the supported encodings could decode the file.
    FileNotReadable {
        file: String,
        tried: Vec<&'static str>,
    },

    /// I/O error while reading a chat export.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "Chat export '{}' does not exist", path.display())
            }
            Self::FileNotReadable { file, tried } => write!(
                f,
                "'{file}': could not decode with any supported encoding (tried {})",
                tried.join(", ")
            ),
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ParseError> for ChatEvidenceError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Dictionary errors
// ---------------------------------------------------------------------------

/// Errors related to keyword dictionary loading and validation.
#[derive(Debug)]
pub enum DictionaryError {
    /// TOML file could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Dictionary file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A category id is not one of the fixed Article 840 labels.
    UnknownCategory { path: PathBuf, id: String },

    /// The same category is defined twice.
    DuplicateCategory { path: PathBuf, id: String },

    /// A category of the closed enumeration has no definition.
    MissingCategory { path: PathBuf, id: &'static str },

    /// A category has no usable keywords.
    EmptyKeywords { path: PathBuf, id: String },

    /// A category has too many keywords.
    TooManyKeywords {
        path: PathBuf,
        id: String,
        count: usize,
        max: usize,
    },

    /// A category weight is outside the accepted range.
    InvalidWeight {
        path: PathBuf,
        id: String,
        weight: u32,
        max: u32,
    },

    /// I/O error reading a dictionary file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for DictionaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse TOML '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Dictionary '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::UnknownCategory { path, id } => write!(
                f,
                "Dictionary '{}': unknown category '{id}'",
                path.display()
            ),
            Self::DuplicateCategory { path, id } => write!(
                f,
                "Dictionary '{}': category '{id}' is defined more than once",
                path.display()
            ),
            Self::MissingCategory { path, id } => write!(
                f,
                "Dictionary '{}': category '{id}' is not defined",
                path.display()
            ),
            Self::EmptyKeywords { path, id } => write!(
                f,
                "Dictionary '{}': category '{id}' has no keywords",
                path.display()
            ),
            Self::TooManyKeywords {
                path,
                id,
                count,
                max,
            } => write!(
                f,
                "Dictionary '{}': category '{id}' has {count} keywords, maximum is {max}",
                path.display()
            ),
            Self::InvalidWeight {
                path,
                id,
                weight,
                max,
            } => write!(
                f,
                "Dictionary '{}': category '{id}' weight {weight} is out of range (1-{max})",
                path.display()
            ),
            Self::Io { path, source } => write!(
                f,
                "I/O error reading dictionary '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for DictionaryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DictionaryError> for ChatEvidenceError {
    fn from(e: DictionaryError) -> Self {
        Self::Dictionary(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for ChatEvidenceError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ChatEvidenceError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for ChatEvidence results.
pub type Result<T> = std::result::Result<T, ChatEvidenceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_file_not_readable_lists_encodings() {
        let e = ParseError::FileNotReadable {
            file: "chat.txt".to_string(),
            tried: vec!["UTF-8", "CP949", "EUC-KR"],
        };
        let msg = e.to_string();
        assert!(msg.contains("chat.txt"));
        assert!(msg.contains("UTF-8, CP949, EUC-KR"));
    }

    #[test]
    fn test_io_error_chain_is_preserved() {
        let inner = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let e: ChatEvidenceError = ParseError::Io {
            path: PathBuf::from("chat.txt"),
            source: inner,
        }
        .into();
        let parse = e.source().expect("top-level error has a source");
        assert!(parse.source().is_some(), "I/O cause must be chained");
    }
}
