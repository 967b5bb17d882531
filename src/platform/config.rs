// ChatEvidence - platform/config.rs
//
// Platform-specific directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::export::ExportFormat;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ChatEvidence configuration and data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/chatevidence/)
    pub config_dir: PathBuf,

    /// User dictionary directory (e.g. ~/.config/chatevidence/dictionaries/)
    pub user_dictionaries_dir: PathBuf,

    /// Data directory for log files.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let user_dictionaries_dir = config_dir.join(constants::DICTIONARIES_DIR_NAME);
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                dictionaries = %user_dictionaries_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                user_dictionaries_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                user_dictionaries_dir: fallback.join(constants::DICTIONARIES_DIR_NAME),
                data_dir: fallback,
            }
        }
    }

    /// Location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are ignored so an older binary accepts a newer file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub parsing: ParsingSection,
    pub tagging: TaggingSection,
    pub export: ExportSection,
    pub logging: LoggingSection,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// Characters of an unparseable line kept in the error report.
    pub error_preview_chars: Option<usize>,
}

/// `[tagging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TaggingSection {
    /// Enable negation filtering.
    pub negation: Option<bool>,
    /// Replacement keyword dictionary (TOML). Relative paths resolve against
    /// the directory holding config.toml.
    pub dictionary_file: Option<String>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// "json" or "csv".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub error_preview_chars: usize,
    pub negation: bool,
    pub dictionary_file: Option<PathBuf>,
    pub export_format: ExportFormat,
    /// Logging level string (read before tracing is initialised).
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            error_preview_chars: constants::DEFAULT_ERROR_PREVIEW_CHARS,
            negation: false,
            dictionary_file: None,
            export_format: ExportFormat::default(),
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate config.toml at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults plus one warning; the caller decides
/// whether to surface it.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source: e,
            };
            warnings.push(format!("{err}. Using defaults."));
            tracing::warn!(error = %err, "Config unreadable");
            return (AppConfig::default(), warnings);
        }
    };

    let base_dir = config_path.parent().unwrap_or(Path::new("."));
    let (config, mut found) = config_from_str(&content, config_path, base_dir);
    warnings.append(&mut found);
    if warnings.is_empty() {
        tracing::info!(path = %config_path.display(), "Loaded config.toml");
    } else {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }
    (config, warnings)
}

/// Parse and validate config text. `source_path` is used in messages only;
/// `base_dir` anchors relative paths.
pub fn config_from_str(
    content: &str,
    source_path: &Path,
    base_dir: &Path,
) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    let raw: RawConfig = match toml::from_str(content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: source_path.to_path_buf(),
                source: e,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (config, warnings);
        }
    };

    let mut out_of_range = |field: &str, value: String, expected: String| {
        let err = ConfigError::ValueOutOfRange {
            field: field.to_string(),
            value,
            expected,
        };
        warnings.push(format!("{err}. Using default."));
    };

    // -- Parsing: error_preview_chars --
    if let Some(chars) = raw.parsing.error_preview_chars {
        if (constants::MIN_ERROR_PREVIEW_CHARS..=constants::MAX_ERROR_PREVIEW_CHARS).contains(&chars) {
            config.error_preview_chars = chars;
        } else {
            out_of_range(
                "parsing.error_preview_chars",
                chars.to_string(),
                format!(
                    "{}-{} (default {})",
                    constants::MIN_ERROR_PREVIEW_CHARS,
                    constants::MAX_ERROR_PREVIEW_CHARS,
                    constants::DEFAULT_ERROR_PREVIEW_CHARS
                ),
            );
        }
    }

    // -- Export: format --
    if let Some(ref format) = raw.export.format {
        match ExportFormat::from_label(format) {
            Some(f) => config.export_format = f,
            None => out_of_range(
                "export.format",
                format.clone(),
                "\"json\" or \"csv\"".to_string(),
            ),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            out_of_range(
                "logging.level",
                level.clone(),
                format!("error, warn, info, debug, trace (default {})", constants::DEFAULT_LOG_LEVEL),
            );
        }
    }

    // -- Tagging --
    if let Some(negation) = raw.tagging.negation {
        config.negation = negation;
    }
    if let Some(ref file) = raw.tagging.dictionary_file {
        let file = file.trim();
        if !file.is_empty() {
            config.dictionary_file = Some(base_dir.join(file));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    (config, warnings)
}
