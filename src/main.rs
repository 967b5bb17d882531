// ChatEvidence - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation
// 3. Keyword dictionary selection (built-in or user-defined)
// 4. Parsing, tagging and export of one chat export

use chat_evidence::app::{dictionary_mgr, pipeline};
use chat_evidence::core::export::{self, ExportFormat};
use chat_evidence::core::parser::ParseConfig;
use chat_evidence::core::tagger::ArticleTagger;
use chat_evidence::platform::config::{self, PlatformPaths};
use chat_evidence::util::constants;
use chat_evidence::util::error::{ExportError, Result};
use chat_evidence::util::logging;
use clap::Parser;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ChatEvidence - KakaoTalk chat export parser and Article 840 evidence tagger.
///
/// Parses a KakaoTalk text export with line-accurate provenance, tags each
/// message against the Korean Civil Code Art. 840 divorce grounds and writes
/// the tagged evidence as JSON or CSV.
#[derive(Parser, Debug)]
#[command(name = "chat-evidence", version, about)]
struct Cli {
    /// KakaoTalk chat export (.txt; UTF-8, CP949 or EUC-KR).
    file: PathBuf,

    /// Case identifier copied into every evidence chunk.
    #[arg(long = "case-id", default_value = constants::DEFAULT_CASE_ID)]
    case_id: String,

    /// File identifier copied into every evidence chunk (default: file name).
    #[arg(long = "file-id")]
    file_id: Option<String>,

    /// Exclude keywords that occur only in negated clauses.
    #[arg(short = 'n', long = "negation")]
    negation: bool,

    /// Output format: json or csv (default from config, else json).
    #[arg(short = 'f', long = "format", value_parser = parse_format)]
    format: Option<ExportFormat>,

    /// Write output to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Keyword dictionary TOML replacing the built-in one.
    #[arg(long = "dictionary")]
    dictionary: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn parse_format(value: &str) -> std::result::Result<ExportFormat, String> {
    ExportFormat::from_label(value).ok_or_else(|| format!("unknown format '{value}' (json, csv)"))
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = PlatformPaths::resolve();
    let (app_config, config_warnings) = config::load_config(&platform_paths.config_file());

    logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "ChatEvidence starting"
    );

    if let Err(e) = run(&cli, &platform_paths, &app_config) {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, paths: &PlatformPaths, app_config: &config::AppConfig) -> Result<()> {
    let (dictionary, dictionary_errors) = dictionary_mgr::load_dictionary(
        cli.dictionary.as_deref(),
        app_config.dictionary_file.as_deref(),
        Some(paths.user_dictionaries_dir.as_path()),
    )?;
    for err in &dictionary_errors {
        eprintln!("Warning: {err}");
    }

    let mut tagger = ArticleTagger::new(Arc::new(dictionary));
    if cli.negation || app_config.negation {
        tagger = tagger.with_default_negation();
    }

    let options = pipeline::PipelineOptions {
        case_id: cli.case_id.clone(),
        file_id: cli.file_id.clone(),
        parse: ParseConfig {
            error_preview_chars: app_config.error_preview_chars,
        },
    };
    let processed = pipeline::process_file(&cli.file, &tagger, &options)?;

    let format = cli.format.unwrap_or(app_config.export_format);
    let written = match &cli.output {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
                path: path.clone(),
                source: e,
            })?;
            write_output(format, &processed.evidence, BufWriter::new(file), path)?
        }
        None => {
            let stdout = std::io::stdout();
            write_output(format, &processed.evidence, stdout.lock(), Path::new("<stdout>"))?
        }
    };

    let summary = processed.summary();
    tracing::info!(
        file = %summary.file_name,
        records = written,
        format = format.label(),
        parsed_ratio = summary.parsed_ratio,
        "Export written"
    );
    Ok(())
}

fn write_output<W: Write>(
    format: ExportFormat,
    evidence: &[export::TaggedEvidence],
    mut writer: W,
    path: &Path,
) -> std::result::Result<usize, ExportError> {
    let count = export::export(format, evidence, &mut writer, path)?;
    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(count)
}
