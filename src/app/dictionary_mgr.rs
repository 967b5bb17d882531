// ChatEvidence - app/dictionary_mgr.rs
//
// Chooses the keyword dictionary for a run: an explicitly requested file,
// else a configured or user-directory override, else the built-in one.
// An explicit file that fails to load is fatal; a broken override is
// reported and the built-in dictionary is used instead.

use crate::core::dictionary::{self, KeywordDictionary};
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::DictionaryError;
use std::path::{Path, PathBuf};

/// Load the dictionary for a run.
///
/// Returns the dictionary and any non-fatal errors from override files.
pub fn load_dictionary(
    explicit: Option<&Path>,
    configured: Option<&Path>,
    user_dir: Option<&Path>,
) -> Result<(KeywordDictionary, Vec<DictionaryError>), DictionaryError> {
    if let Some(path) = explicit {
        let dict = load_file(path)?;
        return Ok((dict, Vec::new()));
    }

    let mut errors = Vec::new();
    if let Some(path) = override_path(configured, user_dir) {
        match load_file(&path) {
            Ok(dict) => return Ok((dict, errors)),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Dictionary override rejected; using built-in dictionary"
                );
                errors.push(e);
            }
        }
    }

    let dict = dictionary::load_builtin()?;
    tracing::info!(
        name = %dict.name,
        keywords = dict.keyword_count(),
        "Loaded built-in dictionary"
    );
    Ok((dict, errors))
}

/// A configured file wins; otherwise `<user_dir>/article840.toml` if present.
fn override_path(configured: Option<&Path>, user_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(path.to_path_buf());
    }
    let candidate = user_dir?.join(constants::USER_DICTIONARY_FILE_NAME);
    if candidate.is_file() {
        Some(candidate)
    } else {
        tracing::debug!(
            path = %candidate.display(),
            "No user dictionary override (skipping)"
        );
        None
    }
}

fn load_file(path: &Path) -> Result<KeywordDictionary, DictionaryError> {
    let content = fs::read_dictionary_file(path)?;
    let dict = dictionary::load_from_str(&content, path)?;
    tracing::info!(
        path = %path.display(),
        name = %dict.name,
        keywords = dict.keyword_count(),
        "Loaded dictionary file"
    );
    Ok(dict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Article840Category;

    fn renamed_builtin(name: &str) -> String {
        dictionary::builtin_dictionary_source()
            .replace("name = \"article840-default\"", &format!("name = \"{name}\""))
    }

    #[test]
    fn test_defaults_to_builtin() {
        let (dict, errors) = load_dictionary(None, None, None).unwrap();
        assert_eq!(dict.name, "article840-default");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_explicit_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(&explicit, renamed_builtin("explicit")).unwrap();
        let configured = dir.path().join("configured.toml");
        std::fs::write(&configured, renamed_builtin("configured")).unwrap();

        let (dict, _) = load_dictionary(Some(explicit.as_path()), Some(configured.as_path()), None).unwrap();
        assert_eq!(dict.name, "explicit");
    }

    #[test]
    fn test_broken_explicit_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("broken.toml");
        std::fs::write(&explicit, "[[category]]\nid = \"general\"\nweight = 1\nkeywords = [\"x\"]\n")
            .unwrap();
        assert!(matches!(
            load_dictionary(Some(explicit.as_path()), None, None),
            Err(DictionaryError::MissingCategory { .. })
        ));
    }

    #[test]
    fn test_broken_override_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let configured = dir.path().join("configured.toml");
        std::fs::write(&configured, "not toml [[").unwrap();

        let (dict, errors) = load_dictionary(None, Some(configured.as_path()), None).unwrap();
        assert_eq!(dict.name, "article840-default");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], DictionaryError::TomlParse { .. }));
    }

    #[test]
    fn test_user_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        let source = dictionary::builtin_dictionary_source()
            .replace("\"도박\",", "\"도박\", \"경마\",");
        std::fs::write(dir.path().join(constants::USER_DICTIONARY_FILE_NAME), source).unwrap();

        let (dict, errors) = load_dictionary(None, None, Some(dir.path())).unwrap();
        assert!(errors.is_empty());
        assert!(dict
            .rule(Article840Category::FinancialMisconduct)
            .unwrap()
            .keywords
            .contains(&"경마".to_string()));
    }
}
