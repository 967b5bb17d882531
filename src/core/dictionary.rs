// ChatEvidence - core/dictionary.rs
//
// Keyword dictionary loading and validation.
// Core layer: accepts TOML strings, never touches the filesystem.
// File reading is done by platform::fs, which feeds content here.
//
// The dictionary is configuration data: swapping the TOML changes what the
// tagger matches without touching the matching algorithm.

use crate::core::model::Article840Category;
use crate::util::constants;
use crate::util::error::DictionaryError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// TOML deserialization structures (raw input)
// =============================================================================

/// Raw TOML dictionary as deserialized from a .toml file.
/// Validated and compiled into a `KeywordDictionary` for runtime use.
#[derive(Debug, Deserialize)]
pub struct DictionaryDefinition {
    #[serde(default)]
    pub dictionary: DictionaryMeta,
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryDef>,
}

#[derive(Debug, Deserialize)]
pub struct DictionaryMeta {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for DictionaryMeta {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
        }
    }
}

fn default_name() -> String {
    "custom".to_string()
}

fn default_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CategoryDef {
    pub id: String,
    pub weight: u32,
    #[serde(default)]
    pub keywords: Vec<String>,
}

// =============================================================================
// Runtime representation
// =============================================================================

/// Keywords and ranking weight for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub category: Article840Category,
    pub weight: u32,
    /// Lower-cased, trimmed, duplicate-free, in file order.
    pub keywords: Vec<String>,
}

/// Validated dictionary covering every `Article840Category` exactly once.
#[derive(Debug, Clone)]
pub struct KeywordDictionary {
    pub name: String,
    pub version: String,
    /// One rule per category, in `Article840Category::all()` order.
    rules: Vec<CategoryRule>,
}

impl KeywordDictionary {
    /// Rules in category declaration order.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Rule for a category. Always present after validation.
    pub fn rule(&self, category: Article840Category) -> Option<&CategoryRule> {
        self.rules.iter().find(|r| r.category == category)
    }

    /// Total keywords across all categories.
    pub fn keyword_count(&self) -> usize {
        self.rules.iter().map(|r| r.keywords.len()).sum()
    }
}

// =============================================================================
// Dictionary validation and compilation
// =============================================================================

/// Parse a TOML string into a `DictionaryDefinition`.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_dictionary_toml(
    toml_content: &str,
    source_path: &Path,
) -> Result<DictionaryDefinition, DictionaryError> {
    toml::from_str(toml_content).map_err(|e| DictionaryError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Validate a `DictionaryDefinition` and compile it into a `KeywordDictionary`.
///
/// Validates:
/// - Every category id is one of the fixed wire labels
/// - No category is defined twice and none is missing
/// - Weights are within 1..=MAX_CATEGORY_WEIGHT
/// - Each category has at least one non-blank keyword, within the size limit
pub fn validate_and_compile(
    def: DictionaryDefinition,
    source_path: &Path,
) -> Result<KeywordDictionary, DictionaryError> {
    let path = || source_path.to_path_buf();
    let mut slots: Vec<Option<CategoryRule>> = vec![None; Article840Category::all().len()];

    for cat_def in def.categories {
        let category = Article840Category::from_label(&cat_def.id).ok_or_else(|| {
            DictionaryError::UnknownCategory {
                path: path(),
                id: cat_def.id.clone(),
            }
        })?;

        if !(1..=constants::MAX_CATEGORY_WEIGHT).contains(&cat_def.weight) {
            return Err(DictionaryError::InvalidWeight {
                path: path(),
                id: cat_def.id,
                weight: cat_def.weight,
                max: constants::MAX_CATEGORY_WEIGHT,
            });
        }

        let keywords = normalise_keywords(&cat_def.keywords);
        if keywords.is_empty() {
            return Err(DictionaryError::EmptyKeywords {
                path: path(),
                id: cat_def.id,
            });
        }
        if keywords.len() > constants::MAX_KEYWORDS_PER_CATEGORY {
            return Err(DictionaryError::TooManyKeywords {
                path: path(),
                id: cat_def.id,
                count: keywords.len(),
                max: constants::MAX_KEYWORDS_PER_CATEGORY,
            });
        }

        let slot = Article840Category::all()
            .iter()
            .position(|c| *c == category)
            .and_then(|idx| slots.get_mut(idx))
            .ok_or_else(|| DictionaryError::UnknownCategory {
                path: path(),
                id: cat_def.id.clone(),
            })?;
        if slot.is_some() {
            return Err(DictionaryError::DuplicateCategory {
                path: path(),
                id: cat_def.id,
            });
        }
        *slot = Some(CategoryRule {
            category,
            weight: cat_def.weight,
            keywords,
        });
    }

    let mut rules = Vec::with_capacity(slots.len());
    for (slot, category) in slots.into_iter().zip(Article840Category::all()) {
        match slot {
            Some(rule) => rules.push(rule),
            None => {
                return Err(DictionaryError::MissingCategory {
                    path: path(),
                    id: category.label(),
                })
            }
        }
    }

    let dictionary = KeywordDictionary {
        name: def.dictionary.name,
        version: def.dictionary.version,
        rules,
    };
    tracing::debug!(
        name = %dictionary.name,
        version = %dictionary.version,
        keywords = dictionary.keyword_count(),
        source = %source_path.display(),
        "Keyword dictionary compiled"
    );
    Ok(dictionary)
}

/// Trim, lower-case, drop blanks and duplicates, keep first-seen order.
fn normalise_keywords(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for kw in raw {
        let kw = kw.trim().to_lowercase();
        if !kw.is_empty() && !out.contains(&kw) {
            out.push(kw);
        }
    }
    out
}

/// Parse and validate in one step.
pub fn load_from_str(
    toml_content: &str,
    source_path: &Path,
) -> Result<KeywordDictionary, DictionaryError> {
    parse_dictionary_toml(toml_content, source_path)
        .and_then(|def| validate_and_compile(def, source_path))
}

// =============================================================================
// Built-in dictionary (embedded at compile time)
// =============================================================================

/// Embedded TOML content of the built-in Article 840 dictionary.
pub fn builtin_dictionary_source() -> &'static str {
    include_str!("../../dictionaries/article840.toml")
}

/// Load and validate the built-in dictionary.
///
/// A failure here is a packaging bug; it is logged and returned.
pub fn load_builtin() -> Result<KeywordDictionary, DictionaryError> {
    let path = PathBuf::from("<builtin>/article840.toml");
    load_from_str(builtin_dictionary_source(), &path).map_err(|e| {
        tracing::error!(error = %e, "Failed to load built-in dictionary");
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_toml_with(extra: &str) -> String {
        let mut toml = String::new();
        for cat in Article840Category::all() {
            toml.push_str(&format!(
                "[[category]]\nid = \"{}\"\nweight = 2\nkeywords = [\"{}\"]\n\n",
                cat.label(),
                cat.label()
            ));
        }
        toml.push_str(extra);
        toml
    }

    #[test]
    fn test_builtin_dictionary_loads() {
        let dict = load_builtin().unwrap();
        assert_eq!(dict.rules().len(), 9);
        assert_eq!(dict.rule(Article840Category::General).unwrap().weight, 1);
        assert_eq!(dict.rule(Article840Category::Adultery).unwrap().weight, 3);
        assert_eq!(dict.rule(Article840Category::DomesticViolence).unwrap().weight, 3);
        assert_eq!(dict.rule(Article840Category::Desertion).unwrap().weight, 2);
        assert!(dict
            .rule(Article840Category::DomesticViolence)
            .unwrap()
            .keywords
            .contains(&"때렸".to_string()));
    }

    #[test]
    fn test_rules_follow_category_order() {
        let dict = load_builtin().unwrap();
        let order: Vec<_> = dict.rules().iter().map(|r| r.category).collect();
        assert_eq!(order, Article840Category::all());
    }

    #[test]
    fn test_keywords_are_normalised() {
        let toml = full_toml_with("").replace(
            "keywords = [\"adultery\"]",
            "keywords = [\" Motel \", \"motel\", \"\", \"HOTEL\"]",
        );
        let dict = load_from_str(&toml, Path::new("t.toml")).unwrap();
        assert_eq!(
            dict.rule(Article840Category::Adultery).unwrap().keywords,
            vec!["motel".to_string(), "hotel".to_string()]
        );
    }

    #[test]
    fn test_unknown_category_rejected() {
        let toml = full_toml_with("[[category]]\nid = \"cruelty\"\nweight = 2\nkeywords = [\"x\"]\n");
        match load_from_str(&toml, Path::new("t.toml")) {
            Err(DictionaryError::UnknownCategory { id, .. }) => assert_eq!(id, "cruelty"),
            other => panic!("Expected UnknownCategory, got: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let toml = full_toml_with("[[category]]\nid = \"general\"\nweight = 1\nkeywords = [\"x\"]\n");
        assert!(matches!(
            load_from_str(&toml, Path::new("t.toml")),
            Err(DictionaryError::DuplicateCategory { .. })
        ));
    }

    #[test]
    fn test_missing_category_rejected() {
        let toml = "[[category]]\nid = \"general\"\nweight = 1\nkeywords = [\"증거\"]\n";
        match load_from_str(toml, Path::new("t.toml")) {
            Err(DictionaryError::MissingCategory { id, .. }) => assert_eq!(id, "adultery"),
            other => panic!("Expected MissingCategory, got: {other:?}"),
        }
    }

    #[test]
    fn test_zero_weight_rejected() {
        let toml = full_toml_with("")
            .replacen("weight = 2", "weight = 0", 1);
        assert!(matches!(
            load_from_str(&toml, Path::new("t.toml")),
            Err(DictionaryError::InvalidWeight { weight: 0, .. })
        ));
    }

    #[test]
    fn test_blank_keywords_rejected() {
        let toml = full_toml_with("").replace("keywords = [\"desertion\"]", "keywords = [\"  \"]");
        assert!(matches!(
            load_from_str(&toml, Path::new("t.toml")),
            Err(DictionaryError::EmptyKeywords { .. })
        ));
    }

    #[test]
    fn test_bad_toml_reports_path() {
        let err = load_from_str("[[category]\n", Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, DictionaryError::TomlParse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }
}
